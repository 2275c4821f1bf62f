//! Structure prediction with a one-way circuit breaker.
//!
//! The first failure of the external folding service marks it unavailable
//! for the life of the process; from then on every request takes the
//! simulated path without touching the network.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use biosynth_common::{StructureMethod, StructurePrediction};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::folding::{FoldingError, FoldingService};

/// Confidence used when an external structure carries no pLDDT values.
pub const DEFAULT_EXTERNAL_CONFIDENCE: f64 = 0.7;
const MAX_SIMULATED_RESIDUES: usize = 1000;

// ── Provider state ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderStatus {
    Unknown,
    Available,
    Unavailable,
}

/// Tri-state availability flag. Transitions only move forward
/// (Unknown → Available → Unavailable), so Unavailable is terminal.
#[derive(Debug, Default)]
pub struct ProviderState(AtomicU8);

const UNKNOWN: u8 = 0;
const AVAILABLE: u8 = 1;
const UNAVAILABLE: u8 = 2;

impl ProviderState {
    pub fn new() -> Self {
        Self(AtomicU8::new(UNKNOWN))
    }

    pub fn unavailable() -> Self {
        Self(AtomicU8::new(UNAVAILABLE))
    }

    pub fn status(&self) -> ProviderStatus {
        match self.0.load(Ordering::Acquire) {
            UNKNOWN => ProviderStatus::Unknown,
            AVAILABLE => ProviderStatus::Available,
            _ => ProviderStatus::Unavailable,
        }
    }

    pub fn mark_available(&self) {
        self.0.fetch_max(AVAILABLE, Ordering::AcqRel);
    }

    /// Returns true if this call performed the transition.
    pub fn mark_unavailable(&self) -> bool {
        self.0.fetch_max(UNAVAILABLE, Ordering::AcqRel) != UNAVAILABLE
    }

    pub fn is_unavailable(&self) -> bool {
        self.status() == ProviderStatus::Unavailable
    }
}

// ── Predictor ────────────────────────────────────────────────────────────────

pub struct StructurePredictor {
    service: Option<Arc<dyn FoldingService>>,
    state: Arc<ProviderState>,
    timeout: Duration,
}

impl StructurePredictor {
    /// Without a service the predictor starts (and stays) unavailable.
    pub fn new(service: Option<Arc<dyn FoldingService>>, timeout: Duration) -> Self {
        let state = if service.is_some() { ProviderState::new() } else { ProviderState::unavailable() };
        Self { service, state: Arc::new(state), timeout }
    }

    pub fn provider_status(&self) -> ProviderStatus {
        self.state.status()
    }

    pub async fn predict(&self, sequence: &str) -> StructurePrediction {
        if let Some(service) = self.service.as_ref().filter(|_| !self.state.is_unavailable()) {
            let outcome = match tokio::time::timeout(self.timeout, service.fold(sequence)).await {
                Ok(Ok(pdb)) if pdb.trim().is_empty() => Err(FoldingError::Empty),
                Ok(result) => result,
                Err(_) => Err(FoldingError::Timeout(self.timeout)),
            };
            match outcome {
                Ok(pdb) => {
                    self.state.mark_available();
                    let confidence = confidence_from_plddt(&pdb);
                    info!(confidence, "Structure predicted by external service");
                    return StructurePrediction {
                        structure_payload: pdb,
                        confidence,
                        method: StructureMethod::External,
                    };
                }
                Err(e) => {
                    if self.state.mark_unavailable() {
                        warn!(error = %e, "Folding service failed, switching to simulated structures");
                    }
                }
            }
        }

        let confidence = simulated_confidence(sequence);
        debug!(confidence, len = sequence.len(), "Simulated structure generated");
        StructurePrediction {
            structure_payload: simulated_pdb(sequence),
            confidence,
            method: StructureMethod::Simulated,
        }
    }
}

/// Mean pLDDT from the B-factor column (61–66) of `ATOM` records, scaled to [0, 1].
pub fn confidence_from_plddt(pdb: &str) -> f64 {
    let scores: Vec<f64> = pdb
        .lines()
        .filter(|l| l.starts_with("ATOM"))
        .filter_map(|l| l.get(60..66.min(l.len())))
        .filter_map(|field| field.trim().parse::<f64>().ok())
        .collect();
    if scores.is_empty() {
        return DEFAULT_EXTERNAL_CONFIDENCE;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    (mean / 100.0).clamp(0.0, 1.0)
}

fn has_nonstandard_residue(sequence: &str) -> bool {
    sequence.contains(['U', 'O', 'B', 'J', 'Z'])
}

/// True if any symbol repeats six or more times in a row.
fn has_long_repeat(sequence: &str) -> bool {
    let mut run = 0usize;
    let mut prev = None;
    for c in sequence.chars() {
        if prev == Some(c) {
            run += 1;
        } else {
            run = 1;
            prev = Some(c);
        }
        if run >= 6 {
            return true;
        }
    }
    false
}

/// Heuristic confidence for simulated structures, always within [0.1, 0.6].
pub fn simulated_confidence(sequence: &str) -> f64 {
    let len = sequence.chars().count();
    let length_confidence = (1.0 - len as f64 / 1000.0).clamp(0.3, 0.7);

    let diversity_ratio = if len == 0 {
        0.0
    } else {
        let unique: std::collections::HashSet<char> = sequence.chars().collect();
        unique.len() as f64 / len as f64
    };
    let diversity_confidence = 0.5 + 0.5 * (1.0 - diversity_ratio);

    let mut penalty = 0.0;
    if has_long_repeat(sequence) {
        penalty += 0.2;
    }
    if has_nonstandard_residue(sequence) {
        penalty += 0.2;
    }

    (0.6 * length_confidence + 0.4 * diversity_confidence - penalty).clamp(0.1, 0.6)
}

/// PDB-like backbone: four atoms per residue along the x axis.
pub fn simulated_pdb(sequence: &str) -> String {
    let preview: String = sequence.chars().take(50).collect();
    let mut lines = vec![format!("REMARK Simulated structure for sequence: {}...", preview)];

    for (i, residue) in sequence.chars().take(MAX_SIMULATED_RESIDUES).enumerate() {
        let n = i + 1;
        let x = n as f64 * 1.5;
        for (k, (atom, element)) in [("N  ", "N"), ("CA ", "C"), ("C  ", "C"), ("O  ", "O")].iter().enumerate() {
            lines.push(format!(
                "ATOM  {:5}  {} {} A {:4}    {:8.3}{:8.3}{:8.3}  1.00 30.00           {}",
                n * 4 - 3 + k,
                atom,
                residue,
                n,
                x + 1.5 * k as f64,
                0.0,
                0.0,
                element
            ));
        }
    }
    lines.push("TER".to_string());
    lines.push("END".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    struct FailingFolder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FoldingService for FailingFolder {
        async fn fold(&self, _sequence: &str) -> Result<String, FoldingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(FoldingError::Empty)
        }
    }

    struct StaticFolder(&'static str);

    #[async_trait]
    impl FoldingService for StaticFolder {
        async fn fold(&self, _sequence: &str) -> Result<String, FoldingError> {
            Ok(self.0.to_string())
        }
    }

    fn atom_line(plddt: f64) -> String {
        format!(
            "ATOM      1  N   MET A   1      11.104  13.207   2.100  1.00{:6.2}           N",
            plddt
        )
    }

    #[test]
    fn test_state_transitions_are_monotone() {
        let state = ProviderState::new();
        assert_eq!(state.status(), ProviderStatus::Unknown);
        state.mark_available();
        assert_eq!(state.status(), ProviderStatus::Available);
        assert!(state.mark_unavailable());
        assert!(!state.mark_unavailable());
        state.mark_available();
        assert_eq!(state.status(), ProviderStatus::Unavailable);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_transitions_end_unavailable() {
        let state = Arc::new(ProviderState::new());
        let mut handles = Vec::new();
        for task_id in 0..16u32 {
            let s = state.clone();
            handles.push(tokio::spawn(async move {
                let mut transitioned = 0usize;
                for i in 0..50u32 {
                    if (task_id + i) % 3 == 0 {
                        transitioned += usize::from(s.mark_unavailable());
                    } else {
                        s.mark_available();
                    }
                    tokio::task::yield_now().await;
                }
                transitioned
            }));
        }

        let mut transitions = 0;
        for handle in handles {
            transitions += handle.await.unwrap();
        }
        assert_eq!(transitions, 1);
        assert_eq!(state.status(), ProviderStatus::Unavailable);
    }

    #[test]
    fn test_nonstandard_residues() {
        assert!(has_nonstandard_residue("MKTAYIAKQZ"));
        assert!(has_nonstandard_residue("UMK"));
        assert!(!has_nonstandard_residue("MKTAYIAKQR"));
        assert!(!has_nonstandard_residue(""));
    }

    #[test]
    fn test_plddt_extraction() {
        let pdb = format!("{}\n{}\nTER", atom_line(80.0), atom_line(90.0));
        assert!((confidence_from_plddt(&pdb) - 0.85).abs() < 1e-9);
        assert_eq!(confidence_from_plddt("HEADER nothing here"), DEFAULT_EXTERNAL_CONFIDENCE);
    }

    #[test]
    fn test_simulated_confidence_bounds_and_penalties() {
        assert_eq!(simulated_confidence(""), 0.6);
        // Long repeat and non-standard residue both penalised.
        let plain = simulated_confidence("MKTAYIAKQR");
        let repeat = simulated_confidence("MKAAAAAAQR");
        let odd = simulated_confidence("MKTAYIAKQZ");
        assert!(repeat < plain);
        assert!(odd <= plain);
        for s in ["", "A", "AAAAAAAAAAAAUUUUUU", "MKTAYIAKQRQISFVKSHFSRQ"] {
            let c = simulated_confidence(s);
            assert!((0.1..=0.6).contains(&c), "{} -> {}", s, c);
        }
    }

    #[test]
    fn test_simulated_pdb_layout() {
        let pdb = simulated_pdb("MK");
        let lines: Vec<&str> = pdb.lines().collect();
        assert!(lines[0].starts_with("REMARK Simulated structure for sequence: MK"));
        assert_eq!(lines.iter().filter(|l| l.starts_with("ATOM")).count(), 8);
        assert_eq!(lines[lines.len() - 2], "TER");
        assert_eq!(lines[lines.len() - 1], "END");

        let long = "A".repeat(1500);
        let atoms = simulated_pdb(&long).lines().filter(|l| l.starts_with("ATOM")).count();
        assert_eq!(atoms, 4000);
    }

    #[tokio::test]
    async fn test_circuit_breaker_never_recalls_service() {
        let folder = Arc::new(FailingFolder { calls: AtomicUsize::new(0) });
        let predictor = StructurePredictor::new(Some(folder.clone()), Duration::from_secs(1));

        let first = predictor.predict("MKTAYIAKQR").await;
        assert_eq!(first.method, StructureMethod::Simulated);
        assert_eq!(predictor.provider_status(), ProviderStatus::Unavailable);

        for _ in 0..3 {
            let p = predictor.predict("MKTAYIAKQR").await;
            assert_eq!(p.method, StructureMethod::Simulated);
        }
        assert_eq!(folder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_predictions_against_failing_service() {
        let folder = Arc::new(FailingFolder { calls: AtomicUsize::new(0) });
        let predictor = Arc::new(StructurePredictor::new(Some(folder.clone()), Duration::from_secs(1)));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let p = predictor.clone();
            handles.push(tokio::spawn(async move { p.predict("MKTAYIAKQR").await }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().method, StructureMethod::Simulated);
        }
        assert_eq!(predictor.provider_status(), ProviderStatus::Unavailable);

        // Calls racing the first failure may reach the service; nothing after it does.
        let burst = folder.calls.load(Ordering::SeqCst);
        assert!((1..=8).contains(&burst));
        for _ in 0..4 {
            predictor.predict("MKTAYIAKQR").await;
        }
        assert_eq!(folder.calls.load(Ordering::SeqCst), burst);
    }

    #[tokio::test]
    async fn test_external_structure_used_when_available() {
        let pdb: &'static str = Box::leak(format!("{}\nEND", atom_line(50.0)).into_boxed_str());
        let predictor = StructurePredictor::new(Some(Arc::new(StaticFolder(pdb))), Duration::from_secs(1));
        let p = predictor.predict("MK").await;
        assert_eq!(p.method, StructureMethod::External);
        assert!((p.confidence - 0.5).abs() < 1e-9);
        assert_eq!(predictor.provider_status(), ProviderStatus::Available);
    }

    #[tokio::test]
    async fn test_empty_payload_trips_breaker() {
        let predictor = StructurePredictor::new(Some(Arc::new(StaticFolder("  "))), Duration::from_secs(1));
        assert_eq!(predictor.predict("MK").await.method, StructureMethod::Simulated);
        assert_eq!(predictor.provider_status(), ProviderStatus::Unavailable);
    }

    #[tokio::test]
    async fn test_without_service_is_simulated() {
        let predictor = StructurePredictor::new(None, Duration::from_secs(1));
        assert_eq!(predictor.provider_status(), ProviderStatus::Unavailable);
        assert_eq!(predictor.predict("MK").await.method, StructureMethod::Simulated);
    }
}
