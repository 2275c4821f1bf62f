/// Core record types that flow through the synthesis pipeline.
/// Every record is immutable once produced by its stage.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::organism::Organism;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

pub const TRAIT_MIN_LEN: usize = 3;
pub const TRAIT_MAX_LEN: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub host_organism: Organism,
    pub desired_trait: String,
    #[serde(default = "bool_true")]
    pub optimize: bool,
    #[serde(default = "bool_true")]
    pub safety_check: bool,
}

fn bool_true() -> bool { true }

impl SynthesisRequest {
    pub fn new(host_organism: Organism, desired_trait: impl Into<String>) -> Self {
        Self {
            host_organism,
            desired_trait: desired_trait.into(),
            optimize: true,
            safety_check: true,
        }
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    /// Checks the trait length bounds (counted in characters).
    pub fn validate(&self) -> Result<(), String> {
        let len = self.desired_trait.chars().count();
        if !(TRAIT_MIN_LEN..=TRAIT_MAX_LEN).contains(&len) {
            return Err(format!(
                "desired_trait must be between {} and {} characters (got {})",
                TRAIT_MIN_LEN, TRAIT_MAX_LEN, len
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Gene
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GeneRecord {
    pub name: String,
    pub species: String,
    pub external_id: String,
    pub sequence: String,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Off-target analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Impact {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffTargetSite {
    pub sequence: String,
    pub chromosome: String,
    pub position: u64,
    pub mismatch_count: u32,
    pub impact: Impact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OffTargetAnalysis {
    total_sites: usize,
    high_risk_sites: usize,
    sites: Vec<OffTargetSite>,
    warnings: Vec<String>,
}

impl OffTargetAnalysis {
    /// Builds an analysis; both counters are derived from `sites`.
    pub fn new(sites: Vec<OffTargetSite>, warnings: Vec<String>) -> Self {
        let high_risk_sites = sites.iter().filter(|s| s.impact == Impact::High).count();
        Self {
            total_sites: sites.len(),
            high_risk_sites,
            sites,
            warnings,
        }
    }

    pub fn total_sites(&self) -> usize { self.total_sites }
    pub fn high_risk_sites(&self) -> usize { self.high_risk_sites }
    pub fn sites(&self) -> &[OffTargetSite] { &self.sites }
    pub fn warnings(&self) -> &[String] { &self.warnings }
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StructureMethod {
    External,
    #[default]
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StructurePrediction {
    pub structure_payload: String,
    pub confidence: f64,
    pub method: StructureMethod,
}

// ---------------------------------------------------------------------------
// Risk
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RiskAssessment {
    pub toxicity: f64,
    pub immunogenicity: f64,
    pub environmental_risk: f64,
    pub recommendations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisStatus {
    Completed,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub request_id: Uuid,
    pub status: SynthesisStatus,
    pub gene: GeneRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized_sequence: Option<String>,
    pub insertion_locus: String,
    pub off_target: OffTargetAnalysis,
    pub structure: StructurePrediction,
    pub risk: RiskAssessment,
    pub recommendation: String,
    pub confidence_score: f64,
}

impl SynthesisResult {
    /// Error record: every sub-record present but zeroed, the fault message
    /// embedded in the gene description, the warnings, and the recommendation.
    pub fn failed(request_id: Uuid, message: &str) -> Self {
        Self {
            request_id,
            status: SynthesisStatus::Error,
            gene: GeneRecord {
                description: format!("Error: {message}"),
                ..GeneRecord::default()
            },
            optimized_sequence: None,
            insertion_locus: String::new(),
            off_target: OffTargetAnalysis::new(
                Vec::new(),
                vec![format!("Processing error: {message}")],
            ),
            structure: StructurePrediction {
                structure_payload: String::new(),
                confidence: 0.0,
                method: StructureMethod::Simulated,
            },
            risk: RiskAssessment {
                recommendations: vec!["Simulation failed due to an error".to_string()],
                ..RiskAssessment::default()
            },
            recommendation: format!(
                "Unable to generate recommendation due to processing error: {message}"
            ),
            confidence_score: 0.0,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == SynthesisStatus::Completed
    }
}
