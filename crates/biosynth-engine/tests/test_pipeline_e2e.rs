//! End-to-end behaviour of the synthesis service with every external
//! collaborator stubbed out.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use biosynth_common::{Organism, StructureMethod, SynthesisRequest, SynthesisStatus};
use biosynth_engine::cache::{ManualClock, MemoryStore, ResultCache, ResultStore};
use biosynth_engine::folding::{FoldingError, FoldingService};
use biosynth_engine::gene::{GeneResolver, PLACEHOLDER_GENE, PLACEHOLDER_ID};
use biosynth_engine::recommend::RecommendationGenerator;
use biosynth_engine::structure::{ProviderStatus, StructurePredictor};
use biosynth_engine::{confidence, PipelineEvent, SynthesisPipeline, SynthesisService};
use biosynth_llm::ProviderChain;
use futures_util::future::join_all;
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;
use uuid::Uuid;

const TIMEOUT: Duration = Duration::from_secs(1);
const HOUR: Duration = Duration::from_secs(3600);

struct DownFolding {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl FoldingService for DownFolding {
    async fn fold(&self, _sequence: &str) -> Result<String, FoldingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(FoldingError::Empty)
    }
}

fn pipeline(folding: Option<Arc<dyn FoldingService>>) -> SynthesisPipeline {
    SynthesisPipeline::new(
        GeneResolver::new(None, TIMEOUT, 42),
        StructurePredictor::new(folding, TIMEOUT),
        RecommendationGenerator::new(ProviderChain::new(TIMEOUT).with_provider("anthropic", None), 256),
        42,
        10_000,
    )
}

fn service_with(folding: Option<Arc<dyn FoldingService>>, clock: Arc<ManualClock>) -> SynthesisService {
    SynthesisService::new(
        pipeline(folding),
        ResultCache::new(Arc::new(MemoryStore::with_clock(clock.clone())), HOUR),
        ResultStore::with_clock(HOUR, clock),
    )
}

fn service() -> SynthesisService {
    service_with(None, Arc::new(ManualClock::new()))
}

#[tokio::test]
async fn test_bone_density_resolves_polar_bear_lrp5() {
    let r = service()
        .synthesize(&SynthesisRequest::new(Organism::Human, "high bone density"))
        .await
        .unwrap();
    assert_eq!(r.status, SynthesisStatus::Completed);
    assert_eq!(r.gene.name, "LRP5");
    assert_eq!(r.gene.species, "Ursus maritimus");
    assert!(r.recommendation.contains("bone density"));
    assert!((0.3..=0.95).contains(&r.confidence_score), "{}", r.confidence_score);
}

#[tokio::test]
async fn test_unknown_trait_gets_placeholder_gene() {
    let r = service()
        .synthesize(&SynthesisRequest::new(Organism::Mouse, "glow in the dark"))
        .await
        .unwrap();
    assert_eq!(r.gene.name, PLACEHOLDER_GENE);
    assert_eq!(r.gene.external_id, PLACEHOLDER_ID);
    assert_eq!(r.gene.sequence.len(), 303);
    assert!(r.gene.sequence.starts_with("ATG"));
}

#[tokio::test]
async fn test_placeholder_is_reproducible_across_services() {
    let req = SynthesisRequest::new(Organism::Zebrafish, "glow in the dark");
    let a = service().synthesize(&req).await.unwrap();
    let b = service().synthesize(&req).await.unwrap();
    assert_eq!(a.gene.sequence, b.gene.sequence);
    assert_eq!(a.off_target, b.off_target);
    assert_eq!(a.risk, b.risk);
    assert_ne!(a.request_id, b.request_id);
}

#[tokio::test]
async fn test_repeat_request_served_from_cache() {
    let svc = service();
    let first = svc.synthesize(&SynthesisRequest::new(Organism::Human, "cold tolerance")).await.unwrap();
    let second = svc.synthesize(&SynthesisRequest::new(Organism::Human, "  Cold Tolerance ")).await.unwrap();
    let third = svc.synthesize(&SynthesisRequest::new(Organism::Human, "cold tolerance")).await.unwrap();

    assert_eq!(second.request_id, first.request_id);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&second).unwrap(),
        serde_json::to_string(&third).unwrap()
    );
    assert_eq!(svc.status().await.retained_results, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_key_requests_last_writer_wins() {
    let svc = Arc::new(service());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let svc = svc.clone();
            tokio::spawn(async move {
                svc.synthesize(&SynthesisRequest::new(Organism::Human, "salt tolerance")).await
            })
        })
        .collect();

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|h| h.unwrap().unwrap())
        .collect();
    assert!(results.iter().all(|r| r.status == SynthesisStatus::Completed));
    for r in &results {
        assert_eq!(r.gene.sequence, results[0].gene.sequence);
        assert!(svc.result(&r.request_id).await.is_some());
    }

    // Whichever write landed last is what every later request sees.
    let cached = svc.synthesize(&SynthesisRequest::new(Organism::Human, "salt tolerance")).await.unwrap();
    let winner = results.iter().find(|r| r.request_id == cached.request_id).unwrap();
    assert_eq!(serde_json::to_string(winner).unwrap(), serde_json::to_string(&cached).unwrap());
    let again = svc.synthesize(&SynthesisRequest::new(Organism::Human, "salt tolerance")).await.unwrap();
    assert_eq!(again.request_id, cached.request_id);
}

#[tokio::test]
async fn test_cache_is_per_organism() {
    let svc = service();
    let human = svc.synthesize(&SynthesisRequest::new(Organism::Human, "cold tolerance")).await.unwrap();
    let mouse = svc.synthesize(&SynthesisRequest::new(Organism::Mouse, "cold tolerance")).await.unwrap();
    assert_ne!(human.request_id, mouse.request_id);
}

#[tokio::test]
async fn test_cache_entry_expires() {
    let clock = Arc::new(ManualClock::new());
    let svc = service_with(None, clock.clone());
    let req = SynthesisRequest::new(Organism::Human, "cold tolerance");
    let first = svc.synthesize(&req).await.unwrap();
    clock.advance(HOUR + Duration::from_secs(1));
    let again = svc.synthesize(&req).await.unwrap();
    assert_ne!(again.request_id, first.request_id);
}

#[tokio::test]
async fn test_result_lookup_unknown_and_expired() {
    let clock = Arc::new(ManualClock::new());
    let svc = service_with(None, clock.clone());
    assert!(svc.result(&Uuid::new_v4()).await.is_none());

    let r = svc.synthesize(&SynthesisRequest::new(Organism::EColi, "heat tolerance")).await.unwrap();
    assert_eq!(svc.result(&r.request_id).await.map(|x| x.request_id), Some(r.request_id));

    clock.advance(HOUR + Duration::from_secs(1));
    assert!(svc.result(&r.request_id).await.is_none());
}

#[tokio::test]
async fn test_folding_breaker_trips_once_across_requests() {
    let calls = Arc::new(AtomicUsize::new(0));
    let folding: Arc<dyn FoldingService> = Arc::new(DownFolding { calls: calls.clone() });
    let svc = service_with(Some(folding), Arc::new(ManualClock::new()));

    for t in ["cold tolerance", "heat tolerance", "drought resistance"] {
        let r = svc.synthesize(&SynthesisRequest::new(Organism::Human, t)).await.unwrap();
        assert_eq!(r.structure.method, StructureMethod::Simulated);
        assert!(r.structure.structure_payload.starts_with("REMARK Simulated structure"));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(svc.status().await.folding_provider, ProviderStatus::Unavailable);
}

#[tokio::test]
async fn test_streaming_emits_stages_then_result() {
    let svc = service();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let r = svc
        .synthesize_streaming(&SynthesisRequest::new(Organism::Human, "toxin resistance"), &tx)
        .await
        .unwrap();
    drop(tx);

    let mut events = Vec::new();
    while let Some(e) = rx.recv().await {
        events.push(e);
    }
    assert_eq!(events.len(), 8);
    match events.last() {
        Some(PipelineEvent::Completed { result }) => assert_eq!(result.request_id, r.request_id),
        other => panic!("expected completion, got {other:?}"),
    }
}

#[tokio::test]
async fn test_streaming_cache_hit_sends_only_completion() {
    let svc = service();
    let req = SynthesisRequest::new(Organism::Human, "toxin resistance");
    svc.synthesize(&req).await.unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    svc.synthesize_streaming(&req, &tx).await.unwrap();
    drop(tx);
    let mut events = Vec::new();
    while let Some(e) = rx.recv().await {
        events.push(e);
    }
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], PipelineEvent::Completed { .. }));
}

#[tokio::test]
async fn test_error_results_are_not_cached() {
    let svc = SynthesisService::new(
        SynthesisPipeline::new(
            GeneResolver::new(None, TIMEOUT, 42),
            StructurePredictor::new(None, TIMEOUT),
            RecommendationGenerator::new(ProviderChain::new(TIMEOUT), 256),
            42,
            10,
        ),
        ResultCache::new(Arc::new(MemoryStore::new()), HOUR),
        ResultStore::new(HOUR),
    );
    let req = SynthesisRequest::new(Organism::Human, "high bone density");
    let a = svc.synthesize(&req).await.unwrap();
    let b = svc.synthesize(&req).await.unwrap();
    assert_eq!(a.status, SynthesisStatus::Error);
    assert_ne!(a.request_id, b.request_id);
    assert_eq!(svc.result(&a.request_id).await.map(|r| r.status), Some(SynthesisStatus::Error));
}

#[test]
fn test_balanced_sequence_scores_high() {
    let seq = "ATGC".repeat(375);
    assert_eq!(seq.len(), 1500);
    assert_eq!(confidence::score(&seq, 50.0), 0.95);
}
