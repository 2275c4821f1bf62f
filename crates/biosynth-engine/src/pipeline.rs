//! Orchestrator for one synthesis request.
//!
//! Stages run strictly in order. Every stage recovers from its own
//! collaborator failures; only faults that make the request meaningless
//! (see [`PipelineError`]) turn the run into an error record.

use biosynth_common::sequence::gc_content;
use biosynth_common::{SynthesisRequest, SynthesisResult, SynthesisStatus};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::codon::CodonOptimizer;
use crate::confidence;
use crate::gene::GeneResolver;
use crate::locus;
use crate::offtarget::OffTargetPredictor;
use crate::recommend::{AnalysisSummary, RecommendationGenerator};
use crate::risk::RiskAssessor;
use crate::structure::{ProviderStatus, StructurePredictor};

pub const STAGES: [&str; 7] = [
    "Finding suitable gene",
    "Retrieving sequence data",
    "Optimizing codon usage",
    "Predicting off-target effects",
    "Folding protein structure",
    "Assessing risks",
    "Generating recommendations",
];

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("sequence length {len} exceeds the maximum of {max}")]
    SequenceTooLong { len: usize, max: usize },
}

// ── Progress events ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PipelineEvent {
    #[serde(rename = "processing")]
    Stage {
        request_id: Uuid,
        stage: &'static str,
        index: usize,
        total: usize,
        progress: f64,
    },
    Completed { result: Box<SynthesisResult> },
    #[serde(rename = "error")]
    Failed { request_id: Uuid, error: String },
}

struct Progress<'a> {
    request_id: Uuid,
    tx: Option<&'a UnboundedSender<PipelineEvent>>,
}

impl Progress<'_> {
    fn stage(&self, index: usize) {
        let stage = STAGES[index];
        info!(request_id = %self.request_id, stage, "Pipeline stage");
        self.send(PipelineEvent::Stage {
            request_id: self.request_id,
            stage,
            index: index + 1,
            total: STAGES.len(),
            progress: (index + 1) as f64 / STAGES.len() as f64,
        });
    }

    fn send(&self, event: PipelineEvent) {
        if let Some(tx) = self.tx {
            // A closed receiver only means nobody is watching.
            let _ = tx.send(event);
        }
    }
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

pub struct SynthesisPipeline {
    genes: GeneResolver,
    codons: CodonOptimizer,
    off_target: OffTargetPredictor,
    structure: StructurePredictor,
    risk: RiskAssessor,
    recommender: RecommendationGenerator,
    max_sequence_length: usize,
}

impl SynthesisPipeline {
    pub fn new(
        genes: GeneResolver,
        structure: StructurePredictor,
        recommender: RecommendationGenerator,
        seed: u64,
        max_sequence_length: usize,
    ) -> Self {
        Self {
            genes,
            codons: CodonOptimizer::new(),
            off_target: OffTargetPredictor::new(seed),
            structure,
            risk: RiskAssessor::new(seed),
            recommender,
            max_sequence_length,
        }
    }

    pub fn structure_status(&self) -> ProviderStatus {
        self.structure.provider_status()
    }

    pub fn text_providers(&self) -> Vec<String> {
        self.recommender.chain().configured().into_iter().map(String::from).collect()
    }

    pub fn primary_text_provider(&self) -> Option<String> {
        self.recommender.chain().primary().map(String::from)
    }

    pub async fn run(&self, request: &SynthesisRequest) -> SynthesisResult {
        self.run_with_progress(request, None).await
    }

    /// Same as [`run`](Self::run), emitting a [`PipelineEvent`] per stage and a
    /// terminal `Completed`/`Failed` event.
    #[instrument(skip(self, request, progress), fields(organism = %request.host_organism))]
    pub async fn run_with_progress(
        &self,
        request: &SynthesisRequest,
        progress: Option<&UnboundedSender<PipelineEvent>>,
    ) -> SynthesisResult {
        let request_id = Uuid::new_v4();
        let progress = Progress { request_id, tx: progress };
        info!(request_id = %request_id, desired_trait = %request.desired_trait, "Starting synthesis pipeline");

        match self.execute(request_id, request, &progress).await {
            Ok(result) => {
                info!(request_id = %request_id, gene = %result.gene.name, "Synthesis completed");
                progress.send(PipelineEvent::Completed { result: Box::new(result.clone()) });
                result
            }
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "Synthesis failed");
                progress.send(PipelineEvent::Failed { request_id, error: e.to_string() });
                SynthesisResult::failed(request_id, &e.to_string())
            }
        }
    }

    async fn execute(
        &self,
        request_id: Uuid,
        request: &SynthesisRequest,
        progress: &Progress<'_>,
    ) -> Result<SynthesisResult, PipelineError> {
        let organism = request.host_organism;

        // ── 1. Gene ──────────────────────────────────────────────────────────
        progress.stage(0);
        let gene = self.genes.resolve(&request.desired_trait, organism).await;

        // ── 2. Sequence ──────────────────────────────────────────────────────
        progress.stage(1);
        if gene.sequence.len() > self.max_sequence_length {
            return Err(PipelineError::SequenceTooLong {
                len: gene.sequence.len(),
                max: self.max_sequence_length,
            });
        }

        // ── 3. Codon optimisation ────────────────────────────────────────────
        progress.stage(2);
        let optimized_sequence = request
            .optimize
            .then(|| self.codons.optimize(&gene.sequence, organism));
        let target = optimized_sequence.as_deref().unwrap_or(&gene.sequence);

        // ── 4. Off-target ────────────────────────────────────────────────────
        progress.stage(3);
        let off_target = self.off_target.predict(target, organism);

        // ── 5. Structure ─────────────────────────────────────────────────────
        progress.stage(4);
        let structure = self.structure.predict(target).await;

        // ── 6. Risk, confidence, locus ───────────────────────────────────────
        progress.stage(5);
        let risk = self.risk.assess(&gene, organism);
        let confidence_score = confidence::score(target, gc_content(target));
        let insertion_locus = locus::select(&gene.name, organism, target.len());

        // ── 7. Recommendation ────────────────────────────────────────────────
        progress.stage(6);
        let summary = AnalysisSummary {
            gene_name: gene.name.clone(),
            species: gene.species.clone(),
            sequence_length: target.len(),
            off_target_sites: off_target.total_sites(),
            structure_confidence: structure.confidence,
        };
        let recommendation = self.recommender.recommend(&summary).await;

        Ok(SynthesisResult {
            request_id,
            status: SynthesisStatus::Completed,
            gene,
            optimized_sequence,
            insertion_locus,
            off_target,
            structure,
            risk,
            recommendation,
            confidence_score,
        })
    }
}
