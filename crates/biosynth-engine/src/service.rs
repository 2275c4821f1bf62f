//! Service facade: cache-first synthesis, retrieval by request id, status.

use std::sync::Arc;

use biosynth_common::{SynthesisRequest, SynthesisResult};
use biosynth_config::Config;
use biosynth_llm::{AnthropicBackend, GeminiBackend, LlmBackend, ProviderChain};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::{CacheStore, MemoryStore, ResultCache, ResultStore};
use crate::folding::{EsmFoldClient, FoldingService};
use crate::gene::GeneResolver;
use crate::genomic::{GenomicDatabase, NcbiClient};
use crate::pipeline::{PipelineEvent, SynthesisPipeline};
use crate::recommend::RecommendationGenerator;
use crate::structure::{ProviderStatus, StructurePredictor};

pub const SERVICE_NAME: &str = "BioSynth API";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub text_providers: Vec<String>,
    pub primary_text_provider: Option<String>,
    pub folding_provider: ProviderStatus,
    pub retained_results: usize,
}

pub struct SynthesisService {
    pipeline: SynthesisPipeline,
    cache: ResultCache,
    results: ResultStore,
}

impl SynthesisService {
    pub fn new(pipeline: SynthesisPipeline, cache: ResultCache, results: ResultStore) -> Self {
        Self { pipeline, cache, results }
    }

    /// Wire up every collaborator from configuration. External clients that
    /// cannot be built are left out and their stages run locally.
    pub fn from_config(config: &Config) -> Self {
        let pipeline_cfg = &config.pipeline;
        let timeout = pipeline_cfg.external_timeout();
        let external = pipeline_cfg.use_external_services;

        let genomic: Option<Arc<dyn GenomicDatabase>> = external
            .then(|| {
                NcbiClient::new(
                    timeout,
                    config.credentials.ncbi().map(String::from),
                    config.credentials.ncbi_email.clone(),
                )
                .map_err(|e| warn!(error = %e, "Genomic database client unavailable"))
                .ok()
            })
            .flatten()
            .map(|c| Arc::new(c) as Arc<dyn GenomicDatabase>);

        let folding: Option<Arc<dyn FoldingService>> = external
            .then(|| {
                EsmFoldClient::new(pipeline_cfg.esmfold_url.clone(), timeout)
                    .map_err(|e| warn!(error = %e, "Folding client unavailable"))
                    .ok()
            })
            .flatten()
            .map(|c| Arc::new(c) as Arc<dyn FoldingService>);

        let llm = &config.llm;
        let anthropic: Option<Arc<dyn LlmBackend>> = config
            .credentials
            .anthropic()
            .filter(|_| external)
            .and_then(|key| {
                AnthropicBackend::new(key, llm.anthropic_model.clone(), timeout)
                    .map_err(|e| warn!(error = %e, "Anthropic backend unavailable"))
                    .ok()
            })
            .map(|b| Arc::new(b) as Arc<dyn LlmBackend>);
        let gemini: Option<Arc<dyn LlmBackend>> = config
            .credentials
            .gemini()
            .filter(|_| external)
            .and_then(|key| {
                GeminiBackend::new(key, llm.gemini_model.clone(), timeout)
                    .map_err(|e| warn!(error = %e, "Gemini backend unavailable"))
                    .ok()
            })
            .map(|b| Arc::new(b) as Arc<dyn LlmBackend>);
        let chain = ProviderChain::new(timeout)
            .with_provider("anthropic", anthropic)
            .with_provider("gemini", gemini);

        let seed = pipeline_cfg.simulation_seed;
        let pipeline = SynthesisPipeline::new(
            GeneResolver::new(genomic, timeout, seed),
            StructurePredictor::new(folding, timeout),
            RecommendationGenerator::new(chain, llm.max_tokens),
            seed,
            pipeline_cfg.max_sequence_length,
        );

        let cache = ResultCache::new(cache_store(config), config.cache.ttl());
        let results = ResultStore::new(config.cache.result_ttl());

        info!(
            external_services = external,
            text_providers = ?pipeline.text_providers(),
            "Synthesis service ready"
        );
        Self::new(pipeline, cache, results)
    }

    /// Cache-first synthesis. Completed results are written to both the
    /// trait cache and the request-id store; error records only to the latter.
    pub async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisResult, ServiceError> {
        self.synthesize_inner(request, None).await
    }

    /// As [`synthesize`](Self::synthesize), streaming [`PipelineEvent`]s. A cache
    /// hit produces a single `Completed` event.
    pub async fn synthesize_streaming(
        &self,
        request: &SynthesisRequest,
        progress: &UnboundedSender<PipelineEvent>,
    ) -> Result<SynthesisResult, ServiceError> {
        self.synthesize_inner(request, Some(progress)).await
    }

    async fn synthesize_inner(
        &self,
        request: &SynthesisRequest,
        progress: Option<&UnboundedSender<PipelineEvent>>,
    ) -> Result<SynthesisResult, ServiceError> {
        request.validate().map_err(ServiceError::InvalidRequest)?;

        if let Some(cached) = self.cache.get(&request.desired_trait, request.host_organism).await {
            info!(request_id = %cached.request_id, "Serving cached synthesis result");
            if let Some(tx) = progress {
                let _ = tx.send(PipelineEvent::Completed { result: Box::new(cached.clone()) });
            }
            return Ok(cached);
        }

        let result = self.pipeline.run_with_progress(request, progress).await;
        if result.is_completed() {
            self.cache.put(&request.desired_trait, request.host_organism, &result).await;
        }
        self.results.insert(result.clone()).await;
        Ok(result)
    }

    /// `None` when the id was never issued or its result has expired.
    pub async fn result(&self, request_id: &Uuid) -> Option<SynthesisResult> {
        self.results.get(request_id).await
    }

    pub async fn status(&self) -> ServiceStatus {
        ServiceStatus {
            status: "ok",
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            text_providers: self.pipeline.text_providers(),
            primary_text_provider: self.pipeline.primary_text_provider(),
            folding_provider: self.pipeline.structure_status(),
            retained_results: self.results.len().await,
        }
    }
}

fn cache_store(config: &Config) -> Arc<dyn CacheStore> {
    #[cfg(feature = "redis-cache")]
    if let Some(url) = &config.cache.redis_url {
        match crate::cache::RedisStore::new(url, "biosynth") {
            Ok(store) => {
                info!("Using Redis result cache");
                return Arc::new(store);
            }
            Err(e) => warn!(error = %e, "Redis unavailable, using in-memory cache"),
        }
    }

    #[cfg(not(feature = "redis-cache"))]
    if config.cache.redis_url.is_some() {
        warn!("REDIS_URL set but the redis-cache feature is disabled, using in-memory cache");
    }

    Arc::new(MemoryStore::new())
}
