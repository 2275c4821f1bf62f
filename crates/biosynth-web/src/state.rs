//! Shared application state for the web server.

use std::sync::Arc;

use biosynth_config::Config;
use biosynth_engine::SynthesisService;

/// Shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SynthesisService>,
}

impl AppState {
    pub fn new(service: SynthesisService) -> Self {
        Self { service: Arc::new(service) }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(SynthesisService::from_config(config))
    }
}

pub type SharedState = Arc<AppState>;
