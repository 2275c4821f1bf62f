//! Welcome and service status.

use axum::extract::State;
use axum::Json;
use biosynth_engine::service::SERVICE_NAME;
use biosynth_engine::ServiceStatus;
use serde::Serialize;

use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct Welcome {
    pub message: String,
    pub version: &'static str,
}

/// GET /
pub async fn root() -> Json<Welcome> {
    Json(Welcome {
        message: format!("Welcome to {}", SERVICE_NAME),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/v1/status
pub async fn status(State(state): State<SharedState>) -> Json<ServiceStatus> {
    Json(state.service.status().await)
}
