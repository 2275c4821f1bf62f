//! Synthesis submission and result retrieval.

use axum::extract::{Path, State};
use axum::Json;
use biosynth_common::{SynthesisRequest, SynthesisResult};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::SharedState;

const RESULT_NOT_FOUND: &str = "Result not found or may have expired";

/// POST /api/v1/synthesize
pub async fn synthesize(
    State(state): State<SharedState>,
    Json(request): Json<SynthesisRequest>,
) -> Result<Json<SynthesisResult>, ApiError> {
    info!(
        organism = %request.host_organism,
        desired_trait = %request.desired_trait,
        "Synthesis requested"
    );
    let result = state.service.synthesize(&request).await?;
    Ok(Json(result))
}

/// GET /api/v1/results/{id}
pub async fn get_result(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SynthesisResult>, ApiError> {
    let not_found = || ApiError::NotFound(RESULT_NOT_FOUND.to_string());
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    state.service.result(&id).await.map(Json).ok_or_else(not_found)
}
