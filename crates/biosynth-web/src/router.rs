//! Axum router: maps all URL paths to handlers.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{
    status::{root, status},
    synthesis::{get_result, synthesize},
};
use crate::state::{AppState, SharedState};
use crate::ws::simulate;

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/", get(root))

        // API endpoints
        .route("/api/v1/synthesize",    post(synthesize))
        .route("/api/v1/results/{id}",  get(get_result))
        .route("/api/v1/status",        get(status))

        // Live progress
        .route("/ws/simulate/{client_id}", get(simulate))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
