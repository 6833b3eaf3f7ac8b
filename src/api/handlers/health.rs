/// Health handler
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::AppState;
use crate::api::types::HealthResponse;
use crate::rag::PipelineState;

/// GET / and GET /health. Reads state only, never triggers initialization.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let pipeline = state.rag.state();

    let (status_code, status, error) = match &pipeline {
        PipelineState::Ready => (StatusCode::OK, "healthy", None),
        PipelineState::Uninitialized => (StatusCode::OK, "initializing", None),
        PipelineState::Failed(reason) => {
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(reason.clone()))
        }
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            state: pipeline.as_str().to_string(),
            ready: pipeline.is_ready(),
            environment: state.environment.clone(),
            backend: state.rag.backend_description(),
            error,
            active_sessions: state.session_manager.session_count(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
