//! Liveness and health endpoints

use axum::{extract::State, response::Response, Json};
use food_vision::service::status_reply;
use serde::Serialize;

use super::json_response;
use crate::state::SharedState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub backend: String,
    pub classes: usize,
}

/// GET / - Liveness message
pub async fn home() -> Response {
    json_response(status_reply())
}

/// GET /health - Health check endpoint
pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.context.backend_name().to_string(),
        classes: state.context.class_index().len(),
    })
}
