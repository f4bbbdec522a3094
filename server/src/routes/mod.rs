//! HTTP routes for the food classification API

pub mod health;
pub mod predict;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use food_vision::JsonReply;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::SharedState;

/// Turn a handler reply into an axum response
pub(crate) fn json_response(reply: JsonReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(reply.body)).into_response()
}

/// Build the application router
pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = state.config.body_limit_bytes;

    Router::new()
        .route("/", get(health::home))
        .route("/health", get(health::health_check))
        .route("/predict", post(predict::predict))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
