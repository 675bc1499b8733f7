use super::super::middleware::auth::authorize;
use super::super::state::AppState;
use super::types::ApiError;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{debug, trace};
use std::sync::Arc;

pub async fn handle_health() -> impl IntoResponse {
    trace!("health check: ok");
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Ready once the chain endpoint answers.
pub async fn handle_ready(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Err(err) = authorize(&headers, state.api_token.as_deref()) {
        return ApiError::unauthorized(err).into_response();
    }

    match state.chain.block_number().await {
        Ok(block) => {
            trace!("ready check: ok block={}", block);
            Json(serde_json::json!({ "status": "ready", "block": block, "signer": state.chain.signer_address() })).into_response()
        }
        Err(err) => {
            debug!("ready check: degraded error={}", err);
            (StatusCode::SERVICE_UNAVAILABLE, Json(serde_json::json!({ "status": "degraded", "error": err.to_string() })))
                .into_response()
        }
    }
}

pub async fn handle_metrics(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Err(err) = authorize(&headers, state.api_token.as_deref()) {
        return ApiError::unauthorized(err).into_response();
    }

    match state.metrics.encode() {
        Ok(body) => {
            let mut response = body.into_response();
            response.headers_mut().insert(axum::http::header::CONTENT_TYPE, HeaderValue::from_static("text/plain; version=0.0.4"));
            response
        }
        Err(err) => {
            debug!("metrics encode failed error={}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics_error: {}", err)).into_response()
        }
    }
}
