use crate::api::handlers::types::ApiError;
use crate::api::state::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use log::debug;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Accepts `x-api-key: <token>` or `Authorization: Bearer <token>`. No configured token means open access.
pub fn authorize(headers: &HeaderMap, expected: Option<&str>) -> Result<(), String> {
    let expected = match expected {
        Some(value) if !value.trim().is_empty() => value.trim(),
        _ => return Ok(()),
    };

    if let Some(value) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        if constant_time_eq(value, expected) {
            return Ok(());
        }
    }
    if let Some(token) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()).and_then(|v| v.strip_prefix("Bearer ")) {
        if constant_time_eq(token, expected) {
            return Ok(());
        }
    }
    Err("unauthorized".to_string())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

pub async fn auth_middleware(State(state): State<Arc<AppState>>, req: Request<Body>, next: Next) -> Response {
    if let Err(err) = authorize(req.headers(), state.api_token.as_deref()) {
        debug!("request rejected by auth path={}", req.uri().path());
        return ApiError::unauthorized(err).into_response();
    }
    next.run(req).await
}
