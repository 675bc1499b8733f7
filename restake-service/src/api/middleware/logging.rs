use super::correlation::CorrelationId;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::header::CONTENT_LENGTH;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use log::{debug, error, trace, warn};
use std::net::SocketAddr;
use std::time::Instant;

const REDACTED_HEADERS: &[&str] = &["authorization", "x-api-key", "cookie"];
const MAX_HEADER_VALUE_LEN: usize = 128;

fn sanitize_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if REDACTED_HEADERS.contains(&name.as_str()) {
                "<redacted>".to_string()
            } else {
                match value.to_str() {
                    Ok(text) if text.len() > MAX_HEADER_VALUE_LEN => format!("{}...", &text[..MAX_HEADER_VALUE_LEN]),
                    Ok(text) => text.to_string(),
                    Err(_) => "<non-utf8>".to_string(),
                }
            };
            (name.as_str().to_string(), shown)
        })
        .collect()
}

fn content_length(headers: &HeaderMap) -> u64 {
    headers.get(CONTENT_LENGTH).and_then(|v| v.to_str().ok()).and_then(|s| s.parse::<u64>().ok()).unwrap_or(0)
}

/// Probes are demoted to trace so they do not drown flow traffic.
fn is_probe(path: &str) -> bool {
    matches!(path, "/health" | "/ready" | "/metrics")
}

pub async fn logging_middleware(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let client_ip =
        req.extensions().get::<ConnectInfo<SocketAddr>>().map(|ConnectInfo(addr)| addr.ip().to_string()).unwrap_or_default();
    let correlation_id = req.extensions().get::<CorrelationId>().map(|id| id.0.clone()).unwrap_or_default();
    let request_body_size = content_length(req.headers());
    debug!(
        target: "http",
        "request headers correlation_id={} method={} uri={} headers={:?}",
        correlation_id,
        method,
        req.uri(),
        sanitize_headers(req.headers())
    );
    let start = Instant::now();

    let response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();
    if is_probe(&path) {
        trace!(target: "http", "probe correlation_id={} path={} status={} duration_ms={}", correlation_id, path, status, duration_ms);
    } else if response.status().is_server_error() {
        error!(
            target: "http",
            "request failed correlation_id={} client_ip={} method={} path={} status={} duration_ms={} request_body_size={}",
            correlation_id, client_ip, method, path, status, duration_ms, request_body_size
        );
    } else if response.status().is_client_error() {
        warn!(
            target: "http",
            "request rejected correlation_id={} client_ip={} method={} path={} status={} duration_ms={} request_body_size={}",
            correlation_id, client_ip, method, path, status, duration_ms, request_body_size
        );
    } else {
        debug!(
            target: "http",
            "request correlation_id={} client_ip={} method={} path={} status={} duration_ms={} response_body_size={}",
            correlation_id,
            client_ip,
            method,
            path,
            status,
            duration_ms,
            content_length(response.headers())
        );
    }
    response
}
