//! Server-sent events bridge for one operation's log channel.

use crate::api::state::AppState;
use axum::extract::{Query, State};
use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL};
use axum::http::{HeaderValue, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::Stream;
use log::debug;
use restake_core::foundation::OperationId;
use restake_core::infrastructure::logbus::{LogEvent, LogSubscription};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub id: Option<String>,
}

fn log_frame(message: &str) -> Event {
    Event::default().event("log").data(serde_json::json!({ "msg": message }).to_string())
}

fn done_frame() -> Event {
    Event::default().event("done").data("{}")
}

/// Dropping the stream (client went away) drops the subscription, which
/// detaches it without completing the operation.
fn frames(mut subscription: LogSubscription, guard: impl Send + 'static) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        let _guard = guard;
        while let Some(event) = subscription.recv().await {
            match event {
                LogEvent::Log(message) => yield Ok(log_frame(&message)),
                LogEvent::Done => {
                    yield Ok(done_frame());
                    break;
                }
            }
        }
        debug!("log stream finished id={}", subscription.id());
    }
}

pub async fn handle_log_stream(State(state): State<Arc<AppState>>, Query(query): Query<StreamQuery>) -> Response {
    let Some(id) = query.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing id").into_response();
    };
    let id = OperationId::from(id);
    debug!("log stream opened id={}", id);
    let subscription = state.orchestrator.log_bus().subscribe(&id);
    let guard = state.metrics.stream_opened();

    let mut response = Sse::new(frames(subscription, guard)).keep_alive(KeepAlive::default()).into_response();
    let headers = response.headers_mut();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}
