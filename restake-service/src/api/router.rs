use super::handlers::flows::{
    handle_balances, handle_deposit_liquid, handle_instant_unstake, handle_rebalance, handle_redeem, handle_request_unlock,
    handle_stake, handle_withdraw,
};
use super::handlers::health::{handle_health, handle_metrics, handle_ready};
use super::handlers::logs::handle_log_stream;
use super::middleware::auth::auth_middleware;
use super::middleware::correlation::correlation_middleware;
use super::middleware::logging::logging_middleware;
use super::middleware::rate_limit::rate_limit_middleware;
use super::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use log::{error, info};
use restake_core::foundation::RestakeError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

const MAX_BODY_BYTES: usize = 64 * 1024;

pub async fn run_http_server(addr: SocketAddr, state: Arc<AppState>) -> Result<(), RestakeError> {
    info!("binding http server addr={}", addr);
    let app = build_router(state);
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server ready and accepting connections addr={}", addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await.map_err(|err| {
        error!("HTTP server terminated unexpectedly addr={} error={}", addr, err);
        RestakeError::Message(err.to_string())
    })
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let flows: Router<Arc<AppState>> = Router::new()
        .route("/tx/magma/stake", post(handle_stake))
        .route("/tx/magma/withdraw", post(handle_withdraw))
        .route("/tx/kintsu/deposit", post(handle_deposit_liquid))
        .route("/tx/kintsu/unstake", post(handle_instant_unstake))
        .route("/tx/kintsu/request-unlock", post(handle_request_unlock))
        .route("/tx/kintsu/redeem", post(handle_redeem))
        .route("/tx/rebalance", post(handle_rebalance))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), rate_limit_middleware));

    let api: Router<Arc<AppState>> = Router::new()
        .merge(flows)
        .route("/balances", get(handle_balances))
        .route("/logs/stream", get(handle_log_stream))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api", api)
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .route("/metrics", get(handle_metrics))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(logging_middleware))
        .layer(axum::middleware::from_fn(correlation_middleware))
        .with_state(state)
}
