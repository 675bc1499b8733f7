use crate::api::RateLimiter;
use crate::service::metrics::Metrics;
use restake_core::application::Orchestrator;
use restake_core::infrastructure::chain::ChainClient;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub chain: Arc<dyn ChainClient>,
    pub metrics: Arc<Metrics>,
    pub rate_limiter: Arc<RateLimiter>,
    pub api_token: Option<String>,
    pub rate_limit_rps: u32,
    pub rate_limit_burst: u32,
}
