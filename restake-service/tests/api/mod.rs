mod auth_test;
mod health_test;
mod rate_limit_test;

use alloy::primitives::{Address, U256};
use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use restake_core::application::{FlowSettings, Orchestrator, TransactionSequencer};
use restake_core::foundation::util::time::FixedClock;
use restake_core::infrastructure::chain::{MockChain, MockContracts, UniversalRouterV3};
use restake_core::infrastructure::config::AppConfig;
use restake_core::infrastructure::logbus::LogBus;
use restake_service::api::{build_router, AppState, RateLimiter};
use restake_service::service::metrics::Metrics;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub const NOW_SECS: u64 = 1_750_000_000;
pub const SIGNER: Address = Address::repeat_byte(0xa1);

pub fn tokens(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u8))
}

pub struct TestApp {
    pub chain: Arc<MockChain>,
    pub bus: Arc<LogBus>,
    pub settings: FlowSettings,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(|_| {})
    }

    pub fn with(configure: impl FnOnce(&mut AppState)) -> Self {
        let mut settings = FlowSettings::from_config(&AppConfig::default()).expect("default settings");
        settings.receipt_poll_interval = Duration::from_millis(2);
        settings.finality_timeout = Duration::from_secs(2);
        let contracts = &settings.contracts;

        let chain = Arc::new(MockChain::new(
            SIGNER,
            MockContracts {
                liquid_staking: contracts.liquid_staking,
                magma_stake: contracts.magma_stake,
                magma_share: contracts.gmon,
                wrapped_native: contracts.wrapped_native,
                registry: contracts.allowance_registry,
            },
        ));
        chain.set_now(NOW_SECS);

        let metrics = Arc::new(Metrics::new().expect("metrics"));
        let sequencer = Arc::new(
            TransactionSequencer::new(chain.clone(), settings.receipt_poll_interval, settings.finality_timeout)
                .with_observer(metrics.clone()),
        );
        let bus = Arc::new(LogBus::new());
        let orchestrator = Orchestrator::new(
            chain.clone(),
            sequencer,
            Arc::new(UniversalRouterV3::new(contracts.swap_router)),
            bus.clone(),
            Arc::new(FixedClock::new(NOW_SECS)),
            settings.clone(),
        );

        let mut state = AppState {
            orchestrator: Arc::new(orchestrator),
            chain: chain.clone(),
            metrics,
            rate_limiter: Arc::new(RateLimiter::new()),
            api_token: None,
            rate_limit_rps: 30,
            rate_limit_burst: 60,
        };
        configure(&mut state);
        let router = build_router(Arc::new(state));
        Self { chain, bus, settings, router }
    }

    pub async fn send(&self, mut request: Request<Body>) -> (StatusCode, HeaderMap, String) {
        let client: SocketAddr = "127.0.0.1:40000".parse().expect("addr");
        request.extensions_mut().insert(ConnectInfo(client));
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
        (status, headers, String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn post(&self, path: &str, body: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method("POST").uri(path).header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let (status, _, text) = self.send(builder.body(Body::from(body.to_string())).expect("request")).await;
        (status, serde_json::from_str(&text).unwrap_or(serde_json::Value::Null))
    }

    pub async fn get(&self, path: &str) -> (StatusCode, HeaderMap, String) {
        self.send(Request::builder().uri(path).body(Body::empty()).expect("request")).await
    }
}
