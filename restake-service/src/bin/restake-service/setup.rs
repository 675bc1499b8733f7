use restake_core::application::{FlowSettings, Orchestrator, TransactionSequencer};
use restake_core::foundation::util::time::SystemClock;
use restake_core::foundation::RestakeError;
use restake_core::infrastructure::chain::{self, ChainClient, UniversalRouterV3};
use restake_core::infrastructure::config::{load_app_config, redact_url, resolve_config_path, AppConfig, PROFILE_ENV};
use restake_core::infrastructure::logbus::LogBus;
use restake_core::infrastructure::logging::init_logger;
use restake_service::service::metrics::Metrics;
use secrecy::ExposeSecret;
use std::sync::Arc;

pub fn load_config() -> Result<Arc<AppConfig>, RestakeError> {
    let path = resolve_config_path()?;
    let profile = std::env::var(PROFILE_ENV).ok().map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
    Ok(Arc::new(load_app_config(&path, profile.as_deref())?))
}

pub fn init_logging(app_config: &AppConfig) -> Result<(), RestakeError> {
    init_logger(app_config.logging.dir.as_deref(), &app_config.logging.filters)
}

pub async fn connect_chain(app_config: &AppConfig) -> Result<Arc<dyn ChainClient>, RestakeError> {
    let private_key = app_config
        .chain
        .private_key
        .as_ref()
        .ok_or_else(|| RestakeError::ConfigError("chain.private_key is required".to_string()))?;
    log::info!("connecting to chain rpc_url={} chain_id={}", redact_url(&app_config.chain.rpc_url), app_config.chain.chain_id);
    let client = chain::connect(&app_config.chain.rpc_url, private_key.expose_secret(), app_config.chain.chain_id).await?;
    Ok(Arc::new(client))
}

pub fn build_orchestrator(
    app_config: &AppConfig,
    chain: Arc<dyn ChainClient>,
    metrics: Arc<Metrics>,
) -> Result<(Arc<Orchestrator>, Arc<LogBus>), RestakeError> {
    let settings = FlowSettings::from_config(app_config)?;
    let sequencer = Arc::new(
        TransactionSequencer::new(chain.clone(), settings.receipt_poll_interval, settings.finality_timeout).with_observer(metrics),
    );
    let swap_builder = Arc::new(UniversalRouterV3::new(settings.contracts.swap_router));
    let bus = Arc::new(LogBus::new());
    let orchestrator = Orchestrator::new(chain, sequencer, swap_builder, bus.clone(), Arc::new(SystemClock), settings);
    Ok((Arc::new(orchestrator), bus))
}
