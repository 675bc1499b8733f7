#[path = "restake-service/cli.rs"]
mod cli;
#[path = "restake-service/setup.rs"]
mod setup;

use crate::cli::Cli;
use log::{info, warn};
use restake_service::api::{run_http_server, AppState, RateLimiter};
use restake_service::service::metrics::Metrics;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

const STATUS_REPORT_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse_args();
    args.apply_to_env();

    let app_config = setup::load_config()?;
    setup::init_logging(&app_config)?;
    info!(
        "restake-service starting chain_id={} rpc_enabled={} rpc_addr={}",
        app_config.chain.chain_id, app_config.rpc.enabled, app_config.rpc.addr
    );

    let chain = setup::connect_chain(&app_config).await?;
    info!("signer ready address={}", chain.signer_address());
    let metrics = Arc::new(Metrics::new()?);
    let (orchestrator, _bus) = setup::build_orchestrator(&app_config, chain.clone(), metrics.clone())?;
    spawn_status_reporter(metrics.clone());

    if !app_config.rpc.enabled {
        info!("http surface disabled; waiting for ctrl-c");
        tokio::signal::ctrl_c().await?;
        info!("shutdown signal received");
        return Ok(());
    }

    let addr: SocketAddr = app_config.rpc.addr.parse().map_err(|err| format!("invalid rpc.addr: {}", err))?;
    info!(
        "starting http server addr={} rate_limit_rps={} rate_limit_burst={} auth={}",
        addr,
        app_config.rpc.rate_limit_rps,
        app_config.rpc.rate_limit_burst,
        app_config.rpc.token.is_some()
    );
    let state = Arc::new(AppState {
        orchestrator,
        chain,
        metrics,
        rate_limiter: Arc::new(RateLimiter::new()),
        api_token: app_config.rpc.token.clone(),
        rate_limit_rps: app_config.rpc.rate_limit_rps,
        rate_limit_burst: app_config.rpc.rate_limit_burst,
    });

    tokio::select! {
        result = run_http_server(addr, state) => {
            if let Err(err) = &result {
                warn!("http server error: {}", err);
            }
            result?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("shutdown signal received");
        }
    }
    Ok(())
}

fn spawn_status_reporter(metrics: Arc<Metrics>) {
    tokio::spawn(async move {
        info!("status reporter started interval_seconds={}", STATUS_REPORT_INTERVAL.as_secs());
        let mut interval = tokio::time::interval(STATUS_REPORT_INTERVAL);
        loop {
            interval.tick().await;
            let snapshot = metrics.snapshot();
            info!(
                "periodic status report uptime_minutes={} flows_ok={} flows_failed={} tx_confirmed={} tx_failed={} stream_subscribers={}",
                snapshot.uptime.as_secs() / 60,
                snapshot.flows_ok,
                snapshot.flows_failed,
                snapshot.transactions_confirmed,
                snapshot.transactions_failed,
                snapshot.stream_subscribers
            );
        }
    });
}
