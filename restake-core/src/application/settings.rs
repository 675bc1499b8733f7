use crate::foundation::util::amount::parse_decimal_amount;
use crate::foundation::{RestakeError, TOKEN_DECIMALS};
use crate::infrastructure::config::{AppConfig, ContractsConfig};
use alloy::primitives::U256;
use std::time::Duration;

/// Flow parameters resolved once from configuration.
#[derive(Clone, Debug)]
pub struct FlowSettings {
    pub contracts: ContractsConfig,
    pub default_fee_tier: u32,
    pub default_deadline_secs: u64,
    pub rebalance_slippage_bps: u32,
    /// Base units.
    pub dust_threshold: U256,
    pub finality_timeout: Duration,
    pub receipt_poll_interval: Duration,
}

impl FlowSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, RestakeError> {
        Ok(Self {
            contracts: config.contracts.clone(),
            default_fee_tier: config.flows.default_fee_tier,
            default_deadline_secs: config.flows.default_deadline_secs,
            rebalance_slippage_bps: config.flows.rebalance_slippage_bps,
            dust_threshold: parse_decimal_amount("flows.dust_threshold", &config.flows.dust_threshold, TOKEN_DECIMALS)?,
            finality_timeout: Duration::from_secs(config.flows.finality_timeout_secs),
            receipt_poll_interval: Duration::from_millis(config.chain.receipt_poll_interval_ms),
        })
    }
}
