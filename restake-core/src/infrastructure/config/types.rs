use crate::foundation::{
    DEFAULT_CHAIN_ID, DEFAULT_DUST_THRESHOLD, DEFAULT_FEE_TIER, DEFAULT_FINALITY_TIMEOUT_SECS, DEFAULT_RECEIPT_POLL_INTERVAL_MS,
    DEFAULT_REBALANCE_SLIPPAGE_BPS, DEFAULT_SWAP_DEADLINE_SECS,
};
use alloy::primitives::{address, Address};
use figment::value::{Dict, Map};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RPC_ADDR: &str = "127.0.0.1:8088";
pub const DEFAULT_RATE_LIMIT_RPS: u32 = 30;
pub const DEFAULT_RATE_LIMIT_BURST: u32 = 60;
pub const DEFAULT_LOG_FILTERS: &str = "info";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub contracts: ContractsConfig,
    #[serde(default)]
    pub flows: FlowsConfig,
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Profile overrides (`[profiles.<name>.*]`), consumed by the loader.
    #[serde(default, skip_serializing)]
    pub profiles: Option<Map<String, Dict>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    /// Hex-encoded key of the single signing account.
    #[serde(skip_serializing)]
    pub private_key: Option<SecretString>,
    pub receipt_poll_interval_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            chain_id: DEFAULT_CHAIN_ID,
            private_key: None,
            receipt_poll_interval_ms: DEFAULT_RECEIPT_POLL_INTERVAL_MS,
        }
    }
}

/// Fixed per-deployment addresses. Defaults target Monad testnet.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractsConfig {
    /// Liquid staking pool; also the share token (sMON).
    pub liquid_staking: Address,
    pub magma_stake: Address,
    /// Magma share token (gMON).
    pub gmon: Address,
    /// Wrapped native token (WMON), the swap output.
    pub wrapped_native: Address,
    /// Secondary allowance registry (Permit2).
    pub allowance_registry: Address,
    pub swap_router: Address,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            liquid_staking: address!("e1d2439b75fb9746e7bc6cb777ae10aa7f7ef9c5"),
            magma_stake: address!("2c9c959516e9aaedb2c748224a41249202ca8be7"),
            gmon: address!("aeef2f6b429cb59c9b2d7bb2141ada993e8571c3"),
            wrapped_native: address!("760afe86e5de5fa0ee542fc7b7b713e1c5425701"),
            allowance_registry: address!("000000000022d473030f116ddee9f6b43ac78ba3"),
            swap_router: address!("94d220c58a23ae0c2ee29344b00a30d1c2d9f1bc"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowsConfig {
    pub finality_timeout_secs: u64,
    pub default_deadline_secs: u64,
    pub default_fee_tier: u32,
    /// Slippage applied to rebalance swaps when computing `amountOutMin`.
    pub rebalance_slippage_bps: u32,
    /// Human-unit decimal string, e.g. "0.0001".
    pub dust_threshold: String,
}

impl Default for FlowsConfig {
    fn default() -> Self {
        Self {
            finality_timeout_secs: DEFAULT_FINALITY_TIMEOUT_SECS,
            default_deadline_secs: DEFAULT_SWAP_DEADLINE_SECS,
            default_fee_tier: DEFAULT_FEE_TIER,
            rebalance_slippage_bps: DEFAULT_REBALANCE_SLIPPAGE_BPS,
            dust_threshold: DEFAULT_DUST_THRESHOLD.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub enabled: bool,
    pub addr: String,
    pub token: Option<String>,
    pub rate_limit_rps: u32,
    pub rate_limit_burst: u32,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            addr: DEFAULT_RPC_ADDR.to_string(),
            token: None,
            rate_limit_rps: DEFAULT_RATE_LIMIT_RPS,
            rate_limit_burst: DEFAULT_RATE_LIMIT_BURST,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: Option<String>,
    pub filters: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { dir: None, filters: DEFAULT_LOG_FILTERS.to_string() }
    }
}
