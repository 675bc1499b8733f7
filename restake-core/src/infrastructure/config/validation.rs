use crate::foundation::util::amount::parse_decimal_amount;
use crate::foundation::{BPS_DENOMINATOR, MAX_FEE_TIER, TOKEN_DECIMALS};
use crate::infrastructure::config::types::AppConfig;
use alloy::primitives::Address;
use secrecy::ExposeSecret;
use std::net::SocketAddr;

impl AppConfig {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let rpc_url = self.chain.rpc_url.trim();
        if rpc_url.is_empty() {
            errors.push("chain.rpc_url is required".to_string());
        } else if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
            errors.push(format!("chain.rpc_url must be an http(s) url: {rpc_url}"));
        }
        match self.chain.private_key.as_ref() {
            Some(key) if !key.expose_secret().trim().is_empty() => {}
            _ => errors.push("chain.private_key is required".to_string()),
        }
        if self.chain.chain_id == 0 {
            errors.push("chain.chain_id must be > 0".to_string());
        }
        if self.chain.receipt_poll_interval_ms == 0 {
            errors.push("chain.receipt_poll_interval_ms must be > 0".to_string());
        }

        let contracts = [
            ("contracts.liquid_staking", self.contracts.liquid_staking),
            ("contracts.magma_stake", self.contracts.magma_stake),
            ("contracts.gmon", self.contracts.gmon),
            ("contracts.wrapped_native", self.contracts.wrapped_native),
            ("contracts.allowance_registry", self.contracts.allowance_registry),
            ("contracts.swap_router", self.contracts.swap_router),
        ];
        for (name, address) in contracts {
            if address == Address::ZERO {
                errors.push(format!("{name} must not be the zero address"));
            }
        }

        if self.flows.finality_timeout_secs == 0 {
            errors.push("flows.finality_timeout_secs must be > 0".to_string());
        }
        if self.flows.default_deadline_secs == 0 {
            errors.push("flows.default_deadline_secs must be > 0".to_string());
        }
        if self.flows.default_fee_tier > MAX_FEE_TIER {
            errors.push(format!("flows.default_fee_tier must fit in 24 bits (max {MAX_FEE_TIER})"));
        }
        if self.flows.rebalance_slippage_bps > BPS_DENOMINATOR {
            errors.push(format!("flows.rebalance_slippage_bps must not exceed {BPS_DENOMINATOR}"));
        }
        if let Err(err) = parse_decimal_amount("flows.dust_threshold", &self.flows.dust_threshold, TOKEN_DECIMALS) {
            errors.push(err.to_string());
        }

        if self.rpc.enabled {
            if self.rpc.addr.parse::<SocketAddr>().is_err() {
                errors.push(format!("rpc.addr is not a socket address: {}", self.rpc.addr));
            }
            if self.rpc.rate_limit_rps == 0 {
                errors.push("rpc.rate_limit_rps must be > 0".to_string());
            }
            if self.rpc.rate_limit_burst < self.rpc.rate_limit_rps {
                errors.push("rpc.rate_limit_burst must be >= rpc.rate_limit_rps".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
