//! Two-position rebalance decision.
//!
//! Deliberately a two-branch rule, not an allocator: whichever position holds more than
//! the dust threshold (liquid staking is checked first) is exited in full and the
//! proceeds go to the other one. No partial moves and no third asset.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RebalanceDirection {
    /// Swap liquid-staking shares out and stake the proceeds with Magma.
    LiquidToMagma,
    /// Unstake Magma and deposit the proceeds into liquid staking.
    MagmaToLiquid,
    Idle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Holdings {
    pub liquid_shares: U256,
    pub magma_shares: U256,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RebalancePlan {
    pub direction: RebalanceDirection,
    /// Shares to exit (the whole position).
    pub amount: U256,
}

pub fn plan_rebalance(holdings: Holdings, dust_threshold: U256) -> RebalancePlan {
    if holdings.liquid_shares > dust_threshold {
        return RebalancePlan { direction: RebalanceDirection::LiquidToMagma, amount: holdings.liquid_shares };
    }
    if holdings.magma_shares > dust_threshold {
        return RebalancePlan { direction: RebalanceDirection::MagmaToLiquid, amount: holdings.magma_shares };
    }
    RebalancePlan { direction: RebalanceDirection::Idle, amount: U256::ZERO }
}
