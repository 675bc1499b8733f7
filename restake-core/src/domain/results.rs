//! Typed outcomes returned by the orchestrator flows.

use crate::domain::allowance::AllowanceReport;
use crate::domain::rebalance::RebalanceDirection;
use crate::foundation::util::amount::serde_decimal;
use alloy::primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};

/// Finalized receipt, reduced to what callers consume.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub success: bool,
    pub gas_used: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOutcome {
    pub hash: TxHash,
    pub receipt: TxReceipt,
}

impl From<TxReceipt> for TxOutcome {
    fn from(receipt: TxReceipt) -> Self {
        Self { hash: receipt.tx_hash, receipt }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantUnstakeOutcome {
    pub allowances: AllowanceReport,
    pub swap: TxOutcome,
    pub unwrap: Option<TxOutcome>,
    #[serde(with = "serde_decimal")]
    pub unwrapped_amount: U256,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PositionExit {
    Swap(InstantUnstakeOutcome),
    Unstake(TxOutcome),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceOutcome {
    pub direction: RebalanceDirection,
    #[serde(with = "serde_decimal")]
    pub exited_amount: U256,
    #[serde(with = "serde_decimal")]
    pub deposited_amount: U256,
    pub exit: Option<PositionExit>,
    pub deposit: Option<TxOutcome>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceEntry {
    #[serde(with = "serde_decimal")]
    pub raw: U256,
    pub formatted: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancesOutcome {
    pub account: Address,
    pub native: BalanceEntry,
    pub liquid_staking: BalanceEntry,
    pub magma: BalanceEntry,
}
