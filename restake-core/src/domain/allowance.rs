//! Two-layer allowance model.
//!
//! Spending rights flow `owner -> registry -> final spender`:
//! - the *direct* edge is a plain ERC-20 allowance from the owner to the registry;
//! - the *delegated* edge lives in the registry's own table, keyed by
//!   `(owner, token, spender)`, with a 160-bit amount and a 48-bit expiration.

use crate::foundation::util::amount::{max_for_bits, serde_decimal};
use crate::foundation::SECONDS_PER_YEAR;
use alloy::primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};

/// Width of the registry's amount field (`uint160`).
pub const DELEGATED_AMOUNT_BITS: usize = 160;

/// Largest expiration the registry's `uint48` field can hold.
pub const MAX_DELEGATED_EXPIRATION: u64 = (1 << 48) - 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApprovalKind {
    Direct,
    Delegated,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalDetail {
    pub token: Address,
    pub spender: Address,
    pub kind: ApprovalKind,
    #[serde(with = "serde_decimal")]
    pub current_amount: U256,
    #[serde(with = "serde_decimal")]
    pub required_amount: U256,
    /// Unix seconds; `None` means the edge never expires.
    pub expires_at: Option<u64>,
    pub expired: bool,
    pub sufficient: bool,
    pub action_taken: bool,
    pub tx_ref: Option<TxHash>,
    pub message: String,
}

impl ApprovalDetail {
    pub fn direct(token: Address, registry: Address, current: U256, required: U256) -> Self {
        let sufficient = is_sufficient(current, required, None, 0);
        let message = if sufficient {
            "direct approval to registry exists and is sufficient".to_string()
        } else {
            "direct approval to registry missing or insufficient; will approve max".to_string()
        };
        Self {
            token,
            spender: registry,
            kind: ApprovalKind::Direct,
            current_amount: current,
            required_amount: required,
            expires_at: None,
            expired: false,
            sufficient,
            action_taken: false,
            tx_ref: None,
            message,
        }
    }

    pub fn delegated(token: Address, spender: Address, current: U256, required: U256, expires_at: u64, now: u64) -> Self {
        let expires_at = normalize_expiration(expires_at);
        let expired = is_expired(expires_at, now);
        let sufficient = is_sufficient(current, required, expires_at, now);
        let message = if sufficient {
            "delegated allowance to spender exists and is valid".to_string()
        } else if expired {
            "delegated allowance expired; will re-approve".to_string()
        } else {
            "delegated allowance missing or insufficient; will approve".to_string()
        };
        Self {
            token,
            spender,
            kind: ApprovalKind::Delegated,
            current_amount: current,
            required_amount: required,
            expires_at,
            expired,
            sufficient,
            action_taken: false,
            tx_ref: None,
            message,
        }
    }

    /// Mark this edge as corrected. Only call once the corrective receipt is final.
    pub fn record_correction(&mut self, tx_hash: TxHash, new_amount: U256, new_expiration: Option<u64>) {
        self.action_taken = true;
        self.tx_ref = Some(tx_hash);
        self.current_amount = new_amount;
        self.expires_at = new_expiration;
        self.expired = false;
        self.sufficient = true;
        self.message = match self.kind {
            ApprovalKind::Direct => "direct approval to registry submitted and confirmed".to_string(),
            ApprovalKind::Delegated => "delegated allowance to spender submitted and confirmed".to_string(),
        };
    }
}

/// Both edges for one `(owner, token)` pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowanceReport {
    pub direct: ApprovalDetail,
    pub delegated: ApprovalDetail,
}

impl AllowanceReport {
    pub fn corrections_taken(&self) -> usize {
        usize::from(self.direct.action_taken) + usize::from(self.delegated.action_taken)
    }
}

/// A corrective transaction the resolver must submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CorrectiveAction {
    /// ERC-20 `approve(registry, 2^256-1)` on the token.
    ApproveRegistry { token: Address, registry: Address, amount: U256 },
    /// Registry `approve(token, spender, 2^160-1, expiration)`.
    ApproveSpender { token: Address, spender: Address, amount: U256, expiration: u64 },
}

impl CorrectiveAction {
    pub fn kind(&self) -> ApprovalKind {
        match self {
            CorrectiveAction::ApproveRegistry { .. } => ApprovalKind::Direct,
            CorrectiveAction::ApproveSpender { .. } => ApprovalKind::Delegated,
        }
    }
}

/// Zero means "no expiration" on-chain.
pub fn normalize_expiration(expires_at: u64) -> Option<u64> {
    (expires_at != 0).then_some(expires_at)
}

pub fn is_expired(expires_at: Option<u64>, now: u64) -> bool {
    matches!(expires_at, Some(at) if at <= now)
}

pub fn is_sufficient(current: U256, required: U256, expires_at: Option<u64>, now: u64) -> bool {
    current >= required && !is_expired(expires_at, now)
}

/// Expiration stamped on renewed delegated allowances.
pub fn renewal_expiration(now: u64) -> u64 {
    now.saturating_add(SECONDS_PER_YEAR).min(MAX_DELEGATED_EXPIRATION)
}

/// Minimal ordered set of corrections: direct edge first, then delegated.
pub fn plan_corrections(report: &AllowanceReport, now: u64) -> Vec<CorrectiveAction> {
    let mut actions = Vec::with_capacity(2);
    if !report.direct.sufficient {
        actions.push(CorrectiveAction::ApproveRegistry {
            token: report.direct.token,
            registry: report.direct.spender,
            amount: U256::MAX,
        });
    }
    if !report.delegated.sufficient {
        actions.push(CorrectiveAction::ApproveSpender {
            token: report.delegated.token,
            spender: report.delegated.spender,
            amount: max_for_bits(DELEGATED_AMOUNT_BITS),
            expiration: renewal_expiration(now),
        });
    }
    actions
}
