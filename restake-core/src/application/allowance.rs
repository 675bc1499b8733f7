use super::sequencer::TransactionSequencer;
use crate::domain::{plan_corrections, AllowanceReport, ApprovalDetail, CorrectiveAction};
use crate::foundation::util::time::Clock;
use crate::foundation::RestakeError;
use crate::infrastructure::chain::{calls, ChainClient, DelegatedAllowance};
use crate::infrastructure::logbus::OperationLog;
use alloy::primitives::{Address, U256};
use log::{debug, warn};
use std::sync::Arc;

/// Where the allowance check is pointed: `owner -> registry -> spender` for `token`.
#[derive(Clone, Copy, Debug)]
pub struct AllowanceTarget {
    pub owner: Address,
    pub token: Address,
    pub required: U256,
    pub registry: Address,
    pub spender: Address,
}

pub struct AllowanceResolver {
    chain: Arc<dyn ChainClient>,
    sequencer: Arc<TransactionSequencer>,
    clock: Arc<dyn Clock>,
}

impl AllowanceResolver {
    pub fn new(chain: Arc<dyn ChainClient>, sequencer: Arc<TransactionSequencer>, clock: Arc<dyn Clock>) -> Self {
        Self { chain, sequencer, clock }
    }

    /// Read both edges, correct what is missing, and return once every correction is final.
    pub async fn resolve(&self, target: AllowanceTarget, log: &OperationLog) -> Result<AllowanceReport, RestakeError> {
        let mut report = self.inspect(target, log).await?;
        for action in self.plan(&report) {
            self.apply(&mut report, action, target.registry, log).await?;
        }
        Ok(report)
    }

    /// Read-only classification. A failed registry read counts as an empty row.
    pub async fn inspect(&self, target: AllowanceTarget, log: &OperationLog) -> Result<AllowanceReport, RestakeError> {
        let now = self.clock.now_secs();
        let AllowanceTarget { owner, token, required, registry, spender } = target;

        let direct_current = self.chain.erc20_allowance(token, owner, registry).await?;
        let delegated = match self.chain.registry_allowance(registry, owner, token, spender).await {
            Ok(row) => row,
            Err(err) => {
                warn!("registry allowance read failed; treating as zero token={} spender={} error={}", token, spender, err);
                log.emit(format!("registry allowance read failed, treating as zero: {err}"));
                DelegatedAllowance::default()
            }
        };

        let report = AllowanceReport {
            direct: ApprovalDetail::direct(token, registry, direct_current, required),
            delegated: ApprovalDetail::delegated(token, spender, delegated.amount, required, delegated.expiration, now),
        };
        debug!(
            "allowance state token={} direct_sufficient={} delegated_sufficient={} delegated_expired={}",
            token, report.direct.sufficient, report.delegated.sufficient, report.delegated.expired
        );

        log.emit(format!(
            "direct allowance to registry: current={} required={} sufficient={}",
            report.direct.current_amount, required, report.direct.sufficient
        ));
        let expiry = report.delegated.expires_at.map(|at| at.to_string()).unwrap_or_else(|| "none".to_string());
        log.emit(format!(
            "delegated allowance to spender: current={} required={} expiresAt={} expired={} sufficient={}",
            report.delegated.current_amount, required, expiry, report.delegated.expired, report.delegated.sufficient
        ));
        Ok(report)
    }

    pub fn plan(&self, report: &AllowanceReport) -> Vec<CorrectiveAction> {
        plan_corrections(report, self.clock.now_secs())
    }

    /// Submit one corrective transaction, wait for finality, and record it on the report.
    pub async fn apply(
        &self,
        report: &mut AllowanceReport,
        action: CorrectiveAction,
        registry: Address,
        log: &OperationLog,
    ) -> Result<(), RestakeError> {
        match action {
            CorrectiveAction::ApproveRegistry { token, registry, amount } => {
                log.emit(report.direct.message.clone());
                let receipt = self.sequencer.submit_and_wait(&calls::erc20_approve(token, registry, amount), log).await?;
                report.direct.record_correction(receipt.tx_hash, amount, None);
            }
            CorrectiveAction::ApproveSpender { token, spender, amount, expiration } => {
                log.emit(format!("{} (expiration={expiration})", report.delegated.message));
                let call = calls::registry_approve(registry, token, spender, amount, expiration)?;
                let receipt = self.sequencer.submit_and_wait(&call, log).await?;
                report.delegated.record_correction(receipt.tx_hash, amount, Some(expiration));
            }
        }
        Ok(())
    }
}
