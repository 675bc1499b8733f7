use crate::domain::TxReceipt;
use crate::foundation::{RestakeError, RECEIPT_LOOKUP_FAILURE_LIMIT};
use crate::infrastructure::chain::{ChainClient, ContractCall};
use crate::infrastructure::logbus::OperationLog;
use log::{debug, info, trace, warn};
use std::sync::Arc;
use std::time::Duration;

/// Hooks for transaction outcomes (metrics, audit). Defaults are no-ops.
pub trait TxObserver: Send + Sync {
    fn on_submitted(&self, _label: &str) {}
    fn on_confirmed(&self, _label: &str, _receipt: &TxReceipt) {}
    fn on_failed(&self, _label: &str, _error: &RestakeError) {}
}

pub struct NoopTxObserver;

impl TxObserver for NoopTxObserver {}

/// Submits one call at a time and holds the caller until the receipt is final.
///
/// Never resubmits: a rejected, reverted or timed-out transaction is returned to the caller.
pub struct TransactionSequencer {
    chain: Arc<dyn ChainClient>,
    poll_interval: Duration,
    finality_timeout: Duration,
    observer: Arc<dyn TxObserver>,
}

impl TransactionSequencer {
    pub fn new(chain: Arc<dyn ChainClient>, poll_interval: Duration, finality_timeout: Duration) -> Self {
        Self { chain, poll_interval, finality_timeout, observer: Arc::new(NoopTxObserver) }
    }

    pub fn with_observer(mut self, observer: Arc<dyn TxObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub async fn submit_and_wait(&self, call: &ContractCall, log: &OperationLog) -> Result<TxReceipt, RestakeError> {
        let label = call.label();
        let result = self.submit_and_wait_inner(call, log).await;
        match &result {
            Ok(receipt) => self.observer.on_confirmed(label, receipt),
            Err(err) => self.observer.on_failed(label, err),
        }
        result
    }

    async fn submit_and_wait_inner(&self, call: &ContractCall, log: &OperationLog) -> Result<TxReceipt, RestakeError> {
        let label = call.label();
        debug!("submitting transaction label={} to={} value={}", label, call.to, call.value);
        let tx_hash = self.chain.submit(call).await?;
        self.observer.on_submitted(label);
        log.emit(format!("{label} submitted tx={tx_hash}"));

        let receipt = match tokio::time::timeout(self.finality_timeout, self.poll_until_mined(tx_hash)).await {
            Ok(receipt) => receipt.inspect_err(|err| log.emit(format!("{label} receipt unavailable tx={tx_hash}: {err}")))?,
            Err(_) => {
                let timeout_secs = self.finality_timeout.as_secs();
                log.emit(format!("{label} not finalized within {timeout_secs}s tx={tx_hash}"));
                return Err(RestakeError::FinalityTimeout { tx_hash: tx_hash.to_string(), timeout_secs });
            }
        };

        if !receipt.success {
            log.emit(format!("{label} reverted tx={tx_hash}"));
            return Err(RestakeError::Reverted { operation: label.to_string(), tx_hash: tx_hash.to_string() });
        }

        let block = receipt.block_number.map(|n| n.to_string()).unwrap_or_else(|| "pending".to_string());
        info!("transaction confirmed label={} tx={} block={} gas_used={}", label, tx_hash, block, receipt.gas_used);
        log.emit(format!("{label} confirmed block={block}"));
        Ok(receipt)
    }

    /// Poll until a receipt exists. A single failed lookup counts as "not yet";
    /// a run of `RECEIPT_LOOKUP_FAILURE_LIMIT` failures ends the wait with that
    /// read failure so a dead node is not reported as a finality timeout.
    async fn poll_until_mined(&self, tx_hash: alloy::primitives::TxHash) -> Result<TxReceipt, RestakeError> {
        let mut failures = 0u32;
        loop {
            match self.chain.receipt(tx_hash).await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => {
                    failures = 0;
                    trace!("receipt pending tx={}", tx_hash);
                }
                Err(err) => {
                    failures += 1;
                    warn!("receipt lookup failed tx={} attempt={} error={}", tx_hash, failures, err);
                    if failures >= RECEIPT_LOOKUP_FAILURE_LIMIT {
                        return Err(err);
                    }
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
