//! Named flows composed from the resolver, the sequencer and the contract calls.
//!
//! Every public flow opens the operation's log channel, runs its steps, emits a
//! final line (the error text on failure) and completes the channel exactly once.
//! Sub-flows reused by `rebalance` never complete the channel themselves.

use super::allowance::{AllowanceResolver, AllowanceTarget};
use super::sequencer::TransactionSequencer;
use super::settings::FlowSettings;
use crate::domain::{
    plan_rebalance, swap_deadline, BalanceEntry, BalancesOutcome, Holdings, InstantUnstakeOutcome, PositionExit, RebalanceDirection,
    RebalanceOutcome, SwapFlowState, SwapFlowTracker, SwapRequest, TxOutcome,
};
use crate::foundation::util::amount::{apply_slippage_floor, format_amount};
use crate::foundation::util::time::Clock;
use crate::foundation::{OperationId, RestakeError, TOKEN_DECIMALS};
use crate::infrastructure::chain::{calls, ChainClient, SwapCallBuilder};
use crate::infrastructure::logbus::{LogBus, OperationLog};
use alloy::primitives::{Address, U256};
use log::{debug, info, warn};
use std::sync::Arc;

/// Caller-supplied knobs for the swap exit. `None` falls back to configured defaults.
#[derive(Clone, Debug, Default)]
pub struct InstantUnstakeParams {
    pub amount_in: U256,
    pub amount_out_min: U256,
    pub fee: Option<u32>,
    pub recipient: Option<Address>,
    pub unwrap: bool,
    pub deadline_secs: Option<u64>,
}

pub struct Orchestrator {
    chain: Arc<dyn ChainClient>,
    sequencer: Arc<TransactionSequencer>,
    resolver: AllowanceResolver,
    swap_builder: Arc<dyn SwapCallBuilder>,
    bus: Arc<LogBus>,
    clock: Arc<dyn Clock>,
    settings: FlowSettings,
}

impl Orchestrator {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        sequencer: Arc<TransactionSequencer>,
        swap_builder: Arc<dyn SwapCallBuilder>,
        bus: Arc<LogBus>,
        clock: Arc<dyn Clock>,
        settings: FlowSettings,
    ) -> Self {
        let resolver = AllowanceResolver::new(chain.clone(), sequencer.clone(), clock.clone());
        Self { chain, sequencer, resolver, swap_builder, bus, clock, settings }
    }

    pub fn log_bus(&self) -> &Arc<LogBus> {
        &self.bus
    }

    pub fn settings(&self) -> &FlowSettings {
        &self.settings
    }

    pub fn signer_address(&self) -> Address {
        self.chain.signer_address()
    }

    fn begin(&self, flow: &str, op_id: Option<OperationId>) -> OperationLog {
        let log = OperationLog::begin(self.bus.clone(), op_id);
        info!("flow started flow={} op_id={}", flow, log.id().map(|id| id.as_str()).unwrap_or("-"));
        log
    }

    fn finish<T>(&self, flow: &str, log: &OperationLog, result: Result<T, RestakeError>) -> Result<T, RestakeError> {
        let op_id = log.id().map(|id| id.as_str()).unwrap_or("-");
        match &result {
            Ok(_) => {
                info!("flow completed flow={} op_id={}", flow, op_id);
                log.emit(format!("{flow} completed"));
            }
            Err(err) => {
                warn!("flow failed flow={} op_id={} error={}", flow, op_id, err);
                log.emit(format!("{flow} failed: {err}"));
            }
        }
        log.complete();
        result
    }

    /// Magma `depositMon` with `value = amount`.
    pub async fn stake(&self, op_id: Option<OperationId>, amount: U256) -> Result<TxOutcome, RestakeError> {
        let log = self.begin("stake", op_id);
        let result = self.stake_inner(amount, &log).await;
        self.finish("stake", &log, result)
    }

    async fn stake_inner(&self, amount: U256, log: &OperationLog) -> Result<TxOutcome, RestakeError> {
        require_positive("amount", amount)?;
        log.emit(format!("staking {} with magma", format_amount(amount, TOKEN_DECIMALS)));
        let receipt = self.sequencer.submit_and_wait(&calls::magma_deposit(self.settings.contracts.magma_stake, amount), log).await?;
        Ok(receipt.into())
    }

    /// Magma `withdrawMon(amount)`.
    pub async fn unstake(&self, op_id: Option<OperationId>, amount: U256) -> Result<TxOutcome, RestakeError> {
        let log = self.begin("unstake", op_id);
        let result = self.unstake_inner(amount, &log).await;
        self.finish("unstake", &log, result)
    }

    async fn unstake_inner(&self, amount: U256, log: &OperationLog) -> Result<TxOutcome, RestakeError> {
        require_positive("amount", amount)?;
        log.emit(format!("withdrawing {} from magma", format_amount(amount, TOKEN_DECIMALS)));
        let receipt = self.sequencer.submit_and_wait(&calls::magma_withdraw(self.settings.contracts.magma_stake, amount), log).await?;
        Ok(receipt.into())
    }

    /// Liquid staking `deposit(assets, receiver)` with `value = assets`.
    pub async fn deposit_liquid(
        &self,
        op_id: Option<OperationId>,
        assets: U256,
        receiver: Option<Address>,
    ) -> Result<TxOutcome, RestakeError> {
        let log = self.begin("deposit", op_id);
        let result = self.deposit_liquid_inner(assets, receiver, &log).await;
        self.finish("deposit", &log, result)
    }

    async fn deposit_liquid_inner(&self, assets: U256, receiver: Option<Address>, log: &OperationLog) -> Result<TxOutcome, RestakeError> {
        require_positive("amount", assets)?;
        let receiver = receiver.unwrap_or_else(|| self.chain.signer_address());
        let call = calls::liquid_deposit(self.settings.contracts.liquid_staking, assets, receiver)?;
        log.emit(format!("depositing {} into liquid staking for {receiver}", format_amount(assets, TOKEN_DECIMALS)));
        let receipt = self.sequencer.submit_and_wait(&call, log).await?;
        Ok(receipt.into())
    }

    /// Liquid staking `requestUnlock(shares)`; redeemable later via [`Self::redeem`].
    pub async fn request_unlock(&self, op_id: Option<OperationId>, shares: U256) -> Result<TxOutcome, RestakeError> {
        let log = self.begin("request-unlock", op_id);
        let result = async {
            require_positive("shares", shares)?;
            let call = calls::liquid_request_unlock(self.settings.contracts.liquid_staking, shares)?;
            log.emit(format!("requesting unlock of {} shares", format_amount(shares, TOKEN_DECIMALS)));
            self.sequencer.submit_and_wait(&call, &log).await.map(TxOutcome::from)
        }
        .await;
        self.finish("request-unlock", &log, result)
    }

    pub async fn redeem(
        &self,
        op_id: Option<OperationId>,
        unlock_index: U256,
        receiver: Option<Address>,
    ) -> Result<TxOutcome, RestakeError> {
        let log = self.begin("redeem", op_id);
        let result = async {
            let receiver = receiver.unwrap_or_else(|| self.chain.signer_address());
            let call = calls::liquid_redeem(self.settings.contracts.liquid_staking, unlock_index, receiver);
            log.emit(format!("redeeming unlock request {unlock_index} to {receiver}"));
            self.sequencer.submit_and_wait(&call, &log).await.map(TxOutcome::from)
        }
        .await;
        self.finish("redeem", &log, result)
    }

    /// Exit liquid staking through the router: fix allowances, swap shares for the
    /// wrapped native token, optionally unwrap whatever the signer then holds.
    pub async fn instant_unstake(
        &self,
        op_id: Option<OperationId>,
        params: InstantUnstakeParams,
    ) -> Result<InstantUnstakeOutcome, RestakeError> {
        let log = self.begin("instant-unstake", op_id);
        let result = self.instant_unstake_inner(params, &log).await;
        self.finish("instant-unstake", &log, result)
    }

    async fn instant_unstake_inner(&self, params: InstantUnstakeParams, log: &OperationLog) -> Result<InstantUnstakeOutcome, RestakeError> {
        let mut tracker = SwapFlowTracker::new();
        let result = self.instant_unstake_steps(params, log, &mut tracker).await;
        match result {
            Ok(outcome) => {
                tracker.advance(SwapFlowState::Done)?;
                Ok(outcome)
            }
            Err(err) => {
                debug!("instant unstake failed state={} path={:?}", tracker.state(), tracker.history());
                tracker.fail();
                Err(err)
            }
        }
    }

    async fn instant_unstake_steps(
        &self,
        params: InstantUnstakeParams,
        log: &OperationLog,
        tracker: &mut SwapFlowTracker,
    ) -> Result<InstantUnstakeOutcome, RestakeError> {
        let contracts = &self.settings.contracts;
        let signer = self.chain.signer_address();
        let deadline_secs = params.deadline_secs.unwrap_or(self.settings.default_deadline_secs);
        let mut request = SwapRequest {
            token_in: contracts.liquid_staking,
            token_out: contracts.wrapped_native,
            fee: params.fee.unwrap_or(self.settings.default_fee_tier),
            amount_in: params.amount_in,
            amount_out_min: params.amount_out_min,
            recipient: params.recipient.unwrap_or(signer),
            deadline: swap_deadline(self.clock.now_secs(), deadline_secs),
        };
        request.validate()?;

        tracker.advance(SwapFlowState::AllowanceChecking)?;
        log.emit(format!("checking allowances for {} via registry {}", self.swap_builder.spender(), contracts.allowance_registry));
        let target = AllowanceTarget {
            owner: signer,
            token: request.token_in,
            required: request.amount_in,
            registry: contracts.allowance_registry,
            spender: self.swap_builder.spender(),
        };
        let mut allowances = self.resolver.inspect(target, log).await?;
        for (step, action) in (1u8..).zip(self.resolver.plan(&allowances)) {
            tracker.advance(SwapFlowState::AllowanceCorrecting(step))?;
            self.resolver.apply(&mut allowances, action, contracts.allowance_registry, log).await?;
        }

        // Deadline counts from the swap submission, not from the allowance checks.
        request.deadline = swap_deadline(self.clock.now_secs(), deadline_secs);
        let call = self.swap_builder.build(&request)?;
        tracker.advance(SwapFlowState::SwapSubmitted)?;
        log.emit(format!(
            "swapping {} for wrapped native (minOut={} fee={} deadline={})",
            format_amount(request.amount_in, TOKEN_DECIMALS),
            request.amount_out_min,
            request.fee,
            request.deadline
        ));
        let swap = self.sequencer.submit_and_wait(&call, log).await?;
        tracker.advance(SwapFlowState::SwapConfirmed)?;

        let mut unwrap = None;
        let mut unwrapped_amount = U256::ZERO;
        if params.unwrap {
            tracker.advance(SwapFlowState::UnwrapChecking)?;
            if request.recipient != signer {
                log.emit(format!("swap output went to {}; only the signer's balance can be unwrapped", request.recipient));
                tracker.advance(SwapFlowState::UnwrapSkipped)?;
            } else {
                let balance = self.chain.erc20_balance(contracts.wrapped_native, signer).await?;
                if balance.is_zero() {
                    log.emit("no balance to unwrap");
                    tracker.advance(SwapFlowState::UnwrapSkipped)?;
                } else {
                    tracker.advance(SwapFlowState::UnwrapSubmitted)?;
                    log.emit(format!("unwrapping {}", format_amount(balance, TOKEN_DECIMALS)));
                    let receipt = self.sequencer.submit_and_wait(&calls::unwrap_native(contracts.wrapped_native, balance), log).await?;
                    tracker.advance(SwapFlowState::UnwrapConfirmed)?;
                    unwrap = Some(TxOutcome::from(receipt));
                    unwrapped_amount = balance;
                }
            }
        } else {
            tracker.advance(SwapFlowState::UnwrapSkipped)?;
        }

        Ok(InstantUnstakeOutcome { allowances, swap: swap.into(), unwrap, unwrapped_amount })
    }

    /// Move the whole position that is above dust into the other one.
    pub async fn rebalance(&self, op_id: Option<OperationId>) -> Result<RebalanceOutcome, RestakeError> {
        let log = self.begin("rebalance", op_id);
        let result = self.rebalance_inner(&log).await;
        self.finish("rebalance", &log, result)
    }

    async fn rebalance_inner(&self, log: &OperationLog) -> Result<RebalanceOutcome, RestakeError> {
        let contracts = &self.settings.contracts;
        let signer = self.chain.signer_address();
        let holdings = Holdings {
            liquid_shares: self.chain.erc20_balance(contracts.liquid_staking, signer).await?,
            magma_shares: self.chain.erc20_balance(contracts.gmon, signer).await?,
        };
        log.emit(format!(
            "holdings liquid={} magma={} dust={}",
            format_amount(holdings.liquid_shares, TOKEN_DECIMALS),
            format_amount(holdings.magma_shares, TOKEN_DECIMALS),
            format_amount(self.settings.dust_threshold, TOKEN_DECIMALS)
        ));

        let plan = plan_rebalance(holdings, self.settings.dust_threshold);
        match plan.direction {
            RebalanceDirection::Idle => {
                log.emit("both positions are below the dust threshold; nothing to rebalance");
                Ok(RebalanceOutcome {
                    direction: plan.direction,
                    exited_amount: U256::ZERO,
                    deposited_amount: U256::ZERO,
                    exit: None,
                    deposit: None,
                })
            }
            RebalanceDirection::LiquidToMagma => {
                log.emit("exiting liquid staking via swap, then staking with magma");
                let params = InstantUnstakeParams {
                    amount_in: plan.amount,
                    amount_out_min: apply_slippage_floor(plan.amount, self.settings.rebalance_slippage_bps),
                    unwrap: true,
                    ..InstantUnstakeParams::default()
                };
                let exit = self.instant_unstake_inner(params, log).await?;
                let proceeds = exit.unwrapped_amount;
                let deposit = self.deposit_proceeds(proceeds, log, |amount| Ok(calls::magma_deposit(contracts.magma_stake, amount))).await?;
                Ok(RebalanceOutcome {
                    direction: plan.direction,
                    exited_amount: plan.amount,
                    deposited_amount: if deposit.is_some() { proceeds } else { U256::ZERO },
                    exit: Some(PositionExit::Swap(exit)),
                    deposit,
                })
            }
            RebalanceDirection::MagmaToLiquid => {
                log.emit("exiting magma, then depositing into liquid staking");
                let before = self.chain.native_balance(signer).await?;
                let exit = self.unstake_inner(plan.amount, log).await?;
                let after = self.chain.native_balance(signer).await?;
                // Net of gas spent on the withdrawal.
                let proceeds = after.saturating_sub(before);
                let deposit = self
                    .deposit_proceeds(proceeds, log, |amount| calls::liquid_deposit(contracts.liquid_staking, amount, signer))
                    .await?;
                Ok(RebalanceOutcome {
                    direction: plan.direction,
                    exited_amount: plan.amount,
                    deposited_amount: if deposit.is_some() { proceeds } else { U256::ZERO },
                    exit: Some(PositionExit::Unstake(exit)),
                    deposit,
                })
            }
        }
    }

    async fn deposit_proceeds(
        &self,
        proceeds: U256,
        log: &OperationLog,
        build: impl FnOnce(U256) -> Result<calls::ContractCall, RestakeError>,
    ) -> Result<Option<TxOutcome>, RestakeError> {
        if proceeds.is_zero() {
            log.emit("exit produced no native proceeds; skipping deposit");
            return Ok(None);
        }
        log.emit(format!("depositing proceeds {}", format_amount(proceeds, TOKEN_DECIMALS)));
        let receipt = self.sequencer.submit_and_wait(&build(proceeds)?, log).await?;
        Ok(Some(receipt.into()))
    }

    /// Signer balances: native, liquid-staking shares, Magma shares.
    pub async fn balances(&self) -> Result<BalancesOutcome, RestakeError> {
        let contracts = &self.settings.contracts;
        let account = self.chain.signer_address();
        let native = self.chain.native_balance(account).await?;
        let liquid = self.chain.erc20_balance(contracts.liquid_staking, account).await?;
        let magma = self.chain.erc20_balance(contracts.gmon, account).await?;
        Ok(BalancesOutcome { account, native: entry(native), liquid_staking: entry(liquid), magma: entry(magma) })
    }
}

fn entry(raw: U256) -> BalanceEntry {
    BalanceEntry { raw, formatted: format_amount(raw, TOKEN_DECIMALS) }
}

fn require_positive(field: &str, value: U256) -> Result<(), RestakeError> {
    if value.is_zero() {
        return Err(RestakeError::malformed(format!("{field} must be greater than zero")));
    }
    Ok(())
}
