#![allow(dead_code)]

use super::constants::{TEST_NOW_SECS, TEST_SIGNER};
use alloy::primitives::U256;
use restake_core::application::{AllowanceResolver, AllowanceTarget, FlowSettings, Orchestrator, TransactionSequencer};
use restake_core::foundation::util::time::FixedClock;
use restake_core::foundation::OperationId;
use restake_core::infrastructure::chain::{MockChain, MockContracts, UniversalRouterV3};
use restake_core::infrastructure::config::AppConfig;
use restake_core::infrastructure::logbus::{LogBus, LogEvent, LogSubscription};
use std::sync::Arc;
use std::time::Duration;

/// Orchestrator wired to an in-memory chain with a pinned clock.
pub struct Harness {
    pub chain: Arc<MockChain>,
    pub bus: Arc<LogBus>,
    pub clock: Arc<FixedClock>,
    pub sequencer: Arc<TransactionSequencer>,
    pub settings: FlowSettings,
    pub orchestrator: Orchestrator,
}

impl Harness {
    pub fn new() -> Self {
        let mut settings = FlowSettings::from_config(&AppConfig::default()).expect("default settings");
        settings.receipt_poll_interval = Duration::from_millis(2);
        settings.finality_timeout = Duration::from_secs(2);

        let contracts = &settings.contracts;
        let chain = Arc::new(MockChain::new(
            TEST_SIGNER,
            MockContracts {
                liquid_staking: contracts.liquid_staking,
                magma_stake: contracts.magma_stake,
                magma_share: contracts.gmon,
                wrapped_native: contracts.wrapped_native,
                registry: contracts.allowance_registry,
            },
        ));
        chain.set_now(TEST_NOW_SECS);

        let bus = Arc::new(LogBus::new());
        let clock = Arc::new(FixedClock::new(TEST_NOW_SECS));
        let sequencer =
            Arc::new(TransactionSequencer::new(chain.clone(), settings.receipt_poll_interval, settings.finality_timeout));
        let swap = Arc::new(UniversalRouterV3::new(contracts.swap_router));
        let orchestrator = Orchestrator::new(chain.clone(), sequencer.clone(), swap, bus.clone(), clock.clone(), settings.clone());

        Self { chain, bus, clock, sequencer, settings, orchestrator }
    }

    pub fn resolver(&self) -> AllowanceResolver {
        AllowanceResolver::new(self.chain.clone(), self.sequencer.clone(), self.clock.clone())
    }

    /// Liquid-staking shares, owner -> registry -> router.
    pub fn swap_target(&self, required: U256) -> AllowanceTarget {
        AllowanceTarget {
            owner: TEST_SIGNER,
            token: self.settings.contracts.liquid_staking,
            required,
            registry: self.settings.contracts.allowance_registry,
            spender: self.settings.contracts.swap_router,
        }
    }

    /// Subscribe before the flow starts so every line is captured.
    pub fn watch(&self, id: &str) -> (OperationId, LogSubscription) {
        let id = OperationId::from(id);
        let subscription = self.bus.subscribe(&id);
        (id, subscription)
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Drain a finished subscription: log lines plus whether `Done` arrived.
pub async fn drain(subscription: &mut LogSubscription) -> (Vec<String>, bool) {
    let mut lines = Vec::new();
    while let Some(event) = subscription.recv().await {
        match event {
            LogEvent::Log(line) => lines.push(line),
            LogEvent::Done => return (lines, true),
        }
    }
    (lines, false)
}
