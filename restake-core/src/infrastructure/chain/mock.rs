//! In-memory chain used by tests and local dry runs.

use super::{CallKind, ChainClient, ContractCall, DelegatedAllowance};
use crate::domain::{is_expired, normalize_expiration, SwapRequest, TxReceipt, DELEGATED_AMOUNT_BITS};
use crate::foundation::util::amount::max_for_bits;
use crate::foundation::util::time::now_secs;
use crate::foundation::{RestakeError, BPS_DENOMINATOR};
use alloy::primitives::{keccak256, Address, TxHash, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

const MOCK_GAS_USED: u64 = 21_000;

/// Contract addresses whose state the mock models.
#[derive(Clone, Copy, Debug)]
pub struct MockContracts {
    pub liquid_staking: Address,
    pub magma_stake: Address,
    pub magma_share: Address,
    pub wrapped_native: Address,
    pub registry: Address,
}

struct PendingReceipt {
    polls_left: u32,
    receipt: TxReceipt,
}

struct MockState {
    now: u64,
    block: u64,
    nonce: u64,
    native: HashMap<Address, U256>,
    erc20: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    delegated: HashMap<(Address, Address, Address), DelegatedAllowance>,
    failing_reads: HashSet<String>,
    failing_submits: HashSet<String>,
    reverting: HashSet<String>,
    stalled: HashSet<String>,
    confirmation_polls: u32,
    swap_rate_bps: u32,
    submitted: Vec<ContractCall>,
    receipts: HashMap<TxHash, PendingReceipt>,
}

pub struct MockChain {
    signer: Address,
    contracts: MockContracts,
    state: Mutex<MockState>,
}

impl MockChain {
    pub fn new(signer: Address, contracts: MockContracts) -> Self {
        Self {
            signer,
            contracts,
            state: Mutex::new(MockState {
                now: now_secs(),
                block: 1,
                nonce: 0,
                native: HashMap::new(),
                erc20: HashMap::new(),
                allowances: HashMap::new(),
                delegated: HashMap::new(),
                failing_reads: HashSet::new(),
                failing_submits: HashSet::new(),
                reverting: HashSet::new(),
                stalled: HashSet::new(),
                confirmation_polls: 0,
                swap_rate_bps: BPS_DENOMINATOR,
                submitted: Vec::new(),
                receipts: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MockState>, RestakeError> {
        self.state.lock().map_err(|_| RestakeError::Message("mock chain state lock poisoned".to_string()))
    }

    fn with_state(&self, f: impl FnOnce(&mut MockState)) {
        if let Ok(mut state) = self.state.lock() {
            f(&mut state);
        }
    }

    pub fn contracts(&self) -> MockContracts {
        self.contracts
    }

    pub fn set_now(&self, now: u64) {
        self.with_state(|state| state.now = now);
    }

    pub fn set_native_balance(&self, owner: Address, amount: U256) {
        self.with_state(|state| {
            state.native.insert(owner, amount);
        });
    }

    pub fn set_erc20_balance(&self, token: Address, owner: Address, amount: U256) {
        self.with_state(|state| {
            state.erc20.insert((token, owner), amount);
        });
    }

    pub fn set_erc20_allowance(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.with_state(|state| {
            state.allowances.insert((token, owner, spender), amount);
        });
    }

    pub fn set_registry_allowance(&self, owner: Address, token: Address, spender: Address, amount: U256, expiration: u64) {
        self.with_state(|state| {
            state.delegated.insert((owner, token, spender), DelegatedAllowance { amount, expiration, nonce: 0 });
        });
    }

    /// Reads labelled `operation` (e.g. `registry.allowance`) fail until cleared.
    pub fn fail_reads(&self, operation: &str) {
        self.with_state(|state| {
            state.failing_reads.insert(operation.to_string());
        });
    }

    /// Submissions of calls with this label are rejected before broadcast.
    pub fn fail_submits(&self, label: &str) {
        self.with_state(|state| {
            state.failing_submits.insert(label.to_string());
        });
    }

    /// Calls with this label are mined with a failed status.
    pub fn revert_calls(&self, label: &str) {
        self.with_state(|state| {
            state.reverting.insert(label.to_string());
        });
    }

    /// Calls with this label never produce a receipt.
    pub fn stall_calls(&self, label: &str) {
        self.with_state(|state| {
            state.stalled.insert(label.to_string());
        });
    }

    /// Number of `None` receipt polls before each transaction becomes visible.
    pub fn set_confirmation_polls(&self, polls: u32) {
        self.with_state(|state| state.confirmation_polls = polls);
    }

    /// Output per input for router swaps, in basis points.
    pub fn set_swap_rate_bps(&self, rate_bps: u32) {
        self.with_state(|state| state.swap_rate_bps = rate_bps);
    }

    pub fn submitted(&self) -> Vec<ContractCall> {
        self.state.lock().map(|state| state.submitted.clone()).unwrap_or_default()
    }

    pub fn submitted_labels(&self) -> Vec<&'static str> {
        self.submitted().iter().map(ContractCall::label).collect()
    }

    pub fn erc20_balance_of(&self, token: Address, owner: Address) -> U256 {
        self.state.lock().map(|state| balance(&state.erc20, token, owner)).unwrap_or_default()
    }

    pub fn native_balance_of(&self, owner: Address) -> U256 {
        self.state.lock().map(|state| state.native.get(&owner).copied().unwrap_or_default()).unwrap_or_default()
    }

    fn check_read(state: &MockState, operation: &str) -> Result<(), RestakeError> {
        if state.failing_reads.contains(operation) {
            return Err(RestakeError::read_failure(operation, "injected read failure"));
        }
        Ok(())
    }

    /// Applies the call's state change; `false` means the transaction reverts.
    fn apply(&self, state: &mut MockState, call: &ContractCall) -> bool {
        let signer = self.signer;
        match &call.kind {
            CallKind::Erc20Approve { token, spender, amount } => {
                state.allowances.insert((*token, signer, *spender), *amount);
                true
            }
            CallKind::RegistryApprove { token, spender, amount, expiration } => {
                let nonce = state.delegated.get(&(signer, *token, *spender)).map(|row| row.nonce).unwrap_or_default();
                state.delegated.insert((signer, *token, *spender), DelegatedAllowance { amount: *amount, expiration: *expiration, nonce });
                true
            }
            CallKind::MagmaDeposit { amount } => {
                debit_native(state, signer, *amount) && credit(&mut state.erc20, self.contracts.magma_share, signer, *amount)
            }
            CallKind::MagmaWithdraw { amount } => {
                debit(&mut state.erc20, self.contracts.magma_share, signer, *amount) && credit_native(state, signer, *amount)
            }
            CallKind::LiquidDeposit { assets, receiver } => {
                debit_native(state, signer, *assets) && credit(&mut state.erc20, self.contracts.liquid_staking, *receiver, *assets)
            }
            CallKind::LiquidRequestUnlock { shares } => debit(&mut state.erc20, self.contracts.liquid_staking, signer, *shares),
            CallKind::LiquidRedeem { .. } => true,
            CallKind::Unwrap { amount } => {
                debit(&mut state.erc20, self.contracts.wrapped_native, signer, *amount) && credit_native(state, signer, *amount)
            }
            CallKind::RouterSwap(request) => self.apply_swap(state, call.to, request),
        }
    }

    fn apply_swap(&self, state: &mut MockState, router: Address, request: &SwapRequest) -> bool {
        let signer = self.signer;
        let direct = state.allowances.get(&(request.token_in, signer, self.contracts.registry)).copied().unwrap_or_default();
        if direct < request.amount_in {
            return false;
        }
        let key = (signer, request.token_in, router);
        let Some(row) = state.delegated.get(&key).copied() else {
            return false;
        };
        if row.amount < request.amount_in
            || is_expired(normalize_expiration(row.expiration), state.now)
            || request.deadline < state.now
        {
            return false;
        }
        let amount_out = request.amount_in * U256::from(state.swap_rate_bps) / U256::from(BPS_DENOMINATOR);
        if amount_out < request.amount_out_min {
            return false;
        }
        if !debit(&mut state.erc20, request.token_in, signer, request.amount_in) {
            return false;
        }
        if row.amount != max_for_bits(DELEGATED_AMOUNT_BITS) {
            state.delegated.insert(key, DelegatedAllowance { amount: row.amount - request.amount_in, ..row });
        }
        credit(&mut state.erc20, request.token_out, request.recipient, amount_out)
    }
}

fn balance(map: &HashMap<(Address, Address), U256>, token: Address, owner: Address) -> U256 {
    map.get(&(token, owner)).copied().unwrap_or_default()
}

fn debit(map: &mut HashMap<(Address, Address), U256>, token: Address, owner: Address, amount: U256) -> bool {
    let current = balance(map, token, owner);
    if current < amount {
        return false;
    }
    map.insert((token, owner), current - amount);
    true
}

fn credit(map: &mut HashMap<(Address, Address), U256>, token: Address, owner: Address, amount: U256) -> bool {
    let current = balance(map, token, owner);
    map.insert((token, owner), current.saturating_add(amount));
    true
}

fn debit_native(state: &mut MockState, owner: Address, amount: U256) -> bool {
    let current = state.native.get(&owner).copied().unwrap_or_default();
    if current < amount {
        return false;
    }
    state.native.insert(owner, current - amount);
    true
}

fn credit_native(state: &mut MockState, owner: Address, amount: U256) -> bool {
    let current = state.native.get(&owner).copied().unwrap_or_default();
    state.native.insert(owner, current.saturating_add(amount));
    true
}

#[async_trait]
impl ChainClient for MockChain {
    fn signer_address(&self) -> Address {
        self.signer
    }

    async fn erc20_allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256, RestakeError> {
        let state = self.lock()?;
        Self::check_read(&state, "erc20.allowance")?;
        Ok(state.allowances.get(&(token, owner, spender)).copied().unwrap_or_default())
    }

    async fn registry_allowance(
        &self,
        _registry: Address,
        owner: Address,
        token: Address,
        spender: Address,
    ) -> Result<DelegatedAllowance, RestakeError> {
        let state = self.lock()?;
        Self::check_read(&state, "registry.allowance")?;
        Ok(state.delegated.get(&(owner, token, spender)).copied().unwrap_or_default())
    }

    async fn erc20_balance(&self, token: Address, owner: Address) -> Result<U256, RestakeError> {
        let state = self.lock()?;
        Self::check_read(&state, "erc20.balanceOf")?;
        Ok(balance(&state.erc20, token, owner))
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, RestakeError> {
        let state = self.lock()?;
        Self::check_read(&state, "eth_getBalance")?;
        Ok(state.native.get(&owner).copied().unwrap_or_default())
    }

    async fn submit(&self, call: &ContractCall) -> Result<TxHash, RestakeError> {
        let mut state = self.lock()?;
        let label = call.label();
        if state.failing_submits.contains(label) {
            return Err(RestakeError::write_failure(label, "injected submission failure"));
        }
        state.nonce += 1;
        let tx_hash = keccak256(state.nonce.to_be_bytes());
        state.submitted.push(call.clone());

        if state.stalled.contains(label) {
            return Ok(tx_hash);
        }
        let success = !state.reverting.contains(label) && self.apply(&mut state, call);
        state.block += 1;
        let receipt = TxReceipt { tx_hash, block_number: Some(state.block), success, gas_used: MOCK_GAS_USED };
        let polls_left = state.confirmation_polls;
        state.receipts.insert(tx_hash, PendingReceipt { polls_left, receipt });
        Ok(tx_hash)
    }

    async fn receipt(&self, tx_hash: TxHash) -> Result<Option<TxReceipt>, RestakeError> {
        let mut state = self.lock()?;
        Self::check_read(&state, "eth_getTransactionReceipt")?;
        let Some(pending) = state.receipts.get_mut(&tx_hash) else {
            return Ok(None);
        };
        if pending.polls_left > 0 {
            pending.polls_left -= 1;
            return Ok(None);
        }
        Ok(Some(pending.receipt.clone()))
    }

    async fn block_number(&self) -> Result<u64, RestakeError> {
        let state = self.lock()?;
        Self::check_read(&state, "eth_blockNumber")?;
        Ok(state.block)
    }
}
