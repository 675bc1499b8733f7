//! Chain access: read/write seam between the orchestration engine and the network.

pub mod alloy_client;
pub mod calls;
pub mod mock;
pub mod swap_builder;

pub use alloy_client::{connect, AlloyChainClient};
pub use calls::{CallKind, ContractCall};
pub use mock::{MockChain, MockContracts};
pub use swap_builder::{SwapCallBuilder, UniversalRouterV3};

use crate::domain::TxReceipt;
use crate::foundation::RestakeError;
use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

/// One row of the registry's allowance table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DelegatedAllowance {
    pub amount: U256,
    /// Unix seconds, zero when unset.
    pub expiration: u64,
    pub nonce: u64,
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// The single signing identity every write is sent from.
    fn signer_address(&self) -> Address;

    async fn erc20_allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256, RestakeError>;

    async fn registry_allowance(
        &self,
        registry: Address,
        owner: Address,
        token: Address,
        spender: Address,
    ) -> Result<DelegatedAllowance, RestakeError>;

    async fn erc20_balance(&self, token: Address, owner: Address) -> Result<U256, RestakeError>;

    async fn native_balance(&self, owner: Address) -> Result<U256, RestakeError>;

    /// Sign and broadcast; returns as soon as the node accepted the transaction.
    async fn submit(&self, call: &ContractCall) -> Result<TxHash, RestakeError>;

    /// Non-blocking receipt lookup; `None` while the transaction is pending.
    async fn receipt(&self, tx_hash: TxHash) -> Result<Option<TxReceipt>, RestakeError>;

    async fn block_number(&self) -> Result<u64, RestakeError>;
}
