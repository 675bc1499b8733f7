use super::calls::{IAllowanceRegistry, IERC20};
use super::{ChainClient, ContractCall, DelegatedAllowance};
use crate::domain::TxReceipt;
use crate::foundation::RestakeError;
use alloy::network::EthereumWallet;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;

/// JSON-RPC backed client; every write is signed by the configured key.
///
/// Calls go out exactly once. A failed read surfaces as `ReadFailure` and the
/// caller decides whether to rerun the flow.
pub struct AlloyChainClient<P> {
    provider: P,
    signer: Address,
}

/// Builds an HTTP provider with the signing wallet and checks the node serves `expected_chain_id`.
pub async fn connect(
    rpc_url: &str,
    private_key: &str,
    expected_chain_id: u64,
) -> Result<AlloyChainClient<impl Provider + Clone + 'static>, RestakeError> {
    let signer: PrivateKeySigner =
        private_key.trim().parse().map_err(|err| RestakeError::ConfigError(format!("invalid chain.private_key: {err}")))?;
    let signer_address = signer.address();
    let wallet = EthereumWallet::from(signer);
    let url = rpc_url.parse().map_err(|err| RestakeError::ConfigError(format!("invalid chain.rpc_url: {err}")))?;
    let provider = ProviderBuilder::default().with_recommended_fillers().wallet(wallet).on_http(url);

    let chain_id = provider.get_chain_id().await.map_err(|err| RestakeError::read_failure("eth_chainId", err))?;
    if chain_id != expected_chain_id {
        return Err(RestakeError::ConfigError(format!(
            "rpc endpoint serves chain_id={chain_id}, configured chain_id={expected_chain_id}"
        )));
    }
    log::info!("chain client connected chain_id={} signer={}", chain_id, signer_address);
    Ok(AlloyChainClient { provider, signer: signer_address })
}

impl<P> AlloyChainClient<P>
where
    P: Provider + Clone + 'static,
{
    pub fn new(provider: P, signer: Address) -> Self {
        Self { provider, signer }
    }
}

#[async_trait]
impl<P> ChainClient for AlloyChainClient<P>
where
    P: Provider + Clone + 'static,
{
    fn signer_address(&self) -> Address {
        self.signer
    }

    async fn erc20_allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256, RestakeError> {
        let ret = IERC20::new(token, &self.provider)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|err| RestakeError::read_failure("erc20.allowance", err))?;
        Ok(ret.remaining)
    }

    async fn registry_allowance(
        &self,
        registry: Address,
        owner: Address,
        token: Address,
        spender: Address,
    ) -> Result<DelegatedAllowance, RestakeError> {
        let ret = IAllowanceRegistry::new(registry, &self.provider)
            .allowance(owner, token, spender)
            .call()
            .await
            .map_err(|err| RestakeError::read_failure("registry.allowance", err))?;
        Ok(DelegatedAllowance {
            amount: U256::from(ret.amount),
            expiration: u64::try_from(ret.expiration).unwrap_or(u64::MAX),
            nonce: u64::try_from(ret.nonce).unwrap_or(u64::MAX),
        })
    }

    async fn erc20_balance(&self, token: Address, owner: Address) -> Result<U256, RestakeError> {
        let ret = IERC20::new(token, &self.provider)
            .balanceOf(owner)
            .call()
            .await
            .map_err(|err| RestakeError::read_failure("erc20.balanceOf", err))?;
        Ok(ret.balance)
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, RestakeError> {
        self.provider.get_balance(owner).await.map_err(|err| RestakeError::read_failure("eth_getBalance", err))
    }

    async fn submit(&self, call: &ContractCall) -> Result<TxHash, RestakeError> {
        let mut tx = TransactionRequest::default().from(self.signer).to(call.to).input(call.data.clone().into());
        if !call.value.is_zero() {
            tx = tx.value(call.value);
        }
        let pending = self.provider.send_transaction(tx).await.map_err(|err| RestakeError::write_failure(call.label(), err))?;
        Ok(*pending.tx_hash())
    }

    async fn receipt(&self, tx_hash: TxHash) -> Result<Option<TxReceipt>, RestakeError> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|err| RestakeError::read_failure("eth_getTransactionReceipt", err))?;
        Ok(receipt.map(|receipt| TxReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            success: receipt.status(),
            gas_used: u64::try_from(receipt.gas_used).unwrap_or(u64::MAX),
        }))
    }

    async fn block_number(&self) -> Result<u64, RestakeError> {
        self.provider.get_block_number().await.map_err(|err| RestakeError::read_failure("eth_blockNumber", err))
    }
}
