use super::calls::{CallKind, ContractCall, IUniversalRouter};
use crate::domain::{encode_v3_path, SwapRequest};
use crate::foundation::{RestakeError, CMD_V3_SWAP_EXACT_IN};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::{SolCall, SolValue};

/// Turns a resolved swap into a router call. The router is a swappable seam.
pub trait SwapCallBuilder: Send + Sync {
    /// Address that pulls `token_in` through the allowance registry.
    fn spender(&self) -> Address;

    fn build(&self, request: &SwapRequest) -> Result<ContractCall, RestakeError>;
}

/// Command-based router that accepts a single `V3_SWAP_EXACT_IN` command.
#[derive(Clone, Debug)]
pub struct UniversalRouterV3 {
    router: Address,
}

impl UniversalRouterV3 {
    pub fn new(router: Address) -> Self {
        Self { router }
    }

    fn encode_input(request: &SwapRequest) -> Result<Bytes, RestakeError> {
        let path = encode_v3_path(request.token_in, request.fee, request.token_out)?;
        // payerIsUser: the router pulls funds from the caller via the registry.
        let params = (request.recipient, request.amount_in, request.amount_out_min, path, true);
        Ok(params.abi_encode_params().into())
    }
}

impl SwapCallBuilder for UniversalRouterV3 {
    fn spender(&self) -> Address {
        self.router
    }

    fn build(&self, request: &SwapRequest) -> Result<ContractCall, RestakeError> {
        request.validate()?;
        let input = Self::encode_input(request)?;
        let data = IUniversalRouter::executeCall {
            commands: Bytes::from(vec![CMD_V3_SWAP_EXACT_IN]),
            inputs: vec![input],
            deadline: U256::from(request.deadline),
        }
        .abi_encode();
        Ok(ContractCall { kind: CallKind::RouterSwap(request.clone()), to: self.router, data: data.into(), value: U256::ZERO })
    }
}
