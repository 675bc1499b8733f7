//! Calldata for every contract function the flows touch.

use crate::domain::SwapRequest;
use crate::foundation::util::amount::fits_bits;
use crate::foundation::RestakeError;
use alloy::primitives::aliases::{U160, U96};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256 balance);
        function allowance(address owner, address spender) external view returns (uint256 remaining);
        function approve(address spender, uint256 amount) external returns (bool success);
    }

    #[sol(rpc)]
    interface IAllowanceRegistry {
        function allowance(address user, address token, address spender) external view returns (uint160 amount, uint48 expiration, uint48 nonce);
        function approve(address token, address spender, uint160 amount, uint48 expiration) external;
    }

    interface IMagmaStaking {
        function depositMon() external payable;
        function withdrawMon(uint256 amount) external;
    }

    interface ILiquidStaking {
        function deposit(uint96 assets, address receiver) external payable returns (uint96 shares);
        function requestUnlock(uint96 shares) external;
        function redeem(uint256 unlockIndex, address receiver) external returns (uint96 assets);
    }

    interface IWrappedNative {
        function withdraw(uint256 wad) external;
    }

    interface IUniversalRouter {
        function execute(bytes commands, bytes[] inputs, uint256 deadline) external payable;
    }
}

/// What a call does, kept alongside the encoded bytes for logging and test doubles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallKind {
    Erc20Approve { token: Address, spender: Address, amount: U256 },
    RegistryApprove { token: Address, spender: Address, amount: U256, expiration: u64 },
    MagmaDeposit { amount: U256 },
    MagmaWithdraw { amount: U256 },
    LiquidDeposit { assets: U256, receiver: Address },
    LiquidRequestUnlock { shares: U256 },
    LiquidRedeem { unlock_index: U256, receiver: Address },
    Unwrap { amount: U256 },
    RouterSwap(SwapRequest),
}

impl CallKind {
    pub fn label(&self) -> &'static str {
        match self {
            CallKind::Erc20Approve { .. } => "erc20.approve",
            CallKind::RegistryApprove { .. } => "registry.approve",
            CallKind::MagmaDeposit { .. } => "magma.depositMon",
            CallKind::MagmaWithdraw { .. } => "magma.withdrawMon",
            CallKind::LiquidDeposit { .. } => "liquid.deposit",
            CallKind::LiquidRequestUnlock { .. } => "liquid.requestUnlock",
            CallKind::LiquidRedeem { .. } => "liquid.redeem",
            CallKind::Unwrap { .. } => "wrapped.withdraw",
            CallKind::RouterSwap(_) => "router.execute",
        }
    }
}

/// A fully-encoded state-changing call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractCall {
    pub kind: CallKind,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

impl ContractCall {
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }
}

fn narrow_u96(field: &str, value: U256) -> Result<U96, RestakeError> {
    if !fits_bits(value, 96) {
        return Err(RestakeError::malformed(format!("{field} {value} exceeds the 96-bit limit")));
    }
    Ok(U96::saturating_from(value))
}

pub fn erc20_approve(token: Address, spender: Address, amount: U256) -> ContractCall {
    let data = IERC20::approveCall { spender, amount }.abi_encode();
    ContractCall { kind: CallKind::Erc20Approve { token, spender, amount }, to: token, data: data.into(), value: U256::ZERO }
}

pub fn registry_approve(
    registry: Address,
    token: Address,
    spender: Address,
    amount: U256,
    expiration: u64,
) -> Result<ContractCall, RestakeError> {
    if !fits_bits(amount, 160) {
        return Err(RestakeError::malformed(format!("delegated amount {amount} exceeds the 160-bit limit")));
    }
    let data = IAllowanceRegistry::approveCall {
        token,
        spender,
        amount: U160::saturating_from(amount),
        expiration: expiration
            .try_into()
            .map_err(|_| RestakeError::malformed(format!("expiration {expiration} exceeds the 48-bit limit")))?,
    }
    .abi_encode();
    Ok(ContractCall {
        kind: CallKind::RegistryApprove { token, spender, amount, expiration },
        to: registry,
        data: data.into(),
        value: U256::ZERO,
    })
}

pub fn magma_deposit(pool: Address, amount: U256) -> ContractCall {
    let data = IMagmaStaking::depositMonCall {}.abi_encode();
    ContractCall { kind: CallKind::MagmaDeposit { amount }, to: pool, data: data.into(), value: amount }
}

pub fn magma_withdraw(pool: Address, amount: U256) -> ContractCall {
    let data = IMagmaStaking::withdrawMonCall { amount }.abi_encode();
    ContractCall { kind: CallKind::MagmaWithdraw { amount }, to: pool, data: data.into(), value: U256::ZERO }
}

pub fn liquid_deposit(pool: Address, assets: U256, receiver: Address) -> Result<ContractCall, RestakeError> {
    let data = ILiquidStaking::depositCall { assets: narrow_u96("assets", assets)?, receiver }.abi_encode();
    Ok(ContractCall { kind: CallKind::LiquidDeposit { assets, receiver }, to: pool, data: data.into(), value: assets })
}

pub fn liquid_request_unlock(pool: Address, shares: U256) -> Result<ContractCall, RestakeError> {
    let data = ILiquidStaking::requestUnlockCall { shares: narrow_u96("shares", shares)? }.abi_encode();
    Ok(ContractCall { kind: CallKind::LiquidRequestUnlock { shares }, to: pool, data: data.into(), value: U256::ZERO })
}

pub fn liquid_redeem(pool: Address, unlock_index: U256, receiver: Address) -> ContractCall {
    let data = ILiquidStaking::redeemCall { unlockIndex: unlock_index, receiver }.abi_encode();
    ContractCall { kind: CallKind::LiquidRedeem { unlock_index, receiver }, to: pool, data: data.into(), value: U256::ZERO }
}

pub fn unwrap_native(wrapped: Address, amount: U256) -> ContractCall {
    let data = IWrappedNative::withdrawCall { wad: amount }.abi_encode();
    ContractCall { kind: CallKind::Unwrap { amount }, to: wrapped, data: data.into(), value: U256::ZERO }
}
