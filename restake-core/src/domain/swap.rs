use super::allowance::DELEGATED_AMOUNT_BITS;
use crate::foundation::util::amount::fits_bits;
use crate::foundation::{RestakeError, MAX_FEE_TIER};
use alloy::primitives::{Address, Bytes, U256};

/// Single-hop exact-input swap, fully resolved (deadline is absolute).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapRequest {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    pub amount_in: U256,
    pub amount_out_min: U256,
    pub recipient: Address,
    pub deadline: u64,
}

impl SwapRequest {
    pub fn validate(&self) -> Result<(), RestakeError> {
        if self.amount_in.is_zero() {
            return Err(RestakeError::malformed("amountIn must be greater than zero"));
        }
        // The registry stores delegated amounts as uint160; a wider amount can never be covered.
        if !fits_bits(self.amount_in, DELEGATED_AMOUNT_BITS) {
            return Err(RestakeError::malformed(format!("amountIn {} does not fit in {DELEGATED_AMOUNT_BITS} bits", self.amount_in)));
        }
        if self.fee > MAX_FEE_TIER {
            return Err(RestakeError::malformed(format!("fee tier {} does not fit in 24 bits", self.fee)));
        }
        if self.recipient == Address::ZERO {
            return Err(RestakeError::malformed("recipient must not be the zero address"));
        }
        Ok(())
    }
}

/// V3 path for one hop: `token_in (20) | fee (3, big-endian) | token_out (20)`.
pub fn encode_v3_path(token_in: Address, fee: u32, token_out: Address) -> Result<Bytes, RestakeError> {
    if fee > MAX_FEE_TIER {
        return Err(RestakeError::malformed(format!("fee tier {fee} does not fit in 24 bits")));
    }
    let mut path = Vec::with_capacity(20 + 3 + 20);
    path.extend_from_slice(token_in.as_slice());
    path.extend_from_slice(&fee.to_be_bytes()[1..]);
    path.extend_from_slice(token_out.as_slice());
    Ok(path.into())
}

pub fn swap_deadline(now: u64, deadline_secs: u64) -> u64 {
    now.saturating_add(deadline_secs)
}
