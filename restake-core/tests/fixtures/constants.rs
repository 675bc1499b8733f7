#![allow(dead_code)]

use alloy::primitives::{Address, U256};

/// Pinned "now" for expiration and deadline math.
pub const TEST_NOW_SECS: u64 = 1_750_000_000;
pub const TEST_SIGNER: Address = Address::repeat_byte(0xa1);
pub const ONE_YEAR_SECS: u64 = 31_536_000;

/// `n` whole tokens in base units (18 decimals).
pub fn tokens(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u8))
}
