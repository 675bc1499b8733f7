//! Exact parsing and formatting of on-chain amounts.
//!
//! Amounts never pass through floating point. Inputs are either integer strings in base
//! units or decimal strings in human units (scaled by the token decimals).

use crate::foundation::{RestakeError, BPS_DENOMINATOR};
use alloy::primitives::utils::{format_units, parse_units, ParseUnits};
use alloy::primitives::U256;

/// Parse a base-unit integer string (e.g. wei) into a `U256`.
pub fn parse_base_units(field: &str, input: &str) -> Result<U256, RestakeError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(RestakeError::malformed(format!("{field} is empty")));
    }
    if trimmed.starts_with('-') {
        return Err(RestakeError::malformed(format!("{field} must not be negative: {trimmed}")));
    }
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RestakeError::malformed(format!("{field} must be an unsigned integer string: {trimmed}")));
    }
    U256::from_str_radix(trimmed, 10).map_err(|_| RestakeError::malformed(format!("{field} exceeds 256 bits: {trimmed}")))
}

/// Parse a human-unit decimal string ("0.01") into base units using `decimals`.
pub fn parse_decimal_amount(field: &str, input: &str, decimals: u8) -> Result<U256, RestakeError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(RestakeError::malformed(format!("{field} is empty")));
    }
    if trimmed.starts_with('-') {
        return Err(RestakeError::malformed(format!("{field} must not be negative: {trimmed}")));
    }
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };
    let digits_ok = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !digits_ok(whole) || !digits_ok(fraction) {
        return Err(RestakeError::malformed(format!("{field} must be a decimal string: {trimmed}")));
    }
    if fraction.len() > usize::from(decimals) {
        return Err(RestakeError::malformed(format!("{field} has more than {decimals} fractional digits: {trimmed}")));
    }
    match parse_units(trimmed, decimals) {
        Ok(ParseUnits::U256(value)) => Ok(value),
        Ok(ParseUnits::I256(_)) => Err(RestakeError::malformed(format!("{field} must not be negative: {trimmed}"))),
        Err(err) => Err(RestakeError::malformed(format!("{field} is not a valid amount ({err}): {trimmed}"))),
    }
}

/// Render base units as a human decimal string with all `decimals` digits.
pub fn format_amount(value: U256, decimals: u8) -> String {
    format_units(value, decimals).unwrap_or_else(|_| value.to_string())
}

/// Whether `value` is representable in an unsigned integer of `bits` width.
pub fn fits_bits(value: U256, bits: usize) -> bool {
    value.bit_len() <= bits
}

/// Largest value representable in `bits` (`2^bits - 1`).
pub fn max_for_bits(bits: usize) -> U256 {
    if bits >= 256 {
        return U256::MAX;
    }
    (U256::from(1u8) << bits) - U256::from(1u8)
}

/// `value * (1 - bps / 10_000)`, rounded down. Exact over the whole `U256` range:
/// the product is taken on quotient and remainder separately, neither of which can overflow.
pub fn apply_slippage_floor(value: U256, slippage_bps: u32) -> U256 {
    let keep = U256::from(BPS_DENOMINATOR.saturating_sub(slippage_bps.min(BPS_DENOMINATOR)));
    let denominator = U256::from(BPS_DENOMINATOR);
    let (quotient, remainder) = value.div_rem(denominator);
    quotient * keep + remainder * keep / denominator
}

/// Serde adapter rendering `U256` as a base-10 string (the JSON shape callers expect).
pub mod serde_decimal {
    use alloy::primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_base_units("amount", &text).map_err(serde::de::Error::custom)
    }
}
