//! Conversion between satoshi values and decimal BTC strings.
//!
//! JSON forms carry values as BTC text (`"0.0000546"`) rather than raw
//! satoshis. Parsing is bounded by [`MAX_SAFE_AMOUNT`] so that values
//! round-trip through consumers that store amounts as IEEE doubles.

use crate::PrimitivesError;

/// Satoshis per bitcoin.
pub const COIN: u64 = 100_000_000;

/// Number of fractional decimal digits in a BTC amount.
pub const DECIMALS: usize = 8;

/// Largest amount accepted by [`from_btc`] (2^53 - 1 satoshis).
pub const MAX_SAFE_AMOUNT: u64 = 9_007_199_254_740_991;

/// Render satoshis as a BTC decimal string.
///
/// Trailing fractional zeros are stripped but at least one fractional
/// digit is kept: `5460 -> "0.0000546"`, `54_600_000_000 -> "546.0"`.
pub fn to_btc(satoshis: u64) -> String {
    let whole = satoshis / COIN;
    let frac = format!("{:08}", satoshis % COIN);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, frac)
    }
}

/// Parse a BTC decimal string into satoshis.
///
/// Digits past the eighth fractional place must all be zero, and the
/// result must not exceed [`MAX_SAFE_AMOUNT`].
pub fn from_btc(text: &str) -> Result<u64, PrimitivesError> {
    let invalid = || PrimitivesError::InvalidAmount(text.to_string());

    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let (significant, excess) = frac.split_at(frac.len().min(DECIMALS));
    if excess.bytes().any(|b| b != b'0') {
        return Err(invalid());
    }

    let whole = whole.trim_start_matches('0');
    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let frac: u64 = if significant.is_empty() {
        0
    } else {
        format!("{:0<8}", significant).parse().map_err(|_| invalid())?
    };

    let value = whole
        .checked_mul(COIN)
        .and_then(|v| v.checked_add(frac))
        .ok_or_else(invalid)?;
    if value > MAX_SAFE_AMOUNT {
        return Err(invalid());
    }
    Ok(value)
}
