//! Fixed-point helpers for decoding contract return values.
//!
//! Lending contracts report amounts in protocol-specific fixed-point bases
//! (1e8 base currency, 1e4 basis points, 1e18 WAD, per-token scales).
//! Arithmetic stays in U256 until the final conversion to f64.

use alloy::primitives::U256;

/// WAD constant: 1e18 for 18-decimal fixed-point arithmetic
pub const WAD: U256 = U256::from_limbs([1_000_000_000_000_000_000u64, 0, 0, 0]);

/// 2^64 as f64, for folding limbs.
const LIMB_BASE: f64 = 18_446_744_073_709_551_616.0;

/// Pre-computed powers of 10 for fast decimal conversion
const POW10: [u128; 39] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    1_000_000_000_000_000_000,
    10_000_000_000_000_000_000,
    100_000_000_000_000_000_000,
    1_000_000_000_000_000_000_000,
    10_000_000_000_000_000_000_000,
    100_000_000_000_000_000_000_000,
    1_000_000_000_000_000_000_000_000,
    10_000_000_000_000_000_000_000_000,
    100_000_000_000_000_000_000_000_000,
    1_000_000_000_000_000_000_000_000_000,
    10_000_000_000_000_000_000_000_000_000,
    100_000_000_000_000_000_000_000_000_000,
    1_000_000_000_000_000_000_000_000_000_000,
    10_000_000_000_000_000_000_000_000_000_000,
    100_000_000_000_000_000_000_000_000_000_000,
    1_000_000_000_000_000_000_000_000_000_000_000,
    10_000_000_000_000_000_000_000_000_000_000_000,
    100_000_000_000_000_000_000_000_000_000_000_000,
    1_000_000_000_000_000_000_000_000_000_000_000_000,
    10_000_000_000_000_000_000_000_000_000_000_000_000,
    100_000_000_000_000_000_000_000_000_000_000_000_000,
];

/// Fast power of 10 lookup (up to 10^38)
#[inline(always)]
pub fn pow10(exp: u8) -> U256 {
    if exp < 39 {
        U256::from(POW10[exp as usize])
    } else {
        U256::from(10u64).pow(U256::from(exp))
    }
}

/// Convert an unscaled U256 to f64 (lossy above 2^53).
#[inline]
pub fn to_f64(value: U256) -> f64 {
    value
        .as_limbs()
        .iter()
        .rev()
        .fold(0.0, |acc, &limb| acc * LIMB_BASE + limb as f64)
}

/// Convert a fixed-point value with `decimals` decimals to f64.
///
/// Example: `scaled_to_f64(1_000_000_000_000, 8) == 10_000.0`
#[inline]
pub fn scaled_to_f64(value: U256, decimals: u8) -> f64 {
    if value.is_zero() {
        return 0.0;
    }
    to_f64(value) / 10_f64.powi(decimals as i32)
}

/// Calculate USD value as WAD from a token balance, its scale and an oracle price.
///
/// Formula: (balance * price * 10^18) / (scale * 10^price_decimals)
///
/// Returns `None` on overflow or a zero scale.
#[inline]
pub fn usd_wad(balance: U256, scale: U256, price: U256, price_decimals: u8) -> Option<U256> {
    if balance.is_zero() || price.is_zero() {
        return Some(U256::ZERO);
    }
    let denominator = scale.checked_mul(pow10(price_decimals))?;
    if denominator.is_zero() {
        return None;
    }
    balance
        .checked_mul(price)?
        .checked_mul(WAD)
        .map(|numerator| numerator / denominator)
}

/// Multiply two WAD values: (a * b) / WAD
#[inline(always)]
pub fn wad_mul(a: U256, b: U256) -> Option<U256> {
    a.checked_mul(b).map(|product| product / WAD)
}
