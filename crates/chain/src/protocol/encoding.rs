//! Per-protocol decoding table.
//!
//! Every protocol gets one [`ProtocolEncoding`] row naming the fixed-point
//! bases of its account fields and how its health factor is obtained.
//! [`normalize`] is the only place raw contract values become floats.

use super::{
    AccountSnapshot, AdapterFailure, CometAccountData, PoolAccountData, ProtocolKind,
    RawAccountData, INFINITE_HEALTH_FACTOR,
};
use crate::u256_math::{scaled_to_f64, usd_wad, wad_mul};
use alloy::primitives::U256;
use std::fmt;

/// Contract family an account is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractFamily {
    /// Aave-style Pool exposing `getUserAccountData`
    Pool,
    /// Compound V3 Comet market
    Comet,
}

impl fmt::Display for ContractFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pool => f.write_str("pool"),
            Self::Comet => f.write_str("comet"),
        }
    }
}

/// How a protocol's health factor is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthFactorRule {
    /// Reported by the contract with the given decimals
    Reported { decimals: u8 },
    /// Derived as sum(collateral * liquidation factor) / debt
    Derived,
}

/// Decimal bases and health factor rule for one protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolEncoding {
    /// Contract family
    pub family: ContractFamily,
    /// Decimals of USD values (base currency or price feed answers)
    pub value_decimals: u8,
    /// Decimals of thresholds and collateral factors
    pub ratio_decimals: u8,
    /// Health factor rule
    pub health_factor: HealthFactorRule,
    /// Whether a liquidation price is computed
    pub liquidation_price: bool,
}

/// Decoding row for a protocol.
pub const fn encoding(protocol: ProtocolKind) -> ProtocolEncoding {
    match protocol {
        // Base currency 1e8 (USD), thresholds in bps, HF in WAD
        ProtocolKind::AaveV3 | ProtocolKind::Spark | ProtocolKind::Radiant => ProtocolEncoding {
            family: ContractFamily::Pool,
            value_decimals: 8,
            ratio_decimals: 4,
            health_factor: HealthFactorRule::Reported { decimals: 18 },
            liquidation_price: true,
        },
        // Price feeds 1e8, collateral factors 1e18, balances in token scale
        ProtocolKind::CompoundV3 => ProtocolEncoding {
            family: ContractFamily::Comet,
            value_decimals: 8,
            ratio_decimals: 18,
            health_factor: HealthFactorRule::Derived,
            liquidation_price: false,
        },
    }
}

/// Normalize raw account data for `protocol` into USD figures and a health factor.
pub fn normalize(
    protocol: ProtocolKind,
    raw: &RawAccountData,
) -> Result<AccountSnapshot, AdapterFailure> {
    let enc = encoding(protocol);
    match (enc.family, raw) {
        (ContractFamily::Pool, RawAccountData::Pool(data)) => Ok(normalize_pool(&enc, data)),
        (ContractFamily::Comet, RawAccountData::Comet(data)) => normalize_comet(&enc, data),
        (expected, raw) => Err(AdapterFailure::Decode(format!(
            "{protocol} expects {expected} data, got {}",
            raw.family()
        ))),
    }
}

fn normalize_pool(enc: &ProtocolEncoding, data: &PoolAccountData) -> AccountSnapshot {
    let collateral_usd = scaled_to_f64(data.total_collateral_base, enc.value_decimals);
    let debt_usd = scaled_to_f64(data.total_debt_base, enc.value_decimals);
    let liquidation_threshold =
        scaled_to_f64(data.current_liquidation_threshold, enc.ratio_decimals);
    let ltv = scaled_to_f64(data.ltv, enc.ratio_decimals);

    // Pools report type(uint256).max when there is no debt
    let health_factor = if data.total_debt_base.is_zero() || data.health_factor == U256::MAX {
        INFINITE_HEALTH_FACTOR
    } else {
        match enc.health_factor {
            HealthFactorRule::Reported { decimals } => scaled_to_f64(data.health_factor, decimals),
            HealthFactorRule::Derived => derive_health_factor(collateral_usd * liquidation_threshold, debt_usd),
        }
    };

    AccountSnapshot {
        collateral_usd,
        debt_usd,
        health_factor,
        liquidation_threshold,
        ltv,
        liquidation_price: liquidation_price(enc, collateral_usd, debt_usd, liquidation_threshold),
    }
}

fn normalize_comet(
    enc: &ProtocolEncoding,
    data: &CometAccountData,
) -> Result<AccountSnapshot, AdapterFailure> {
    let overflow = || AdapterFailure::Decode("comet account values overflow".to_string());

    let mut collateral_wad = U256::ZERO;
    let mut liquidation_adjusted_wad = U256::ZERO;
    let mut borrow_adjusted_wad = U256::ZERO;

    for collateral in &data.collaterals {
        let value = usd_wad(collateral.balance, collateral.scale, collateral.price, enc.value_decimals)
            .ok_or_else(overflow)?;
        collateral_wad = collateral_wad.checked_add(value).ok_or_else(overflow)?;

        // Factors are WAD when ratio_decimals == 18
        let liquidate = wad_mul(value, collateral.liquidate_collateral_factor).ok_or_else(overflow)?;
        liquidation_adjusted_wad = liquidation_adjusted_wad.checked_add(liquidate).ok_or_else(overflow)?;

        let borrow = wad_mul(value, collateral.borrow_collateral_factor).ok_or_else(overflow)?;
        borrow_adjusted_wad = borrow_adjusted_wad.checked_add(borrow).ok_or_else(overflow)?;
    }

    let debt_wad = usd_wad(data.borrow_balance, data.base_scale, data.base_price, enc.value_decimals)
        .ok_or_else(overflow)?;

    let collateral_usd = scaled_to_f64(collateral_wad, 18);
    let debt_usd = scaled_to_f64(debt_wad, 18);
    let adjusted_usd = scaled_to_f64(liquidation_adjusted_wad, 18);

    let (liquidation_threshold, ltv) = if collateral_wad.is_zero() {
        (0.0, 0.0)
    } else {
        (
            adjusted_usd / collateral_usd,
            scaled_to_f64(borrow_adjusted_wad, 18) / collateral_usd,
        )
    };

    Ok(AccountSnapshot {
        collateral_usd,
        debt_usd,
        health_factor: derive_health_factor(adjusted_usd, debt_usd),
        liquidation_threshold,
        ltv,
        liquidation_price: liquidation_price(enc, collateral_usd, debt_usd, liquidation_threshold),
    })
}

/// HF = risk-adjusted collateral / debt, or the sentinel without debt.
pub fn derive_health_factor(adjusted_collateral_usd: f64, debt_usd: f64) -> f64 {
    if debt_usd <= 0.0 {
        return INFINITE_HEALTH_FACTOR;
    }
    adjusted_collateral_usd / debt_usd
}

/// Relative collateral price at which the position becomes liquidatable.
///
/// Formula: debt / (collateral * liquidation_threshold)
fn liquidation_price(
    enc: &ProtocolEncoding,
    collateral_usd: f64,
    debt_usd: f64,
    liquidation_threshold: f64,
) -> Option<f64> {
    if !enc.liquidation_price || debt_usd <= 0.0 || collateral_usd <= 0.0 || liquidation_threshold <= 0.0 {
        return None;
    }
    Some(debt_usd / (collateral_usd * liquidation_threshold))
}
