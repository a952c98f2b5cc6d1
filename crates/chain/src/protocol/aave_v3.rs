//! Pool family reads (AAVE V3, Spark, Radiant).
//!
//! One `getUserAccountData` call returns the whole account in the market's
//! base currency, so nothing else is needed.

use super::{AdapterFailure, PoolAccountData};
use crate::contracts::IPool;
use alloy::primitives::Address;
use alloy::providers::DynProvider;
use tracing::trace;

/// Read the account of `wallet` from the Pool at `market`.
pub(super) async fn read_pool_account(
    provider: &DynProvider,
    market: Address,
    wallet: Address,
) -> Result<PoolAccountData, AdapterFailure> {
    let pool = IPool::new(market, provider);

    let data = pool
        .getUserAccountData(wallet)
        .call()
        .await
        .map_err(|e| AdapterFailure::Rpc(e.to_string()))?;

    trace!(
        market = %market,
        wallet = %wallet,
        collateral = %data.totalCollateralBase,
        debt = %data.totalDebtBase,
        health_factor = %data.healthFactor,
        "Pool account data"
    );

    Ok(PoolAccountData {
        total_collateral_base: data.totalCollateralBase,
        total_debt_base: data.totalDebtBase,
        available_borrows_base: data.availableBorrowsBase,
        current_liquidation_threshold: data.currentLiquidationThreshold,
        ltv: data.ltv,
        health_factor: data.healthFactor,
    })
}
