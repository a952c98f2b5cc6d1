//! Comet family reads (Compound V3).
//!
//! Comet has no single account view. The borrow balance and base price come
//! from the market itself; collateral is walked asset by asset and only the
//! assets the wallet holds are priced.

use super::{AdapterFailure, CometAccountData, CometCollateral};
use crate::contracts::IComet;
use alloy::primitives::{Address, U256};
use alloy::providers::DynProvider;
use futures::future::try_join_all;
use tracing::trace;

fn rpc_failure(e: impl std::fmt::Display) -> AdapterFailure {
    AdapterFailure::Rpc(e.to_string())
}

/// Read the account of `wallet` from the Comet market at `market`.
pub(super) async fn read_comet_account(
    provider: &DynProvider,
    market: Address,
    wallet: Address,
) -> Result<CometAccountData, AdapterFailure> {
    let comet = IComet::new(market, provider);

    let num_assets_call = comet.numAssets();
    let borrow_call = comet.borrowBalanceOf(wallet);
    let base_feed_call = comet.baseTokenPriceFeed();
    let base_scale_call = comet.baseScale();

    let (num_assets, borrow_balance, base_feed, base_scale) = tokio::try_join!(
        async { num_assets_call.call().await.map_err(rpc_failure) },
        async { borrow_call.call().await.map_err(rpc_failure) },
        async { base_feed_call.call().await.map_err(rpc_failure) },
        async { base_scale_call.call().await.map_err(rpc_failure) },
    )?;

    let collaterals = try_join_all(
        (0..num_assets._0).map(|index| read_collateral(provider, market, wallet, index)),
    )
    .await?;

    let base_price = if borrow_balance._0.is_zero() {
        U256::ZERO
    } else {
        comet
            .getPrice(base_feed._0)
            .call()
            .await
            .map_err(rpc_failure)?
            ._0
    };

    trace!(
        market = %market,
        wallet = %wallet,
        assets = num_assets._0,
        borrow = %borrow_balance._0,
        "Comet account data"
    );

    Ok(CometAccountData {
        borrow_balance: borrow_balance._0,
        base_scale: base_scale._0,
        base_price,
        collaterals: collaterals.into_iter().flatten().collect(),
    })
}

/// Read one collateral slot; `None` when the wallet holds none of it.
async fn read_collateral(
    provider: &DynProvider,
    market: Address,
    wallet: Address,
    index: u8,
) -> Result<Option<CometCollateral>, AdapterFailure> {
    let comet = IComet::new(market, provider);
    let info = comet.getAssetInfo(index).call().await.map_err(rpc_failure)?._0;

    let balance = comet
        .collateralBalanceOf(wallet, info.asset)
        .call()
        .await
        .map_err(rpc_failure)?
        ._0;
    if balance == 0 {
        return Ok(None);
    }

    let price = comet.getPrice(info.priceFeed).call().await.map_err(rpc_failure)?._0;

    Ok(Some(CometCollateral {
        asset: info.asset,
        balance: U256::from(balance),
        scale: U256::from(info.scale),
        price,
        borrow_collateral_factor: U256::from(info.borrowCollateralFactor),
        liquidate_collateral_factor: U256::from(info.liquidateCollateralFactor),
    }))
}
