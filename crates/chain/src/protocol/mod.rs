//! Protocol abstraction layer for multi-protocol position reads.
//!
//! This module turns a (wallet, chain, protocol) triple into a normalized
//! account snapshot in a uniform way.
//!
//! # Architecture
//!
//! - [`AccountReader`]: issues the protocol-family contract reads and returns
//!   [`RawAccountData`] exactly as the contracts encode it
//! - [`encoding`]: per-protocol decimal bases and health factor rules
//! - [`ProtocolAdapter`]: the single driver that resolves the market address,
//!   reads through an [`AccountReader`], normalizes, and suppresses empty accounts
//!
//! # Example
//!
//! ```rust,ignore
//! use sentinel_chain::protocol::{FetchOutcome, ProtocolAdapter, ProtocolKind};
//!
//! let adapter = ProtocolAdapter::new(deployments, reader, Duration::from_secs(10));
//!
//! match adapter.fetch_position(ProtocolKind::AaveV3, wallet, 1).await {
//!     FetchOutcome::Found(snapshot) => println!("HF = {}", snapshot.health_factor),
//!     FetchOutcome::Absent => {}
//!     FetchOutcome::Failed(reason) => eprintln!("read failed: {reason}"),
//! }
//! ```

#[cfg(feature = "aave-v3")]
mod aave_v3;
#[cfg(feature = "compound-v3")]
mod compound_v3;
mod deployments;
pub mod encoding;
mod reader;

pub use deployments::{parse_address, InvalidAddress, ProtocolDeployments};
pub use encoding::{normalize, ContractFamily, HealthFactorRule, ProtocolEncoding};
pub use reader::OnChainReader;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Health factor reported for accounts without debt.
///
/// Finite so that it survives JSON serialization.
pub const INFINITE_HEALTH_FACTOR: f64 = f64::MAX;

/// Supported lending protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolKind {
    /// AAVE V3
    AaveV3,
    /// Compound V3 (Comet)
    CompoundV3,
    /// Spark (AAVE V3 fork)
    Spark,
    /// Radiant (AAVE fork)
    Radiant,
}

impl ProtocolKind {
    /// All supported protocols.
    pub const ALL: [ProtocolKind; 4] = [Self::AaveV3, Self::CompoundV3, Self::Spark, Self::Radiant];

    /// Parse a protocol identifier (e.g., from a request or config).
    pub fn from_id(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "aave_v3" | "aave-v3" | "aavev3" => Some(Self::AaveV3),
            "compound_v3" | "compound-v3" | "compoundv3" | "comet" => Some(Self::CompoundV3),
            "spark" => Some(Self::Spark),
            "radiant" => Some(Self::Radiant),
            _ => None,
        }
    }

    /// Wire identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Self::AaveV3 => "aave_v3",
            Self::CompoundV3 => "compound_v3",
            Self::Spark => "spark",
            Self::Radiant => "radiant",
        }
    }

    /// Display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::AaveV3 => "Aave V3",
            Self::CompoundV3 => "Compound V3",
            Self::Spark => "Spark",
            Self::Radiant => "Radiant",
        }
    }

    /// Contract family used to read accounts.
    pub fn family(&self) -> ContractFamily {
        encoding::encoding(*self).family
    }
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Account data as returned by an Aave-style `getUserAccountData`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolAccountData {
    pub total_collateral_base: U256,
    pub total_debt_base: U256,
    pub available_borrows_base: U256,
    pub current_liquidation_threshold: U256,
    pub ltv: U256,
    pub health_factor: U256,
}

/// One collateral asset held in a Comet market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CometCollateral {
    /// Token address
    pub asset: Address,
    /// Raw balance (token scale)
    pub balance: U256,
    /// Token scale (10^decimals)
    pub scale: U256,
    /// Price feed answer
    pub price: U256,
    /// Borrow collateral factor (1e18 = 100%)
    pub borrow_collateral_factor: U256,
    /// Liquidate collateral factor (1e18 = 100%)
    pub liquidate_collateral_factor: U256,
}

/// Account data assembled from a Comet market.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CometAccountData {
    /// Borrow balance in base token units
    pub borrow_balance: U256,
    /// Base token scale (10^decimals)
    pub base_scale: U256,
    /// Base token price feed answer
    pub base_price: U256,
    /// Collateral assets with nonzero balance
    pub collaterals: SmallVec<[CometCollateral; 4]>,
}

/// Raw account data, encoded exactly as the contracts return it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawAccountData {
    Pool(PoolAccountData),
    Comet(CometAccountData),
}

impl RawAccountData {
    pub fn family(&self) -> ContractFamily {
        match self {
            Self::Pool(_) => ContractFamily::Pool,
            Self::Comet(_) => ContractFamily::Comet,
        }
    }
}

/// Normalized, protocol-agnostic account figures.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSnapshot {
    /// Total collateral in USD
    pub collateral_usd: f64,
    /// Total debt in USD
    pub debt_usd: f64,
    /// Health factor ([`INFINITE_HEALTH_FACTOR`] without debt)
    pub health_factor: f64,
    /// Effective liquidation threshold (fraction)
    pub liquidation_threshold: f64,
    /// Effective loan-to-value (fraction)
    pub ltv: f64,
    /// Relative collateral price at which HF reaches 1.0 (not every protocol)
    pub liquidation_price: Option<f64>,
}

impl AccountSnapshot {
    /// An account with neither collateral nor debt is not a position.
    pub fn is_empty(&self) -> bool {
        self.collateral_usd == 0.0 && self.debt_usd == 0.0
    }
}

/// Failure inside an adapter. Never escapes the aggregation as an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdapterFailure {
    #[error("connection unavailable: {0}")]
    Connection(String),

    #[error("rpc call failed: {0}")]
    Rpc(String),

    #[error("read timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed account data: {0}")]
    Decode(String),

    #[error("{0} support is not compiled in")]
    Disabled(ContractFamily),
}

/// Outcome of fetching one (chain, protocol) pair.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Open position
    Found(AccountSnapshot),
    /// No deployment on this chain, or no collateral and no debt
    Absent,
    /// The read failed
    Failed(AdapterFailure),
}

/// Reads raw account data from a protocol market.
#[async_trait]
pub trait AccountReader: Send + Sync + fmt::Debug {
    /// Read the account of `wallet` in the `market` contract of `protocol` on `chain_id`.
    async fn read_account(
        &self,
        protocol: ProtocolKind,
        chain_id: u64,
        market: Address,
        wallet: Address,
    ) -> Result<RawAccountData, AdapterFailure>;
}

/// Generic adapter driver for every supported protocol.
///
/// Resolves the market address from the deployment table, reads through the
/// [`AccountReader`], and normalizes using the protocol's encoding row.
#[derive(Debug, Clone)]
pub struct ProtocolAdapter {
    /// Protocol deployments by chain
    deployments: Arc<ProtocolDeployments>,
    /// Contract reader
    reader: Arc<dyn AccountReader>,
    /// Upper bound for a single account read
    read_timeout: Duration,
}

impl ProtocolAdapter {
    /// Create a new adapter driver.
    pub fn new(
        deployments: Arc<ProtocolDeployments>,
        reader: Arc<dyn AccountReader>,
        read_timeout: Duration,
    ) -> Self {
        Self {
            deployments,
            reader,
            read_timeout,
        }
    }

    /// Get the deployment table.
    pub fn deployments(&self) -> &ProtocolDeployments {
        &self.deployments
    }

    /// Fetch the position of `wallet` for `protocol` on `chain_id`.
    ///
    /// Never fails: unsupported pairs and empty accounts are [`FetchOutcome::Absent`],
    /// every read or decode error is [`FetchOutcome::Failed`].
    pub async fn fetch_position(
        &self,
        protocol: ProtocolKind,
        wallet: Address,
        chain_id: u64,
    ) -> FetchOutcome {
        let Some(market) = self.deployments.market(protocol, chain_id) else {
            debug!(%protocol, chain_id, "Protocol not deployed on chain");
            return FetchOutcome::Absent;
        };

        let read = self.reader.read_account(protocol, chain_id, market, wallet);
        let raw = match tokio::time::timeout(self.read_timeout, read).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(failure)) => return self.failed(protocol, chain_id, failure),
            Err(_) => return self.failed(protocol, chain_id, AdapterFailure::Timeout(self.read_timeout)),
        };

        let snapshot = match normalize(protocol, &raw) {
            Ok(snapshot) => snapshot,
            Err(failure) => return self.failed(protocol, chain_id, failure),
        };

        if snapshot.is_empty() {
            debug!(%protocol, chain_id, wallet = %wallet, "No open position");
            return FetchOutcome::Absent;
        }

        debug!(
            %protocol,
            chain_id,
            wallet = %wallet,
            collateral_usd = snapshot.collateral_usd,
            debt_usd = snapshot.debt_usd,
            health_factor = snapshot.health_factor,
            "Position fetched"
        );

        FetchOutcome::Found(snapshot)
    }

    fn failed(&self, protocol: ProtocolKind, chain_id: u64, failure: AdapterFailure) -> FetchOutcome {
        warn!(%protocol, chain_id, error = %failure, "Adapter read failed");
        FetchOutcome::Failed(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::u256_math::WAD;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reader returning a fixed response and counting calls.
    #[derive(Debug)]
    struct FixedReader {
        response: Result<RawAccountData, AdapterFailure>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl FixedReader {
        fn new(response: Result<RawAccountData, AdapterFailure>) -> Self {
            Self {
                response,
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AccountReader for FixedReader {
        async fn read_account(
            &self,
            _protocol: ProtocolKind,
            _chain_id: u64,
            _market: Address,
            _wallet: Address,
        ) -> Result<RawAccountData, AdapterFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.response.clone()
        }
    }

    fn adapter(reader: Arc<FixedReader>) -> ProtocolAdapter {
        let deployments = ProtocolDeployments::new()
            .with_market(ProtocolKind::AaveV3, 1, Address::repeat_byte(0xAA));
        ProtocolAdapter::new(Arc::new(deployments), reader, Duration::from_millis(200))
    }

    fn pool(collateral: u64, debt: u64, hf: U256) -> RawAccountData {
        RawAccountData::Pool(PoolAccountData {
            total_collateral_base: U256::from(collateral) * U256::from(100_000_000u64),
            total_debt_base: U256::from(debt) * U256::from(100_000_000u64),
            available_borrows_base: U256::ZERO,
            current_liquidation_threshold: U256::from(8500u64),
            ltv: U256::from(8000u64),
            health_factor: hf,
        })
    }

    #[test]
    fn test_protocol_id_parsing() {
        assert_eq!(ProtocolKind::from_id("aave_v3"), Some(ProtocolKind::AaveV3));
        assert_eq!(ProtocolKind::from_id("Aave-V3"), Some(ProtocolKind::AaveV3));
        assert_eq!(ProtocolKind::from_id("comet"), Some(ProtocolKind::CompoundV3));
        assert_eq!(ProtocolKind::from_id("spark"), Some(ProtocolKind::Spark));
        assert_eq!(ProtocolKind::from_id("radiant"), Some(ProtocolKind::Radiant));
        assert_eq!(ProtocolKind::from_id("morpho"), None);

        for kind in ProtocolKind::ALL {
            assert_eq!(ProtocolKind::from_id(kind.id()), Some(kind));
        }
    }

    #[test]
    fn test_protocol_families() {
        assert_eq!(ProtocolKind::AaveV3.family(), ContractFamily::Pool);
        assert_eq!(ProtocolKind::Spark.family(), ContractFamily::Pool);
        assert_eq!(ProtocolKind::Radiant.family(), ContractFamily::Pool);
        assert_eq!(ProtocolKind::CompoundV3.family(), ContractFamily::Comet);
    }

    #[tokio::test]
    async fn test_unsupported_pair_skips_network() {
        let reader = Arc::new(FixedReader::new(Ok(pool(1, 1, WAD))));
        let adapter = adapter(reader.clone());

        let outcome = adapter
            .fetch_position(ProtocolKind::Spark, Address::ZERO, 1)
            .await;
        assert_eq!(outcome, FetchOutcome::Absent);

        let outcome = adapter
            .fetch_position(ProtocolKind::AaveV3, Address::ZERO, 137)
            .await;
        assert_eq!(outcome, FetchOutcome::Absent);

        assert_eq!(reader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_account_is_absent() {
        let reader = Arc::new(FixedReader::new(Ok(pool(0, 0, U256::MAX))));
        let outcome = adapter(reader.clone())
            .fetch_position(ProtocolKind::AaveV3, Address::ZERO, 1)
            .await;
        assert_eq!(outcome, FetchOutcome::Absent);
        assert_eq!(reader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_found_position() {
        let reader = Arc::new(FixedReader::new(Ok(pool(10_000, 5_000, WAD * U256::from(17u64) / U256::from(10u64)))));
        let outcome = adapter(reader)
            .fetch_position(ProtocolKind::AaveV3, Address::ZERO, 1)
            .await;

        let FetchOutcome::Found(snapshot) = outcome else {
            panic!("expected a position, got {outcome:?}");
        };
        assert_eq!(snapshot.collateral_usd, 10_000.0);
        assert_eq!(snapshot.debt_usd, 5_000.0);
        assert!((snapshot.health_factor - 1.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_reader_failure_is_reported() {
        let reader = Arc::new(FixedReader::new(Err(AdapterFailure::Rpc("boom".into()))));
        let outcome = adapter(reader)
            .fetch_position(ProtocolKind::AaveV3, Address::ZERO, 1)
            .await;
        assert_eq!(outcome, FetchOutcome::Failed(AdapterFailure::Rpc("boom".into())));
    }

    #[tokio::test]
    async fn test_slow_read_times_out() {
        let mut reader = FixedReader::new(Ok(pool(1, 1, WAD)));
        reader.delay = Some(Duration::from_secs(5));
        let outcome = adapter(Arc::new(reader))
            .fetch_position(ProtocolKind::AaveV3, Address::ZERO, 1)
            .await;
        assert_eq!(
            outcome,
            FetchOutcome::Failed(AdapterFailure::Timeout(Duration::from_millis(200)))
        );
    }

    #[tokio::test]
    async fn test_family_mismatch_is_decode_failure() {
        let reader = Arc::new(FixedReader::new(Ok(RawAccountData::Comet(CometAccountData::default()))));
        let outcome = adapter(reader)
            .fetch_position(ProtocolKind::AaveV3, Address::ZERO, 1)
            .await;
        assert!(matches!(outcome, FetchOutcome::Failed(AdapterFailure::Decode(_))));
    }
}
