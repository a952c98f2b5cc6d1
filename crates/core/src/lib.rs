//! Sentinel core logic.
//!
//! This crate provides the liquidation-risk monitoring functionality:
//! - Risk classification of health factors into tiers with warnings
//! - Position records built from normalized account snapshots
//! - Position aggregation across chains and protocols
//! - Report assembly with at-risk counts
//! - Configuration (runtime profiles, chains, protocol deployments)
//!
//! Supports Aave-style Pools (Aave V3, Spark, Radiant) and Compound V3 on
//! multiple EVM chains.

mod aggregator;
pub mod config;
mod position;
mod report;
mod risk;

pub use aggregator::{Aggregation, AggregatorConfig, PositionAggregator, ReportRequest};
pub use config::{ConfigRegistry, SentinelConfig};
pub use position::PositionRecord;
pub use report::{Report, UnavailablePair};
pub use risk::{classify, RiskTier, DEFAULT_ALERT_THRESHOLD, HIGH_RISK_HF, LIQUIDATION_HF};
