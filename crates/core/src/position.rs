//! Position records emitted for each open (chain, protocol) position.

use crate::risk::{classify, RiskTier};
use sentinel_chain::{AccountSnapshot, ProtocolKind, INFINITE_HEALTH_FACTOR};
use serde::{Deserialize, Serialize};

/// One open lending position, classified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    /// Protocol display name (e.g., "Aave V3")
    pub protocol: String,
    /// Protocol wire identifier (e.g., "aave_v3")
    pub protocol_id: String,
    /// Chain ID
    pub chain_id: u64,
    /// Chain display name
    pub chain_name: String,
    /// Health factor (sentinel value without debt)
    pub health_factor: f64,
    /// Relative collateral price at which HF reaches 1.0
    pub liquidation_price: Option<f64>,
    /// Total collateral in USD
    pub collateral_usd: f64,
    /// Total debt in USD
    pub debt_usd: f64,
    /// Effective liquidation threshold (fraction)
    pub liquidation_threshold: f64,
    /// Effective loan-to-value (fraction)
    pub ltv: f64,
    /// Distance above HF 1.0 in percent; `None` without debt
    pub buffer_percent: Option<f64>,
    /// Risk tier
    pub risk_tier: RiskTier,
    /// Human-readable warning, absent for safe positions
    pub warning: Option<String>,
}

impl PositionRecord {
    /// Build a classified record from a normalized account snapshot.
    pub fn from_snapshot(
        protocol: ProtocolKind,
        chain_id: u64,
        chain_name: impl Into<String>,
        snapshot: &AccountSnapshot,
        alert_threshold: f64,
    ) -> Self {
        let (risk_tier, warning) = classify(snapshot.health_factor, alert_threshold);

        Self {
            protocol: protocol.display_name().to_string(),
            protocol_id: protocol.id().to_string(),
            chain_id,
            chain_name: chain_name.into(),
            health_factor: snapshot.health_factor,
            liquidation_price: snapshot.liquidation_price,
            collateral_usd: snapshot.collateral_usd,
            debt_usd: snapshot.debt_usd,
            liquidation_threshold: snapshot.liquidation_threshold,
            ltv: snapshot.ltv,
            buffer_percent: buffer_percent(snapshot.health_factor),
            risk_tier,
            warning,
        }
    }

    /// Check if the health factor is below `alert_threshold`.
    pub fn is_at_risk(&self, alert_threshold: f64) -> bool {
        self.health_factor < alert_threshold
    }
}

/// (hf - 1) * 100 above 1.0, zero at or below it.
fn buffer_percent(health_factor: f64) -> Option<f64> {
    if health_factor >= INFINITE_HEALTH_FACTOR {
        None
    } else if health_factor > 1.0 {
        Some((health_factor - 1.0) * 100.0)
    } else {
        Some(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(collateral: f64, debt: f64, lt: f64) -> AccountSnapshot {
        let health_factor = if debt == 0.0 {
            INFINITE_HEALTH_FACTOR
        } else {
            collateral * lt / debt
        };
        AccountSnapshot {
            collateral_usd: collateral,
            debt_usd: debt,
            health_factor,
            liquidation_threshold: lt,
            ltv: 0.8,
            liquidation_price: (debt > 0.0).then(|| debt / (collateral * lt)),
        }
    }

    #[test]
    fn test_moderate_record() {
        let record = PositionRecord::from_snapshot(
            ProtocolKind::AaveV3,
            1,
            "Ethereum",
            &snapshot(10_000.0, 6_500.0, 0.85),
            1.5,
        );

        assert_eq!(record.protocol, "Aave V3");
        assert_eq!(record.protocol_id, "aave_v3");
        assert_eq!(record.risk_tier, RiskTier::Moderate);
        assert!((record.health_factor - 1.3077).abs() < 1e-4);
        assert!((record.buffer_percent.unwrap() - 30.77).abs() < 1e-2);
        assert!(record.is_at_risk(1.5));
        assert!(record.warning.as_deref().unwrap().contains("1.5"));
    }

    #[test]
    fn test_zero_debt_record_is_safe() {
        let record = PositionRecord::from_snapshot(
            ProtocolKind::CompoundV3,
            8453,
            "Base",
            &snapshot(10_000.0, 0.0, 0.85),
            1.5,
        );
        assert_eq!(record.risk_tier, RiskTier::Safe);
        assert_eq!(record.warning, None);
        assert_eq!(record.buffer_percent, None);
        assert_eq!(record.liquidation_price, None);
        assert!(!record.is_at_risk(1.5));
    }

    #[test]
    fn test_buffer_percent() {
        assert_eq!(buffer_percent(0.95), Some(0.0));
        assert_eq!(buffer_percent(1.0), Some(0.0));
        assert!((buffer_percent(1.25).unwrap() - 25.0).abs() < 1e-9);
        assert_eq!(buffer_percent(INFINITE_HEALTH_FACTOR), None);
    }

    #[test]
    fn test_record_json_shape() {
        let record = PositionRecord::from_snapshot(
            ProtocolKind::Spark,
            1,
            "Ethereum",
            &snapshot(1_000.0, 900.0, 0.8),
            1.5,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["risk_tier"], "critical");
        assert_eq!(json["protocol"], "Spark");
        assert!(json["warning"].is_string());
    }
}
