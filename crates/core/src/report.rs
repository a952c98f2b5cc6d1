//! Report assembly.

use crate::position::PositionRecord;
use alloy::primitives::Address;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A (chain, protocol) pair whose read failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailablePair {
    pub chain_id: u64,
    pub protocol_id: String,
    pub reason: String,
}

/// Final response for one wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Checksummed wallet address
    pub wallet: String,
    /// Positions in chains-outer, protocols-inner order
    pub positions: Vec<PositionRecord>,
    /// Number of positions
    pub total_positions: usize,
    /// Positions with health factor below the alert threshold
    pub at_risk_count: usize,
    /// Alert threshold used for classification
    pub alert_threshold: f64,
    /// Assembly time (RFC 3339, UTC)
    pub timestamp: String,
    /// Failed reads, only listed when enabled
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<UnavailablePair>,
}

impl Report {
    /// Assemble a report stamped with the current time.
    pub fn assemble(
        wallet: Address,
        positions: Vec<PositionRecord>,
        unavailable: Vec<UnavailablePair>,
        alert_threshold: f64,
    ) -> Self {
        Self::assemble_at(wallet, positions, unavailable, alert_threshold, Utc::now())
    }

    /// Assemble a report stamped with `now`.
    pub fn assemble_at(
        wallet: Address,
        positions: Vec<PositionRecord>,
        unavailable: Vec<UnavailablePair>,
        alert_threshold: f64,
        now: DateTime<Utc>,
    ) -> Self {
        // Counted here from the health factors, not from the tiers
        let at_risk_count = positions
            .iter()
            .filter(|p| p.is_at_risk(alert_threshold))
            .count();

        Self {
            wallet: wallet.to_checksum(None),
            total_positions: positions.len(),
            positions,
            at_risk_count,
            alert_threshold,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Micros, true),
            unavailable,
        }
    }

    /// Check if any position is below the alert threshold.
    pub fn has_risk(&self) -> bool {
        self.at_risk_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskTier;
    use chrono::TimeZone;

    fn record(health_factor: f64, risk_tier: RiskTier) -> PositionRecord {
        PositionRecord {
            protocol: "Aave V3".to_string(),
            protocol_id: "aave_v3".to_string(),
            chain_id: 1,
            chain_name: "Ethereum".to_string(),
            health_factor,
            liquidation_price: None,
            collateral_usd: 1.0,
            debt_usd: 1.0,
            liquidation_threshold: 0.85,
            ltv: 0.8,
            buffer_percent: None,
            risk_tier,
            warning: None,
        }
    }

    #[test]
    fn test_at_risk_count_uses_health_factor() {
        // Tier deliberately inconsistent: the count must follow the HF
        let positions = vec![
            record(1.3, RiskTier::Safe),
            record(0.9, RiskTier::Critical),
            record(2.0, RiskTier::Moderate),
        ];
        let report = Report::assemble(Address::ZERO, positions, Vec::new(), 1.5);
        assert_eq!(report.total_positions, 3);
        assert_eq!(report.at_risk_count, 2);
        assert!(report.has_risk());
    }

    #[test]
    fn test_timestamp_and_order() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        let positions = vec![record(3.0, RiskTier::Safe), record(1.1, RiskTier::High)];
        let report = Report::assemble_at(Address::ZERO, positions.clone(), Vec::new(), 1.5, now);

        assert_eq!(report.timestamp, "2026-03-01T12:30:00.000000Z");
        assert_eq!(report.positions, positions);
        assert_eq!(report.at_risk_count, 1);
    }

    #[test]
    fn test_empty_report() {
        let report = Report::assemble(Address::ZERO, Vec::new(), Vec::new(), 1.5);
        assert_eq!(report.total_positions, 0);
        assert_eq!(report.at_risk_count, 0);
        assert!(!report.has_risk());
    }

    #[test]
    fn test_unavailable_only_serialized_when_present() {
        let report = Report::assemble(Address::ZERO, Vec::new(), Vec::new(), 1.5);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("unavailable").is_none());

        let unavailable = vec![UnavailablePair {
            chain_id: 137,
            protocol_id: "compound_v3".to_string(),
            reason: "read timed out after 10s".to_string(),
        }];
        let report = Report::assemble(Address::ZERO, Vec::new(), unavailable, 1.5);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["unavailable"][0]["chain_id"], 137);
    }
}
