//! Health factor risk classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Below this health factor a position can be liquidated.
pub const LIQUIDATION_HF: f64 = 1.0;

/// Below this health factor a position is high risk regardless of the alert threshold.
pub const HIGH_RISK_HF: f64 = 1.2;

/// Alert threshold used when the caller does not supply one.
pub const DEFAULT_ALERT_THRESHOLD: f64 = 1.5;

/// Risk tier, ordered from safest to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Safe,
    Moderate,
    High,
    Critical,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a health factor against the caller's alert threshold.
///
/// Bands are checked in order and the first match wins: below 1.0 is
/// critical, below 1.2 is high, below `alert_threshold` is moderate,
/// anything else is safe. Only the moderate band moves with the threshold.
pub fn classify(health_factor: f64, alert_threshold: f64) -> (RiskTier, Option<String>) {
    if health_factor < LIQUIDATION_HF {
        (
            RiskTier::Critical,
            Some(format!(
                "Liquidation imminent: health factor {health_factor:.4} is below 1.0"
            )),
        )
    } else if health_factor < HIGH_RISK_HF {
        (
            RiskTier::High,
            Some(format!(
                "High liquidation risk: health factor {health_factor:.4} is below 1.2"
            )),
        )
    } else if health_factor < alert_threshold {
        (
            RiskTier::Moderate,
            Some(format!(
                "Health factor {health_factor:.4} is below alert threshold {alert_threshold}"
            )),
        )
    } else {
        (RiskTier::Safe, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_chain::INFINITE_HEALTH_FACTOR;

    /// Health factors from 0.00 to 3.00 in 0.01 steps.
    fn sweep() -> impl Iterator<Item = f64> {
        (0..=300).map(|i| i as f64 / 100.0)
    }

    const THRESHOLDS: [f64; 6] = [0.5, 1.0, 1.1, 1.5, 2.0, 5.0];

    #[test]
    fn test_critical_band_ignores_threshold() {
        for threshold in THRESHOLDS {
            for hf in sweep().filter(|hf| *hf < 1.0) {
                let (tier, warning) = classify(hf, threshold);
                assert_eq!(tier, RiskTier::Critical, "hf={hf} threshold={threshold}");
                assert!(warning.unwrap().contains("Liquidation imminent"));
            }
        }
    }

    #[test]
    fn test_high_band_ignores_threshold() {
        for threshold in THRESHOLDS {
            for hf in sweep().filter(|hf| (1.0..1.2).contains(hf)) {
                assert_eq!(classify(hf, threshold).0, RiskTier::High, "hf={hf}");
            }
        }
    }

    #[test]
    fn test_moderate_and_safe_bands() {
        for threshold in THRESHOLDS {
            for hf in sweep().filter(|hf| *hf >= 1.2) {
                let (tier, warning) = classify(hf, threshold);
                if hf < threshold {
                    assert_eq!(tier, RiskTier::Moderate, "hf={hf} threshold={threshold}");
                    assert!(warning.unwrap().contains(&threshold.to_string()));
                } else {
                    assert_eq!(tier, RiskTier::Safe, "hf={hf} threshold={threshold}");
                    assert!(warning.is_none());
                }
            }
        }
    }

    #[test]
    fn test_raising_threshold_never_lowers_tier() {
        for hf in sweep() {
            let mut previous = RiskTier::Safe;
            for threshold in THRESHOLDS {
                let (tier, _) = classify(hf, threshold);
                assert!(tier >= previous, "hf={hf} threshold={threshold}");
                previous = tier;
            }
        }
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(classify(0.9999, 1.5).0, RiskTier::Critical);
        assert_eq!(classify(1.0, 1.5).0, RiskTier::High);
        assert_eq!(classify(1.2, 1.5).0, RiskTier::Moderate);
        assert_eq!(classify(1.5, 1.5).0, RiskTier::Safe);
    }

    #[test]
    fn test_sentinel_and_extremes() {
        assert_eq!(classify(INFINITE_HEALTH_FACTOR, DEFAULT_ALERT_THRESHOLD), (RiskTier::Safe, None));
        assert_eq!(classify(f64::INFINITY, DEFAULT_ALERT_THRESHOLD).0, RiskTier::Safe);
        assert_eq!(classify(0.0, DEFAULT_ALERT_THRESHOLD).0, RiskTier::Critical);
        assert_eq!(classify(-1.0, DEFAULT_ALERT_THRESHOLD).0, RiskTier::Critical);
        assert_eq!(classify(f64::NAN, DEFAULT_ALERT_THRESHOLD).0, RiskTier::Safe);
    }

    #[test]
    fn test_moderate_warning_references_threshold() {
        let (tier, warning) = classify(1.308, 1.5);
        assert_eq!(tier, RiskTier::Moderate);
        assert_eq!(
            warning.as_deref(),
            Some("Health factor 1.3080 is below alert threshold 1.5")
        );
    }

    #[test]
    fn test_tier_serialization() {
        assert_eq!(serde_json::to_string(&RiskTier::Critical).unwrap(), "\"critical\"");
        assert_eq!(RiskTier::Moderate.to_string(), "moderate");
    }
}
