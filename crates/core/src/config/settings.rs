//! Runtime settings with profile support.
//!
//! Provides the knobs the aggregator and report assembler read at runtime,
//! with named profiles (default, monitoring, fast).

use crate::risk::DEFAULT_ALERT_THRESHOLD;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable selecting a profile name or a settings file.
pub const PROFILE_ENV: &str = "SENTINEL_PROFILE";

/// Main runtime settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentinelConfig {
    /// Profile name (for logging/identification)
    #[serde(default = "default_profile_name")]
    pub profile: String,

    /// Alerting thresholds
    #[serde(default)]
    pub alert: AlertConfig,

    /// Position fetching limits
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Report contents
    #[serde(default)]
    pub report: ReportConfig,
}

fn default_profile_name() -> String {
    "default".to_string()
}

/// Alerting thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Alert threshold used when a request does not supply one
    #[serde(default = "default_alert_threshold")]
    pub default_threshold: f64,
}

fn default_alert_threshold() -> f64 {
    DEFAULT_ALERT_THRESHOLD
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            default_threshold: default_alert_threshold(),
        }
    }
}

/// Position fetching limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum (chain, protocol) pairs read concurrently
    #[serde(default = "default_max_concurrent_pairs")]
    pub max_concurrent_pairs: usize,

    /// Upper bound for one account read (milliseconds)
    #[serde(default = "default_rpc_timeout")]
    pub rpc_timeout_ms: u64,
}

fn default_max_concurrent_pairs() -> usize {
    4
}
fn default_rpc_timeout() -> u64 {
    10_000
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_pairs: default_max_concurrent_pairs(),
            rpc_timeout_ms: default_rpc_timeout(),
        }
    }
}

impl FetchConfig {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    /// Concurrency limit, never below one.
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_pairs.max(1)
    }
}

/// Report contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// List failed (chain, protocol) reads instead of dropping them
    #[serde(default)]
    pub report_unavailable: bool,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            profile: default_profile_name(),
            alert: AlertConfig::default(),
            fetch: FetchConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl SentinelConfig {
    /// Load settings from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Monitoring profile: failed reads are reported, reads get more time.
    pub fn monitoring() -> Self {
        Self {
            profile: "monitoring".to_string(),
            alert: AlertConfig::default(),
            fetch: FetchConfig {
                max_concurrent_pairs: 4,
                rpc_timeout_ms: 20_000,
            },
            report: ReportConfig {
                report_unavailable: true,
            },
        }
    }

    /// Fast profile: wide fan-out and short timeouts.
    pub fn fast() -> Self {
        Self {
            profile: "fast".to_string(),
            alert: AlertConfig::default(),
            fetch: FetchConfig {
                max_concurrent_pairs: 16,
                rpc_timeout_ms: 4_000,
            },
            report: ReportConfig::default(),
        }
    }

    /// Get a profile by name, falling back to the default profile.
    /// Supported values: default, monitoring, fast
    pub fn profile(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "monitoring" | "monitor" => Self::monitoring(),
            "fast" => Self::fast(),
            _ => Self::default(),
        }
    }

    /// Resolve a selector: a path ending in `.toml` is loaded, anything else names a profile.
    pub fn select(selector: &str) -> anyhow::Result<Self> {
        let selector = selector.trim();
        if selector.ends_with(".toml") {
            Self::from_file(selector)
        } else {
            Ok(Self::profile(selector))
        }
    }

    /// Settings selected by SENTINEL_PROFILE, or the default profile.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var(PROFILE_ENV) {
            Ok(selector) => Self::select(&selector),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        tracing::info!(profile = %self.profile, "Sentinel configuration loaded");
        tracing::info!(
            default_threshold = self.alert.default_threshold,
            max_concurrent_pairs = self.fetch.max_concurrent_pairs,
            rpc_timeout_ms = self.fetch.rpc_timeout_ms,
            report_unavailable = self.report.report_unavailable,
            "Runtime settings"
        );
    }
}
