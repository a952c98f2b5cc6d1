//! Configuration system for the multi-chain, multi-protocol sentinel.
//!
//! This module provides:
//! - Runtime settings (profiles, thresholds, fan-out, timeouts)
//! - Chain configuration (RPC endpoints)
//! - Protocol configuration (market contract per chain)
//! - Built-in chains and deployments
//! - Configuration registry for runtime loading

mod chain;
pub mod defaults;
mod protocol;
mod registry;
mod settings;

// Re-export runtime settings
pub use settings::{AlertConfig, FetchConfig, ReportConfig, SentinelConfig};

// Re-export chain config
pub use chain::{expand_env, ChainConfig, ChainDetails, RpcConfig};

// Re-export protocol config
pub use protocol::{DeploymentEntry, ProtocolConfig, ProtocolDetails};

// Re-export config registry
pub use registry::{rpc_override_key, ConfigRegistry, CONFIG_DIR_ENV};
