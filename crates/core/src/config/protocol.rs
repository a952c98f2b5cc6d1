//! Protocol deployment configuration files.
//!
//! One file per protocol, listing the market contract on each chain:
//!
//! ```toml
//! [protocol]
//! id = "aave_v3"
//!
//! [[protocol.deployments]]
//! chain_id = 1
//! address = "0x87870Bca3F3fD6335C3F4ce8392D69350B4fA4E2"
//! ```

use anyhow::Context;
use sentinel_chain::protocol::parse_address;
use sentinel_chain::{ProtocolDeployments, ProtocolKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Protocol configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Protocol details
    pub protocol: ProtocolDetails,
}

/// Protocol details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolDetails {
    /// Protocol identifier (e.g., "aave_v3", "compound_v3")
    pub id: String,
    /// Market contracts by chain
    #[serde(default)]
    pub deployments: Vec<DeploymentEntry>,
}

/// One market contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentEntry {
    /// Chain ID
    pub chain_id: u64,
    /// Pool or Comet address
    pub address: String,
}

impl ProtocolConfig {
    /// Load protocol config from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: ProtocolConfig =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Get the protocol kind, if the identifier is recognized.
    pub fn kind(&self) -> Option<ProtocolKind> {
        ProtocolKind::from_id(&self.protocol.id)
    }

    /// Replace the deployments of this protocol in `deployments`.
    pub fn apply(&self, deployments: &mut ProtocolDeployments) -> anyhow::Result<usize> {
        let kind = self
            .kind()
            .with_context(|| format!("unknown protocol id '{}'", self.protocol.id))?;

        let mut parsed = Vec::with_capacity(self.protocol.deployments.len());
        for entry in &self.protocol.deployments {
            let address = parse_address(&entry.address)
                .with_context(|| format!("{kind} deployment on chain {}", entry.chain_id))?;
            parsed.push((entry.chain_id, address));
        }

        deployments.remove_protocol(kind);
        for (chain_id, address) in &parsed {
            deployments.insert(kind, *chain_id, *address);
        }
        Ok(parsed.len())
    }
}
