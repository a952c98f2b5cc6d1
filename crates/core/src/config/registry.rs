//! Configuration registry for chains and protocol deployments.
//!
//! Starts from the built-in tables, then layers config files from a
//! directory and `CHAIN_<id>_RPC_URL` environment overrides on top.

use super::defaults::{default_chains, default_deployments};
use super::{ChainConfig, ProtocolConfig};
use anyhow::{Context, Result};
use sentinel_chain::{ChainDescriptor, ProtocolDeployments};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Environment variable naming the config directory.
pub const CONFIG_DIR_ENV: &str = "SENTINEL_CONFIG_DIR";

/// Environment variable overriding one chain's RPC endpoint.
pub fn rpc_override_key(chain_id: u64) -> String {
    format!("CHAIN_{chain_id}_RPC_URL")
}

/// Configuration registry for runtime config management.
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    /// Chain descriptors indexed by chain ID
    chains: BTreeMap<u64, ChainDescriptor>,
    /// Market contracts by protocol and chain
    deployments: ProtocolDeployments,
}

impl ConfigRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in chains and deployments.
    pub fn with_defaults() -> Self {
        Self {
            chains: default_chains().into_iter().map(|c| (c.chain_id, c)).collect(),
            deployments: default_deployments(),
        }
    }

    /// Built-in tables, then `SENTINEL_CONFIG_DIR` (if set), then RPC overrides.
    pub fn from_env() -> Result<Self> {
        let mut registry = Self::with_defaults();
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            registry.load_dir(&dir)?;
        }
        registry.apply_rpc_overrides(|key| std::env::var(key).ok());
        Ok(registry)
    }

    /// Load all configurations from a directory on top of the built-in tables.
    ///
    /// Expected structure:
    /// ```text
    /// config/
    ///   chains/
    ///     ethereum.toml
    ///     arbitrum.toml
    ///   protocols/
    ///     aave-v3.toml
    ///     radiant.toml
    /// ```
    pub fn load_from_dir(config_dir: impl AsRef<Path>) -> Result<Self> {
        let mut registry = Self::with_defaults();
        registry.load_dir(config_dir.as_ref())?;
        Ok(registry)
    }

    fn load_dir(&mut self, config_dir: impl AsRef<Path>) -> Result<()> {
        let config_dir = config_dir.as_ref();
        info!(config_dir = %config_dir.display(), "Loading configuration registry");

        if !config_dir.is_dir() {
            anyhow::bail!("config directory {} does not exist", config_dir.display());
        }

        let chains_dir = config_dir.join("chains");
        if chains_dir.exists() {
            self.load_chains(&chains_dir)?;
        }

        let protocols_dir = config_dir.join("protocols");
        if protocols_dir.exists() {
            self.load_protocols(&protocols_dir)?;
        }

        info!(
            chains = self.chains.len(),
            deployments = self.deployments.len(),
            "Configuration registry loaded"
        );
        Ok(())
    }

    /// Load chain configs from a directory.
    fn load_chains(&mut self, dir: &Path) -> Result<()> {
        for path in toml_files(dir)? {
            match ChainConfig::from_file(&path) {
                Ok(mut config) => {
                    config.expand_env_vars();
                    let descriptor = config.into_descriptor();
                    debug!(
                        chain_id = descriptor.chain_id,
                        name = %descriptor.name,
                        file = %path.display(),
                        "Loaded chain config"
                    );
                    self.chains.insert(descriptor.chain_id, descriptor);
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Failed to load chain config");
                }
            }
        }
        Ok(())
    }

    /// Load protocol configs from a directory.
    fn load_protocols(&mut self, dir: &Path) -> Result<()> {
        for path in toml_files(dir)? {
            let applied = ProtocolConfig::from_file(&path)
                .and_then(|config| config.apply(&mut self.deployments).map(|n| (config, n)));
            match applied {
                Ok((config, count)) => {
                    debug!(
                        protocol_id = %config.protocol.id,
                        deployments = count,
                        file = %path.display(),
                        "Loaded protocol config"
                    );
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Failed to load protocol config");
                }
            }
        }
        Ok(())
    }

    /// Replace RPC endpoints with `CHAIN_<id>_RPC_URL` values from `lookup`.
    pub fn apply_rpc_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for (chain_id, descriptor) in self.chains.iter_mut() {
            if let Some(url) = lookup(&rpc_override_key(*chain_id)).filter(|u| !u.trim().is_empty()) {
                debug!(chain_id, "RPC endpoint overridden from environment");
                descriptor.rpc_url = url.trim().to_string();
            }
        }
    }

    /// Get chain descriptor by chain ID.
    pub fn get_chain(&self, chain_id: u64) -> Option<&ChainDescriptor> {
        self.chains.get(&chain_id)
    }

    /// Get all chain IDs.
    pub fn chain_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.chains.keys().copied()
    }

    /// Get the deployment table.
    pub fn deployments(&self) -> &ProtocolDeployments {
        &self.deployments
    }

    /// Split into chain descriptors and the deployment table.
    pub fn into_parts(self) -> (Vec<ChainDescriptor>, ProtocolDeployments) {
        (self.chains.into_values().collect(), self.deployments)
    }
}

/// TOML files in `dir`, sorted by path so later files win deterministically.
fn toml_files(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == "toml") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
