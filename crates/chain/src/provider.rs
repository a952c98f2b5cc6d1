//! Chain connection registry.
//!
//! Maps chain ids to read-only Alloy HTTP providers. Providers are built on
//! first use and memoized for the lifetime of the registry.

use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::transports::http::reqwest::Url;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

/// Immutable description of a supported chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDescriptor {
    /// Chain ID
    pub chain_id: u64,
    /// Human-readable network name
    pub name: String,
    /// HTTP RPC endpoint
    pub rpc_url: String,
}

impl ChainDescriptor {
    pub fn new(chain_id: u64, name: impl Into<String>, rpc_url: impl Into<String>) -> Self {
        Self {
            chain_id,
            name: name.into(),
            rpc_url: rpc_url.into(),
        }
    }
}

/// Errors raised by the connection registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("chain {0} is not supported")]
    UnsupportedChain(u64),

    #[error("invalid RPC url for chain {chain_id}: {reason}")]
    InvalidRpcUrl { chain_id: u64, reason: String },

    #[error("chain {chain_id} unreachable: {reason}")]
    Unreachable { chain_id: u64, reason: String },
}

/// Registry of read-only chain connections.
///
/// Descriptors are fixed at construction. Connections are created lazily and
/// shared; the dashmap entry lock makes concurrent first use of one chain id
/// build a single provider.
pub struct ConnectionRegistry {
    /// Chain descriptors by chain ID (ordered for stable listing)
    descriptors: BTreeMap<u64, ChainDescriptor>,
    /// Memoized providers by chain ID
    connections: DashMap<u64, DynProvider>,
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("chains", &self.descriptors.keys().collect::<Vec<_>>())
            .field("open_connections", &self.connections.len())
            .finish()
    }
}

impl ConnectionRegistry {
    /// Create a registry from chain descriptors. No connection is opened here.
    pub fn new(descriptors: impl IntoIterator<Item = ChainDescriptor>) -> Self {
        let descriptors: BTreeMap<u64, ChainDescriptor> = descriptors
            .into_iter()
            .map(|d| (d.chain_id, d))
            .collect();

        info!(chains = descriptors.len(), "Connection registry initialized");

        Self {
            descriptors,
            connections: DashMap::new(),
        }
    }

    /// Get the descriptor for a chain.
    pub fn descriptor(&self, chain_id: u64) -> Option<&ChainDescriptor> {
        self.descriptors.get(&chain_id)
    }

    /// Check whether a chain has a descriptor.
    pub fn supports(&self, chain_id: u64) -> bool {
        self.descriptors.contains_key(&chain_id)
    }

    /// Supported chain IDs in ascending order.
    pub fn chain_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.descriptors.keys().copied()
    }

    /// Number of connections built so far.
    pub fn open_connections(&self) -> usize {
        self.connections.len()
    }

    /// Get (or lazily build) the provider for a chain.
    pub fn connection(&self, chain_id: u64) -> Result<DynProvider, RegistryError> {
        let descriptor = self
            .descriptors
            .get(&chain_id)
            .ok_or(RegistryError::UnsupportedChain(chain_id))?;

        match self.connections.entry(chain_id) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let url: Url = descriptor.rpc_url.parse().map_err(|e| {
                    RegistryError::InvalidRpcUrl {
                        chain_id,
                        reason: format!("{e}"),
                    }
                })?;

                debug!(chain_id, chain = %descriptor.name, "Building chain connection");

                let provider = ProviderBuilder::new().on_http(url).erased();
                Ok(entry.insert(provider).clone())
            }
        }
    }

    /// Check that a chain endpoint answers, returning its latest block.
    pub async fn health_check(&self, chain_id: u64) -> Result<u64, RegistryError> {
        let provider = self.connection(chain_id)?;
        let block = provider
            .get_block_number()
            .await
            .map_err(|e| RegistryError::Unreachable {
                chain_id,
                reason: e.to_string(),
            })?;
        debug!(chain_id, block, "Provider health check passed");
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ConnectionRegistry {
        ConnectionRegistry::new([
            ChainDescriptor::new(1, "Ethereum", "https://eth.llamarpc.com"),
            ChainDescriptor::new(8453, "Base", "https://base.llamarpc.com"),
            ChainDescriptor::new(10, "Optimism", "not a url"),
        ])
    }

    #[test]
    fn test_unsupported_chain() {
        let registry = registry();
        assert!(!registry.supports(999));
        assert_eq!(
            registry.connection(999).unwrap_err(),
            RegistryError::UnsupportedChain(999)
        );
        assert_eq!(registry.open_connections(), 0);
    }

    #[tokio::test]
    async fn test_connection_is_memoized() {
        let registry = registry();
        registry.connection(1).unwrap();
        registry.connection(1).unwrap();
        assert_eq!(registry.open_connections(), 1);

        registry.connection(8453).unwrap();
        assert_eq!(registry.open_connections(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_use_builds_one_connection() {
        let registry = std::sync::Arc::new(registry());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.connection(1).is_ok() })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap());
        }
        assert_eq!(registry.open_connections(), 1);
    }

    #[test]
    fn test_invalid_rpc_url() {
        let registry = registry();
        assert!(matches!(
            registry.connection(10),
            Err(RegistryError::InvalidRpcUrl { chain_id: 10, .. })
        ));
        assert_eq!(registry.open_connections(), 0);
    }

    #[test]
    fn test_chain_ids_sorted() {
        let registry = registry();
        assert_eq!(registry.chain_ids().collect::<Vec<_>>(), vec![1, 10, 8453]);
        assert_eq!(registry.descriptor(8453).unwrap().name, "Base");
    }

    #[tokio::test]
    #[ignore] // Requires network
    async fn test_health_check() {
        let registry = registry();
        let block = registry.health_check(1).await.unwrap();
        assert!(block > 0);
    }
}
