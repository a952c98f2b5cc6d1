//! Protocol deployment table.
//!
//! Maps (protocol, chain) pairs to the market contract an account is read from.
//! A pair missing from the table means the protocol is not deployed there.

use super::ProtocolKind;
use alloy::primitives::Address;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Invalid address literal in a deployment entry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid address '{input}': {reason}")]
pub struct InvalidAddress {
    pub input: String,
    pub reason: String,
}

/// Parse address from string, returning error on failure.
pub fn parse_address(s: &str) -> Result<Address, InvalidAddress> {
    s.trim().parse().map_err(|e| InvalidAddress {
        input: s.to_string(),
        reason: format!("{e}"),
    })
}

/// Market addresses by protocol and chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolDeployments {
    markets: BTreeMap<(ProtocolKind, u64), Address>,
}

impl ProtocolDeployments {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_market(mut self, protocol: ProtocolKind, chain_id: u64, market: Address) -> Self {
        self.insert(protocol, chain_id, market);
        self
    }

    /// Insert or replace a deployment, returning the previous market address.
    pub fn insert(&mut self, protocol: ProtocolKind, chain_id: u64, market: Address) -> Option<Address> {
        self.markets.insert((protocol, chain_id), market)
    }

    /// Drop every deployment of `protocol`.
    pub fn remove_protocol(&mut self, protocol: ProtocolKind) {
        self.markets.retain(|(kind, _), _| *kind != protocol);
    }

    /// Market address of `protocol` on `chain_id`, if deployed.
    pub fn market(&self, protocol: ProtocolKind, chain_id: u64) -> Option<Address> {
        self.markets.get(&(protocol, chain_id)).copied()
    }

    /// Chains where `protocol` is deployed, ascending.
    pub fn chains_for(&self, protocol: ProtocolKind) -> Vec<u64> {
        self.markets
            .keys()
            .filter(|(kind, _)| *kind == protocol)
            .map(|(_, chain_id)| *chain_id)
            .collect()
    }

    /// Protocols with at least one deployment.
    pub fn protocols(&self) -> BTreeSet<ProtocolKind> {
        self.markets.keys().map(|(kind, _)| *kind).collect()
    }

    /// Number of deployments.
    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}
