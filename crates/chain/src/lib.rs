//! Sentinel chain interaction layer.
//!
//! This crate provides:
//! - A lazy, memoized registry of read-only chain connections
//! - Contract bindings for Aave-style Pools and Compound V3 Comet markets
//! - The protocol adapter driver and its per-protocol decoding table
//! - Fixed-point helpers for contract return values
//!
//! Supports multiple EVM chains with configurable RPC endpoints.

mod contracts;
pub mod protocol;
mod provider;
pub mod u256_math;

pub use contracts::{IComet, IPool};
pub use protocol::{
    AccountReader, AccountSnapshot, AdapterFailure, ContractFamily, FetchOutcome, OnChainReader,
    ProtocolAdapter, ProtocolDeployments, ProtocolKind, RawAccountData, INFINITE_HEALTH_FACTOR,
};
pub use provider::{ChainDescriptor, ConnectionRegistry, RegistryError};
