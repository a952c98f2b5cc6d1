//! On-chain [`AccountReader`] backed by the connection registry.

use super::{AccountReader, AdapterFailure, ContractFamily, ProtocolKind, RawAccountData};
use crate::provider::ConnectionRegistry;
use alloy::primitives::Address;
use async_trait::async_trait;
use std::sync::Arc;

/// Reads accounts through registry connections, dispatching on contract family.
#[derive(Debug, Clone)]
pub struct OnChainReader {
    registry: Arc<ConnectionRegistry>,
}

impl OnChainReader {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl AccountReader for OnChainReader {
    #[allow(unused_variables)]
    async fn read_account(
        &self,
        protocol: ProtocolKind,
        chain_id: u64,
        market: Address,
        wallet: Address,
    ) -> Result<RawAccountData, AdapterFailure> {
        let provider = self
            .registry
            .connection(chain_id)
            .map_err(|e| AdapterFailure::Connection(e.to_string()))?;

        match protocol.family() {
            #[cfg(feature = "aave-v3")]
            ContractFamily::Pool => super::aave_v3::read_pool_account(&provider, market, wallet)
                .await
                .map(RawAccountData::Pool),
            #[cfg(feature = "compound-v3")]
            ContractFamily::Comet => super::compound_v3::read_comet_account(&provider, market, wallet)
                .await
                .map(RawAccountData::Comet),
            #[allow(unreachable_patterns)]
            family => Err(AdapterFailure::Disabled(family)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ChainDescriptor;

    #[tokio::test]
    async fn test_unknown_chain_is_connection_failure() {
        let registry = Arc::new(ConnectionRegistry::new([ChainDescriptor::new(
            1,
            "Ethereum",
            "https://eth.llamarpc.com",
        )]));
        let reader = OnChainReader::new(registry);

        let err = reader
            .read_account(ProtocolKind::AaveV3, 56, Address::ZERO, Address::ZERO)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AdapterFailure::Connection("chain 56 is not supported".to_string())
        );
    }

    #[tokio::test]
    #[ignore] // Requires network
    async fn test_read_pool_account_mainnet() {
        let registry = Arc::new(ConnectionRegistry::new([ChainDescriptor::new(
            1,
            "Ethereum",
            "https://eth.llamarpc.com",
        )]));
        let reader = OnChainReader::new(registry);
        let pool = crate::protocol::parse_address("0x87870Bca3F3fD6335C3F4ce8392D69350B4fA4E2").unwrap();

        let raw = reader
            .read_account(ProtocolKind::AaveV3, 1, pool, Address::ZERO)
            .await
            .unwrap();
        assert_eq!(raw.family(), ContractFamily::Pool);
    }

    #[tokio::test]
    #[ignore] // Requires network
    async fn test_read_comet_account_mainnet() {
        let registry = Arc::new(ConnectionRegistry::new([ChainDescriptor::new(
            1,
            "Ethereum",
            "https://eth.llamarpc.com",
        )]));
        let reader = OnChainReader::new(registry);
        let comet = crate::protocol::parse_address("0xc3d688B66703497DAA19211EEdff47f25384cdc3").unwrap();

        let raw = reader
            .read_account(ProtocolKind::CompoundV3, 1, comet, Address::ZERO)
            .await
            .unwrap();
        let RawAccountData::Comet(data) = raw else {
            panic!("expected comet data");
        };
        assert!(data.collaterals.is_empty());
        assert!(data.borrow_balance.is_zero());
    }
}
