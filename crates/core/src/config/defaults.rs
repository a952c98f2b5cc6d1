//! Built-in chains and protocol deployments.

use sentinel_chain::protocol::parse_address;
use sentinel_chain::{ChainDescriptor, ProtocolDeployments, ProtocolKind};
use tracing::warn;

/// (chain id, name, public RPC endpoint)
pub const DEFAULT_CHAINS: &[(u64, &str, &str)] = &[
    (1, "Ethereum", "https://eth.llamarpc.com"),
    (137, "Polygon", "https://polygon.llamarpc.com"),
    (42161, "Arbitrum", "https://arbitrum.llamarpc.com"),
    (10, "Optimism", "https://optimism.llamarpc.com"),
    (8453, "Base", "https://base.llamarpc.com"),
    (43114, "Avalanche", "https://avalanche.llamarpc.com"),
    (56, "BSC", "https://binance.llamarpc.com"),
];

/// (protocol, chain id, market address)
pub const DEFAULT_DEPLOYMENTS: &[(ProtocolKind, u64, &str)] = &[
    // Aave V3 Pool
    (ProtocolKind::AaveV3, 1, "0x87870Bca3F3fD6335C3F4ce8392D69350B4fA4E2"),
    (ProtocolKind::AaveV3, 137, "0x794a61358D6845594F94dc1DB02A252b5b4814aD"),
    (ProtocolKind::AaveV3, 42161, "0x794a61358D6845594F94dc1DB02A252b5b4814aD"),
    (ProtocolKind::AaveV3, 10, "0x794a61358D6845594F94dc1DB02A252b5b4814aD"),
    (ProtocolKind::AaveV3, 8453, "0xA238Dd80C259a72e81d7e4664a9801593F98d1c5"),
    (ProtocolKind::AaveV3, 43114, "0x794a61358D6845594F94dc1DB02A252b5b4814aD"),
    // Compound V3 USDC Comet
    (ProtocolKind::CompoundV3, 1, "0xc3d688B66703497DAA19211EEdff47f25384cdc3"),
    (ProtocolKind::CompoundV3, 137, "0xF25212E676D1F7F89Cd72fFEe66158f541246445"),
    (ProtocolKind::CompoundV3, 42161, "0xA5EDBDD9646f8dFF606d7448e414884C7d905dCA"),
    (ProtocolKind::CompoundV3, 8453, "0xb125E6687d4313864e53df431d5425969c15Eb2F"),
    // Spark Pool
    (ProtocolKind::Spark, 1, "0xC13e21B648A5Ee794902342038FF3aDAB66BE987"),
    // Radiant V2 LendingPool
    (ProtocolKind::Radiant, 42161, "0xF4B1486DD74D07706052A33d31d7c0AAFD0659E1"),
    (ProtocolKind::Radiant, 43114, "0xF4B1486DD74D07706052A33d31d7c0AAFD0659E1"),
    (ProtocolKind::Radiant, 56, "0xd50Cf00b6e600Dd036Ba8eF475677d816d6c4281"),
];

/// Built-in chain descriptors.
pub fn default_chains() -> Vec<ChainDescriptor> {
    DEFAULT_CHAINS
        .iter()
        .map(|(chain_id, name, rpc_url)| ChainDescriptor::new(*chain_id, *name, *rpc_url))
        .collect()
}

/// Built-in deployment table.
pub fn default_deployments() -> ProtocolDeployments {
    let mut deployments = ProtocolDeployments::new();
    for (protocol, chain_id, address) in DEFAULT_DEPLOYMENTS {
        match parse_address(address) {
            Ok(address) => {
                deployments.insert(*protocol, *chain_id, address);
            }
            Err(e) => warn!(%protocol, chain_id, error = %e, "Skipping built-in deployment"),
        }
    }
    deployments
}
