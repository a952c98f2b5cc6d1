//! Chain configuration files.

use anyhow::Context;
use sentinel_chain::ChainDescriptor;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Chain configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain details
    pub chain: ChainDetails,
}

/// Chain details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainDetails {
    /// Chain ID
    pub chain_id: u64,
    /// Human-readable name
    pub name: String,
    /// RPC configuration
    pub rpc: RpcConfig,
}

/// RPC endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// HTTP RPC endpoint
    pub http: String,
}

impl ChainConfig {
    /// Load chain config from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: ChainConfig =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Expand environment variables in config values.
    pub fn expand_env_vars(&mut self) {
        self.chain.rpc.http = expand_env(&self.chain.rpc.http);
    }

    /// Convert into a registry descriptor.
    pub fn into_descriptor(self) -> ChainDescriptor {
        ChainDescriptor::new(self.chain.chain_id, self.chain.name, self.chain.rpc.http)
    }
}

/// Expand ${VAR_NAME} patterns with environment variable values.
///
/// Unset variables are left as written.
pub fn expand_env(s: &str) -> String {
    let Ok(re) = regex_lite::Regex::new(r"\$\{([^}]+)\}") else {
        return s.to_string();
    };
    let mut result = s.to_string();

    for cap in re.captures_iter(s) {
        if let (Some(full_match), Some(var_match)) = (cap.get(0), cap.get(1)) {
            if let Ok(value) = std::env::var(var_match.as_str()) {
                result = result.replace(full_match.as_str(), &value);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env() {
        // Use unique var name to avoid conflicts with parallel tests
        std::env::set_var("SENTINEL_CHAIN_TEST_VAR", "test_value");
        assert_eq!(expand_env("${SENTINEL_CHAIN_TEST_VAR}"), "test_value");
        assert_eq!(
            expand_env("https://rpc/${SENTINEL_CHAIN_TEST_VAR}/v1"),
            "https://rpc/test_value/v1"
        );
        assert_eq!(expand_env("no_vars"), "no_vars");
        assert_eq!(expand_env("${SENTINEL_UNSET_TEST_VAR}"), "${SENTINEL_UNSET_TEST_VAR}");
        std::env::remove_var("SENTINEL_CHAIN_TEST_VAR");
    }

    #[test]
    fn test_parse_chain_toml() {
        let mut config: ChainConfig = toml::from_str(
            r#"
            [chain]
            chain_id = 8453
            name = "Base"

            [chain.rpc]
            http = "https://mainnet.base.org"
            "#,
        )
        .unwrap();
        config.expand_env_vars();

        let descriptor = config.into_descriptor();
        assert_eq!(descriptor, ChainDescriptor::new(8453, "Base", "https://mainnet.base.org"));
    }

    #[test]
    fn test_unparsable_file_names_path() {
        let path = std::env::temp_dir().join(format!("sentinel-chain-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "[chain]\nchain_id = \"one\"\n").unwrap();
        let err = ChainConfig::from_file(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        let message = format!("{err:#}");
        assert!(message.starts_with("parsing "));
        assert!(message.contains(&*path.to_string_lossy()));
    }
}
