//! Lending Liquidation Sentinel
//!
//! Reads a wallet's lending positions across EVM chains and protocols,
//! classifies their liquidation risk, and prints the report as JSON.
//! Features:
//! - Aave V3, Spark, Radiant (Pool family) and Compound V3 (Comet)
//! - Bounded concurrent reads with per-read timeouts
//! - Optional listing of reads that failed

use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sentinel_chain::{ConnectionRegistry, OnChainReader, ProtocolAdapter};
use sentinel_core::{AggregatorConfig, ConfigRegistry, PositionAggregator, ReportRequest, SentinelConfig};

/// Environment variable names.
mod env {
    pub const WALLET: &str = "WALLET";
    pub const CHAIN_IDS: &str = "CHAIN_IDS";
    pub const PROTOCOL_IDS: &str = "PROTOCOL_IDS";
    pub const ALERT_THRESHOLD: &str = "ALERT_THRESHOLD";
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    // Runtime settings: SENTINEL_PROFILE selects default, monitoring, fast, or a TOML file path
    let settings = SentinelConfig::from_env().context("loading runtime settings")?;
    settings.log_config();

    // Chains and deployments: built-in tables, SENTINEL_CONFIG_DIR, CHAIN_<id>_RPC_URL
    let (chains, deployments) = ConfigRegistry::from_env()?.into_parts();

    let registry = Arc::new(ConnectionRegistry::new(chains));
    let reader = Arc::new(OnChainReader::new(registry.clone()));
    let adapter = ProtocolAdapter::new(Arc::new(deployments), reader, settings.fetch.rpc_timeout());
    let aggregator = PositionAggregator::new(registry, adapter, AggregatorConfig::from(&settings));

    let request = load_request(&aggregator)?;
    info!(
        wallet = %request.wallet,
        chains = ?request.chain_ids,
        protocols = ?request.protocol_ids,
        "Building report"
    );

    let report = aggregator.report(&request).await;

    info!(
        positions = report.total_positions,
        at_risk = report.at_risk_count,
        "Report ready"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Log to stderr so stdout carries only the report.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sentinel_core=debug,sentinel_chain=debug"));

    let json = std::env::var(env::LOG_FORMAT).is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!json).then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

/// Build the request from the environment; chains and protocols default to everything supported.
fn load_request(aggregator: &PositionAggregator) -> Result<ReportRequest> {
    let wallet: Address = std::env::var(env::WALLET)
        .context("Missing env var: WALLET")?
        .trim()
        .parse()
        .context("Invalid address for WALLET")?;

    let chain_ids = match std::env::var(env::CHAIN_IDS) {
        Ok(list) => split_list(&list)
            .map(|id| id.parse::<u64>().with_context(|| format!("Invalid chain id '{id}'")))
            .collect::<Result<Vec<_>>>()?,
        Err(_) => aggregator.supported_chain_ids(),
    };

    let protocol_ids = match std::env::var(env::PROTOCOL_IDS) {
        Ok(list) => split_list(&list).map(str::to_string).collect(),
        Err(_) => aggregator
            .supported_protocol_ids()
            .into_iter()
            .map(str::to_string)
            .collect(),
    };

    let alert_threshold = std::env::var(env::ALERT_THRESHOLD)
        .ok()
        .map(|t| t.trim().parse::<f64>().with_context(|| format!("Invalid alert threshold '{t}'")))
        .transpose()?;

    Ok(ReportRequest {
        wallet,
        chain_ids,
        protocol_ids,
        alert_threshold,
    })
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}
