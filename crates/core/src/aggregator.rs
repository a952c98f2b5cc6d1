//! Position aggregation across chains and protocols.
//!
//! Expands a request into (chain, protocol) pairs, fetches them with bounded
//! concurrency through the protocol adapter, and keeps the results in request
//! order: chains outer, protocols inner.

use alloy::primitives::Address;
use futures::stream::{self, StreamExt};
use sentinel_chain::{ConnectionRegistry, FetchOutcome, ProtocolAdapter, ProtocolKind};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::SentinelConfig;
use crate::position::PositionRecord;
use crate::report::{Report, UnavailablePair};

/// Aggregator configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorConfig {
    /// Alert threshold when the request has none
    pub default_threshold: f64,
    /// Maximum pairs fetched concurrently
    pub max_concurrent_pairs: usize,
    /// List failed pairs in the report instead of dropping them
    pub report_unavailable: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self::from(&SentinelConfig::default())
    }
}

impl From<&SentinelConfig> for AggregatorConfig {
    fn from(cfg: &SentinelConfig) -> Self {
        Self {
            default_threshold: cfg.alert.default_threshold,
            max_concurrent_pairs: cfg.fetch.concurrency(),
            report_unavailable: cfg.report.report_unavailable,
        }
    }
}

/// One monitoring request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub wallet: Address,
    pub chain_ids: Vec<u64>,
    pub protocol_ids: Vec<String>,
    pub alert_threshold: Option<f64>,
}

/// Positions plus the pairs that could not be read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub positions: Vec<PositionRecord>,
    /// Empty unless `report_unavailable` is enabled
    pub unavailable: Vec<UnavailablePair>,
}

/// Fans a wallet out over chains and protocols.
#[derive(Debug, Clone)]
pub struct PositionAggregator {
    /// Chain connections (also the supported chain set)
    registry: Arc<ConnectionRegistry>,
    /// Generic protocol adapter driver
    adapter: ProtocolAdapter,
    /// Configuration
    config: AggregatorConfig,
}

impl PositionAggregator {
    /// Create a new aggregator.
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        adapter: ProtocolAdapter,
        config: AggregatorConfig,
    ) -> Self {
        info!(
            chains = registry.chain_ids().count(),
            deployments = adapter.deployments().len(),
            max_concurrent_pairs = config.max_concurrent_pairs,
            report_unavailable = config.report_unavailable,
            "Position aggregator initialized"
        );
        Self {
            registry,
            adapter,
            config,
        }
    }

    /// Chain IDs with a descriptor, ascending.
    pub fn supported_chain_ids(&self) -> Vec<u64> {
        self.registry.chain_ids().collect()
    }

    /// Protocol identifiers with at least one deployment.
    pub fn supported_protocol_ids(&self) -> Vec<&'static str> {
        self.adapter
            .deployments()
            .protocols()
            .into_iter()
            .map(|kind| kind.id())
            .collect()
    }

    /// Classified positions of `wallet`, in request order.
    ///
    /// Unsupported chains are logged and skipped, unknown protocol ids are
    /// skipped, and no per-pair failure is returned.
    pub async fn aggregate<S: AsRef<str>>(
        &self,
        wallet: Address,
        chain_ids: &[u64],
        protocol_ids: &[S],
        alert_threshold: f64,
    ) -> Vec<PositionRecord> {
        self.collect(wallet, chain_ids, protocol_ids, alert_threshold)
            .await
            .positions
    }

    /// Like [`aggregate`](Self::aggregate), also returning failed pairs when
    /// `report_unavailable` is enabled.
    #[instrument(skip(self, wallet, chain_ids, protocol_ids), fields(wallet = %wallet))]
    pub async fn collect<S: AsRef<str>>(
        &self,
        wallet: Address,
        chain_ids: &[u64],
        protocol_ids: &[S],
        alert_threshold: f64,
    ) -> Aggregation {
        let pairs = self.expand_pairs(chain_ids, protocol_ids);
        debug!(pairs = pairs.len(), "Fetching positions");

        // `buffered` yields in input order whatever the completion order
        let outcomes: Vec<_> = stream::iter(pairs)
            .map(|(chain_id, protocol)| async move {
                let outcome = self.adapter.fetch_position(protocol, wallet, chain_id).await;
                (chain_id, protocol, outcome)
            })
            .buffered(self.config.max_concurrent_pairs.max(1))
            .collect()
            .await;

        let mut aggregation = Aggregation::default();
        for (chain_id, protocol, outcome) in outcomes {
            match outcome {
                FetchOutcome::Found(snapshot) => {
                    let chain_name = self
                        .registry
                        .descriptor(chain_id)
                        .map(|d| d.name.clone())
                        .unwrap_or_else(|| format!("Chain {chain_id}"));
                    aggregation.positions.push(PositionRecord::from_snapshot(
                        protocol,
                        chain_id,
                        chain_name,
                        &snapshot,
                        alert_threshold,
                    ));
                }
                FetchOutcome::Absent => {}
                FetchOutcome::Failed(failure) => {
                    if self.config.report_unavailable {
                        aggregation.unavailable.push(UnavailablePair {
                            chain_id,
                            protocol_id: protocol.id().to_string(),
                            reason: failure.to_string(),
                        });
                    }
                }
            }
        }

        info!(
            positions = aggregation.positions.len(),
            unavailable = aggregation.unavailable.len(),
            "Aggregation complete"
        );
        aggregation
    }

    /// Run a request end to end and assemble its report.
    pub async fn report(&self, request: &ReportRequest) -> Report {
        let alert_threshold = request
            .alert_threshold
            .unwrap_or(self.config.default_threshold);

        let aggregation = self
            .collect(
                request.wallet,
                &request.chain_ids,
                &request.protocol_ids,
                alert_threshold,
            )
            .await;

        Report::assemble(
            request.wallet,
            aggregation.positions,
            aggregation.unavailable,
            alert_threshold,
        )
    }

    /// (chain, protocol) pairs in request order.
    fn expand_pairs<S: AsRef<str>>(
        &self,
        chain_ids: &[u64],
        protocol_ids: &[S],
    ) -> Vec<(u64, ProtocolKind)> {
        let protocols: Vec<ProtocolKind> = protocol_ids
            .iter()
            .filter_map(|id| {
                let kind = ProtocolKind::from_id(id.as_ref());
                if kind.is_none() {
                    debug!(protocol_id = id.as_ref(), "Skipping unknown protocol");
                }
                kind
            })
            .collect();

        let mut pairs = Vec::with_capacity(chain_ids.len() * protocols.len());
        for &chain_id in chain_ids {
            if !self.registry.supports(chain_id) {
                warn!(chain_id, "Skipping unsupported chain");
                continue;
            }
            pairs.extend(protocols.iter().map(|&protocol| (chain_id, protocol)));
        }
        pairs
    }
}
