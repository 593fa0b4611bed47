//! Prometheus metrics for the token devnet.
//!
//! All metrics are aggregated in the [`Metrics`] struct for easy tracking and management.

use devnet::Receipt;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

/// Aggregated metrics for executed transfers.
///
/// Metrics are registered with the global metrics registry on creation.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance and register all metric descriptions.
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        describe_counter!(
            "labtoken_transfers_total",
            "Total number of transfer transactions executed"
        );
        describe_counter!(
            "labtoken_transfers_success_total",
            "Total number of successful transfers"
        );
        describe_counter!(
            "labtoken_transfers_failure_total",
            "Total number of reverted transfers by revert reason"
        );
        describe_histogram!(
            "labtoken_transfer_gas_used",
            "Gas used by successful transfers"
        );
        describe_gauge!(
            "labtoken_holders",
            "Number of accounts holding a non-zero balance"
        );
    }

    /// Record an executed transfer from its receipt.
    pub fn record_transfer(&self, receipt: &Receipt) {
        counter!("labtoken_transfers_total").increment(1);

        if receipt.status {
            counter!("labtoken_transfers_success_total").increment(1);
            histogram!("labtoken_transfer_gas_used").record(receipt.gas_used as f64);
        } else {
            let reason = receipt
                .revert_reason()
                .unwrap_or_else(|| "unknown".to_string());
            counter!("labtoken_transfers_failure_total", "reason" => reason).increment(1);
        }
    }

    /// Set the current number of holders.
    pub fn set_holders(&self, holders: usize) {
        gauge!("labtoken_holders").set(holders as f64);
    }
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::config::DevnetConfig;
    use alloy_primitives::{Address, U256};
    use devnet::Devnet;
    use metrics_util::{
        debugging::{DebugValue, DebuggingRecorder},
        CompositeKey, MetricKind,
    };

    type Entry = (
        CompositeKey,
        Option<metrics::Unit>,
        Option<metrics::SharedString>,
        DebugValue,
    );

    fn counter(entries: &[Entry], name: &str, labels: &[&str]) -> Option<u64> {
        entries.iter().find_map(|(key, _, _, value)| {
            let key_labels: Vec<&str> = key.key().labels().map(|label| label.value()).collect();
            let matches = key.kind() == MetricKind::Counter
                && key.key().name() == name
                && key_labels == labels;
            match value {
                DebugValue::Counter(count) if matches => Some(*count),
                _ => None,
            }
        })
    }

    #[tokio::test]
    async fn test_record_transfer_counts_by_outcome() {
        let devnet = Devnet::start(DevnetConfig::default()).unwrap();
        let token = devnet.token(devnet.deployer());
        let alice = devnet.accounts()[1].address();

        let success = token.transfer(alice, U256::from(5)).await.unwrap();
        let success = success.wait().await.unwrap();
        let failed = token.transfer(Address::ZERO, U256::from(5)).await.unwrap();
        let failed = failed.wait().await.unwrap();

        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        metrics::with_local_recorder(&recorder, || {
            let metrics = Metrics::new();
            metrics.record_transfer(&success);
            metrics.record_transfer(&failed);
            metrics.record_transfer(&failed);
        });

        let entries = snapshotter.snapshot().into_vec();
        assert_eq!(counter(&entries, "labtoken_transfers_total", &[]), Some(3));
        assert_eq!(
            counter(&entries, "labtoken_transfers_success_total", &[]),
            Some(1)
        );
        assert_eq!(
            counter(&entries, "labtoken_transfers_failure_total", &["ZERO_ADDRESS"]),
            Some(2)
        );
        assert_eq!(
            counter(&entries, "labtoken_transfers_failure_total", &["AMOUNT_ZERO"]),
            None
        );
    }
}
