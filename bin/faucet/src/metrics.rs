//! Prometheus metrics for the faucet client.
//!
//! All metrics are aggregated in the [`Metrics`] struct for easy tracking and management.

use claim::{ChainError, ClaimFailure, ClaimStatus, ValidationError};
use metrics::{counter, describe_counter};

/// Aggregated metrics for the faucet client.
///
/// Metrics are registered with the global metrics registry on creation. Without an installed
/// recorder every call is a no-op.
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

    /// Register metric descriptions with the global registry.
    fn register_descriptions() {
        describe_counter!(
            "faucet_claims_submitted_total",
            "Total number of claim submissions, valid or not"
        );
        describe_counter!(
            "faucet_claims_superseded_total",
            "Total number of in-flight claims replaced by a newer submission"
        );
        describe_counter!(
            "faucet_claims_pending_total",
            "Total number of claims handed to the network"
        );
        describe_counter!(
            "faucet_claims_settled_total",
            "Total number of claims confirmed on chain"
        );
        describe_counter!(
            "faucet_claims_failed_total",
            "Total number of failed claims by reason"
        );
        describe_counter!(
            "faucet_copies_total",
            "Total clipboard copies by field and outcome"
        );
    }

    /// Record a claim submission.
    pub fn record_submission(&self, superseded: bool) {
        counter!("faucet_claims_submitted_total").increment(1);
        if superseded {
            counter!("faucet_claims_superseded_total").increment(1);
        }
    }

    /// Record an observed status transition.
    pub fn record_status(&self, status: &ClaimStatus) {
        match status {
            ClaimStatus::Pending(_) => counter!("faucet_claims_pending_total").increment(1),
            ClaimStatus::Settled(_) => counter!("faucet_claims_settled_total").increment(1),
            ClaimStatus::Failed(failure) => {
                counter!("faucet_claims_failed_total", "reason" => failure_reason(failure))
                    .increment(1)
            }
            ClaimStatus::Idle | ClaimStatus::Validating | ClaimStatus::Submitting => {}
        }
    }

    /// Record a clipboard copy attempt.
    pub fn record_copy(&self, field: &str, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        counter!("faucet_copies_total", "field" => field.to_string(), "outcome" => outcome)
            .increment(1);
    }
}

/// Low-cardinality label for a failure.
pub const fn failure_reason(failure: &ClaimFailure) -> &'static str {
    match failure {
        ClaimFailure::Invalid(ValidationError::WrongLength { .. }) => "wrong_length",
        ClaimFailure::Invalid(ValidationError::BadPrefix) => "bad_prefix",
        ClaimFailure::Invalid(ValidationError::BadHex { .. }) => "bad_hex",
        ClaimFailure::Chain(ChainError::Rejected(_)) => "rejected",
        ClaimFailure::Chain(ChainError::Reverted(_)) => "reverted",
        ClaimFailure::Chain(ChainError::Transport(_)) => "transport",
        ClaimFailure::Chain(ChainError::UnsupportedCall(_)) => "unsupported_call",
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
