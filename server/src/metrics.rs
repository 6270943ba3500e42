//! # Prometheus Metrics
//!
//! Operational metrics for the transaction API, scraped at `/metrics` on
//! the metrics port.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so they
//! do not collide with any default global registry consumers.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};
use std::sync::Arc;

/// Holds all Prometheus metric handles for the server.
///
/// Clone-friendly (prometheus handles are `Arc`s internally) so it can be
/// shared across request handlers.
#[derive(Clone)]
pub struct ApiMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Transactions successfully created.
    pub transactions_created_total: IntCounter,
    /// Create requests rejected for bad input (validation or body parsing).
    pub validation_failures_total: IntCounter,
    /// Create requests the store refused.
    pub store_failures_total: IntCounter,
    /// Detail lookups served, found or not.
    pub lookups_total: IntCounter,
    /// Detail lookups for ids that don't exist.
    pub lookups_not_found_total: IntCounter,
    /// Transactions currently held by the store.
    pub stored_transactions: IntGauge,
    /// Handler latency in seconds.
    pub request_latency_seconds: Histogram,
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, prometheus::Error> {
    let counter = IntCounter::new(name, help)?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}

impl ApiMetrics {
    /// Creates and registers all metrics. Call once at startup.
    ///
    /// # Errors
    ///
    /// Fails only if a metric name is invalid or registered twice.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("tally".into()), None)?;

        let transactions_created_total = counter(
            &registry,
            "transactions_created_total",
            "Total number of transactions created",
        )?;
        let validation_failures_total = counter(
            &registry,
            "validation_failures_total",
            "Total number of create requests rejected for invalid input",
        )?;
        let store_failures_total = counter(
            &registry,
            "store_failures_total",
            "Total number of create requests the store could not accept",
        )?;
        let lookups_total = counter(
            &registry,
            "lookups_total",
            "Total number of transaction detail lookups",
        )?;
        let lookups_not_found_total = counter(
            &registry,
            "lookups_not_found_total",
            "Total number of lookups for unknown transaction ids",
        )?;

        let stored_transactions = IntGauge::new(
            "stored_transactions",
            "Number of transactions currently held in memory",
        )?;
        registry.register(Box::new(stored_transactions.clone()))?;

        let request_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "request_latency_seconds",
                "Transaction API handler latency in seconds",
            )
            .buckets(vec![
                0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
            ]),
        )?;
        registry.register(Box::new(request_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            transactions_created_total,
            validation_failures_total,
            store_failures_total,
            lookups_total,
            lookups_not_found_total,
            stored_transactions,
            request_latency_seconds,
        })
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<ApiMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
///
/// Returns HTTP 500 if encoding fails (should never happen in practice).
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
