//! # Prometheus Metrics
//!
//! Request outcomes per route and upstream call latency, served as
//! Prometheus text at `GET /metrics`. Everything lives in a dedicated
//! [`prometheus::Registry`] prefixed `constructor_`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, HistogramOpts, HistogramTimer, HistogramVec, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Metric handles shared by all request handlers.
#[derive(Clone)]
pub struct ConstructorMetrics {
    registry: Registry,
    /// Requests served, labelled by route and outcome (`ok` or an error kind).
    pub requests_total: IntCounterVec,
    /// Latency of chain API calls, labelled by operation.
    pub upstream_latency_seconds: HistogramVec,
}

impl ConstructorMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("constructor".into()), None)?;

        let requests_total = IntCounterVec::new(
            Opts::new("requests_total", "Requests served, by route and outcome"),
            &["route", "outcome"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let upstream_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "upstream_latency_seconds",
                "Chain API call latency in seconds, by operation",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["operation"],
        )?;
        registry.register(Box::new(upstream_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            upstream_latency_seconds,
        })
    }

    /// Counts one request against `route`.
    pub fn record_request(&self, route: &str, outcome: &str) {
        self.requests_total
            .with_label_values(&[route, outcome])
            .inc();
    }

    /// Starts timing an upstream call. The sample is recorded on drop.
    pub fn upstream_timer(&self, operation: &str) -> HistogramTimer {
        self.upstream_latency_seconds
            .with_label_values(&[operation])
            .start_timer()
    }

    /// Encodes all registered metrics in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

pub type SharedMetrics = Arc<ConstructorMetrics>;

/// `GET /metrics`
pub async fn metrics_handler(State(metrics): State<SharedMetrics>) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_exposition() {
        let metrics = ConstructorMetrics::new().unwrap();
        metrics.record_request("/hash", "ok");
        metrics.record_request("/hash", "ok");
        metrics.record_request("/derive", "unsupported_curve");

        let text = metrics.encode().unwrap();
        assert!(text.contains("constructor_requests_total"));
        assert!(text.contains(r#"outcome="unsupported_curve""#));
        assert!(text.contains(r#"route="/hash""#));
    }

    #[test]
    fn upstream_timer_records_a_sample() {
        let metrics = ConstructorMetrics::new().unwrap();
        drop(metrics.upstream_timer("chain_vars"));
        assert_eq!(
            metrics
                .upstream_latency_seconds
                .with_label_values(&["chain_vars"])
                .get_sample_count(),
            1
        );
    }
}
