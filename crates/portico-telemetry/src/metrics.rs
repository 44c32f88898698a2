//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes the counters relevant to the request pipeline.

use std::sync::Arc;

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::TelemetryError;

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    https_redirects_total: IntCounter,
    panics_recovered_total: IntCounter,
}

/// Snapshot of selected counters for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Plain-HTTP requests redirected to HTTPS since startup.
    pub https_redirects_total: u64,
    /// Request handler panics intercepted by the exception stage.
    pub panics_recovered_total: u64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any collector cannot be built or registered.
    pub fn new() -> Result<Self, TelemetryError> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests received"),
            &["route", "code"],
        )
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "http_requests_total",
            source,
        })?;
        let https_redirects_total = IntCounter::with_opts(Opts::new(
            "https_redirects_total",
            "Plain-HTTP requests redirected to HTTPS",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "https_redirects_total",
            source,
        })?;
        let panics_recovered_total = IntCounter::with_opts(Opts::new(
            "panics_recovered_total",
            "Request handler panics intercepted by the exception stage",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "panics_recovered_total",
            source,
        })?;

        registry
            .register(Box::new(http_requests_total.clone()))
            .map_err(|source| TelemetryError::MetricsRegister {
                name: "http_requests_total",
                source,
            })?;
        registry
            .register(Box::new(https_redirects_total.clone()))
            .map_err(|source| TelemetryError::MetricsRegister {
                name: "https_redirects_total",
                source,
            })?;
        registry
            .register(Box::new(panics_recovered_total.clone()))
            .map_err(|source| TelemetryError::MetricsRegister {
                name: "panics_recovered_total",
                source,
            })?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                https_redirects_total,
                panics_recovered_total,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    /// Increment the HTTPS redirect counter.
    pub fn inc_https_redirect(&self) {
        self.inner.https_redirects_total.inc();
    }

    /// Increment the counter tracking panics recovered by the exception stage.
    pub fn inc_panic_recovered(&self) {
        self.inner.panics_recovered_total.inc();
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String, TelemetryError> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }

    /// Take a point-in-time snapshot of the pipeline counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            https_redirects_total: self.inner.https_redirects_total.get(),
            panics_recovered_total: self.inner.panics_recovered_total.get(),
        }
    }
}
