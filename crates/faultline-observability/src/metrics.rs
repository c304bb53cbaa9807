//! Metrics collection with Prometheus
//!
//! This module provides the service's telemetry sink:
//! - Request counts by route and status
//! - Error counts by route and exception kind
//! - Request latency histogram by route
//! - A single health gauge (1=healthy, 0=not)
//!
//! All recording helpers are fire-and-forget: they never block and surface
//! no failure modes to callers. Counters and the histogram accumulate for
//! the process lifetime and are never reset.

use prometheus::{CounterVec, Gauge, HistogramOpts, HistogramVec, Opts, Registry};
use std::sync::Arc;

/// Metrics collector for Faultline
#[derive(Clone)]
pub struct Metrics {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Total requests by route and status
    pub requests_total: CounterVec,
    /// Simulated errors by route and exception kind
    pub errors_total: CounterVec,
    /// Request latency distribution by route
    pub request_seconds: HistogramVec,
    /// 1 if healthy else 0
    pub health: Gauge,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = CounterVec::new(
            Opts::new("faultline_requests_total", "Total requests"),
            &["route", "status"],
        )?;

        let errors_total = CounterVec::new(
            Opts::new("faultline_errors_total", "Simulated errors"),
            &["route", "exc"],
        )?;

        let request_seconds = HistogramVec::new(
            HistogramOpts::new("faultline_request_seconds", "Request latency in seconds")
                .buckets(vec![
                    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                ]),
            &["route"],
        )?;

        let health = Gauge::new("faultline_health", "1 if healthy else 0")?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;
        registry.register(Box::new(request_seconds.clone()))?;
        registry.register(Box::new(health.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            requests_total,
            errors_total,
            request_seconds,
            health,
        })
    }

    /// Get the Prometheus registry for exporting metrics
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Count one request for a route with its status label
    pub fn inc_requests(&self, route: &str, status: &str) {
        self.requests_total.with_label_values(&[route, status]).inc();
    }

    /// Count one simulated error for a route with its exception kind
    pub fn inc_errors(&self, route: &str, kind: &str) {
        self.errors_total.with_label_values(&[route, kind]).inc();
    }

    /// Record one latency observation for a route
    pub fn observe_latency(&self, route: &str, seconds: f64) {
        self.request_seconds
            .with_label_values(&[route])
            .observe(seconds);
    }

    /// Set the health gauge
    pub fn set_health(&self, healthy: bool) {
        self.health.set(if healthy { 1.0 } else { 0.0 });
    }
}
