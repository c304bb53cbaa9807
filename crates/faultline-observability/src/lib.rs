//! Faultline Observability
//!
//! This crate provides the telemetry surface of the service:
//! - Metrics collection (Prometheus)
//! - Trace spans with guaranteed close-on-exit (OpenTelemetry)
//! - Health and metrics-exposition endpoints

pub mod health;
pub mod metrics;
pub mod tracing;

pub use health::{health_router, HealthResponse, HealthState};
pub use metrics::Metrics;
pub use tracing::{init_tracer_provider, start_span, ScopedSpan, TracerConfig};
