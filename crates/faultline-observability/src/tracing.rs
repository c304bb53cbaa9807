//! OpenTelemetry distributed tracing
//!
//! This module provides the span side of the telemetry surface:
//! - Tracer provider setup (resource attributes, sampling, OTLP export)
//! - [`ScopedSpan`], an RAII guard that ends its span on every exit path
//!
//! Export failures belong to the exporter's batch processor; nothing in this
//! module blocks on or surfaces them.

use opentelemetry::{
    global::{self, BoxedSpan},
    trace::{Span, Status, Tracer},
    KeyValue,
};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    trace::{RandomIdGenerator, Sampler, SdkTracerProvider},
    Resource,
};

/// Instrumentation scope name used for all spans emitted by this service.
const TRACER_NAME: &str = "faultline";

/// Tracer configuration
#[derive(Debug, Clone)]
pub struct TracerConfig {
    /// Service name
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Sampling rate (0.0-1.0)
    pub sampling_rate: f64,
    /// OTLP endpoint; spans stay unexported when unset
    pub otlp_endpoint: Option<String>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            service_name: "faultline".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            sampling_rate: 1.0,
            otlp_endpoint: None,
        }
    }
}

/// Initialize a tracer provider
///
/// Returns a provider with the configured resource and sampler. When an OTLP
/// endpoint is set, spans are shipped through a batch exporter; otherwise the
/// provider only records locally.
pub fn init_tracer_provider(
    config: TracerConfig,
) -> Result<SdkTracerProvider, opentelemetry_otlp::ExporterBuildError> {
    let resource = Resource::builder()
        .with_service_name(config.service_name)
        .with_attribute(KeyValue::new("service.version", config.service_version))
        .build();

    let sampler = if config.sampling_rate >= 1.0 {
        Sampler::AlwaysOn
    } else if config.sampling_rate <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(config.sampling_rate)
    };

    let mut builder = SdkTracerProvider::builder()
        .with_resource(resource)
        .with_id_generator(RandomIdGenerator::default())
        .with_sampler(sampler);

    if let Some(endpoint) = config.otlp_endpoint {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_http()
            .with_endpoint(endpoint)
            .build()?;
        builder = builder.with_batch_exporter(exporter);
    }

    Ok(builder.build())
}

/// A trace span that is guaranteed to end exactly once.
///
/// The span ends when the guard drops, so every exit path of the enclosing
/// operation closes it: normal return, early return, and cancellation of the
/// owning future mid-await.
pub struct ScopedSpan {
    span: BoxedSpan,
}

impl ScopedSpan {
    /// Mark the span as failed
    pub fn record_error(&mut self, message: &str) {
        self.span.set_status(Status::error(message.to_string()));
        self.span.set_attribute(KeyValue::new("error", true));
    }

    /// Mark the span as successful
    pub fn record_ok(&mut self) {
        self.span.set_status(Status::Ok);
    }

    /// Attach an attribute to the span
    pub fn set_attribute(&mut self, attribute: KeyValue) {
        self.span.set_attribute(attribute);
    }
}

impl Drop for ScopedSpan {
    fn drop(&mut self) {
        self.span.end();
    }
}

/// Start a scoped span on the globally installed tracer provider.
pub fn start_span(name: &'static str) -> ScopedSpan {
    let tracer = global::tracer(TRACER_NAME);
    ScopedSpan {
        span: tracer.start(name),
    }
}
