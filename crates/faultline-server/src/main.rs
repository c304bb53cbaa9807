//! Faultline — a synthetic instrumented HTTP service
//!
//! The service exists to exercise observability pipelines: it emits
//! Prometheus metrics, structured logs, and OTLP trace spans for simulated
//! work, and exposes runtime fault toggles to rehearse failure scenarios.
//!
//! Usage:
//! ```bash
//! # With config file
//! faultline-server --config config.yaml
//!
//! # Or with environment variables
//! FAULTLINE_PORT=8000 FAULTLINE_ERROR_RATE=0.1 faultline-server
//! ```
//!
//! Test with:
//! ```bash
//! curl http://localhost:8000/work
//! curl -X POST 'http://localhost:8000/faults/error?rate=0.5'
//! curl -X POST 'http://localhost:8000/faults/latency?ms=200'
//! curl -X POST http://localhost:8000/faults/reset
//! curl http://localhost:8000/metrics
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use faultline_core::{FaultController, ThreadRngSource};
use faultline_observability::{init_tracer_provider, Metrics, TracerConfig};
use faultline_server::{app_router, AppState, ServerConfig};
use faultline_sim::WorkSimulator;

/// Faultline Server - synthetic instrumented service with fault injection
#[derive(Parser)]
#[command(name = "faultline-server")]
#[command(about = "Synthetic instrumented HTTP service with runtime fault injection", long_about = None)]
struct Cli {
    /// Path to configuration file (YAML or TOML)
    #[arg(short, long, value_name = "FILE", env = "FAULTLINE_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration; env vars override the file
    let mut config = if let Some(config_path) = cli.config {
        ServerConfig::from_file(&config_path)?
    } else {
        ServerConfig::default()
    };
    config.merge_env();

    init_logging(&config)?;

    // Tracing export; the provider is kept for a flush at shutdown
    let tracer_provider = init_tracer_provider(TracerConfig {
        service_name: config.service_name.clone(),
        service_version: env!("CARGO_PKG_VERSION").to_string(),
        sampling_rate: config.tracing.sampling_rate,
        otlp_endpoint: config.tracing.otlp_endpoint.clone(),
    })?;
    opentelemetry::global::set_tracer_provider(tracer_provider.clone());

    info!(
        service_name = %config.service_name,
        host = %config.host,
        port = config.port,
        "Configuration loaded"
    );

    // Telemetry sink; healthy from startup onward
    let metrics = Arc::new(Metrics::new()?);
    metrics.set_health(true);

    // Fault parameters, seeded from config and mutated via /faults/*
    let faults = Arc::new(FaultController::with_initial(
        config.faults.error_rate,
        config.faults.extra_latency_ms,
    ));

    let simulator = Arc::new(WorkSimulator::new(
        faults.clone(),
        metrics.clone(),
        Arc::new(ThreadRngSource),
    ));

    let state = AppState {
        service_name: config.service_name.clone(),
        faults,
        simulator,
    };
    let app = app_router(state, metrics);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!("faultline listening on http://{}", addr);
    info!("  - Simulated work:     http://{}/work", addr);
    info!("  - Fault toggles:      http://{}/faults/{{error,latency,reset}}", addr);
    info!("  - Health check:       http://{}/health", addr);
    info!("  - Prometheus metrics: http://{}/metrics", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = tracer_provider.shutdown() {
        warn!("Failed to flush tracer provider: {}", e);
    }

    info!("Shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber: stdout always, plus an append-only
/// file layer when a log path is configured.
fn init_logging(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());

    if let Some(path) = &config.logging.path {
        if let Some(parent) = std::path::Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
            .init();
    } else {
        registry.init();
    }

    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
