// ============================================================================
// Relay Worker - inbound topic -> schema registry -> outbound topic
// ============================================================================
//
// Startup:
// 1. Load configuration (environment, `.env` honoured)
// 2. Initialize tracing (JSON lines by default, LOG_FORMAT=text locally)
// 3. Load mutual TLS material, connect the registry, open both channels
//    Any failure here exits non-zero before a single record is read
// 4. Run the pipeline until SIGTERM/SIGINT
//
// Shutdown:
// - Stop pulling, let the in-flight record finish
// - Close inbound (commit stored offsets), outbound (flush), registry
// - If that takes longer than SHUTDOWN_GRACE_MS, exit anyway
//
// ============================================================================

use anyhow::{Context, Result};
use relay_config::{Config, LogFormat, LoggingConfig};
use schema_relay::pipeline::{
    PipelineState, ShutdownOutcome, run_until_signal, termination_signal,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize tracing
    init_tracing(&config.logging);

    info!("=== Relay Worker Starting ===");
    info!("Kafka Brokers: {}", config.kafka.brokers);
    info!("Inbound Topic: {}", config.kafka.inbound_topic);
    info!("Outbound Topic: {}", config.kafka.outbound_topic);
    info!("Consumer Group: {}", config.kafka.consumer_group);
    info!("Schema Registry: {}", config.registry.url);

    let engine = match schema_relay::bootstrap(&config).await {
        Ok(engine) => engine,
        Err(e) => {
            error!(error = %e, error_kind = e.kind(), "Relay startup failed");
            return Err(e).context("Failed to start relay");
        }
    };

    // Report lifecycle transitions
    let mut status = engine.status();
    tokio::spawn(async move {
        let mut last = PipelineState::Running;
        while status.changed().await.is_ok() {
            let state = status.borrow_and_update().state;
            if state != last {
                info!(from = %last, to = %state, "Pipeline state changed");
                last = state;
            }
        }
    });

    match run_until_signal(engine, termination_signal(), config.pipeline.shutdown_grace).await {
        ShutdownOutcome::Drained(report) => {
            info!(
                consumed = report.stats.consumed,
                produced = report.stats.produced,
                dropped = report.stats.dropped(),
                "=== Relay Worker Stopped ==="
            );
            Ok(())
        }
        ShutdownOutcome::GraceExpired => {
            warn!("=== Relay Worker Stopped (grace period expired) ===");
            // Blocking close tasks (commit, flush) would hold the runtime open
            std::process::exit(0)
        }
        ShutdownOutcome::Failed(reason) => Err(anyhow::anyhow!("pipeline failed: {}", reason)),
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::new(logging.rust_log.clone());

    match logging.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}
