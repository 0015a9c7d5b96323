// ============================================================================
// Process Lifecycle
// ============================================================================
//
// The engine runs on its own task while the caller waits for a termination
// signal. On signal the engine is cancelled and given a bounded grace period
// to drain; past it the engine task is aborted and the caller exits anyway.
//
// ============================================================================

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::channel::{RecordSink, RecordSource};
use super::engine::PipelineEngine;
use super::state::PipelineReport;
use super::transform::Transform;
use crate::schema::SchemaRegistry;

/// How the engine ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Engine reached Stopped with every channel closed
    Drained(PipelineReport),
    /// Grace period elapsed before the engine stopped; the task was aborted
    GraceExpired,
    /// Engine task panicked
    Failed(String),
}

/// Run `engine` until `signal` resolves, then drain within `grace`
pub async fn run_until_signal<S, K, R, T, F>(
    engine: PipelineEngine<S, K, R, T>,
    signal: F,
    grace: Duration,
) -> ShutdownOutcome
where
    S: RecordSource + 'static,
    K: RecordSink + 'static,
    R: SchemaRegistry + 'static,
    T: Transform + 'static,
    F: Future<Output = ()>,
{
    let token = CancellationToken::new();
    let mut handle = tokio::spawn(engine.run(token.clone()));

    tokio::select! {
        _ = signal => {
            info!(grace_ms = grace.as_millis(), "Termination requested, draining pipeline");
        }
        joined = &mut handle => {
            // The engine only returns after cancellation, so this is a panic
            return match joined {
                Ok(report) => ShutdownOutcome::Drained(report),
                Err(e) => {
                    error!(error = %e, "Pipeline task ended unexpectedly");
                    ShutdownOutcome::Failed(e.to_string())
                }
            };
        }
    }

    token.cancel();

    match tokio::time::timeout(grace, &mut handle).await {
        Ok(Ok(report)) => ShutdownOutcome::Drained(report),
        Ok(Err(e)) => {
            error!(error = %e, "Pipeline task failed while draining");
            ShutdownOutcome::Failed(e.to_string())
        }
        Err(_) => {
            warn!(
                grace_ms = grace.as_millis(),
                "Grace period expired before the pipeline stopped, forcing exit"
            );
            handle.abort();
            ShutdownOutcome::GraceExpired
        }
    }
}

/// Resolve on SIGTERM or Ctrl-C
pub async fn termination_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        info!("SIGTERM received, initiating graceful shutdown...");
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("SIGINT received, initiating graceful shutdown...");
                    }
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler, listening for Ctrl-C only"),
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl-C received, initiating graceful shutdown..."),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl-C, shutting down"),
    }
}
