// ============================================================================
// Pipeline Configuration
// ============================================================================

use crate::constants::*;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Time granted between the termination signal and forced exit
    pub shutdown_grace: Duration,
    /// How often the engine logs its counters
    pub status_interval: Duration,
    /// Pause after a transport read error before pulling again
    pub read_error_backoff: Duration,
}

impl PipelineConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            shutdown_grace: Duration::from_millis(
                std::env::var("SHUTDOWN_GRACE_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_SHUTDOWN_GRACE_MS),
            ),
            status_interval: Duration::from_secs(
                std::env::var("PIPELINE_STATUS_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_STATUS_INTERVAL_SECS),
            ),
            read_error_backoff: Duration::from_millis(
                std::env::var("PIPELINE_READ_ERROR_BACKOFF_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_READ_ERROR_BACKOFF_MS),
            ),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            shutdown_grace: Duration::from_millis(DEFAULT_SHUTDOWN_GRACE_MS),
            status_interval: Duration::from_secs(DEFAULT_STATUS_INTERVAL_SECS),
            read_error_backoff: Duration::from_millis(DEFAULT_READ_ERROR_BACKOFF_MS),
        }
    }
}
