use relay_error::{ReadError, RelayError};
use std::fmt;
use std::time::Duration;

/// Lifecycle of the pipeline engine
///
/// Running -> Draining -> Stopped. There is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Running,
    Draining,
    Stopped,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Running => write!(f, "running"),
            PipelineState::Draining => write!(f, "draining"),
            PipelineState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Counters owned by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Records pulled from the inbound channel
    pub consumed: u64,
    /// Records acknowledged by the outbound broker
    pub produced: u64,
    pub dropped_decode: u64,
    pub dropped_encode: u64,
    pub dropped_write: u64,
    /// Transport failures while pulling (cancellation not included)
    pub read_failures: u64,
}

impl PipelineStats {
    pub fn dropped(&self) -> u64 {
        self.dropped_decode + self.dropped_encode + self.dropped_write
    }

    /// Count a record abandoned because of `error`
    pub(crate) fn record_drop(&mut self, error: &RelayError) {
        match error {
            RelayError::Decode(_) => self.dropped_decode += 1,
            RelayError::Encode(_) => self.dropped_encode += 1,
            RelayError::Write(_) => self.dropped_write += 1,
            RelayError::Read(ReadError::Transport(_)) => self.read_failures += 1,
            // Startup errors and cancellation never abandon a record
            RelayError::Config(_)
            | RelayError::RegistryUnavailable(_)
            | RelayError::Read(ReadError::Cancelled) => {}
        }
    }
}

/// Snapshot published on the engine's status channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStatus {
    pub state: PipelineState,
    pub stats: PipelineStats,
}

impl PipelineStatus {
    pub fn running() -> Self {
        Self {
            state: PipelineState::Running,
            stats: PipelineStats::default(),
        }
    }
}

/// Final summary returned once the engine is stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineReport {
    pub stats: PipelineStats,
    pub uptime: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_drop_by_kind() {
        let mut stats = PipelineStats::default();

        stats.record_drop(&RelayError::decode("bad frame"));
        stats.record_drop(&RelayError::decode("bad envelope"));
        stats.record_drop(&RelayError::encode("missing field"));
        stats.record_drop(&RelayError::write("broker down"));
        stats.record_drop(&RelayError::transport("broker down"));
        stats.record_drop(&ReadError::Cancelled.into());

        assert_eq!(stats.dropped_decode, 2);
        assert_eq!(stats.dropped_encode, 1);
        assert_eq!(stats.dropped_write, 1);
        assert_eq!(stats.read_failures, 1);
        assert_eq!(stats.dropped(), 4);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PipelineState::Draining.to_string(), "draining");
    }
}
