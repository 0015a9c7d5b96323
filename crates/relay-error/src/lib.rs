// ============================================================================
// Relay Error - Error taxonomy for the schema relay
// ============================================================================
//
// Startup errors (Config, RegistryUnavailable) are fatal: the pipeline must
// never enter Running state after one of them.
// Per-record errors (Read, Decode, Encode, Write) are logged and the record
// is dropped; the pipeline moves on to the next iteration.
//
// ============================================================================

use thiserror::Error;

/// Why a pull from the inbound channel did not yield a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// The cancellation token fired while waiting for a record.
    /// This is the normal way out of the Running state, not a failure.
    #[error("read cancelled")]
    Cancelled,

    /// Broker unavailable, authentication failure, rebalance error, ...
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Error type shared by every component of the relay
#[derive(Error, Debug)]
pub enum RelayError {
    // ===== Startup Errors =====
    /// Missing or invalid credential material / configuration
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema registry unavailable: {0}")]
    RegistryUnavailable(String),

    // ===== Per-Record Errors =====
    #[error("Read error: {0}")]
    Read(#[from] ReadError),

    /// Corrupt wire frame, unknown schema, schema violation, bad inner JSON
    #[error("Decode error: {0}")]
    Decode(String),

    /// Record does not conform to the registered schema for the subject
    #[error("Encode error: {0}")]
    Encode(String),

    /// Publish failed (broker unavailable, auth failure, oversized payload)
    #[error("Write error: {0}")]
    Write(String),
}

impl RelayError {
    pub fn config(msg: impl Into<String>) -> Self {
        RelayError::Config(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        RelayError::Decode(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        RelayError::Encode(msg.into())
    }

    pub fn write(msg: impl Into<String>) -> Self {
        RelayError::Write(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        RelayError::Read(ReadError::Transport(msg.into()))
    }

    /// Whether this error must abort startup
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RelayError::Config(_) | RelayError::RegistryUnavailable(_)
        )
    }

    /// A cancelled pull means "no record, shut down" rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RelayError::Read(ReadError::Cancelled))
    }

    /// Stable label used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Config(_) => "CONFIG_ERROR",
            RelayError::RegistryUnavailable(_) => "REGISTRY_UNAVAILABLE",
            RelayError::Read(ReadError::Cancelled) => "READ_CANCELLED",
            RelayError::Read(ReadError::Transport(_)) => "READ_ERROR",
            RelayError::Decode(_) => "DECODE_ERROR",
            RelayError::Encode(_) => "ENCODE_ERROR",
            RelayError::Write(_) => "WRITE_ERROR",
        }
    }

    /// Log this error with a level matching its severity
    pub fn log(&self) {
        let kind = self.kind();

        match self {
            RelayError::Read(ReadError::Cancelled) => {
                tracing::debug!(error_kind = %kind, "Read cancelled");
            }
            RelayError::Decode(_) | RelayError::Encode(_) => {
                tracing::warn!(error = %self, error_kind = %kind, "Record rejected");
            }
            _ => {
                tracing::error!(error = %self, error_kind = %kind, "Relay error occurred");
            }
        }
    }
}
