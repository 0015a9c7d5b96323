// ============================================================================
// Channel Contracts
// ============================================================================
//
// The engine only talks to the bus through these two traits. The Kafka
// channels implement them in `crate::kafka`; tests use in-memory doubles.
//
// Each channel is owned by the engine and closed exactly once, consuming it.
//
// ============================================================================

use async_trait::async_trait;
use relay_error::RelayError;
use tokio_util::sync::CancellationToken;

use crate::kafka::{Delivery, OutboundRecord, RawRecord};

/// Pull-based subscription to the inbound topic
#[async_trait]
pub trait RecordSource: Send + Sized {
    /// Topic the subscription reads from
    fn topic(&self) -> &str;

    /// Wait for the next record
    ///
    /// Returns `ReadError::Cancelled` once `token` fires, even if no record arrived.
    async fn next(&mut self, token: &CancellationToken) -> Result<RawRecord, RelayError>;

    /// Mark `record` as handled so its offset may be committed
    fn acknowledge(&mut self, record: &RawRecord) -> Result<(), RelayError>;

    async fn close(self);
}

/// Synchronous publisher to the outbound topic
#[async_trait]
pub trait RecordSink: Send + Sized {
    fn topic(&self) -> &str;

    /// Publish one record and wait for the broker acknowledgement
    async fn send(&mut self, record: OutboundRecord) -> Result<Delivery, RelayError>;

    async fn close(self);
}
