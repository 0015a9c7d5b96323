// ============================================================================
// Pipeline Engine
// ============================================================================
//
// One lane, one record at a time:
//
//   InboundChannel.next
//     -> SchemaCodec.decode(inbound topic)   JSON string envelope
//     -> KeyedRecord::parse
//     -> Transform.apply
//     -> SchemaCodec.encode(outbound topic)
//     -> OutboundChannel.send(key = envelope key)
//
// Any failing step drops the record: it is logged with its coordinates and
// the loop moves on. Nothing is retried or dead-lettered.
//
// Cancellation moves the engine to Draining. The pull in progress returns
// immediately; an iteration already past the pull runs to completion. Then
// the inbound channel, the outbound channel and the registry connection are
// closed in that order, and the engine is Stopped.
//
// ============================================================================

use relay_config::PipelineConfig;
use relay_error::RelayError;
use std::time::Instant;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::channel::{RecordSink, RecordSource};
use super::state::{PipelineReport, PipelineState, PipelineStats, PipelineStatus};
use super::transform::Transform;
use crate::kafka::{Delivery, OutboundRecord, RawRecord};
use crate::message::KeyedRecord;
use crate::schema::{SchemaCodec, SchemaRegistry};

/// Owns every resource of the relay and drives the consume/produce loop
pub struct PipelineEngine<S, K, R, T>
where
    S: RecordSource,
    K: RecordSink,
    R: SchemaRegistry,
    T: Transform,
{
    source: S,
    sink: K,
    codec: SchemaCodec<R>,
    transform: T,
    inbound_topic: String,
    outbound_topic: String,
    config: PipelineConfig,
    stats: PipelineStats,
    status_tx: watch::Sender<PipelineStatus>,
}

impl<S, K, R, T> PipelineEngine<S, K, R, T>
where
    S: RecordSource,
    K: RecordSink,
    R: SchemaRegistry,
    T: Transform,
{
    pub fn new(
        source: S,
        sink: K,
        codec: SchemaCodec<R>,
        transform: T,
        config: PipelineConfig,
    ) -> Self {
        let (status_tx, _) = watch::channel(PipelineStatus::running());

        Self {
            inbound_topic: source.topic().to_string(),
            outbound_topic: sink.topic().to_string(),
            source,
            sink,
            codec,
            transform,
            config,
            stats: PipelineStats::default(),
            status_tx,
        }
    }

    /// Subscribe to state and counter updates
    ///
    /// Take the receiver before calling [`run`](Self::run), which consumes the engine.
    pub fn status(&self) -> watch::Receiver<PipelineStatus> {
        self.status_tx.subscribe()
    }

    /// Run until `token` is cancelled, then drain and close everything
    pub async fn run(mut self, token: CancellationToken) -> PipelineReport {
        let started = Instant::now();
        let mut last_status_log = Instant::now();

        info!(
            inbound_topic = %self.inbound_topic,
            outbound_topic = %self.outbound_topic,
            "Pipeline running"
        );

        loop {
            if token.is_cancelled() {
                break;
            }

            let raw = match self.source.next(&token).await {
                Ok(raw) => raw,
                Err(e) if e.is_cancelled() => break,
                Err(e) => {
                    self.stats.record_drop(&e);
                    e.log();
                    self.publish(PipelineState::Running);

                    // Broker down: do not spin, but stay responsive to shutdown
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = tokio::time::sleep(self.config.read_error_backoff) => {}
                    }
                    continue;
                }
            };

            self.stats.consumed += 1;

            match self.process(&raw).await {
                Ok(delivery) => {
                    self.stats.produced += 1;
                    debug!(
                        topic = %raw.topic,
                        partition = raw.partition,
                        offset = raw.offset,
                        key = %raw.key_lossy(),
                        out_partition = delivery.partition,
                        out_offset = delivery.offset,
                        "Record relayed"
                    );
                }
                Err(e) => {
                    self.stats.record_drop(&e);
                    log_dropped(&raw, &e);
                }
            }

            // Produced or dropped, this offset is done with
            if let Err(e) = self.source.acknowledge(&raw) {
                warn!(
                    error = %e,
                    topic = %raw.topic,
                    partition = raw.partition,
                    offset = raw.offset,
                    "Failed to store consumer offset"
                );
            }

            self.publish(PipelineState::Running);

            if last_status_log.elapsed() >= self.config.status_interval {
                self.log_status(PipelineState::Running);
                last_status_log = Instant::now();
            }
        }

        self.shutdown(started).await
    }

    async fn process(&mut self, raw: &RawRecord) -> Result<Delivery, RelayError> {
        let envelope: String = self.codec.decode(&self.inbound_topic, &raw.value).await?;
        let keyed = KeyedRecord::parse(&envelope)?;

        let transformed = self.transform.apply(keyed)?;
        let value = self
            .codec
            .encode(&self.outbound_topic, &transformed.record)
            .await?;

        self.sink
            .send(OutboundRecord {
                key: transformed.key.into_bytes(),
                value,
            })
            .await
    }

    /// Draining -> Stopped: close Inbound, Outbound, registry, in that order
    async fn shutdown(self, started: Instant) -> PipelineReport {
        self.publish(PipelineState::Draining);
        self.log_status(PipelineState::Draining);

        let PipelineEngine {
            source,
            sink,
            codec,
            stats,
            status_tx,
            ..
        } = self;

        source.close().await;
        sink.close().await;
        codec.close().await;

        status_tx.send_replace(PipelineStatus {
            state: PipelineState::Stopped,
            stats,
        });

        let report = PipelineReport {
            stats,
            uptime: started.elapsed(),
        };

        info!(
            consumed = stats.consumed,
            produced = stats.produced,
            dropped = stats.dropped(),
            read_failures = stats.read_failures,
            uptime_secs = report.uptime.as_secs(),
            "Pipeline stopped"
        );

        report
    }

    fn publish(&self, state: PipelineState) {
        self.status_tx.send_replace(PipelineStatus {
            state,
            stats: self.stats,
        });
    }

    fn log_status(&self, state: PipelineState) {
        info!(
            state = %state,
            consumed = self.stats.consumed,
            produced = self.stats.produced,
            dropped_decode = self.stats.dropped_decode,
            dropped_encode = self.stats.dropped_encode,
            dropped_write = self.stats.dropped_write,
            read_failures = self.stats.read_failures,
            "Pipeline status"
        );
    }
}

/// Log an abandoned record with enough context to find it on the topic
fn log_dropped(raw: &RawRecord, error: &RelayError) {
    match error {
        RelayError::Write(_) => error!(
            error = %error,
            error_kind = error.kind(),
            topic = %raw.topic,
            partition = raw.partition,
            offset = raw.offset,
            key = %raw.key_lossy(),
            "Record dropped"
        ),
        _ => warn!(
            error = %error,
            error_kind = error.kind(),
            topic = %raw.topic,
            partition = raw.partition,
            offset = raw.offset,
            key = %raw.key_lossy(),
            "Record dropped"
        ),
    }
}
