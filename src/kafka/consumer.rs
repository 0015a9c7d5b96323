use async_trait::async_trait;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::{Message, Offset, TopicPartitionList};
use relay_config::KafkaConfig;
use relay_error::{ReadError, RelayError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::create_client_config;
use super::types::RawRecord;
use crate::pipeline::RecordSource;
use crate::tls::SecureChannelContext;

/// Kafka subscription feeding the pipeline
///
/// This consumer is configured for:
/// - Consumer group coordination (several relay instances share partitions)
/// - Periodic auto-commit of *stored* offsets
/// - Offsets stored only once an iteration has finished with the record,
///   so a record in flight during shutdown is never committed early
pub struct InboundChannel {
    consumer: StreamConsumer,
    topic: String,
}

impl InboundChannel {
    /// Create the consumer and subscribe to the inbound topic
    ///
    /// # Configuration
    /// - `enable.auto.commit=true`: offsets committed every `auto_commit_interval_ms`
    /// - `enable.auto.offset.store=false`: offsets stored by [`RecordSource::acknowledge`]
    /// - `auto.offset.reset`: from config (default earliest)
    pub fn new(config: &KafkaConfig, tls: &SecureChannelContext) -> Result<Self, RelayError> {
        info!("Initializing Kafka consumer...");
        let mut client_config = create_client_config(config, tls);

        let consumer: StreamConsumer = client_config
            .set("group.id", &config.consumer_group)
            // Offset management
            .set("enable.auto.commit", "true")
            .set(
                "auto.commit.interval.ms",
                config.auto_commit_interval_ms.to_string(),
            )
            .set("enable.auto.offset.store", "false")
            .set("auto.offset.reset", &config.auto_offset_reset)
            // Performance
            .set("fetch.wait.max.ms", "500")
            .set("max.partition.fetch.bytes", "1048576") // 1MB
            // Session management
            .set("session.timeout.ms", config.session_timeout_ms.to_string())
            .set("heartbeat.interval.ms", "3000")
            .create()
            .map_err(|e| RelayError::config(format!("failed to create Kafka consumer: {}", e)))?;

        consumer
            .subscribe(&[&config.inbound_topic])
            .map_err(|e| {
                RelayError::config(format!(
                    "failed to subscribe to topic '{}': {}",
                    config.inbound_topic, e
                ))
            })?;

        info!(
            "Kafka consumer initialized for topic '{}' in group '{}'",
            config.inbound_topic, config.consumer_group
        );

        Ok(Self {
            consumer,
            topic: config.inbound_topic.clone(),
        })
    }
}

#[async_trait]
impl RecordSource for InboundChannel {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn next(&mut self, token: &CancellationToken) -> Result<RawRecord, RelayError> {
        tokio::select! {
            biased;

            _ = token.cancelled() => Err(ReadError::Cancelled.into()),
            received = self.consumer.recv() => match received {
                Ok(message) => Ok(RawRecord {
                    topic: message.topic().to_string(),
                    partition: message.partition(),
                    offset: message.offset(),
                    key: message.key().map(<[u8]>::to_vec).unwrap_or_default(),
                    value: message.payload().map(<[u8]>::to_vec).unwrap_or_default(),
                }),
                Err(e) => Err(RelayError::transport(e.to_string())),
            },
        }
    }

    fn acknowledge(&mut self, record: &RawRecord) -> Result<(), RelayError> {
        // Committed offset is the next one to read
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(
            &record.topic,
            record.partition,
            Offset::Offset(record.offset + 1),
        )
        .map_err(|e| RelayError::transport(format!("invalid offset: {}", e)))?;

        self.consumer
            .store_offsets(&tpl)
            .map_err(|e| RelayError::transport(format!("failed to store offset: {}", e)))
    }

    async fn close(self) {
        let topic = self.topic.clone();
        let consumer = self.consumer;

        // Commit and group leave are blocking librdkafka calls
        let closed = tokio::task::spawn_blocking(move || {
            match consumer.commit_consumer_state(CommitMode::Sync) {
                Ok(()) => debug!("Committed stored offsets on close"),
                Err(KafkaError::ConsumerCommit(RDKafkaErrorCode::NoOffset)) => {
                    debug!("No stored offsets to commit on close")
                }
                Err(e) => warn!(error = %e, "Failed to commit offsets on close"),
            }
            consumer.unsubscribe();
            drop(consumer);
        })
        .await;

        if let Err(e) = closed {
            warn!(error = %e, "Kafka consumer close task failed");
        }
        info!(topic = %topic, "Inbound channel closed");
    }
}
