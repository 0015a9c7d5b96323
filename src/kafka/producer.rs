use async_trait::async_trait;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use relay_config::KafkaConfig;
use relay_error::RelayError;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::config::create_client_config;
use super::partitioner::KeyHashPartitioner;
use super::types::{Delivery, OutboundRecord};
use crate::pipeline::RecordSink;
use crate::tls::SecureChannelContext;

/// Kafka publisher for re-encoded records
///
/// This producer is configured for:
/// - Synchronous sends: every send awaits the broker acknowledgement
/// - Key-hash partitioning (murmur2), so records sharing a key keep their order
/// - Bounded delivery time (`produce_timeout_ms`)
pub struct OutboundChannel {
    producer: FutureProducer,
    topic: String,
    partitioner: Option<KeyHashPartitioner>,
    produce_timeout: Duration,
    flush_timeout: Duration,
}

impl OutboundChannel {
    /// Create the producer and discover the partition count of the outbound topic
    ///
    /// # Configuration
    /// - `acks`: from config (default all)
    /// - `partitioner=murmur2_random`: same hash as [`KeyHashPartitioner`], used
    ///   when the partition count could not be discovered
    /// - `message.max.bytes`: larger payloads fail with a WriteError
    pub async fn new(config: &KafkaConfig, tls: &SecureChannelContext) -> Result<Self, RelayError> {
        info!("Initializing Kafka producer...");
        let mut client_config = create_client_config(config, tls);

        let producer: FutureProducer = client_config
            .set("acks", &config.producer_acks)
            .set("partitioner", "murmur2_random")
            .set("message.max.bytes", config.message_max_bytes.to_string())
            .set("message.timeout.ms", config.produce_timeout_ms.to_string())
            .set("linger.ms", "0") // One record in flight at a time
            .create()
            .map_err(|e| RelayError::config(format!("failed to create Kafka producer: {}", e)))?;

        let partitioner = discover_partitioner(
            &producer,
            &config.outbound_topic,
            Duration::from_millis(config.metadata_timeout_ms),
        )
        .await;

        info!(
            partitions = partitioner.map(|p| p.partition_count()),
            "Kafka producer initialized successfully for topic '{}'", config.outbound_topic
        );

        Ok(Self {
            producer,
            topic: config.outbound_topic.clone(),
            partitioner,
            produce_timeout: Duration::from_millis(config.produce_timeout_ms),
            flush_timeout: Duration::from_millis(config.flush_timeout_ms),
        })
    }
}

/// Look up the partition count of `topic`; `None` leaves partitioning to librdkafka
async fn discover_partitioner(
    producer: &FutureProducer,
    topic: &str,
    timeout: Duration,
) -> Option<KeyHashPartitioner> {
    let probe = producer.clone();
    let name = topic.to_string();

    let metadata = tokio::task::spawn_blocking(move || {
        probe
            .client()
            .fetch_metadata(Some(name.as_str()), Timeout::After(timeout))
    })
    .await;

    match metadata {
        Ok(Ok(metadata)) => metadata
            .topics()
            .iter()
            .find(|t| t.name() == topic && t.error().is_none())
            .and_then(|t| KeyHashPartitioner::new(t.partitions().len() as i32)),
        Ok(Err(e)) => {
            warn!(error = %e, topic = %topic, "Failed to fetch topic metadata, partitioning left to librdkafka");
            None
        }
        Err(e) => {
            warn!(error = %e, topic = %topic, "Metadata task failed, partitioning left to librdkafka");
            None
        }
    }
}

#[async_trait]
impl RecordSink for OutboundChannel {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn send(&mut self, record: OutboundRecord) -> Result<Delivery, RelayError> {
        let mut future_record = FutureRecord::to(&self.topic)
            .key(record.key.as_slice())
            .payload(record.value.as_slice());
        if let Some(partitioner) = &self.partitioner {
            future_record = future_record.partition(partitioner.partition_for(&record.key));
        }

        let start = Instant::now();
        match self
            .producer
            .send(future_record, Timeout::After(self.produce_timeout))
            .await
        {
            Ok((partition, offset)) => {
                debug!(
                    partition = partition,
                    offset = offset,
                    latency_ms = start.elapsed().as_millis(),
                    "Record acknowledged by broker"
                );
                Ok(Delivery { partition, offset })
            }
            Err((kafka_err, _)) => {
                error!(
                    error = %kafka_err,
                    topic = %self.topic,
                    latency_ms = start.elapsed().as_millis(),
                    "Failed to send record to Kafka"
                );
                Err(RelayError::write(format!(
                    "publish to '{}' failed: {}",
                    self.topic, kafka_err
                )))
            }
        }
    }

    /// Flush pending deliveries before the producer is dropped
    async fn close(self) {
        info!("Flushing Kafka producer (timeout: {:?})", self.flush_timeout);

        let producer = self.producer;
        let timeout = self.flush_timeout;
        let flushed =
            tokio::task::spawn_blocking(move || producer.flush(Timeout::After(timeout))).await;

        match flushed {
            Ok(Ok(())) => info!(topic = %self.topic, "Outbound channel closed"),
            Ok(Err(e)) => error!(error = %e, "Failed to flush Kafka producer on close"),
            Err(e) => error!(error = %e, "Kafka producer flush task failed"),
        }
    }
}
