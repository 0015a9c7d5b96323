// ============================================================================
// Kafka Configuration
// ============================================================================

use crate::constants::*;
use crate::required_var;

/// Kafka configuration for the inbound subscription and the outbound publisher
#[derive(Clone, Debug)]
pub struct KafkaConfig {
    /// Bootstrap address of the cluster (e.g., "kafka-bootstrap:9093")
    pub brokers: String,
    /// Topic consumed by the pipeline
    pub inbound_topic: String,
    /// Topic the re-encoded records are published to
    pub outbound_topic: String,
    /// Consumer group ID used for offset coordination
    pub consumer_group: String,
    /// "earliest" | "latest"
    pub auto_offset_reset: String,
    pub auto_commit_interval_ms: u64,
    pub session_timeout_ms: u64,
    /// Socket connection setup timeout
    pub connect_timeout_ms: u64,
    // producer-specific settings
    pub produce_timeout_ms: u64,
    pub flush_timeout_ms: u64,
    pub metadata_timeout_ms: u64,
    pub producer_acks: String, // "all" | "1" | "-1" | "0"
    pub message_max_bytes: u32,
}

impl KafkaConfig {
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        let auto_offset_reset = std::env::var("KAFKA_AUTO_OFFSET_RESET")
            .unwrap_or_else(|_| "earliest".to_string());
        if !matches!(auto_offset_reset.as_str(), "earliest" | "latest") {
            anyhow::bail!(
                "KAFKA_AUTO_OFFSET_RESET must be 'earliest' or 'latest', got '{}'",
                auto_offset_reset
            );
        }

        Ok(Self {
            brokers: required_var("BOOTSTRAP_SERVERS")?,
            inbound_topic: required_var("TOPIC")?,
            outbound_topic: required_var("OUT_TOPIC")?,
            consumer_group: required_var("GROUP_ID")?,
            auto_offset_reset,
            auto_commit_interval_ms: std::env::var("KAFKA_AUTO_COMMIT_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_AUTO_COMMIT_INTERVAL_MS),
            session_timeout_ms: std::env::var("KAFKA_SESSION_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SESSION_TIMEOUT_MS),
            connect_timeout_ms: std::env::var("KAFKA_CONNECT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS),
            produce_timeout_ms: std::env::var("KAFKA_PRODUCE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PRODUCE_TIMEOUT_MS),
            flush_timeout_ms: std::env::var("KAFKA_FLUSH_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_FLUSH_TIMEOUT_MS),
            metadata_timeout_ms: std::env::var("KAFKA_METADATA_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_METADATA_TIMEOUT_MS),
            producer_acks: std::env::var("KAFKA_PRODUCER_ACKS")
                .unwrap_or_else(|_| "all".to_string()),
            message_max_bytes: std::env::var("KAFKA_MESSAGE_MAX_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MESSAGE_MAX_BYTES),
        })
    }
}
