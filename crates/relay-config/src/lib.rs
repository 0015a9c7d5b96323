// ============================================================================
// Relay Config - Centralized configuration management
// ============================================================================
//
// Environment-style key/value configuration for the schema relay.
// A `.env` file in the working directory is honoured for local runs.
//
// ============================================================================

mod constants;
mod kafka;
mod logging;
mod pipeline;
mod registry;
mod tls;

pub use kafka::KafkaConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use pipeline::PipelineConfig;
pub use registry::{SchemaRegistryConfig, SubjectNameStrategy, normalize_registry_url};
pub use tls::TlsConfig;

use anyhow::Result;

/// Main configuration structure for the relay worker
#[derive(Clone, Debug)]
pub struct Config {
    pub kafka: KafkaConfig,
    pub registry: SchemaRegistryConfig,
    pub tls: TlsConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            kafka: KafkaConfig::from_env()?,
            registry: SchemaRegistryConfig::from_env()?,
            tls: TlsConfig::from_env(),
            pipeline: PipelineConfig::from_env(),
            logging: LoggingConfig::from_env()?,
        })
    }
}

/// Read a variable that has no sensible default
pub(crate) fn required_var(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => anyhow::bail!("{} must be set", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::time::Duration;

    const REQUIRED: [(&str, &str); 5] = [
        ("BOOTSTRAP_SERVERS", "kafka-bootstrap:9093"),
        ("TOPIC", "cars-in"),
        ("GROUP_ID", "relay-group"),
        ("SCHEMA_REGISTRY_URL", "schema-registry:8081"),
        ("OUT_TOPIC", "cars-out"),
    ];

    const OPTIONAL: [&str; 8] = [
        "TLS_CA_CERT_PATH",
        "SCHEMA_SUBJECT_STRATEGY",
        "SCHEMA_AUTO_REGISTER",
        "SHUTDOWN_GRACE_MS",
        "KAFKA_AUTO_OFFSET_RESET",
        "KAFKA_PRODUCE_TIMEOUT_MS",
        "LOG_FORMAT",
        "RUST_LOG",
    ];

    fn set_required() {
        for (key, value) in REQUIRED {
            unsafe { std::env::set_var(key, value) };
        }
        for key in OPTIONAL {
            unsafe { std::env::remove_var(key) };
        }
    }

    fn clear_all() {
        for (key, _) in REQUIRED {
            unsafe { std::env::remove_var(key) };
        }
        for key in OPTIONAL {
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        set_required();

        let config = Config::from_env().unwrap();

        assert_eq!(config.kafka.brokers, "kafka-bootstrap:9093");
        assert_eq!(config.kafka.inbound_topic, "cars-in");
        assert_eq!(config.kafka.outbound_topic, "cars-out");
        assert_eq!(config.kafka.consumer_group, "relay-group");
        assert_eq!(config.kafka.auto_offset_reset, "earliest");
        assert_eq!(config.kafka.produce_timeout_ms, 10000);
        assert_eq!(config.registry.url, "https://schema-registry:8081");
        assert_eq!(config.registry.subject_strategy, SubjectNameStrategy::Topic);
        assert!(config.registry.auto_register);
        assert!(config.registry.validate);
        assert_eq!(
            config.tls.ca_cert_path,
            std::path::PathBuf::from("/tmp/ca/ca.crt")
        );
        assert_eq!(config.pipeline.shutdown_grace, Duration::from_secs(5));
        assert_eq!(config.logging.format, LogFormat::Json);

        clear_all();
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        set_required();
        unsafe {
            std::env::set_var("TLS_CA_CERT_PATH", "/etc/relay/ca.pem");
            std::env::set_var("SCHEMA_SUBJECT_STRATEGY", "topic-value");
            std::env::set_var("SCHEMA_AUTO_REGISTER", "false");
            std::env::set_var("SHUTDOWN_GRACE_MS", "1000");
            std::env::set_var("LOG_FORMAT", "text");
        }

        let config = Config::from_env().unwrap();

        assert_eq!(
            config.tls.ca_cert_path,
            std::path::PathBuf::from("/etc/relay/ca.pem")
        );
        assert_eq!(
            config.registry.subject_strategy,
            SubjectNameStrategy::TopicValue
        );
        assert!(!config.registry.auto_register);
        assert_eq!(config.pipeline.shutdown_grace, Duration::from_secs(1));
        assert_eq!(config.logging.format, LogFormat::Text);

        clear_all();
    }

    #[test]
    #[serial]
    fn test_missing_required_var_fails() {
        set_required();
        unsafe { std::env::remove_var("OUT_TOPIC") };

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("OUT_TOPIC"));

        clear_all();
    }

    #[test]
    #[serial]
    fn test_invalid_offset_reset_fails() {
        set_required();
        unsafe { std::env::set_var("KAFKA_AUTO_OFFSET_RESET", "beginning") };

        assert!(Config::from_env().is_err());

        clear_all();
    }
}
