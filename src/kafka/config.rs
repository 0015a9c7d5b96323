use rdkafka::config::ClientConfig;
use relay_config::KafkaConfig;
use tracing::info;

use crate::tls::SecureChannelContext;

/// Creates a new `rdkafka::config::ClientConfig` shared by consumer and producer.
///
/// Every client of the relay talks to the cluster over mutual TLS; there is no
/// plaintext fallback.
///
/// # Arguments
/// * `config` - Kafka connection details.
/// * `tls` - Credential material loaded at startup.
pub fn create_client_config(config: &KafkaConfig, tls: &SecureChannelContext) -> ClientConfig {
    let mut client_config = ClientConfig::new();
    client_config
        .set("bootstrap.servers", &config.brokers)
        .set(
            "socket.connection.setup.timeout.ms",
            config.connect_timeout_ms.to_string(),
        );

    info!(brokers = %config.brokers, "Enabling mutual TLS for Kafka connection");
    tls.apply_to(&mut client_config);

    client_config
}
