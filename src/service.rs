// ============================================================================
// Service Bootstrap
// ============================================================================
//
// Acquisition order: TLS material -> registry connection -> inbound channel
// -> outbound channel. Every step is fatal on failure and the engine is only
// built once all of them succeeded, so the pipeline never enters Running
// without authenticated channels and a reachable registry.
//
// ============================================================================

use relay_config::Config;
use relay_error::RelayError;
use tracing::info;

use crate::kafka::{InboundChannel, OutboundChannel};
use crate::pipeline::{IdentityTransform, PipelineEngine, RecordSource};
use crate::schema::{RegistryClient, SchemaCodec};
use crate::tls::SecureChannelFactory;

/// The engine wired to Kafka and the HTTP registry
pub type RelayEngine =
    PipelineEngine<InboundChannel, OutboundChannel, RegistryClient, IdentityTransform>;

/// Acquire every resource and assemble the engine
///
/// # Errors
/// `RelayError::Config` for bad credential material or client settings,
/// `RelayError::RegistryUnavailable` if the registry cannot be reached.
pub async fn bootstrap(config: &Config) -> Result<RelayEngine, RelayError> {
    let tls = SecureChannelFactory::new(config.tls.clone()).build()?;

    let registry = RegistryClient::connect(&config.registry, &tls).await?;
    let codec = SchemaCodec::new(registry, &config.registry);

    let inbound = match InboundChannel::new(&config.kafka, &tls) {
        Ok(inbound) => inbound,
        Err(e) => {
            codec.close().await;
            return Err(e);
        }
    };

    let outbound = match OutboundChannel::new(&config.kafka, &tls).await {
        Ok(outbound) => outbound,
        Err(e) => {
            inbound.close().await;
            codec.close().await;
            return Err(e);
        }
    };

    info!(
        inbound_topic = %config.kafka.inbound_topic,
        outbound_topic = %config.kafka.outbound_topic,
        registry = %config.registry.url,
        "Relay resources acquired"
    );

    Ok(PipelineEngine::new(
        inbound,
        outbound,
        codec,
        IdentityTransform,
        config.pipeline.clone(),
    ))
}
