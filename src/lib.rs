// ============================================================================
// Schema Relay
// ============================================================================
//
// Consumes schema-framed envelopes from one Kafka topic, decodes and validates
// them against the schema registry, re-shapes the payload, re-encodes it for
// the outbound subject and publishes it to a second topic. Every connection
// (both Kafka channels and the registry) uses mutual TLS.
//
// ============================================================================

pub mod kafka;
pub mod message;
pub mod pipeline;
pub mod schema;
pub mod service;
pub mod tls;

pub use service::{RelayEngine, bootstrap};
