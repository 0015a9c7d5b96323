// Kafka module: inbound subscription and outbound publisher
//
// Both channels share one mutual-TLS client configuration and are driven by
// the pipeline engine through the `RecordSource` / `RecordSink` traits.

pub mod config;
pub mod consumer;
pub mod partitioner;
pub mod producer;
pub mod types;

// Re-export commonly used types
pub use consumer::InboundChannel;
pub use partitioner::KeyHashPartitioner;
pub use producer::OutboundChannel;
pub use types::{Delivery, OutboundRecord, RawRecord};
