//! Schema-registry governed (de)serialization

pub mod codec;
pub mod registry;
pub mod wire;

pub use codec::SchemaCodec;
pub use registry::{RegisteredSchema, RegistryClient, SchemaRegistry, SchemaType};
