use relay_error::RelayError;

use crate::message::{DomainRecord, KeyedRecord};

/// Output of the transform stage: the outbound key and record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedRecord {
    pub key: String,
    pub record: DomainRecord,
}

/// Re-shapes an inbound envelope into the outbound record
///
/// Must be pure: no I/O, same input gives the same output.
pub trait Transform: Send + Sync {
    fn apply(&self, input: KeyedRecord) -> Result<TransformedRecord, RelayError>;
}

/// Relays the inbound payload unchanged under its envelope key
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl Transform for IdentityTransform {
    fn apply(&self, input: KeyedRecord) -> Result<TransformedRecord, RelayError> {
        Ok(TransformedRecord {
            key: input.key,
            record: input.message,
        })
    }
}
