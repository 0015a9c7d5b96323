/// One record pulled from the inbound topic
///
/// Immutable and scoped to a single pipeline iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl RawRecord {
    /// Key rendered for log fields
    pub fn key_lossy(&self) -> String {
        String::from_utf8_lossy(&self.key).into_owned()
    }
}

/// Record handed to the outbound channel
///
/// `value` is the schema-framed payload; `key` drives partition selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRecord {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Broker acknowledgement of a published record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub partition: i32,
    pub offset: i64,
}
