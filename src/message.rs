use relay_error::RelayError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Types that carry their own JSON Schema for registry registration
pub trait RecordSchema {
    fn json_schema() -> Value;
}

/// Business payload relayed from the inbound to the outbound topic
///
/// Field names on the wire are `user`, `car`, `color`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    pub user: String,
    #[serde(rename = "car")]
    pub vehicle: String,
    pub color: String,
}

impl RecordSchema for DomainRecord {
    fn json_schema() -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": "DomainRecord",
            "type": "object",
            "properties": {
                "user": { "type": "string" },
                "car": { "type": "string" },
                "color": { "type": "string" }
            },
            "required": ["user", "car", "color"],
            "additionalProperties": false
        })
    }
}

/// Inner envelope carried as a JSON string inside the inbound payload
///
/// `{"key": "...", "message": {"user": "...", "car": "...", "color": "..."}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyedRecord {
    /// Partition key for the outbound record. May be empty; downstream
    /// partitioning then degrades but the record is still relayed.
    pub key: String,
    pub message: DomainRecord,
}

impl KeyedRecord {
    /// Parse the decoded inbound envelope string
    ///
    /// Missing or mistyped fields are a DecodeError, never a zero-valued record.
    pub fn parse(envelope: &str) -> Result<Self, RelayError> {
        serde_json::from_str(envelope)
            .map_err(|e| RelayError::decode(format!("invalid keyed envelope: {}", e)))
    }
}
