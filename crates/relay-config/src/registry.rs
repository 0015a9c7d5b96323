// ============================================================================
// Schema Registry Configuration
// ============================================================================

use crate::constants::*;
use crate::required_var;
use std::time::Duration;

/// How a topic name maps to a registry subject
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubjectNameStrategy {
    /// Subject name equals the topic name
    Topic,
    /// Confluent TopicNameStrategy for values: "{topic}-value"
    TopicValue,
}

impl SubjectNameStrategy {
    pub fn subject_for(&self, topic: &str) -> String {
        match self {
            SubjectNameStrategy::Topic => topic.to_string(),
            SubjectNameStrategy::TopicValue => format!("{}-value", topic),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SchemaRegistryConfig {
    /// Base URL, always carrying a scheme
    pub url: String,
    pub subject_strategy: SubjectNameStrategy,
    /// Register the outbound record schema when the subject has none
    pub auto_register: bool,
    /// Validate payloads against the resolved schema on every call
    pub validate: bool,
    pub request_timeout: Duration,
}

impl SchemaRegistryConfig {
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        let subject_strategy = match std::env::var("SCHEMA_SUBJECT_STRATEGY")
            .unwrap_or_else(|_| "topic".to_string())
            .as_str()
        {
            "topic" => SubjectNameStrategy::Topic,
            "topic-value" => SubjectNameStrategy::TopicValue,
            other => anyhow::bail!(
                "SCHEMA_SUBJECT_STRATEGY must be 'topic' or 'topic-value', got '{}'",
                other
            ),
        };

        Ok(Self {
            url: normalize_registry_url(&required_var("SCHEMA_REGISTRY_URL")?),
            subject_strategy,
            auto_register: std::env::var("SCHEMA_AUTO_REGISTER")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            validate: std::env::var("SCHEMA_VALIDATE")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            request_timeout: Duration::from_secs(
                std::env::var("SCHEMA_REGISTRY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_REGISTRY_TIMEOUT_SECS),
            ),
        })
    }
}

/// Registry addresses are usually given as bare `host:port`; the registry is
/// only reachable over TLS, so a missing scheme means https.
pub fn normalize_registry_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}
