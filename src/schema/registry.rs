// ============================================================================
// Schema Registry Client
// ============================================================================
//
// Minimal Confluent Schema Registry REST client:
// - GET  /subjects                              connectivity probe at startup
// - GET  /schemas/ids/{id}?subject={subject}    writer schema of a framed message
// - GET  /subjects/{subject}/versions/latest    schema used for encoding
// - POST /subjects/{subject}/versions           idempotent registration
//
// The client shares the mutual-TLS material of the Kafka channels.
//
// ============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use relay_config::SchemaRegistryConfig;
use relay_error::RelayError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::tls::SecureChannelContext;

const ACCEPT: &str = "application/vnd.schemaregistry.v1+json";

/// Schema format registered under a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    Json,
    Avro,
    Protobuf,
}

impl SchemaType {
    /// The registry omits `schemaType` for Avro schemas
    pub fn from_registry(value: Option<&str>) -> Result<Self> {
        match value {
            None | Some("AVRO") => Ok(SchemaType::Avro),
            Some("JSON") => Ok(SchemaType::Json),
            Some("PROTOBUF") => Ok(SchemaType::Protobuf),
            Some(other) => anyhow::bail!("unknown schema type '{}'", other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Json => "JSON",
            SchemaType::Avro => "AVRO",
            SchemaType::Protobuf => "PROTOBUF",
        }
    }
}

/// A schema as stored in the registry
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredSchema {
    pub id: u32,
    pub schema_type: SchemaType,
    /// Raw schema document
    pub schema: String,
}

/// Registry operations needed by the codec
///
/// `Ok(None)` means the registry answered but has no such schema/subject.
#[async_trait]
pub trait SchemaRegistry: Send + Sync {
    async fn schema_by_id(&self, subject: &str, id: u32) -> Result<Option<RegisteredSchema>>;

    async fn latest_schema(&self, subject: &str) -> Result<Option<RegisteredSchema>>;

    /// Register `schema` (JSON Schema) under `subject`, returning its id.
    /// Registering an already known schema returns the existing id.
    async fn register_schema(&self, subject: &str, schema: &Value) -> Result<u32>;

    /// Release the connection; called once on shutdown
    async fn close(&self) {}
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaByIdResponse {
    schema: String,
    schema_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubjectVersionResponse {
    id: u32,
    schema: String,
    schema_type: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest<'a> {
    schema_type: &'a str,
    schema: String,
}

#[derive(Deserialize)]
struct RegisterResponse {
    id: u32,
}

/// HTTP client for the schema registry
#[derive(Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build an mTLS client and verify the registry answers
    ///
    /// # Errors
    /// `RelayError::Config` for unusable TLS material,
    /// `RelayError::RegistryUnavailable` if the registry cannot be reached.
    pub async fn connect(
        config: &SchemaRegistryConfig,
        tls: &SecureChannelContext,
    ) -> Result<Self, RelayError> {
        let http = tls
            .http_client_builder()?
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RelayError::config(format!("failed to build registry client: {}", e)))?;

        let client = Self::new(config.url.clone(), http);
        client.probe().await?;

        info!(url = %client.base_url, "Connected to schema registry");
        Ok(client)
    }

    /// Check the registry is reachable and answering
    pub async fn probe(&self) -> Result<(), RelayError> {
        let url = format!("{}/subjects", self.base_url);

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .send()
            .await
            .map_err(|e| RelayError::RegistryUnavailable(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(RelayError::RegistryUnavailable(format!(
                "{} answered {}",
                url,
                response.status()
            )));
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Turn a non-success registry response into an error carrying its message
async fn registry_error(response: reqwest::Response, what: &str) -> anyhow::Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);

    anyhow::anyhow!("{} failed with {}: {}", what, status, message)
}

#[async_trait]
impl SchemaRegistry for RegistryClient {
    async fn schema_by_id(&self, subject: &str, id: u32) -> Result<Option<RegisteredSchema>> {
        let url = format!("{}/schemas/ids/{}", self.base_url, id);
        debug!(subject = %subject, schema_id = id, "Fetching schema by id");

        let response = self
            .http
            .get(&url)
            .query(&[("subject", subject)])
            .header(reqwest::header::ACCEPT, ACCEPT)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(registry_error(response, "schema lookup").await);
        }

        let body: SchemaByIdResponse = response
            .json()
            .await
            .context("Failed to parse schema lookup response")?;

        Ok(Some(RegisteredSchema {
            id,
            schema_type: SchemaType::from_registry(body.schema_type.as_deref())?,
            schema: body.schema,
        }))
    }

    async fn latest_schema(&self, subject: &str) -> Result<Option<RegisteredSchema>> {
        let url = format!("{}/subjects/{}/versions/latest", self.base_url, subject);
        debug!(subject = %subject, "Fetching latest schema version");

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(registry_error(response, "latest version lookup").await);
        }

        let body: SubjectVersionResponse = response
            .json()
            .await
            .context("Failed to parse subject version response")?;

        Ok(Some(RegisteredSchema {
            id: body.id,
            schema_type: SchemaType::from_registry(body.schema_type.as_deref())?,
            schema: body.schema,
        }))
    }

    async fn register_schema(&self, subject: &str, schema: &Value) -> Result<u32> {
        let url = format!("{}/subjects/{}/versions", self.base_url, subject);

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .json(&RegisterRequest {
                schema_type: SchemaType::Json.as_str(),
                schema: schema.to_string(),
            })
            .send()
            .await
            .with_context(|| format!("POST {} failed", url))?;

        if !response.status().is_success() {
            return Err(registry_error(response, "schema registration").await);
        }

        let body: RegisterResponse = response
            .json()
            .await
            .context("Failed to parse registration response")?;

        info!(subject = %subject, schema_id = body.id, "Schema registered");
        Ok(body.id)
    }

    async fn close(&self) {
        info!(url = %self.base_url, "Schema registry connection closed");
    }
}
