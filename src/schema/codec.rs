// ============================================================================
// Schema Codec
// ============================================================================
//
// decode: frame -> schema id -> writer schema (cached per subject) -> validate -> T
// encode: T -> subject schema id (registered or latest, cached) -> validate -> frame
//
// Subjects are derived from topic names with the configured strategy.
// Only JSON Schema subjects are supported.
//
// ============================================================================

use jsonschema::Validator;
use relay_config::{SchemaRegistryConfig, SubjectNameStrategy};
use relay_error::RelayError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::registry::{RegisteredSchema, SchemaRegistry, SchemaType};
use super::wire;
use crate::message::RecordSchema;

/// How many violations are reported in a single error message
const MAX_REPORTED_VIOLATIONS: usize = 5;

/// Schema-governed (de)serializer bound to one registry connection
pub struct SchemaCodec<R: SchemaRegistry> {
    registry: R,
    strategy: SubjectNameStrategy,
    auto_register: bool,
    validate: bool,
    /// Reader schemas by (subject, id); an id resolved for one subject says
    /// nothing about another
    readers: HashMap<(String, u32), Arc<Validator>>,
    /// Writer schema id and compiled schema, by subject
    writers: HashMap<String, (u32, Arc<Validator>)>,
}

impl<R: SchemaRegistry> SchemaCodec<R> {
    pub fn new(registry: R, config: &SchemaRegistryConfig) -> Self {
        Self {
            registry,
            strategy: config.subject_strategy,
            auto_register: config.auto_register,
            validate: config.validate,
            readers: HashMap::new(),
            writers: HashMap::new(),
        }
    }

    pub fn subject_for(&self, topic: &str) -> String {
        self.strategy.subject_for(topic)
    }

    /// Decode a framed message read from `topic`
    ///
    /// # Errors
    /// `RelayError::Decode` for a corrupt frame, an unknown or non-JSON schema,
    /// a schema violation or a body that does not fit `T`.
    pub async fn decode<T: DeserializeOwned>(
        &mut self,
        topic: &str,
        bytes: &[u8],
    ) -> Result<T, RelayError> {
        let (schema_id, body) = wire::unframe(bytes)?;
        let subject = self.subject_for(topic);

        let validator = self.validator_for_id(&subject, schema_id).await?;

        let instance: Value = serde_json::from_slice(body)
            .map_err(|e| RelayError::decode(format!("payload is not valid JSON: {}", e)))?;

        if self.validate {
            check(&validator, &instance).map_err(|violations| {
                RelayError::decode(format!(
                    "payload violates schema {} of subject '{}': {}",
                    schema_id, subject, violations
                ))
            })?;
        }

        serde_json::from_value(instance).map_err(|e| {
            RelayError::decode(format!(
                "payload does not match the expected record: {}",
                e
            ))
        })
    }

    /// Encode `record` for publishing to `topic`
    ///
    /// # Errors
    /// `RelayError::Encode` when no usable schema exists for the subject or the
    /// record does not conform to it.
    pub async fn encode<T: Serialize + RecordSchema>(
        &mut self,
        topic: &str,
        record: &T,
    ) -> Result<Vec<u8>, RelayError> {
        let subject = self.subject_for(topic);
        let (schema_id, validator) = self.writer_schema::<T>(&subject).await?;

        let instance = serde_json::to_value(record)
            .map_err(|e| RelayError::encode(format!("failed to serialize record: {}", e)))?;

        if self.validate {
            check(&validator, &instance).map_err(|violations| {
                RelayError::encode(format!(
                    "record violates schema {} of subject '{}': {}",
                    schema_id, subject, violations
                ))
            })?;
        }

        let body = serde_json::to_vec(&instance)
            .map_err(|e| RelayError::encode(format!("failed to serialize record: {}", e)))?;

        Ok(wire::frame(schema_id, &body))
    }

    /// Release the registry connection
    pub async fn close(self) {
        self.registry.close().await;
    }

    async fn validator_for_id(
        &mut self,
        subject: &str,
        schema_id: u32,
    ) -> Result<Arc<Validator>, RelayError> {
        let cache_key = (subject.to_string(), schema_id);
        if let Some(validator) = self.readers.get(&cache_key) {
            return Ok(Arc::clone(validator));
        }

        let registered = self
            .registry
            .schema_by_id(subject, schema_id)
            .await
            .map_err(|e| RelayError::decode(format!("schema lookup failed: {:#}", e)))?
            .ok_or_else(|| {
                RelayError::decode(format!(
                    "unknown schema id {} for subject '{}'",
                    schema_id, subject
                ))
            })?;

        let validator = compile(&registered).map_err(RelayError::decode)?;
        debug!(subject = %subject, schema_id = schema_id, "Cached reader schema");

        self.readers.insert(cache_key, Arc::clone(&validator));
        Ok(validator)
    }

    async fn writer_schema<T: RecordSchema>(
        &mut self,
        subject: &str,
    ) -> Result<(u32, Arc<Validator>), RelayError> {
        if let Some((schema_id, validator)) = self.writers.get(subject) {
            return Ok((*schema_id, Arc::clone(validator)));
        }

        let registered = if self.auto_register {
            let schema = T::json_schema();
            let schema_id = self
                .registry
                .register_schema(subject, &schema)
                .await
                .map_err(|e| RelayError::encode(format!("schema registration failed: {:#}", e)))?;

            RegisteredSchema {
                id: schema_id,
                schema_type: SchemaType::Json,
                schema: schema.to_string(),
            }
        } else {
            self.registry
                .latest_schema(subject)
                .await
                .map_err(|e| RelayError::encode(format!("schema lookup failed: {:#}", e)))?
                .ok_or_else(|| {
                    RelayError::encode(format!("no schema registered for subject '{}'", subject))
                })?
        };

        let validator = compile(&registered).map_err(RelayError::encode)?;
        info!(
            subject = %subject,
            schema_id = registered.id,
            auto_register = self.auto_register,
            "Resolved writer schema"
        );

        self.writers
            .insert(subject.to_string(), (registered.id, Arc::clone(&validator)));
        Ok((registered.id, validator))
    }
}

/// Compile a registered JSON Schema
fn compile(registered: &RegisteredSchema) -> Result<Arc<Validator>, String> {
    if registered.schema_type != SchemaType::Json {
        return Err(format!(
            "schema {} has unsupported type {}",
            registered.id,
            registered.schema_type.as_str()
        ));
    }

    let schema: Value = serde_json::from_str(&registered.schema)
        .map_err(|e| format!("schema {} is not valid JSON: {}", registered.id, e))?;

    jsonschema::validator_for(&schema)
        .map(Arc::new)
        .map_err(|e| format!("schema {} is not a valid JSON Schema: {}", registered.id, e))
}

/// Validate `instance`, joining the first few violations into one message
fn check(validator: &Validator, instance: &Value) -> Result<(), String> {
    let violations: Vec<String> = validator
        .iter_errors(instance)
        .take(MAX_REPORTED_VIOLATIONS)
        .map(|e| e.to_string())
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registered(schema: Value, schema_type: SchemaType) -> RegisteredSchema {
        RegisteredSchema {
            id: 1,
            schema_type,
            schema: schema.to_string(),
        }
    }

    #[test]
    fn test_compile_rejects_avro() {
        let avro = registered(json!({"type": "record", "name": "R", "fields": []}), SchemaType::Avro);

        let err = compile(&avro).err().unwrap();
        assert!(err.contains("unsupported type AVRO"));
    }

    #[test]
    fn test_compile_rejects_non_json_document() {
        let broken = RegisteredSchema {
            id: 9,
            schema_type: SchemaType::Json,
            schema: "{not json".to_string(),
        };

        assert!(compile(&broken).is_err());
    }

    #[test]
    fn test_check_reports_violation() {
        let validator = compile(&registered(
            json!({
                "type": "object",
                "properties": { "user": { "type": "string" } }
            }),
            SchemaType::Json,
        ))
        .unwrap();

        assert!(check(&validator, &json!({"user": "Mike"})).is_ok());

        let err = check(&validator, &json!({"user": 42})).unwrap_err();
        assert!(err.contains("string"));
    }
}
