// ============================================================================
// Test doubles shared by the integration tests
// ============================================================================
//
// - InMemoryRegistry: SchemaRegistry backed by a HashMap
// - VecSource:        RecordSource replaying a fixed list of records
// - RecordingSink:    RecordSink capturing what would be published
//
// All three write into a shared CloseLog so tests can assert close order.
//
// ============================================================================

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use relay_config::{PipelineConfig, SchemaRegistryConfig, SubjectNameStrategy};
use relay_error::{ReadError, RelayError};
use schema_relay::kafka::{Delivery, OutboundRecord, RawRecord};
use schema_relay::pipeline::{RecordSink, RecordSource};
use schema_relay::schema::wire;
use schema_relay::schema::{RegisteredSchema, SchemaRegistry, SchemaType};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

pub const INBOUND_TOPIC: &str = "cars-in";
pub const OUTBOUND_TOPIC: &str = "cars-out";

/// Ordered record of close() calls across components
#[derive(Clone, Default)]
pub struct CloseLog(Arc<Mutex<Vec<&'static str>>>);

impl CloseLog {
    pub fn push(&self, name: &'static str) {
        self.0.lock().unwrap().push(name);
    }

    pub fn entries(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

// ============================================================================
// InMemoryRegistry
// ============================================================================

#[derive(Default)]
struct RegistryState {
    schemas: HashMap<u32, RegisteredSchema>,
    subjects: HashMap<String, Vec<u32>>,
    next_id: u32,
    register_calls: usize,
    lookups: usize,
}

#[derive(Clone, Default)]
pub struct InMemoryRegistry {
    state: Arc<Mutex<RegistryState>>,
    closes: CloseLog,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_close_log(closes: CloseLog) -> Self {
        Self {
            state: Arc::default(),
            closes,
        }
    }

    /// Register a JSON schema directly, bypassing the codec
    pub fn add_schema(&self, subject: &str, schema: Value) -> u32 {
        self.add(subject, SchemaType::Json, schema.to_string())
    }

    pub fn add(&self, subject: &str, schema_type: SchemaType, schema: String) -> u32 {
        let mut state = self.state.lock().unwrap();

        if let Some(ids) = state.subjects.get(subject) {
            for id in ids {
                if state.schemas[id].schema == schema {
                    return *id;
                }
            }
        }

        state.next_id += 1;
        let id = state.next_id;
        state.schemas.insert(
            id,
            RegisteredSchema {
                id,
                schema_type,
                schema,
            },
        );
        state.subjects.entry(subject.to_string()).or_default().push(id);
        id
    }

    pub fn latest_id(&self, subject: &str) -> Option<u32> {
        let state = self.state.lock().unwrap();
        state.subjects.get(subject).and_then(|ids| ids.last().copied())
    }

    pub fn register_calls(&self) -> usize {
        self.state.lock().unwrap().register_calls
    }

    pub fn lookups(&self) -> usize {
        self.state.lock().unwrap().lookups
    }

    pub fn closes(&self) -> usize {
        self.closes
            .entries()
            .iter()
            .filter(|name| **name == "registry")
            .count()
    }
}

#[async_trait]
impl SchemaRegistry for InMemoryRegistry {
    async fn schema_by_id(&self, subject: &str, id: u32) -> Result<Option<RegisteredSchema>> {
        let mut state = self.state.lock().unwrap();
        state.lookups += 1;

        let in_subject = state
            .subjects
            .get(subject)
            .is_some_and(|ids| ids.contains(&id));
        if !in_subject {
            return Ok(None);
        }
        Ok(state.schemas.get(&id).cloned())
    }

    async fn latest_schema(&self, subject: &str) -> Result<Option<RegisteredSchema>> {
        let mut state = self.state.lock().unwrap();
        state.lookups += 1;

        let latest = state
            .subjects
            .get(subject)
            .and_then(|ids| ids.last())
            .and_then(|id| state.schemas.get(id))
            .cloned();
        Ok(latest)
    }

    async fn register_schema(&self, subject: &str, schema: &Value) -> Result<u32> {
        self.state.lock().unwrap().register_calls += 1;
        Ok(self.add_schema(subject, schema.clone()))
    }

    async fn close(&self) {
        self.closes.push("registry");
    }
}

// ============================================================================
// VecSource
// ============================================================================

/// Replays `records`, then blocks until cancelled
pub struct VecSource {
    topic: String,
    records: VecDeque<Result<RawRecord, RelayError>>,
    acknowledged: Arc<Mutex<Vec<i64>>>,
    closes: CloseLog,
}

impl VecSource {
    pub fn new(records: Vec<RawRecord>, closes: CloseLog) -> Self {
        Self::with_results(records.into_iter().map(Ok).collect(), closes)
    }

    pub fn with_results(records: Vec<Result<RawRecord, RelayError>>, closes: CloseLog) -> Self {
        Self {
            topic: INBOUND_TOPIC.to_string(),
            records: records.into(),
            acknowledged: Arc::default(),
            closes,
        }
    }

    /// Offsets passed to acknowledge(), in call order
    pub fn acknowledged(&self) -> Arc<Mutex<Vec<i64>>> {
        Arc::clone(&self.acknowledged)
    }
}

#[async_trait]
impl RecordSource for VecSource {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn next(&mut self, token: &CancellationToken) -> Result<RawRecord, RelayError> {
        if token.is_cancelled() {
            return Err(ReadError::Cancelled.into());
        }
        match self.records.pop_front() {
            Some(record) => record,
            None => {
                token.cancelled().await;
                Err(ReadError::Cancelled.into())
            }
        }
    }

    fn acknowledge(&mut self, record: &RawRecord) -> Result<(), RelayError> {
        self.acknowledged.lock().unwrap().push(record.offset);
        Ok(())
    }

    async fn close(self) {
        self.closes.push("inbound");
    }
}

// ============================================================================
// RecordingSink
// ============================================================================

pub struct RecordingSink {
    topic: String,
    sent: Arc<Mutex<Vec<OutboundRecord>>>,
    failing_keys: HashSet<Vec<u8>>,
    send_gate: Option<(Arc<Notify>, Duration)>,
    close_delay: Option<Duration>,
    closes: CloseLog,
}

impl RecordingSink {
    pub fn new(closes: CloseLog) -> Self {
        Self {
            topic: OUTBOUND_TOPIC.to_string(),
            sent: Arc::default(),
            failing_keys: HashSet::new(),
            send_gate: None,
            close_delay: None,
            closes,
        }
    }

    /// Publishing a record with `key` fails with a WriteError
    pub fn failing_on(mut self, key: &str) -> Self {
        self.failing_keys.insert(key.as_bytes().to_vec());
        self
    }

    /// send() notifies `started` and then takes `delay` before the record is accepted
    pub fn slow_send(mut self, started: Arc<Notify>, delay: Duration) -> Self {
        self.send_gate = Some((started, delay));
        self
    }

    /// close() hangs for `delay`, simulating a broker that never acknowledges the flush
    pub fn slow_close(mut self, delay: Duration) -> Self {
        self.close_delay = Some(delay);
        self
    }

    pub fn sent(&self) -> Arc<Mutex<Vec<OutboundRecord>>> {
        Arc::clone(&self.sent)
    }
}

#[async_trait]
impl RecordSink for RecordingSink {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn send(&mut self, record: OutboundRecord) -> Result<Delivery, RelayError> {
        if self.failing_keys.contains(&record.key) {
            return Err(RelayError::write("broker unavailable"));
        }

        if let Some((started, delay)) = &self.send_gate {
            started.notify_one();
            tokio::time::sleep(*delay).await;
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(record);
        Ok(Delivery {
            partition: 0,
            offset: sent.len() as i64 - 1,
        })
    }

    async fn close(self) {
        self.closes.push("outbound");
        if let Some(delay) = self.close_delay {
            tokio::time::sleep(delay).await;
        }
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// JSON Schema of the inbound subject: the envelope is a JSON string
pub fn inbound_schema() -> Value {
    json!({ "type": "string" })
}

/// Inner envelope as produced upstream
pub fn envelope_json(key: &str, user: &str, car: &str, color: &str) -> String {
    json!({
        "key": key,
        "message": { "user": user, "car": car, "color": color }
    })
    .to_string()
}

/// Inbound bus payload: framed JSON string wrapping the envelope
pub fn framed_envelope(schema_id: u32, envelope: &str) -> Vec<u8> {
    let body = serde_json::to_vec(&Value::String(envelope.to_string())).unwrap();
    wire::frame(schema_id, &body)
}

pub fn raw_record(offset: i64, key: &str, value: Vec<u8>) -> RawRecord {
    RawRecord {
        topic: INBOUND_TOPIC.to_string(),
        partition: 0,
        offset,
        key: key.as_bytes().to_vec(),
        value,
    }
}

pub fn registry_config(auto_register: bool, validate: bool) -> SchemaRegistryConfig {
    SchemaRegistryConfig {
        url: "http://registry.test".to_string(),
        subject_strategy: SubjectNameStrategy::Topic,
        auto_register,
        validate,
        request_timeout: Duration::from_secs(1),
    }
}

pub fn pipeline_config() -> PipelineConfig {
    PipelineConfig {
        shutdown_grace: Duration::from_secs(1),
        status_interval: Duration::from_secs(30),
        read_error_backoff: Duration::from_millis(10),
    }
}
