// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use api_pack::{
  ApiPackError, ApiPackResult, Checker, Operation, Payload, Persister, Provider, RouteChecker, Serializer, Validator,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::Level;

// --- Call log shared between a test and its collaborators ---
#[derive(Clone, Debug, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&self, entry: impl Into<String>) {
    self.0.lock().push(entry.into());
  }

  pub fn entries(&self) -> Vec<String> {
    self.0.lock().clone()
  }

  pub fn contains(&self, entry: &str) -> bool {
    self.0.lock().iter().any(|e| e == entry)
  }

  pub fn is_empty(&self) -> bool {
    self.0.lock().is_empty()
  }
}

// --- Provider ---
#[derive(Clone, Debug)]
pub struct RecordingProvider {
  pub name: &'static str,
  pub log: CallLog,
  pub collection: Value,
  pub item: Value,
  pub custom: Value,
  pub instance: Option<Value>,
  pub fail_reads: bool,
}

impl RecordingProvider {
  pub fn new(log: &CallLog) -> Self {
    Self::named("provider", log)
  }

  pub fn named(name: &'static str, log: &CallLog) -> Self {
    Self {
      name,
      log: log.clone(),
      collection: json!([{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]),
      item: json!({"id": 1, "name": "a"}),
      custom: json!({"report": "ok"}),
      instance: None,
      fail_reads: false,
    }
  }

  pub fn failing(mut self) -> Self {
    self.fail_reads = true;
    self
  }

  pub fn with_instance(mut self, instance: Value) -> Self {
    self.instance = Some(instance);
    self
  }

  fn record(&self, call: &str) {
    self.log.push(format!("{}:{}", self.name, call));
  }
}

#[async_trait]
impl Provider for RecordingProvider {
  async fn get_collection(&self, op: &mut Operation) -> ApiPackResult<()> {
    self.record("get_collection");
    if self.fail_reads {
      return Err(anyhow::anyhow!("collection backend unavailable").into());
    }
    op.data = Some(self.collection.clone());
    Ok(())
  }

  async fn get_item(&self, op: &mut Operation) -> ApiPackResult<()> {
    self.record("get_item");
    if self.fail_reads {
      // Leave something behind to prove `read` clears it.
      op.data = Some(json!({"partial": true}));
      return Err(anyhow::anyhow!("item not found").into());
    }
    op.data = Some(self.item.clone());
    Ok(())
  }

  async fn get_data(&self, op: &mut Operation) -> ApiPackResult<()> {
    self.record("get_data");
    if self.fail_reads {
      return Err(ApiPackError::Internal("custom source failed".to_string()));
    }
    op.data = Some(self.custom.clone());
    Ok(())
  }

  async fn get_instance(&self, op: &mut Operation) -> ApiPackResult<()> {
    self.record("get_instance");
    op.data = self.instance.clone();
    Ok(())
  }
}

// --- Serializer ---
/// Merges payload keys into an object and wraps data as `{"serialized": data}` on the way out.
#[derive(Clone, Debug)]
pub struct RecordingSerializer {
  pub log: CallLog,
}

impl RecordingSerializer {
  pub fn new(log: &CallLog) -> Self {
    Self { log: log.clone() }
  }
}

#[async_trait]
impl Serializer for RecordingSerializer {
  async fn deserialize(&self, op: &mut Operation, payload: &Payload) -> ApiPackResult<()> {
    self.log.push("serializer:deserialize");
    let mut merged = match op.data.take() {
      Some(Value::Object(existing)) => existing,
      _ => serde_json::Map::new(),
    };
    for (key, value) in payload {
      merged.insert(key.clone(), value.clone());
    }
    op.data = Some(Value::Object(merged));
    Ok(())
  }

  async fn serialize(&self, op: &mut Operation) -> ApiPackResult<()> {
    self.log.push("serializer:serialize");
    let data = op.data.take().unwrap_or(Value::Null);
    op.data = Some(json!({ "serialized": data }));
    Ok(())
  }
}

// --- Persister ---
/// Assigns id 42 to objects without one.
#[derive(Clone, Debug)]
pub struct RecordingPersister {
  pub log: CallLog,
}

impl RecordingPersister {
  pub fn new(log: &CallLog) -> Self {
    Self { log: log.clone() }
  }
}

#[async_trait]
impl Persister for RecordingPersister {
  async fn persist(&self, op: &mut Operation) -> ApiPackResult<()> {
    self.log.push("persister:persist");
    if let Some(Value::Object(record)) = op.data.as_mut() {
      record.entry("id").or_insert(json!(42));
    }
    Ok(())
  }

  async fn remove(&self, _op: &mut Operation) -> ApiPackResult<()> {
    self.log.push("persister:remove");
    Ok(())
  }
}

// --- Checker ---
#[derive(Clone, Debug)]
pub struct RecordingChecker {
  pub log: CallLog,
  pub deny: bool,
}

impl RecordingChecker {
  pub fn new(log: &CallLog) -> Self {
    Self {
      log: log.clone(),
      deny: false,
    }
  }

  pub fn denying(mut self) -> Self {
    self.deny = true;
    self
  }
}

#[async_trait]
impl Checker for RecordingChecker {
  async fn check(&self, op: &mut Operation) -> ApiPackResult<()> {
    self.log.push("checker:check");
    if self.deny {
      op.push_error("forbidden", "record is locked");
      return Err(anyhow::anyhow!("checker denied access").into());
    }
    Ok(())
  }
}

// --- Validator ---
/// Requires a string `name` on object data; records a `validation` error otherwise.
#[derive(Clone, Debug)]
pub struct RecordingValidator {
  pub log: CallLog,
}

impl RecordingValidator {
  pub fn new(log: &CallLog) -> Self {
    Self { log: log.clone() }
  }
}

#[async_trait]
impl Validator for RecordingValidator {
  async fn validate(&self, op: &mut Operation) -> ApiPackResult<()> {
    self.log.push("validator:validate");
    let has_name = op
      .data
      .as_ref()
      .and_then(|d| d.get("name"))
      .map_or(false, Value::is_string);
    if !has_name {
      op.push_error("validation", json!({"field": "name", "message": "required"}));
      return Err(anyhow::anyhow!("validation failed").into());
    }
    Ok(())
  }
}

// --- Route checker ---
#[derive(Clone, Debug)]
pub struct RecordingRouteChecker {
  pub log: CallLog,
  pub deny: bool,
}

impl RecordingRouteChecker {
  pub fn new(log: &CallLog) -> Self {
    Self {
      log: log.clone(),
      deny: false,
    }
  }

  pub fn denying(mut self) -> Self {
    self.deny = true;
    self
  }
}

#[async_trait]
impl RouteChecker for RecordingRouteChecker {
  async fn check_route(&self, _op: &mut Operation) -> ApiPackResult<()> {
    self.log.push("route_checker:check_route");
    if self.deny {
      return Err(anyhow::anyhow!("route not allowed").into());
    }
    Ok(())
  }
}

// --- Helpers ---
pub fn payload(value: Value) -> Payload {
  match value {
    Value::Object(map) => map,
    other => panic!("payload helper expects a JSON object, got {}", other),
  }
}

/// A pack with every role registered against `log`.
pub fn full_pack(log: &CallLog) -> api_pack::ApiPack {
  let mut pack = api_pack::ApiPack::new();
  pack
    .route_checker(RecordingRouteChecker::new(log))
    .provider(RecordingProvider::new(log))
    .serializer(RecordingSerializer::new(log))
    .checker(RecordingChecker::new(log))
    .validator(RecordingValidator::new(log))
    .persister(RecordingPersister::new(log));
  pack
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
