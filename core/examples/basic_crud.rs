// api_pack/examples/basic_crud.rs

use api_pack::{
  ApiPack, ApiPackError, ApiPackResult, Checker, Method, Operation, Payload, Persister, Provider, ResourceType,
  RouteChecker, Serializer, Validator,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

// 1. A toy "notes" backend. The records live behind a lock; the pipeline itself
//    only ever sees the Operation handed to each call.
#[derive(Clone, Default)]
struct NotesStore {
  notes: Arc<Mutex<BTreeMap<u64, Value>>>,
}

fn note_id(op: &Operation) -> Option<u64> {
  op.attribute("id").and_then(Value::as_u64)
}

#[async_trait]
impl Provider for NotesStore {
  async fn get_collection(&self, op: &mut Operation) -> ApiPackResult<()> {
    op.data = Some(Value::Array(self.notes.lock().values().cloned().collect()));
    Ok(())
  }

  async fn get_item(&self, op: &mut Operation) -> ApiPackResult<()> {
    let id = note_id(op).ok_or_else(|| anyhow::anyhow!("no id on operation"))?;
    let note = self.notes.lock().get(&id).cloned();
    op.data = Some(note.ok_or_else(|| anyhow::anyhow!("note {} not found", id))?);
    Ok(())
  }

  async fn get_data(&self, op: &mut Operation) -> ApiPackResult<()> {
    op.data = Some(json!({ "count": self.notes.lock().len() }));
    Ok(())
  }

  async fn get_instance(&self, op: &mut Operation) -> ApiPackResult<()> {
    op.data = Some(json!({}));
    Ok(())
  }
}

#[async_trait]
impl Persister for NotesStore {
  async fn persist(&self, op: &mut Operation) -> ApiPackResult<()> {
    let mut notes = self.notes.lock();
    let id = note_id(op).unwrap_or_else(|| notes.keys().next_back().map_or(1, |last| last + 1));
    let Some(Value::Object(record)) = op.data.as_mut() else {
      return Err(ApiPackError::Internal("nothing to persist".to_string()));
    };
    record.insert("id".to_string(), json!(id));
    notes.insert(id, Value::Object(record.clone()));
    Ok(())
  }

  async fn remove(&self, op: &mut Operation) -> ApiPackResult<()> {
    if let Some(id) = note_id(op) {
      self.notes.lock().remove(&id);
    }
    op.data = None;
    Ok(())
  }
}

// 2. Stateless collaborators.
struct JsonSerializer;

#[async_trait]
impl Serializer for JsonSerializer {
  async fn deserialize(&self, op: &mut Operation, payload: &Payload) -> ApiPackResult<()> {
    if let Some(Value::Object(record)) = op.data.as_mut() {
      record.extend(payload.clone());
    }
    Ok(())
  }

  async fn serialize(&self, op: &mut Operation) -> ApiPackResult<()> {
    let data = op.data.take().unwrap_or(Value::Null);
    op.data = Some(json!({ "data": data }));
    Ok(())
  }
}

struct TitleRequired;

#[async_trait]
impl Validator for TitleRequired {
  async fn validate(&self, op: &mut Operation) -> ApiPackResult<()> {
    let ok = op.data.as_ref().and_then(|d| d.get("title")).map_or(false, Value::is_string);
    if !ok {
      op.push_error("validation", json!({"field": "title", "message": "required"}));
      return Err(anyhow::anyhow!("invalid note").into());
    }
    Ok(())
  }
}

struct NoLockedNotes;

#[async_trait]
impl Checker for NoLockedNotes {
  async fn check(&self, op: &mut Operation) -> ApiPackResult<()> {
    if op.data.as_ref().and_then(|d| d.get("locked")) == Some(&Value::Bool(true)) {
      op.push_error("forbidden", "note is locked");
      return Err(anyhow::anyhow!("locked note").into());
    }
    Ok(())
  }
}

struct AllowAll;

#[async_trait]
impl RouteChecker for AllowAll {
  async fn check_route(&self, _op: &mut Operation) -> ApiPackResult<()> {
    Ok(())
  }
}

fn body(value: Value) -> Payload {
  match value {
    Value::Object(map) => map,
    _ => Payload::new(),
  }
}

#[tokio::main]
async fn main() -> Result<(), ApiPackError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic CRUD Example ---");

  // 3. Configure the pack once.
  let store = NotesStore::default();
  let mut pack = ApiPack::new();
  pack
    .route_checker(AllowAll)
    .provider(store.clone())
    .serializer(JsonSerializer)
    .checker(NoLockedNotes)
    .validator(TitleRequired)
    .persister(store.clone());

  // 4. Create a note.
  let mut create = Operation::parse("post", "collection")?;
  pack.run(&mut create, &body(json!({"title": "groceries"}))).await?;
  info!("Created: {}", create.data.unwrap_or_default());

  // 5. A rejected create leaves its reasons on the operation.
  let mut invalid = Operation::parse("post", "collection")?;
  if let Err(e) = pack.run(&mut invalid, &body(json!({"body": "untitled"}))).await {
    info!("Rejected ({}): {:?}", e, invalid.errors("validation"));
  }

  // 6. Update, list, delete.
  let mut update = Operation::new(Method::Patch, ResourceType::Item).with_attribute("id", 1);
  pack.run(&mut update, &body(json!({"title": "groceries (done)"}))).await?;
  info!("Updated: {}", update.data.unwrap_or_default());

  let mut list = Operation::new(Method::Get, ResourceType::Collection);
  pack.run(&mut list, &Payload::new()).await?;
  info!("Listed: {}", list.data.unwrap_or_default());

  let mut delete = Operation::new(Method::Delete, ResourceType::Item).with_attribute("id", 1);
  pack.run(&mut delete, &Payload::new()).await?;
  info!("Remaining notes: {}", store.notes.lock().len());

  // 7. Strict mode refuses to run without every collaborator it needs.
  let bare = ApiPack::new();
  let strict_result = bare
    .strictify(Operation::new(Method::Get, ResourceType::Item))
    .run(&Payload::new())
    .await;
  info!("Strict run on an empty pack: {:?}", strict_result.map(|_| ()));

  Ok(())
}
