// api_pack/src/core/collaborator.rs

//! The collaborator traits the pipeline delegates to.
//!
//! Each role is a separate trait so an implementation only provides what it
//! does. Every method receives the run's `Operation` by exclusive reference and
//! communicates by mutating it (`data`, `context.errors`, `attributes`).
//! Implementations are shared across runs behind `Arc`, so they must keep no
//! per-request state of their own.

use crate::core::operation::{Operation, Payload};
use crate::error::ApiPackResult;
use async_trait::async_trait;

/// Reads data from a backing store into `op.data`.
#[async_trait]
pub trait Provider: Send + Sync + 'static {
  /// Loads every record matching the operation into `op.data`.
  async fn get_collection(&self, op: &mut Operation) -> ApiPackResult<()>;

  /// Loads the single addressed record into `op.data`.
  async fn get_item(&self, op: &mut Operation) -> ApiPackResult<()>;

  /// Loads data for a `CUSTOM` resource into `op.data`.
  async fn get_data(&self, op: &mut Operation) -> ApiPackResult<()>;

  /// Fetches the record an incoming payload is about to be merged into.
  /// Called by `deserialize` when `read` left no data behind.
  async fn get_instance(&self, op: &mut Operation) -> ApiPackResult<()>;
}

/// Converts between the wire payload and the internal data shape.
#[async_trait]
pub trait Serializer: Send + Sync + 'static {
  /// Merges `payload` into `op.data`.
  async fn deserialize(&self, op: &mut Operation, payload: &Payload) -> ApiPackResult<()>;

  /// Replaces `op.data` with its outbound representation.
  async fn serialize(&self, op: &mut Operation) -> ApiPackResult<()>;
}

/// Business-rule and authorization checks on retrieved data.
#[async_trait]
pub trait Checker: Send + Sync + 'static {
  async fn check(&self, op: &mut Operation) -> ApiPackResult<()>;
}

/// Input-shape validation.
#[async_trait]
pub trait Validator: Send + Sync + 'static {
  async fn validate(&self, op: &mut Operation) -> ApiPackResult<()>;
}

/// Writes to and removes from a backing store.
#[async_trait]
pub trait Persister: Send + Sync + 'static {
  /// Creates or updates the record in `op.data`.
  async fn persist(&self, op: &mut Operation) -> ApiPackResult<()>;

  async fn remove(&self, op: &mut Operation) -> ApiPackResult<()>;
}

/// Route-level access control, run before any data is touched.
#[async_trait]
pub trait RouteChecker: Send + Sync + 'static {
  async fn check_route(&self, op: &mut Operation) -> ApiPackResult<()>;
}
