// api_pack/src/pipeline/strict.rs

//! The fail-fast companion to `ApiPack`.

use crate::config::PipelineMode;
use crate::core::collaborator::{Checker, Persister, Provider, RouteChecker, Serializer, Validator};
use crate::core::control::{RunReport, StageOutcome};
use crate::core::operation::{Operation, Payload};
use crate::error::ApiPackResult;
use crate::pipeline::stages;
use crate::registry::Selected;
use serde_json::Value;
use std::sync::Arc;
use tracing::{event, instrument, Level};

const MODE: PipelineMode = PipelineMode::Strict;

/// Everything a `StrictApiPack` is built from.
#[derive(Default)]
pub struct StrictParts {
  pub operation: Operation,
  pub route_checker: Option<Arc<dyn RouteChecker>>,
  pub provider: Option<Arc<dyn Provider>>,
  pub serializer: Option<Arc<dyn Serializer>>,
  pub checker: Option<Arc<dyn Checker>>,
  pub validator: Option<Arc<dyn Validator>>,
  pub persister: Option<Arc<dyn Persister>>,
}

/// A pipeline bound to one operation that refuses to silently skip.
///
/// Where `ApiPack` skips a stage because no collaborator is registered, this
/// returns `ApiPackError::MissingCollaborator` naming the role and stage.
/// Skips driven by the method, the payload or the absence of data are the same
/// as in `ApiPack`, and a failing provider during `read` is still absorbed.
///
/// Usually obtained from `ApiPack::strictify`, which captures the collaborators
/// once; registrations made on the `ApiPack` afterwards are not seen.
pub struct StrictApiPack {
  collaborators: Selected,
  operation: Operation,
}

impl StrictApiPack {
  pub fn new(parts: StrictParts) -> Self {
    let StrictParts {
      operation,
      route_checker,
      provider,
      serializer,
      checker,
      validator,
      persister,
    } = parts;
    Self::from_selected(
      Selected {
        route_checker,
        provider,
        serializer,
        checker,
        validator,
        persister,
      },
      operation,
    )
  }

  pub(crate) fn from_selected(collaborators: Selected, operation: Operation) -> Self {
    event!(Level::DEBUG, ?collaborators, method = %operation.method, resource_type = %operation.resource_type, "Strict pipeline created.");
    Self {
      collaborators,
      operation,
    }
  }

  pub fn operation(&self) -> &Operation {
    &self.operation
  }

  pub fn operation_mut(&mut self) -> &mut Operation {
    &mut self.operation
  }

  pub fn into_operation(self) -> Operation {
    self.operation
  }

  pub fn errors(&self, kind: &str) -> Option<&[Value]> {
    self.operation.errors(kind)
  }

  /// Fails with the first missing collaborator, in stage order, among those the
  /// operation is certain to need given its method, resource type and `payload`.
  ///
  /// Collaborators only needed depending on what earlier stages load (the
  /// checker, the serializer for output, the provider's `get_instance`) are
  /// enforced when their stage runs.
  pub fn ensure_ready(&self, payload: &Payload) -> ApiPackResult<()> {
    stages::ensure_ready(self.collaborators.slots(), &self.operation, payload)
  }

  #[instrument(name = "StrictApiPack::check_route", skip_all, err(Display))]
  pub async fn check_route(&mut self) -> ApiPackResult<StageOutcome> {
    stages::check_route(self.collaborators.slots(), MODE, &mut self.operation).await
  }

  #[instrument(name = "StrictApiPack::read", skip_all, err(Display))]
  pub async fn read(&mut self) -> ApiPackResult<StageOutcome> {
    stages::read(self.collaborators.slots(), MODE, &mut self.operation).await
  }

  #[instrument(name = "StrictApiPack::deserialize", skip_all, fields(payload_keys = payload.len()), err(Display))]
  pub async fn deserialize(&mut self, payload: &Payload) -> ApiPackResult<StageOutcome> {
    stages::deserialize(self.collaborators.slots(), MODE, &mut self.operation, payload).await
  }

  #[instrument(name = "StrictApiPack::check", skip_all, err(Display))]
  pub async fn check(&mut self) -> ApiPackResult<StageOutcome> {
    stages::check(self.collaborators.slots(), MODE, &mut self.operation).await
  }

  #[instrument(name = "StrictApiPack::validate", skip_all, err(Display))]
  pub async fn validate(&mut self) -> ApiPackResult<StageOutcome> {
    stages::validate(self.collaborators.slots(), MODE, &mut self.operation).await
  }

  #[instrument(name = "StrictApiPack::write", skip_all, err(Display))]
  pub async fn write(&mut self) -> ApiPackResult<StageOutcome> {
    stages::write(self.collaborators.slots(), MODE, &mut self.operation).await
  }

  #[instrument(name = "StrictApiPack::serialize", skip_all, err(Display))]
  pub async fn serialize(&mut self) -> ApiPackResult<StageOutcome> {
    stages::serialize(self.collaborators.slots(), MODE, &mut self.operation).await
  }

  /// `ensure_ready`, then every stage in order.
  #[instrument(
    name = "StrictApiPack::run",
    skip_all,
    fields(method = %self.operation.method, resource_type = %self.operation.resource_type),
    err(Display)
  )]
  pub async fn run(&mut self, payload: &Payload) -> ApiPackResult<RunReport> {
    self.ensure_ready(payload)?;
    event!(Level::DEBUG, "Strict pipeline run starting.");
    stages::run_all(self.collaborators.slots(), MODE, &mut self.operation, payload).await
  }
}

impl std::fmt::Debug for StrictApiPack {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StrictApiPack")
      .field("collaborators", &self.collaborators)
      .field("operation", &self.operation)
      .finish()
  }
}
