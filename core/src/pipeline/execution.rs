// api_pack/src/pipeline/execution.rs

//! Stage methods of the permissive `ApiPack`, plus whole-run entry points.
//!
//! Stages are usable one at a time (the caller drives the order) or through
//! `run`, which goes `check_route → read → deserialize → check → validate →
//! write → serialize` and stops at the first error.

use crate::config::PipelineMode;
use crate::core::control::{RunReport, StageOutcome};
use crate::core::operation::{Operation, Payload};
use crate::error::ApiPackResult;
use crate::pipeline::definition::ApiPack;
use crate::pipeline::stages;
use crate::pipeline::strict::StrictApiPack;
use tracing::{event, instrument, Level};

const MODE: PipelineMode = PipelineMode::Permissive;

impl ApiPack {
  /// Route-level authorization. Errors propagate.
  #[instrument(name = "ApiPack::check_route", skip_all, fields(method = %op.method, resource_type = %op.resource_type), err(Display))]
  pub async fn check_route(&self, op: &mut Operation) -> ApiPackResult<StageOutcome> {
    stages::check_route(self.collaborators.slots(), MODE, op).await
  }

  /// Loads `op.data` from the provider.
  ///
  /// `data` is cleared first. Provider errors are absorbed: a failed read
  /// leaves `data` as `None` and this still returns `Ok`.
  #[instrument(name = "ApiPack::read", skip_all, fields(method = %op.method, resource_type = %op.resource_type), err(Display))]
  pub async fn read(&self, op: &mut Operation) -> ApiPackResult<StageOutcome> {
    stages::read(self.collaborators.slots(), MODE, op).await
  }

  /// Merges `payload` into `op.data`, fetching the stored instance first when
  /// there is no data yet. Pass `&Payload::new()` when the request had no body.
  #[instrument(
    name = "ApiPack::deserialize",
    skip_all,
    fields(method = %op.method, resource_type = %op.resource_type, payload_keys = payload.len()),
    err(Display)
  )]
  pub async fn deserialize(&self, op: &mut Operation, payload: &Payload) -> ApiPackResult<StageOutcome> {
    stages::deserialize(self.collaborators.slots(), MODE, op, payload).await
  }

  #[instrument(name = "ApiPack::check", skip_all, fields(method = %op.method, resource_type = %op.resource_type), err(Display))]
  pub async fn check(&self, op: &mut Operation) -> ApiPackResult<StageOutcome> {
    stages::check(self.collaborators.slots(), MODE, op).await
  }

  #[instrument(name = "ApiPack::validate", skip_all, fields(method = %op.method, resource_type = %op.resource_type), err(Display))]
  pub async fn validate(&self, op: &mut Operation) -> ApiPackResult<StageOutcome> {
    stages::validate(self.collaborators.slots(), MODE, op).await
  }

  /// PUT/POST/PATCH persist, DELETE removes, GET does nothing.
  #[instrument(name = "ApiPack::write", skip_all, fields(method = %op.method, resource_type = %op.resource_type), err(Display))]
  pub async fn write(&self, op: &mut Operation) -> ApiPackResult<StageOutcome> {
    stages::write(self.collaborators.slots(), MODE, op).await
  }

  #[instrument(name = "ApiPack::serialize", skip_all, fields(method = %op.method, resource_type = %op.resource_type), err(Display))]
  pub async fn serialize(&self, op: &mut Operation) -> ApiPackResult<StageOutcome> {
    stages::serialize(self.collaborators.slots(), MODE, op).await
  }

  /// Runs all stages permissively, regardless of the configured mode.
  #[instrument(
    name = "ApiPack::run",
    skip_all,
    fields(method = %op.method, resource_type = %op.resource_type),
    err(Display)
  )]
  pub async fn run(&self, op: &mut Operation, payload: &Payload) -> ApiPackResult<RunReport> {
    event!(Level::DEBUG, "Permissive pipeline run starting.");
    stages::run_all(self.collaborators.slots(), MODE, op, payload).await
  }

  /// Runs all stages in the mode chosen by this pack's `ApiPackConfig`.
  ///
  /// Both modes work on `op` in place, so whatever the stages did to it stays
  /// visible to the caller even if the run fails or is dropped midway.
  #[instrument(
    name = "ApiPack::process",
    skip_all,
    fields(mode = ?self.config.mode, method = %op.method, resource_type = %op.resource_type),
    err(Display)
  )]
  pub async fn process(&self, op: &mut Operation, payload: &Payload) -> ApiPackResult<RunReport> {
    let slots = self.collaborators.slots();
    let mode = self.config.mode;
    if mode == PipelineMode::Strict {
      stages::ensure_ready(slots, op, payload)?;
    }
    event!(Level::DEBUG, ?mode, "Pipeline run starting.");
    stages::run_all(slots, mode, op, payload).await
  }

  /// Derives a fail-fast pipeline for one operation from this pack's first
  /// registered collaborators.
  pub fn strictify(&self, operation: Operation) -> StrictApiPack {
    StrictApiPack::from_selected(self.collaborators.select(), operation)
  }
}
