// api_pack/src/pipeline/stages.rs

//! Stage bodies shared by `ApiPack` and `StrictApiPack`.
//!
//! Every stage decides from the operation's method, resource type and data
//! whether it applies, then delegates to the selected collaborator. The only
//! difference between the two pipelines is what happens when that collaborator
//! is absent, which `missing` resolves from the `PipelineMode`.

use crate::config::PipelineMode;
use crate::core::control::{Role, RunReport, SkipReason, Stage, StageOutcome};
use crate::core::operation::{Method, Operation, Payload, ResourceType};
use crate::error::{ApiPackError, ApiPackResult};
use crate::registry::Slots;
use tracing::{event, span, Instrument, Level};

fn missing(mode: PipelineMode, role: Role, stage: Stage, op: &Operation) -> ApiPackResult<StageOutcome> {
  match mode {
    PipelineMode::Permissive => {
      event!(Level::DEBUG, %role, "No collaborator registered, skipping.");
      Ok(StageOutcome::Skipped(SkipReason::MissingCollaborator(role)))
    }
    PipelineMode::Strict => {
      event!(Level::DEBUG, %role, "Required collaborator missing.");
      Err(ApiPackError::MissingCollaborator {
        role,
        stage,
        method: op.method,
        resource_type: op.resource_type,
      })
    }
  }
}

fn skipped(reason: SkipReason) -> ApiPackResult<StageOutcome> {
  event!(Level::DEBUG, ?reason, "Stage skipped.");
  Ok(StageOutcome::Skipped(reason))
}

fn is_collection_create(op: &Operation) -> bool {
  op.resource_type == ResourceType::Collection && op.method == Method::Post
}

/// A body is only merged for POST/PUT/PATCH, and POST/PUT only when one was sent.
fn deserialize_applies(op: &Operation, payload: &Payload) -> Option<SkipReason> {
  if op.method.is_bodiless() {
    Some(SkipReason::MethodExcluded)
  } else if op.method.allows_empty_body() && payload.is_empty() {
    Some(SkipReason::EmptyPayload)
  } else {
    None
  }
}

pub(crate) async fn check_route(sel: Slots<'_>, mode: PipelineMode, op: &mut Operation) -> ApiPackResult<StageOutcome> {
  let Some(route_checker) = sel.route_checker else {
    return missing(mode, Role::RouteChecker, Stage::CheckRoute, op);
  };
  route_checker.check_route(op).await?;
  Ok(StageOutcome::Executed)
}

/// Never fails on a provider error: whatever went wrong, the operation simply ends up without data.
pub(crate) async fn read(sel: Slots<'_>, mode: PipelineMode, op: &mut Operation) -> ApiPackResult<StageOutcome> {
  op.data = None;

  if is_collection_create(op) {
    return skipped(SkipReason::CollectionCreate);
  }
  let Some(provider) = sel.provider else {
    return missing(mode, Role::Provider, Stage::Read, op);
  };

  let result = match op.resource_type {
    ResourceType::Collection => provider.get_collection(op).await,
    ResourceType::Item => provider.get_item(op).await,
    ResourceType::Custom => provider.get_data(op).await,
  };
  if let Err(e) = result {
    event!(Level::WARN, error = %e, "Provider failed during read, continuing without data.");
    op.data = None;
  }
  Ok(StageOutcome::Executed)
}

pub(crate) async fn deserialize(
  sel: Slots<'_>,
  mode: PipelineMode,
  op: &mut Operation,
  payload: &Payload,
) -> ApiPackResult<StageOutcome> {
  if let Some(reason) = deserialize_applies(op, payload) {
    return skipped(reason);
  }

  // Updates merge into the stored record, so fetch it when read produced nothing.
  let mut fetched_instance = false;
  if !op.has_data() {
    let Some(provider) = sel.provider else {
      return missing(mode, Role::Provider, Stage::Deserialize, op);
    };
    provider.get_instance(op).await?;
    fetched_instance = true;
  }

  match sel.serializer {
    Some(serializer) => {
      serializer.deserialize(op, payload).await?;
      Ok(StageOutcome::Executed)
    }
    None if fetched_instance && mode == PipelineMode::Permissive => {
      event!(Level::DEBUG, "Instance fetched but no serializer registered to merge the payload.");
      Ok(StageOutcome::Executed)
    }
    None => missing(mode, Role::Serializer, Stage::Deserialize, op),
  }
}

pub(crate) async fn check(sel: Slots<'_>, mode: PipelineMode, op: &mut Operation) -> ApiPackResult<StageOutcome> {
  if !op.has_data() {
    return skipped(SkipReason::NoData);
  }
  let Some(checker) = sel.checker else {
    return missing(mode, Role::Checker, Stage::Check, op);
  };
  checker.check(op).await?;
  Ok(StageOutcome::Executed)
}

pub(crate) async fn validate(sel: Slots<'_>, mode: PipelineMode, op: &mut Operation) -> ApiPackResult<StageOutcome> {
  if op.method.is_bodiless() {
    return skipped(SkipReason::MethodExcluded);
  }
  let Some(validator) = sel.validator else {
    return missing(mode, Role::Validator, Stage::Validate, op);
  };
  validator.validate(op).await?;
  Ok(StageOutcome::Executed)
}

pub(crate) async fn write(sel: Slots<'_>, mode: PipelineMode, op: &mut Operation) -> ApiPackResult<StageOutcome> {
  let removes = match op.method {
    Method::Get => return skipped(SkipReason::MethodExcluded),
    Method::Put | Method::Post | Method::Patch => false,
    Method::Delete => true,
  };
  let Some(persister) = sel.persister else {
    return missing(mode, Role::Persister, Stage::Write, op);
  };

  if removes {
    persister.remove(op).await?;
  } else {
    persister.persist(op).await?;
  }
  Ok(StageOutcome::Executed)
}

pub(crate) async fn serialize(sel: Slots<'_>, mode: PipelineMode, op: &mut Operation) -> ApiPackResult<StageOutcome> {
  if !op.has_data() {
    return skipped(SkipReason::NoData);
  }
  let Some(serializer) = sel.serializer else {
    return missing(mode, Role::Serializer, Stage::Serialize, op);
  };
  serializer.serialize(op).await?;
  Ok(StageOutcome::Executed)
}

/// Roles whose necessity follows from method, resource type and payload alone,
/// paired with the first stage that needs them, in stage order.
///
/// Needs that depend on data produced mid-run (checker, serializer for output,
/// provider for `get_instance`) are not listed.
pub(crate) fn statically_required(op: &Operation, payload: &Payload) -> Vec<(Stage, Role)> {
  let mut required = vec![(Stage::CheckRoute, Role::RouteChecker)];
  if !is_collection_create(op) {
    required.push((Stage::Read, Role::Provider));
  }
  if deserialize_applies(op, payload).is_none() {
    required.push((Stage::Deserialize, Role::Serializer));
  }
  if !op.method.is_bodiless() {
    required.push((Stage::Validate, Role::Validator));
  }
  if op.method != Method::Get {
    required.push((Stage::Write, Role::Persister));
  }
  required
}

/// Fails with the first role in `statically_required` that `sel` lacks.
pub(crate) fn ensure_ready(sel: Slots<'_>, op: &Operation, payload: &Payload) -> ApiPackResult<()> {
  match statically_required(op, payload).into_iter().find(|(_, role)| !sel.has(*role)) {
    Some((stage, role)) => Err(ApiPackError::MissingCollaborator {
      role,
      stage,
      method: op.method,
      resource_type: op.resource_type,
    }),
    None => Ok(()),
  }
}

pub(crate) async fn run_stage(
  stage: Stage,
  sel: Slots<'_>,
  mode: PipelineMode,
  op: &mut Operation,
  payload: &Payload,
) -> ApiPackResult<StageOutcome> {
  match stage {
    Stage::CheckRoute => check_route(sel, mode, op).await,
    Stage::Read => read(sel, mode, op).await,
    Stage::Deserialize => deserialize(sel, mode, op, payload).await,
    Stage::Check => check(sel, mode, op).await,
    Stage::Validate => validate(sel, mode, op).await,
    Stage::Write => write(sel, mode, op).await,
    Stage::Serialize => serialize(sel, mode, op).await,
  }
}

/// Runs every stage in order, stopping at the first error.
pub(crate) async fn run_all(
  sel: Slots<'_>,
  mode: PipelineMode,
  op: &mut Operation,
  payload: &Payload,
) -> ApiPackResult<RunReport> {
  let mut report = RunReport::default();

  for (stage_idx, stage) in Stage::ORDER.into_iter().enumerate() {
    let stage_span = span!(
      Level::INFO,
      "pipeline_stage_execution",
      stage = stage.as_str(),
      stage_index = stage_idx
    );
    let outcome = run_stage(stage, sel, mode, op, payload)
      .instrument(stage_span)
      .await
      .map_err(|e| {
        event!(Level::DEBUG, %stage, "Stopping at failed stage.");
        e
      })?;
    report.record(stage, outcome);
  }

  event!(Level::DEBUG, "Pipeline run completed.");
  Ok(report)
}
