// api_pack/src/core/control.rs

//! Names for the pipeline's stages and collaborator roles, and the outcome of
//! running a stage or a whole pipeline.

use std::fmt;

/// The fixed stages of a pipeline run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
  CheckRoute,
  Read,
  Deserialize,
  Check,
  Validate,
  Write,
  Serialize,
}

impl Stage {
  pub const ORDER: [Stage; 7] = [
    Stage::CheckRoute,
    Stage::Read,
    Stage::Deserialize,
    Stage::Check,
    Stage::Validate,
    Stage::Write,
    Stage::Serialize,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Stage::CheckRoute => "check_route",
      Stage::Read => "read",
      Stage::Deserialize => "deserialize",
      Stage::Check => "check",
      Stage::Validate => "validate",
      Stage::Write => "write",
      Stage::Serialize => "serialize",
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A pluggable collaborator slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
  RouteChecker,
  Provider,
  Serializer,
  Checker,
  Validator,
  Persister,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::RouteChecker => "route checker",
      Role::Provider => "provider",
      Role::Serializer => "serializer",
      Role::Checker => "checker",
      Role::Validator => "validator",
      Role::Persister => "persister",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Why a stage did not call into its collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  /// No collaborator registered for the role the stage needs.
  MissingCollaborator(Role),
  /// The operation's method never involves this stage (e.g. validating a GET).
  MethodExcluded,
  /// POST/PUT without a request body.
  EmptyPayload,
  /// The stage only acts on data and the operation has none.
  NoData,
  /// Creating into a collection reads nothing up front.
  CollectionCreate,
}

/// Result of invoking a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
  /// The stage delegated to its collaborator(s).
  Executed,
  /// The stage returned without delegating.
  Skipped(SkipReason),
}

impl StageOutcome {
  pub fn is_executed(&self) -> bool {
    matches!(self, StageOutcome::Executed)
  }
}

/// Outcome of a full pipeline run: every stage in order with what it did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
  pub stages: Vec<(Stage, StageOutcome)>,
}

impl RunReport {
  pub(crate) fn record(&mut self, stage: Stage, outcome: StageOutcome) {
    self.stages.push((stage, outcome));
  }

  pub fn outcome(&self, stage: Stage) -> Option<StageOutcome> {
    self.stages.iter().find(|(s, _)| *s == stage).map(|(_, o)| *o)
  }

  pub fn executed(&self, stage: Stage) -> bool {
    self.outcome(stage).map_or(false, |o| o.is_executed())
  }
}
