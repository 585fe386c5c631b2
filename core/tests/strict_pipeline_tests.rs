// tests/strict_pipeline_tests.rs
mod common;

use api_pack::{
  ApiPack, ApiPackError, Method, Operation, Payload, ResourceType, Role, SkipReason, Stage, StageOutcome,
  StrictApiPack, StrictParts,
};
use common::*;
use serde_json::json;
use std::sync::Arc;

fn assert_missing(result: Result<impl std::fmt::Debug, ApiPackError>, expected_role: Role, expected_stage: Stage) {
  match result {
    Err(ApiPackError::MissingCollaborator { role, stage, .. }) => {
      assert_eq!(role, expected_role);
      assert_eq!(stage, expected_stage);
    }
    other => panic!("Expected MissingCollaborator({}, {}), got {:?}", expected_role, expected_stage, other),
  }
}

#[tokio::test]
async fn test_strict_reports_missing_route_checker() {
  setup_tracing();
  let pack = ApiPack::new();
  let mut strict = pack.strictify(Operation::new(Method::Get, ResourceType::Item));

  assert_missing(strict.check_route().await, Role::RouteChecker, Stage::CheckRoute);
}

#[tokio::test]
async fn test_strict_read_requires_provider_except_collection_create() {
  setup_tracing();
  let pack = ApiPack::new();

  let mut strict = pack.strictify(Operation::new(Method::Get, ResourceType::Collection));
  assert_missing(strict.read().await, Role::Provider, Stage::Read);

  let mut create = pack.strictify(Operation::new(Method::Post, ResourceType::Collection));
  assert_eq!(
    create.read().await.unwrap(),
    StageOutcome::Skipped(SkipReason::CollectionCreate)
  );
}

#[tokio::test]
async fn test_strict_read_still_absorbs_provider_failure() {
  setup_tracing();
  let log = CallLog::new();
  let mut pack = ApiPack::new();
  pack.provider(RecordingProvider::new(&log).failing());
  let mut strict = pack.strictify(Operation::new(Method::Get, ResourceType::Item));

  assert_eq!(strict.read().await.unwrap(), StageOutcome::Executed);
  assert_eq!(strict.operation().data, None);
}

#[tokio::test]
async fn test_strict_deserialize_requires_provider_then_serializer() {
  setup_tracing();
  let log = CallLog::new();
  let body = payload(json!({"name": "a"}));

  let empty = ApiPack::new();
  let mut strict = empty.strictify(Operation::new(Method::Post, ResourceType::Item));
  assert_missing(strict.deserialize(&body).await, Role::Provider, Stage::Deserialize);

  let mut provider_only = ApiPack::new();
  provider_only.provider(RecordingProvider::new(&log));
  let mut strict = provider_only.strictify(Operation::new(Method::Post, ResourceType::Item));
  assert_missing(strict.deserialize(&body).await, Role::Serializer, Stage::Deserialize);
  assert_eq!(log.entries(), vec!["provider:get_instance"]);

  // With data already present, only the serializer is needed.
  let mut strict = empty.strictify(Operation::new(Method::Patch, ResourceType::Item).with_data(json!({"id": 1})));
  assert_missing(strict.deserialize(&body).await, Role::Serializer, Stage::Deserialize);
}

#[tokio::test]
async fn test_strict_keeps_method_and_payload_skips() {
  setup_tracing();
  let pack = ApiPack::new();

  let mut get = pack.strictify(Operation::new(Method::Get, ResourceType::Item).with_data(json!({"id": 1})));
  assert_eq!(
    get.deserialize(&payload(json!({"x": 1}))).await.unwrap(),
    StageOutcome::Skipped(SkipReason::MethodExcluded)
  );
  assert_eq!(get.validate().await.unwrap(), StageOutcome::Skipped(SkipReason::MethodExcluded));
  assert_eq!(get.write().await.unwrap(), StageOutcome::Skipped(SkipReason::MethodExcluded));

  let mut put = pack.strictify(Operation::new(Method::Put, ResourceType::Item));
  assert_eq!(
    put.deserialize(&Payload::new()).await.unwrap(),
    StageOutcome::Skipped(SkipReason::EmptyPayload)
  );
  assert_eq!(put.check().await.unwrap(), StageOutcome::Skipped(SkipReason::NoData));
  assert_eq!(put.serialize().await.unwrap(), StageOutcome::Skipped(SkipReason::NoData));
}

#[tokio::test]
async fn test_strict_requires_checker_validator_persister_serializer_when_acting() {
  setup_tracing();
  let pack = ApiPack::new();
  let mut strict = pack.strictify(Operation::new(Method::Delete, ResourceType::Item).with_data(json!({"id": 1})));

  assert_missing(strict.check().await, Role::Checker, Stage::Check);
  assert_missing(strict.write().await, Role::Persister, Stage::Write);
  assert_missing(strict.serialize().await, Role::Serializer, Stage::Serialize);

  let mut post = pack.strictify(Operation::new(Method::Post, ResourceType::Item));
  assert_missing(post.validate().await, Role::Validator, Stage::Validate);
}

#[tokio::test]
async fn test_strict_missing_collaborator_error_message() {
  setup_tracing();
  let pack = ApiPack::new();
  let mut strict = pack.strictify(Operation::parse("patch", "item").unwrap());

  let err = strict.write().await.unwrap_err();

  assert!(err.is_missing_collaborator());
  assert_eq!(err.missing_role(), Some(Role::Persister));
  assert_eq!(
    err.to_string(),
    "Missing persister collaborator required by stage 'write' for PATCH ITEM operation"
  );
}

#[tokio::test]
async fn test_ensure_ready_reports_first_missing_in_stage_order() {
  setup_tracing();
  let log = CallLog::new();
  let mut pack = ApiPack::new();
  pack.route_checker(RecordingRouteChecker::new(&log)).provider(RecordingProvider::new(&log));

  let strict = pack.strictify(Operation::new(Method::Post, ResourceType::Item));
  assert_missing(strict.ensure_ready(&payload(json!({"name": "a"}))), Role::Serializer, Stage::Deserialize);
  // Without a body nothing needs deserializing, so the validator is next.
  assert_missing(strict.ensure_ready(&Payload::new()), Role::Validator, Stage::Validate);

  let get = pack.strictify(Operation::new(Method::Get, ResourceType::Collection));
  assert!(get.ensure_ready(&Payload::new()).is_ok());
}

#[tokio::test]
async fn test_strict_run_fails_before_any_stage_when_unready() {
  setup_tracing();
  let log = CallLog::new();
  let mut pack = ApiPack::new();
  pack
    .route_checker(RecordingRouteChecker::new(&log))
    .provider(RecordingProvider::new(&log))
    .serializer(RecordingSerializer::new(&log));
  let mut strict = pack.strictify(Operation::new(Method::Put, ResourceType::Item));

  let result = strict.run(&payload(json!({"name": "b"}))).await;

  assert_missing(result, Role::Validator, Stage::Validate);
  assert!(log.is_empty(), "no collaborator may run when the pipeline is unready");
}

#[tokio::test]
async fn test_strict_run_completes_with_all_collaborators() {
  setup_tracing();
  let log = CallLog::new();
  let pack = full_pack(&log);
  let mut strict = pack.strictify(Operation::new(Method::Put, ResourceType::Item).with_attribute("id", 1));

  let report = strict.run(&payload(json!({"name": "renamed"}))).await.unwrap();

  assert!(Stage::ORDER.iter().all(|s| report.executed(*s)));
  let op = strict.into_operation();
  assert_eq!(op.data, Some(json!({"serialized": {"id": 1, "name": "renamed"}})));
  assert_eq!(op.attribute("id"), Some(&json!(1)));
}

#[tokio::test]
async fn test_strictify_captures_collaborators_at_construction() {
  setup_tracing();
  let log = CallLog::new();
  let mut pack = ApiPack::new();
  let mut strict = pack.strictify(Operation::new(Method::Get, ResourceType::Item));

  pack.provider(RecordingProvider::new(&log));

  assert_missing(strict.read().await, Role::Provider, Stage::Read);
  assert!(log.is_empty());
}

#[tokio::test]
async fn test_strict_from_parts() {
  setup_tracing();
  let log = CallLog::new();
  let mut strict = StrictApiPack::new(StrictParts {
    operation: Operation::new(Method::Get, ResourceType::Item),
    provider: Some(Arc::new(RecordingProvider::new(&log))),
    checker: Some(Arc::new(RecordingChecker::new(&log).denying())),
    ..Default::default()
  });

  strict.read().await.unwrap();
  assert!(strict.check().await.is_err());
  assert_eq!(strict.errors("forbidden").map(|e| e.len()), Some(1));
  assert_eq!(log.entries(), vec!["provider:get_item", "checker:check"]);
}
