// api_pack/src/pipeline/definition.rs

//! Contains the `ApiPack` struct and its fluent collaborator registration.

use crate::config::ApiPackConfig;
use crate::core::collaborator::{Checker, Persister, Provider, RouteChecker, Serializer, Validator};
use crate::registry::Collaborators;
use std::sync::Arc;

/// The permissive CRUD pipeline.
///
/// Configure it once with chained registration calls, then run any number of
/// operations through it. Stage methods take `&self`, so a configured pack can
/// be shared behind an `Arc` while each request owns its own `Operation`.
///
/// ```ignore
/// let mut pack = ApiPack::new();
/// pack.provider(MyProvider).serializer(MySerializer).persister(MyPersister);
/// let report = pack.run(&mut operation, &payload).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ApiPack {
  pub(crate) collaborators: Collaborators,
  pub(crate) config: ApiPackConfig,
}

impl ApiPack {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_config(config: ApiPackConfig) -> Self {
    Self {
      collaborators: Collaborators::new(),
      config,
    }
  }

  pub fn from_collaborators(collaborators: Collaborators, config: ApiPackConfig) -> Self {
    Self { collaborators, config }
  }

  pub fn config(&self) -> &ApiPackConfig {
    &self.config
  }

  pub fn collaborators(&self) -> &Collaborators {
    &self.collaborators
  }

  // --- Fluent registration ---
  // Only the first registration per role is ever called; see `Collaborators`.

  pub fn checker(&mut self, checker: impl Checker) -> &mut Self {
    self.collaborators.add_checker(Arc::new(checker));
    self
  }

  pub fn persister(&mut self, persister: impl Persister) -> &mut Self {
    self.collaborators.add_persister(Arc::new(persister));
    self
  }

  pub fn provider(&mut self, provider: impl Provider) -> &mut Self {
    self.collaborators.add_provider(Arc::new(provider));
    self
  }

  pub fn serializer(&mut self, serializer: impl Serializer) -> &mut Self {
    self.collaborators.add_serializer(Arc::new(serializer));
    self
  }

  pub fn validator(&mut self, validator: impl Validator) -> &mut Self {
    self.collaborators.add_validator(Arc::new(validator));
    self
  }

  pub fn route_checker(&mut self, route_checker: impl RouteChecker) -> &mut Self {
    self.collaborators.set_route_checker(Arc::new(route_checker));
    self
  }
}
