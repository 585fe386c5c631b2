// api_pack/src/registry.rs

//! Defines `Collaborators`, the per-role registries an `ApiPack` is configured with,
//! and `Selected`, the snapshot of the collaborators a run actually calls.

use crate::core::collaborator::{Checker, Persister, Provider, RouteChecker, Serializer, Validator};
use crate::core::control::Role;
use std::sync::Arc;
use tracing::{event, Level};

/// Ordered registries, one per role, plus the single route-checker slot.
///
/// Registration appends. Selection always picks the first implementation
/// registered for a role; later registrations are kept (and counted by
/// [`Collaborators::count`]) but are never invoked. This is the hook for a
/// future selection policy, so the extra entries are retained on purpose.
#[derive(Clone, Default)]
pub struct Collaborators {
  pub(crate) checkers: Vec<Arc<dyn Checker>>,
  pub(crate) persisters: Vec<Arc<dyn Persister>>,
  pub(crate) providers: Vec<Arc<dyn Provider>>,
  pub(crate) serializers: Vec<Arc<dyn Serializer>>,
  pub(crate) validators: Vec<Arc<dyn Validator>>,
  pub(crate) route_checker: Option<Arc<dyn RouteChecker>>,
}

impl Collaborators {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_checker(&mut self, checker: Arc<dyn Checker>) {
    self.checkers.push(checker);
    self.log_registration(Role::Checker);
  }

  pub fn add_persister(&mut self, persister: Arc<dyn Persister>) {
    self.persisters.push(persister);
    self.log_registration(Role::Persister);
  }

  pub fn add_provider(&mut self, provider: Arc<dyn Provider>) {
    self.providers.push(provider);
    self.log_registration(Role::Provider);
  }

  pub fn add_serializer(&mut self, serializer: Arc<dyn Serializer>) {
    self.serializers.push(serializer);
    self.log_registration(Role::Serializer);
  }

  pub fn add_validator(&mut self, validator: Arc<dyn Validator>) {
    self.validators.push(validator);
    self.log_registration(Role::Validator);
  }

  /// Replaces the route checker.
  pub fn set_route_checker(&mut self, route_checker: Arc<dyn RouteChecker>) {
    if self.route_checker.replace(route_checker).is_some() {
      event!(Level::DEBUG, "Route checker replaced.");
    }
    self.log_registration(Role::RouteChecker);
  }

  /// Number of implementations registered for `role`.
  pub fn count(&self, role: Role) -> usize {
    match role {
      Role::RouteChecker => usize::from(self.route_checker.is_some()),
      Role::Provider => self.providers.len(),
      Role::Serializer => self.serializers.len(),
      Role::Checker => self.checkers.len(),
      Role::Validator => self.validators.len(),
      Role::Persister => self.persisters.len(),
    }
  }

  pub fn checker(&self) -> Option<&Arc<dyn Checker>> {
    self.checkers.first()
  }

  pub fn persister(&self) -> Option<&Arc<dyn Persister>> {
    self.persisters.first()
  }

  pub fn provider(&self) -> Option<&Arc<dyn Provider>> {
    self.providers.first()
  }

  pub fn serializer(&self) -> Option<&Arc<dyn Serializer>> {
    self.serializers.first()
  }

  pub fn validator(&self) -> Option<&Arc<dyn Validator>> {
    self.validators.first()
  }

  pub fn route_checker(&self) -> Option<&Arc<dyn RouteChecker>> {
    self.route_checker.as_ref()
  }

  /// Borrows the collaborator each role currently resolves to, without cloning.
  pub(crate) fn slots(&self) -> Slots<'_> {
    Slots {
      route_checker: self.route_checker(),
      provider: self.provider(),
      serializer: self.serializer(),
      checker: self.checker(),
      validator: self.validator(),
      persister: self.persister(),
    }
  }

  /// Captures the collaborator each role currently resolves to.
  pub fn select(&self) -> Selected {
    Selected {
      route_checker: self.route_checker().cloned(),
      provider: self.provider().cloned(),
      serializer: self.serializer().cloned(),
      checker: self.checker().cloned(),
      validator: self.validator().cloned(),
      persister: self.persister().cloned(),
    }
  }

  fn log_registration(&self, role: Role) {
    let count = self.count(role);
    if count > 1 {
      event!(Level::DEBUG, %role, count, "Additional collaborator registered; only the first one is used.");
    } else {
      event!(Level::DEBUG, %role, "Collaborator registered.");
    }
  }
}

impl std::fmt::Debug for Collaborators {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Collaborators")
      .field("checkers", &self.checkers.len())
      .field("persisters", &self.persisters.len())
      .field("providers", &self.providers.len())
      .field("serializers", &self.serializers.len())
      .field("validators", &self.validators.len())
      .field("route_checker_present", &self.route_checker.is_some())
      .finish()
  }
}

/// At most one collaborator per role: the one a pipeline run delegates to.
#[derive(Clone, Default)]
pub struct Selected {
  pub route_checker: Option<Arc<dyn RouteChecker>>,
  pub provider: Option<Arc<dyn Provider>>,
  pub serializer: Option<Arc<dyn Serializer>>,
  pub checker: Option<Arc<dyn Checker>>,
  pub validator: Option<Arc<dyn Validator>>,
  pub persister: Option<Arc<dyn Persister>>,
}

impl Selected {
  pub fn has(&self, role: Role) -> bool {
    self.slots().has(role)
  }

  pub(crate) fn slots(&self) -> Slots<'_> {
    Slots {
      route_checker: self.route_checker.as_ref(),
      provider: self.provider.as_ref(),
      serializer: self.serializer.as_ref(),
      checker: self.checker.as_ref(),
      validator: self.validator.as_ref(),
      persister: self.persister.as_ref(),
    }
  }
}

impl std::fmt::Debug for Selected {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Selected")
      .field("route_checker", &self.route_checker.is_some())
      .field("provider", &self.provider.is_some())
      .field("serializer", &self.serializer.is_some())
      .field("checker", &self.checker.is_some())
      .field("validator", &self.validator.is_some())
      .field("persister", &self.persister.is_some())
      .finish()
  }
}

/// Borrowed view over the collaborators a stage delegates to.
#[derive(Clone, Copy)]
pub(crate) struct Slots<'a> {
  pub(crate) route_checker: Option<&'a Arc<dyn RouteChecker>>,
  pub(crate) provider: Option<&'a Arc<dyn Provider>>,
  pub(crate) serializer: Option<&'a Arc<dyn Serializer>>,
  pub(crate) checker: Option<&'a Arc<dyn Checker>>,
  pub(crate) validator: Option<&'a Arc<dyn Validator>>,
  pub(crate) persister: Option<&'a Arc<dyn Persister>>,
}

impl Slots<'_> {
  pub(crate) fn has(&self, role: Role) -> bool {
    match role {
      Role::RouteChecker => self.route_checker.is_some(),
      Role::Provider => self.provider.is_some(),
      Role::Serializer => self.serializer.is_some(),
      Role::Checker => self.checker.is_some(),
      Role::Validator => self.validator.is_some(),
      Role::Persister => self.persister.is_some(),
    }
  }
}
