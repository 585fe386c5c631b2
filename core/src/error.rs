// api_pack/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::core::control::{Role, Stage};
use crate::core::operation::{Method, ResourceType};

#[derive(Debug, Error)]
pub enum ApiPackError {
  /// Raised by the strict pipeline when an action needs a collaborator that was never registered.
  #[error("Missing {role} collaborator required by stage '{stage}' for {method} {resource_type} operation")]
  MissingCollaborator {
    role: Role,
    stage: Stage,
    method: Method,
    resource_type: ResourceType,
  },

  #[error("Unknown HTTP method: '{0}'")]
  InvalidMethod(String),

  #[error("Unknown resource type: '{0}'")]
  InvalidResourceType(String),

  #[error("Error in collaborator. Source: {source}")]
  Collaborator {
    #[source]
    source: AnyhowError,
  },

  #[error("Configuration error for '{key}': {message}")]
  ConfigurationError { key: String, message: String },

  #[error("Internal api-pack error: {0}")]
  Internal(String),
}

impl ApiPackError {
  /// True for the strict pipeline's missing-collaborator error.
  pub fn is_missing_collaborator(&self) -> bool {
    matches!(self, ApiPackError::MissingCollaborator { .. })
  }

  /// The role named by a missing-collaborator error.
  pub fn missing_role(&self) -> Option<Role> {
    match self {
      ApiPackError::MissingCollaborator { role, .. } => Some(*role),
      _ => None,
    }
  }
}

// Lets collaborator implementations use `?` on anything anyhow can carry.
impl From<AnyhowError> for ApiPackError {
  fn from(err: AnyhowError) -> Self {
    // An ApiPackError that went through anyhow comes back out as itself.
    match err.downcast::<ApiPackError>() {
      Ok(inner) => inner,
      Err(source) => ApiPackError::Collaborator { source },
    }
  }
}

pub type ApiPackResult<T, E = ApiPackError> = std::result::Result<T, E>;
