// api_pack/src/config.rs

use crate::error::{ApiPackError, ApiPackResult};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Environment variable selecting the pipeline mode.
pub const MODE_ENV_VAR: &str = "API_PACK_MODE";

/// How `ApiPack::process` treats collaborators that were never registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineMode {
  /// Skip stages whose collaborator is missing.
  #[default]
  Permissive,
  /// Fail with `ApiPackError::MissingCollaborator` instead of skipping.
  Strict,
}

impl FromStr for PipelineMode {
  type Err = ApiPackError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "permissive" | "lenient" => Ok(PipelineMode::Permissive),
      "strict" => Ok(PipelineMode::Strict),
      other => Err(ApiPackError::ConfigurationError {
        key: MODE_ENV_VAR.to_string(),
        message: format!("expected 'permissive' or 'strict', got '{}'", other),
      }),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApiPackConfig {
  pub mode: PipelineMode,
}

impl ApiPackConfig {
  pub fn permissive() -> Self {
    Self {
      mode: PipelineMode::Permissive,
    }
  }

  pub fn strict() -> Self {
    Self {
      mode: PipelineMode::Strict,
    }
  }

  /// Reads the configuration from the environment, loading `.env` first if present.
  /// An unset `API_PACK_MODE` means permissive.
  pub fn from_env() -> ApiPackResult<Self> {
    dotenv().ok(); // Load .env file if present

    let mode = match env::var(MODE_ENV_VAR) {
      Ok(raw) => raw.parse::<PipelineMode>()?,
      Err(env::VarError::NotPresent) => PipelineMode::default(),
      Err(e) => {
        return Err(ApiPackError::ConfigurationError {
          key: MODE_ENV_VAR.to_string(),
          message: e.to_string(),
        })
      }
    };

    tracing::debug!(?mode, "api-pack configuration loaded.");
    Ok(Self { mode })
  }
}
