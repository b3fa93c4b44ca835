//! SessionConfig - settings for one debugger session.
//!
//! Loaded from an optional JSON file; every field has a default so an empty
//! object (or no file at all) is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::types::{ApiError, DEFAULT_EXECUTION_CONTEXT_NAME};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Directory relative script paths are resolved against
    pub base_dir: String,
    /// Display name of the well-known execution context
    pub execution_context_name: String,
    /// Log filter (env_logger syntax); `RUST_LOG` applies when unset
    pub log_level: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_dir: ".".to_string(),
            execution_context_name: DEFAULT_EXECUTION_CONTEXT_NAME.to_string(),
            log_level: None,
        }
    }
}

impl SessionConfig {
    /// Read a config file.
    ///
    /// # Returns
    /// * `Ok(SessionConfig)` - Parsed config, defaults filled in
    /// * `Err(ApiError)` - File unreadable or not valid config JSON
    pub fn from_file(path: &Path) -> Result<Self, ApiError> {
        let text = std::fs::read_to_string(path).map_err(|e| ApiError::IoError {
            message: format!("Failed to read config '{}': {e}", path.display()),
        })?;
        Self::from_json(&text).map_err(|e| match e {
            ApiError::InvalidInput { message } => ApiError::InvalidInput {
                message: format!("{} ({message})", path.display()),
            },
            other => other,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, ApiError> {
        let config: SessionConfig =
            serde_json::from_str(text).map_err(|e| ApiError::InvalidInput {
                message: format!("Invalid session config: {e}"),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.execution_context_name.trim().is_empty() {
            return Err(ApiError::InvalidInput {
                message: "Execution context name cannot be empty".to_string(),
            });
        }
        if self.base_dir.trim().is_empty() {
            return Err(ApiError::InvalidInput {
                message: "Base directory cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// File helpers scoped to the configured base directory.
    #[cfg(unix)]
    pub fn fs_binding(&self) -> crate::runtime::fs::FsBinding {
        crate::runtime::fs::FsBinding::new(self.base_dir.clone())
    }
}
