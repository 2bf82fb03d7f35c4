//! Configuration System
//!
//! Layered configuration for hosts embedding the context runtime. Sources are
//! merged lowest to highest: built-in defaults, the global config file, an
//! explicitly given file, then `APICTX_*` environment variables.

use crate::error::SetupError;
use crate::logging::{LoggingConfig, LOG_FORMATS, LOG_LEVELS};
use crate::output::OutputKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge;
mod sources;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiCtxConfig {
    /// Context runtime settings
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings applied to every context tree created from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Function name used by `run` and `run_concurrent_default`
    #[serde(default = "default_func_name")]
    pub default_func_name: String,

    /// Where `ApiContext::output` writes
    #[serde(default)]
    pub output: OutputKind,

    /// Prefix of the names given to concurrent worker threads
    #[serde(default = "default_thread_name_prefix")]
    pub thread_name_prefix: String,
}

fn default_func_name() -> String {
    crate::keys::DEFAULT_FUNC_NAME.to_string()
}

fn default_thread_name_prefix() -> String {
    merge::DEFAULT_THREAD_NAME_PREFIX.to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_func_name: default_func_name(),
            output: OutputKind::default(),
            thread_name_prefix: default_thread_name_prefix(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Runtime(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Runtime(msg) => write!(f, "Runtime: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl RuntimeConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.default_func_name.trim().is_empty() {
            return Err("default_func_name cannot be empty".to_string());
        }
        if self.thread_name_prefix.trim().is_empty() {
            return Err("thread_name_prefix cannot be empty".to_string());
        }
        if self.thread_name_prefix.contains('\0') {
            return Err("thread_name_prefix cannot contain NUL bytes".to_string());
        }
        Ok(())
    }
}

impl ApiCtxConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.runtime.validate() {
            errors.push(ValidationError::Runtime(e));
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ValidationError::Logging(format!(
                "unknown level '{}'",
                self.logging.level
            )));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            errors.push(ValidationError::Logging(format!(
                "unknown format '{}'",
                self.logging.format
            )));
        }
        if self.logging.output == "file" && self.logging.file.is_none() {
            errors.push(ValidationError::Logging(
                "output 'file' requires a file path".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, SetupError> {
        toml::to_string_pretty(self).map_err(|e| SetupError::Config(e.to_string()))
    }
}

/// Loads [`ApiCtxConfig`] from the layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Global config file location, if a home directory can be determined.
    pub fn global_config_path() -> Option<PathBuf> {
        sources::global_config_path()
    }

    /// Load defaults, the global file, `explicit` (if given) and environment
    /// overrides, then validate.
    pub fn load(explicit: Option<&Path>) -> Result<ApiCtxConfig, SetupError> {
        let mut builder = merge::builder_with_defaults()?;
        builder = sources::add_global_file(builder);
        if let Some(path) = explicit {
            builder = sources::add_explicit_file(builder, path);
        }
        builder = sources::add_environment(builder);

        let config: ApiCtxConfig = builder.build()?.try_deserialize()?;
        Self::validated(config)
    }

    /// Load defaults plus a single file, ignoring the global file and the
    /// environment.
    pub fn load_from_file(path: &Path) -> Result<ApiCtxConfig, SetupError> {
        let builder = sources::add_explicit_file(merge::builder_with_defaults()?, path);
        let config: ApiCtxConfig = builder.build()?.try_deserialize()?;
        Self::validated(config)
    }

    fn validated(config: ApiCtxConfig) -> Result<ApiCtxConfig, SetupError> {
        config.validate().map_err(|errors| {
            SetupError::Validation(errors.iter().map(ToString::to_string).collect())
        })?;
        Ok(config)
    }
}
