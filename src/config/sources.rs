//! Configuration sources: global file, explicit file, environment.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;
use config::File;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix of environment overrides, e.g. `APICTX_RUNTIME__OUTPUT=tracing`.
pub(super) const ENV_PREFIX: &str = "APICTX";

/// Path to the global config file:
/// `$XDG_CONFIG_HOME/apictx/config.toml` or `~/.config/apictx/config.toml`.
pub(super) fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "apictx").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add the global config file to the builder if it exists.
pub(super) fn add_global_file(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    match global_config_path() {
        Some(path) if path.exists() => {
            debug!(config_path = %path.display(), "using global configuration");
            builder.add_source(File::from(path).required(false))
        }
        _ => builder,
    }
}

/// Add an explicitly requested file; it must exist.
pub(super) fn add_explicit_file(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> ConfigBuilder<DefaultState> {
    builder.add_source(File::from(path).required(true))
}

/// Add `APICTX_*` environment overrides; `__` separates nested keys.
pub(super) fn add_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    )
}
