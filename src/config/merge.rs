//! Merge rules: built-in defaults underneath every other source.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

use crate::keys::DEFAULT_FUNC_NAME;

pub(super) const DEFAULT_THREAD_NAME_PREFIX: &str = "apictx-worker";

/// Create a Config builder with merge policy defaults applied.
pub(super) fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("runtime.default_func_name", DEFAULT_FUNC_NAME)?
        .set_default("runtime.output", "stdout")?
        .set_default("runtime.thread_name_prefix", DEFAULT_THREAD_NAME_PREFIX)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
