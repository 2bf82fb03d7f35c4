//! Integration tests for configuration loading

use apictx::config::ConfigLoader;
use apictx::error::SetupError;
use apictx::output::OutputKind;
use apictx::ApiContext;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_file_drives_context_root() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("apictx.toml");
    fs::write(
        &path,
        r#"
[runtime]
default_func_name = "hook"
output = "tracing"
thread_name_prefix = "plugin"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&path).unwrap();
    assert_eq!(config.runtime.output, OutputKind::Tracing);

    let root = ApiContext::from_config(&config.runtime);
    assert_eq!(root.run(|_| {}).function_name(), "hook");
}

#[test]
fn test_logging_section_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("apictx.toml");
    fs::write(&path, "[runtime]\n").unwrap();

    let config = ConfigLoader::load_from_file(&path).unwrap();
    assert!(config.logging.enabled);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.output, "stderr");
}

#[test]
fn test_file_output_without_path_fails_validation() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("apictx.toml");
    fs::write(&path, "[logging]\noutput = \"file\"\n").unwrap();

    let err = ConfigLoader::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SetupError::Validation(_)));
    assert!(err.to_string().contains("requires a file path"));
}

#[test]
fn test_malformed_file_is_a_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("apictx.toml");
    fs::write(&path, "[runtime\nbroken").unwrap();

    let err = ConfigLoader::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SetupError::Config(_)));
}
