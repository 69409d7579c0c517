//! Integration tests for configuration loading and validation
//!
//! Tests that touch environment variables hold `ENV_MUTEX`.

use cdw_export::config::load_config;
use cdw_export::domain::CdwError;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::NamedTempFile;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    for var in [
        "CDW_APPLICATION_LOG_LEVEL",
        "CDW_APPLICATION_DRY_RUN",
        "CDW_EXPORT_KEY_START",
        "CDW_EXPORT_PARALLEL_PERSONS",
        "CDW_EXPORT_OUTPUT_DIR",
        "CDW_POPULATION_PATH",
        "TEST_CDW_POPULATION",
    ] {
        std::env::remove_var(var);
    }
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    let file = config_file(
        r#"
[application]
log_level = "debug"
dry_run = true

[export]
output_dir = "/tmp/cdw"
key_start = 1000001
parallel_persons = 4
as_of = "2021-01-01T00:00:00Z"
verify = true

[population]
path = "/data/population.json"

[logging]
local_enabled = true
local_path = "/tmp/cdw-logs"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);
    assert_eq!(config.export.output_dir, PathBuf::from("/tmp/cdw"));
    assert_eq!(config.export.key_start, 1_000_001);
    assert_eq!(config.export.parallel_persons, 4);
    assert!(config.export.verify);
    assert!(config.export.as_of_time().unwrap().is_some());
    assert_eq!(config.population.path, PathBuf::from("/data/population.json"));
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_minimal_config_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    let file = config_file("[population]\npath = \"population.json\"\n");

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "info");
    assert!(!config.application.dry_run);
    assert_eq!(config.export.key_start, 1);
    assert_eq!(config.export.parallel_persons, 8);
    assert!(config.export.as_of.is_none());
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_substitution_and_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_CDW_POPULATION", "/srv/run-7/population.json");
    std::env::set_var("CDW_EXPORT_KEY_START", "2000001");
    std::env::set_var("CDW_APPLICATION_DRY_RUN", "true");
    let file = config_file(
        r#"
[export]
key_start = 1

[population]
path = "${TEST_CDW_POPULATION}"
"#,
    );

    let config = load_config(file.path());
    cleanup_env_vars();
    let config = config.unwrap();

    assert_eq!(
        config.population.path,
        PathBuf::from("/srv/run-7/population.json")
    );
    assert_eq!(config.export.key_start, 2_000_001);
    assert!(config.application.dry_run);
}

#[test]
fn test_missing_env_var_is_configuration_error() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    let file = config_file("[population]\npath = \"${TEST_CDW_POPULATION}\"\n");

    let err = load_config(file.path()).unwrap_err();

    assert!(matches!(err, CdwError::Configuration(_)));
    assert!(err.to_string().contains("TEST_CDW_POPULATION"));
}

#[test]
fn test_invalid_values_are_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    for content in [
        "[export]\nkey_start = 0\n[population]\npath = \"p.json\"\n",
        "[export]\nparallel_persons = 0\n[population]\npath = \"p.json\"\n",
        "[application]\nlog_level = \"loud\"\n[population]\npath = \"p.json\"\n",
        "[export]\nas_of = \"yesterday\"\n[population]\npath = \"p.json\"\n",
        "[export]\nkey_start = 1\n",
    ] {
        let file = config_file(content);
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, CdwError::Configuration(_)), "accepted: {content}");
    }
}

#[test]
fn test_bad_override_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("CDW_EXPORT_PARALLEL_PERSONS", "many");
    let file = config_file("[population]\npath = \"p.json\"\n");

    let result = load_config(file.path());
    cleanup_env_vars();

    assert!(matches!(result, Err(CdwError::Configuration(_))));
}
