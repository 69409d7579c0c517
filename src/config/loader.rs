//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::CdwConfig;
use crate::domain::errors::CdwError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into CdwConfig
/// 4. Applies environment variable overrides (CDW_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`CdwError::Configuration`] if the file cannot be read or parsed,
/// a referenced environment variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use cdw_export::config::loader::load_config;
///
/// let config = load_config("cdw-export.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CdwConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CdwError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CdwError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: CdwConfig = toml::from_str(&contents)
        .map_err(|e| CdwError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        CdwError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| CdwError::Configuration(e.to_string()))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures<'_>| {
            let name = &cap[1];
            std::env::var(name).unwrap_or_else(|_| {
                if !missing_vars.iter().any(|m| m == name) {
                    missing_vars.push(name.to_string());
                }
                String::new()
            })
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(CdwError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CdwError::Configuration(format!("Invalid value '{value}' for environment variable {name}"))
    })
}

/// Applies environment variable overrides using the CDW_* prefix
///
/// Environment variables follow the pattern CDW_<SECTION>_<KEY>, for example
/// CDW_EXPORT_KEY_START or CDW_LOGGING_LOCAL_PATH.
fn apply_env_overrides(config: &mut CdwConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    // Application overrides
    if let Some(val) = var("CDW_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = var("CDW_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_override("CDW_APPLICATION_DRY_RUN", &val)?;
    }

    // Export overrides
    if let Some(val) = var("CDW_EXPORT_OUTPUT_DIR") {
        config.export.output_dir = PathBuf::from(val);
    }
    if let Some(val) = var("CDW_EXPORT_KEY_START") {
        config.export.key_start = parse_override("CDW_EXPORT_KEY_START", &val)?;
    }
    if let Some(val) = var("CDW_EXPORT_PARALLEL_PERSONS") {
        config.export.parallel_persons = parse_override("CDW_EXPORT_PARALLEL_PERSONS", &val)?;
    }
    if let Some(val) = var("CDW_EXPORT_AS_OF") {
        config.export.as_of = Some(val);
    }
    if let Some(val) = var("CDW_EXPORT_VERIFY") {
        config.export.verify = parse_override("CDW_EXPORT_VERIFY", &val)?;
    }

    // Population overrides
    if let Some(val) = var("CDW_POPULATION_PATH") {
        config.population.path = PathBuf::from(val);
    }

    // Logging overrides
    if let Some(val) = var("CDW_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("CDW_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("CDW_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = var("CDW_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
