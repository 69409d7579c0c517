//! Configuration schema types
//!
//! This module defines the configuration structure for the CDW exporter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main exporter configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdwConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Population input
    pub population: PopulationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CdwConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.export.validate()?;
        self.population.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (allocate keys but discard every row)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory the table files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// First detail key of this run; dimension keys start at
    /// `key_start / 10000`
    #[serde(default = "default_key_start")]
    pub key_start: u64,

    /// Number of persons exported concurrently
    #[serde(default = "default_parallel_persons")]
    pub parallel_persons: usize,

    /// End of the simulation (RFC 3339), defaults to the time of the run
    #[serde(default)]
    pub as_of: Option<String>,

    /// Check referential integrity of the output after finalization
    #[serde(default)]
    pub verify: bool,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.key_start == 0 {
            return Err("export.key_start must be >= 1".to_string());
        }

        if self.parallel_persons == 0 || self.parallel_persons > 256 {
            return Err(format!(
                "export.parallel_persons must be between 1 and 256, got {}",
                self.parallel_persons
            ));
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err("export.output_dir cannot be empty".to_string());
        }

        self.as_of_time()?;
        Ok(())
    }

    /// Parsed `as_of`, or `None` when the run should use the current time
    pub fn as_of_time(&self) -> Result<Option<DateTime<Utc>>, String> {
        self.as_of
            .as_deref()
            .map(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| format!("export.as_of '{raw}' is not an RFC 3339 time: {e}"))
            })
            .transpose()
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            key_start: default_key_start(),
            parallel_persons: default_parallel_persons(),
            as_of: None,
            verify: false,
        }
    }
}

/// Population input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Path of the population JSON document
    pub path: PathBuf,
}

impl PopulationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("population.path cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output/cdw")
}

fn default_key_start() -> u64 {
    1
}

fn default_parallel_persons() -> usize {
    8
}

fn default_local_path() -> String {
    "/var/log/cdw-export".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
