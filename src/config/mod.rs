//! Configuration management for the CDW exporter.
//!
//! The exporter is configured from a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CDW_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation of every section
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cdw_export::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("cdw-export.toml")?;
//!
//! println!("Output: {}", config.export.output_dir.display());
//! println!("Key start: {}", config.export.key_start);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [export]
//! output_dir = "${CDW_OUTPUT_ROOT}/shard-2"
//! key_start = 1000001
//! parallel_persons = 8
//! verify = true
//!
//! [population]
//! path = "population.json"
//! ```
//!
//! Shards that write into the same warehouse must be given key starts far
//! enough apart that their detail ranges never meet.

pub mod loader;
pub mod schema;

pub use loader::load_config;
pub use schema::{ApplicationConfig, CdwConfig, ExportConfig, LoggingConfig, PopulationConfig};
