//! Init command implementation
//!
//! Generates a sample configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "cdw-export.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing CDW export configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(()) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Point [population] path at your population file");
                println!("  2. Pick a key_start that does not overlap other runs");
                println!("  3. Validate configuration: cdw-export validate-config");
                println!("  4. Run export: cdw-export export");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    fn sample_config() -> &'static str {
        r#"# CDW Export Configuration File
# Values may reference environment variables as ${VAR}.
# Every key can also be overridden with CDW_<SECTION>_<KEY>.

[application]
log_level = "info"      # trace | debug | info | warn | error
dry_run = false         # allocate keys without writing any table

[export]
output_dir = "./output/cdw"

# First detail key of this run. Runs that share a warehouse must use
# disjoint ranges, e.g. 1 and 1000001.
key_start = 1

# Persons exported concurrently (1-256)
parallel_persons = 8

# Reference time for ages and active records (RFC 3339).
# Defaults to the time the run starts.
# as_of = "2021-01-01T00:00:00Z"

# Check primary and foreign keys once the dimension tables are written
verify = false

[population]
path = "./population.json"

[logging]
local_enabled = false
local_path = "/var/log/cdw-export"
local_rotation = "daily"  # daily | hourly | never
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CdwConfig;
    use tempfile::TempDir;

    #[test]
    fn test_sample_config_is_valid() {
        let config: CdwConfig = toml::from_str(InitArgs::sample_config()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.export.key_start, 1);
        assert_eq!(config.export.parallel_persons, 8);
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("cdw-export.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");

        let forced = InitArgs {
            force: true,
            ..args
        };
        assert_eq!(forced.execute().await.unwrap(), 0);
        assert!(fs::read_to_string(&output).unwrap().contains("[population]"));
    }
}
