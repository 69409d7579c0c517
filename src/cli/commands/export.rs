//! Export command implementation
//!
//! This module implements the `export` command, which writes a population
//! into the warehouse tables.

use crate::config::load_config;
use crate::core::export::{ExportCoordinator, ExportSummary};
use crate::domain::CdwError;
use clap::Args;
use std::path::PathBuf;
use tokio::sync::watch;

/// Failures shown in full before the list is truncated
const SHOWN_FAILURES: usize = 10;

/// Arguments for the export command
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Dry run mode - allocate keys without writing any table
    #[arg(long)]
    pub dry_run: bool,

    /// Override the first detail key of this run
    #[arg(long)]
    pub key_start: Option<u64>,

    /// Override the output directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Override the population file
    #[arg(long)]
    pub population: Option<PathBuf>,

    /// Override the number of persons exported concurrently
    #[arg(long)]
    pub parallel: Option<usize>,

    /// Check referential integrity after finalization
    #[arg(long)]
    pub verify: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if let Some(key_start) = self.key_start {
            tracing::info!(key_start, "Overriding key start from CLI");
            config.export.key_start = key_start;
        }
        if let Some(dir) = &self.output_dir {
            tracing::info!(output_dir = %dir.display(), "Overriding output directory from CLI");
            config.export.output_dir = dir.clone();
        }
        if let Some(path) = &self.population {
            tracing::info!(population = %path.display(), "Overriding population from CLI");
            config.population.path = path.clone();
        }
        if let Some(parallel) = self.parallel {
            tracing::info!(parallel, "Overriding parallel persons from CLI");
            config.export.parallel_persons = parallel;
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }
        if self.verify {
            config.export.verify = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        if config.application.dry_run {
            println!("🔍 DRY RUN MODE - No table will be written");
            println!();
        }

        println!("🚀 Starting export...");
        println!("  Population: {}", config.population.path.display());
        println!("  Output: {}", config.export.output_dir.display());
        println!("  Key start: {}", config.export.key_start);
        println!();

        let coordinator = ExportCoordinator::new(config, shutdown_signal);
        let summary = match coordinator.execute_export().await {
            Ok(summary) => summary,
            Err(e @ CdwError::Setup { .. }) => {
                tracing::error!(error = %e, "Failed to open output tables");
                eprintln!("Failed to initialize export: {e}");
                return Ok(4);
            }
            Err(e @ CdwError::Configuration(_)) => {
                tracing::error!(error = %e, "Invalid configuration");
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Export failed: {e}");
                return Ok(5);
            }
        };

        print_summary(&summary);
        Ok(exit_code(&summary))
    }
}

/// Exit code for a completed run
pub fn exit_code(summary: &ExportSummary) -> i32 {
    if summary.interrupted {
        130
    } else if summary.is_successful() {
        0
    } else {
        1
    }
}

fn print_summary(summary: &ExportSummary) {
    println!();
    println!("📊 Export Summary:");
    println!("  Total Persons: {}", summary.total_persons);
    println!("  Exported: {}", summary.exported_persons);
    println!("  Skipped: {}", summary.skipped_persons);
    println!("  Failed: {}", summary.failed_persons);
    if let Some(dimensions) = &summary.dimensions {
        println!("  Dimension Rows: {}", dimensions.total_rows());
    }
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!("  Success Rate: {:.2}%", summary.success_rate());
    println!();

    if let Some(report) = &summary.verification_report {
        println!("🔍 Verification Results:");
        println!("  Checks: {}", report.total_checked);
        println!("  Passed: {}", report.passed);
        println!("  Failed: {}", report.failed);
        println!("  Skipped: {}", report.skipped);

        if !report.failures.is_empty() {
            println!();
            println!("  ⚠️  Integrity Failures:");
            for failure in report.failures.iter().take(SHOWN_FAILURES) {
                println!(
                    "    - {}.{} = {} ({})",
                    failure.table, failure.column, failure.value, failure.reason
                );
            }
            if report.failures.len() > SHOWN_FAILURES {
                println!(
                    "    ... and {} more failures",
                    report.failures.len() - SHOWN_FAILURES
                );
            }
        }
        println!();
    }

    if !summary.errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for error in summary.errors.iter().take(SHOWN_FAILURES) {
            match &error.person_id {
                Some(person) => println!("  - {person}: {}", error.message),
                None => println!("  - {}", error.message),
            }
        }
        if summary.errors.len() > SHOWN_FAILURES {
            println!("  ... and {} more errors", summary.errors.len() - SHOWN_FAILURES);
        }
        println!();
    }

    if summary.interrupted {
        println!("⚠️  Export interrupted. Dimension tables were not written.");
    } else if summary.is_successful() {
        println!("✅ Export completed successfully!");
    } else {
        println!("⚠️  Export completed with failures");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::export::FinalizeReport;
    use crate::domain::ExportErrorDetail;

    #[test]
    fn test_export_args_defaults() {
        let args = ExportArgs::default();
        assert!(!args.dry_run);
        assert!(args.key_start.is_none());
        assert!(args.output_dir.is_none());
    }

    #[test]
    fn test_exit_codes() {
        let mut summary = ExportSummary::new();
        summary.dimensions = Some(FinalizeReport::default());
        assert_eq!(exit_code(&summary), 0);

        summary.record_failure(ExportErrorDetail::new("disk full"));
        assert_eq!(exit_code(&summary), 1);

        summary.interrupted = true;
        assert_eq!(exit_code(&summary), 130);
    }
}
