//! Export coordinator - main orchestrator for the export process
//!
//! The coordinator builds the run context, exports every person of the
//! population on a bounded pool of blocking workers, finalizes the dimension
//! tables once all persons are done, and optionally verifies the output.
//!
//! A shutdown signal stops dispatching new persons. Persons already in flight
//! complete, but the run is not finalized: the detail files keep the rows of
//! every finished person and no dimension file is written.

use super::context::RunContext;
use super::exporter::{CdwExporter, PersonOutcome};
use super::summary::ExportSummary;
use crate::adapters::population::{load_population, Population};
use crate::config::CdwConfig;
use crate::core::format::CdwFormatter;
use crate::core::keys::KeySpace;
use crate::core::verification::IntegrityVerifier;
use crate::domain::{CdwError, ExportErrorDetail, PersonId, Result};
use crate::{log_error_with_context, log_finalize_complete, log_person_export, log_progress};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Semaphore};
use tokio::task::{JoinError, JoinSet};

/// Persons between two progress log lines
const PROGRESS_INTERVAL: usize = 1000;

type PersonResult = (PersonId, Result<PersonOutcome>, Duration);

/// Export coordinator
pub struct ExportCoordinator {
    config: CdwConfig,
    shutdown_signal: watch::Receiver<bool>,
}

impl ExportCoordinator {
    /// Create a new export coordinator
    pub fn new(config: CdwConfig, shutdown_signal: watch::Receiver<bool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    fn is_shutdown_requested(&self) -> bool {
        *self.shutdown_signal.borrow()
    }

    /// Opens the output tables of a new run
    ///
    /// # Errors
    ///
    /// Returns [`CdwError::Setup`] if an output file cannot be opened and
    /// [`CdwError::Configuration`] for an invalid key start.
    pub fn build_context(&self) -> Result<RunContext> {
        let key_space = KeySpace::new(self.config.export.key_start)?;
        let formatter = Arc::new(CdwFormatter::new());
        if self.config.application.dry_run {
            tracing::info!("Dry run mode enabled - rows are discarded");
            return Ok(RunContext::dry_run(key_space, formatter));
        }
        RunContext::with_formatter(&self.config.export.output_dir, key_space, formatter)
    }

    /// Loads the configured population and exports it
    ///
    /// # Errors
    ///
    /// Fails only when the run cannot start or cannot be finalized; per-person
    /// failures are recorded in the summary.
    pub async fn execute_export(&self) -> Result<ExportSummary> {
        let path = self.config.population.path.clone();
        let population = tokio::task::spawn_blocking(move || load_population(path))
            .await
            .map_err(join_error)??;
        self.export_population(population).await
    }

    /// Exports every person of `population`
    ///
    /// This is the main entry point for the export process. It:
    /// 1. Opens every detail table (a setup failure aborts the run)
    /// 2. Exports persons concurrently, recording per-person failures
    /// 3. Finalizes the dimension tables once every person is done
    /// 4. Verifies referential integrity if enabled
    pub async fn export_population(&self, population: Population) -> Result<ExportSummary> {
        let start_time = Instant::now();
        let mut summary = ExportSummary::new();
        summary.total_persons = population.len();

        let as_of = self.as_of()?;
        let context = Arc::new(self.build_context()?);
        let exporter = CdwExporter::new(context.clone());
        let parallel = self.config.export.parallel_persons.max(1);

        tracing::info!(
            persons = summary.total_persons,
            parallel_persons = parallel,
            key_start = context.key_space().detail_start(),
            as_of = %as_of,
            "Starting export"
        );

        let semaphore = Arc::new(Semaphore::new(parallel));
        let mut tasks: JoinSet<PersonResult> = JoinSet::new();
        let mut done = 0;

        for person in population.persons {
            if self.is_shutdown_requested() {
                tracing::warn!("Shutdown requested, no further persons will be exported");
                summary.interrupted = true;
                break;
            }

            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| CdwError::Io(format!("worker pool closed: {e}")))?;
            let exporter = exporter.clone();
            tasks.spawn_blocking(move || {
                let _permit = permit;
                let started = Instant::now();
                let result = exporter.export_person(&person, as_of);
                (person.id, result, started.elapsed())
            });

            while let Some(finished) = tasks.try_join_next() {
                done += 1;
                record(&mut summary, finished, done);
            }
        }

        while let Some(finished) = tasks.join_next().await {
            done += 1;
            record(&mut summary, finished, done);
        }

        if summary.interrupted {
            tracing::warn!(
                exported = summary.exported_persons,
                "Export interrupted before finalization; dimension tables were not written"
            );
            context.detail().flush_all()?;
            summary = summary.with_duration(start_time.elapsed());
            summary.log_summary();
            return Ok(summary);
        }

        let finalize_started = Instant::now();
        let finalizing = context.clone();
        let report = tokio::task::spawn_blocking(move || finalizing.finalize())
            .await
            .map_err(join_error)??;
        log_finalize_complete!(
            report.tables.len(),
            report.total_rows(),
            finalize_started.elapsed()
        );
        summary.dimensions = Some(report);

        if self.config.export.verify {
            self.verify(&context, &mut summary).await;
        }

        summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    fn as_of(&self) -> Result<DateTime<Utc>> {
        let configured = self
            .config
            .export
            .as_of_time()
            .map_err(CdwError::Configuration)?;
        Ok(configured.unwrap_or_else(Utc::now))
    }

    async fn verify(&self, context: &RunContext, summary: &mut ExportSummary) {
        let Some(dir) = context.output_dir() else {
            tracing::warn!("Verification is enabled but a dry run writes no output");
            return;
        };

        tracing::info!("Running post-export verification");
        let verifier = IntegrityVerifier::new(dir);
        match tokio::task::spawn_blocking(move || verifier.verify()).await {
            Ok(Ok(report)) => {
                if !report.is_success() {
                    tracing::warn!(
                        failed_count = report.failed,
                        "Verification found dangling or duplicate keys"
                    );
                }
                summary.set_verification_report(report);
            }
            Ok(Err(e)) => {
                log_error_with_context!(e, "Verification failed");
                summary.add_error(ExportErrorDetail::new(format!("Verification failed: {e}")));
            }
            Err(e) => {
                tracing::error!(error = %e, "Verification task failed");
                summary.add_error(ExportErrorDetail::new(format!("Verification failed: {e}")));
            }
        }
    }
}

fn join_error(e: JoinError) -> CdwError {
    CdwError::Io(format!("worker task failed: {e}"))
}

fn record(
    summary: &mut ExportSummary,
    finished: std::result::Result<PersonResult, JoinError>,
    done: usize,
) {
    match finished {
        Ok((person_id, Ok(outcome), elapsed)) => match outcome {
            PersonOutcome::Exported { .. } => {
                summary.exported_persons += 1;
                log_person_export!(&person_id, "exported", elapsed);
            }
            PersonOutcome::Skipped => {
                summary.skipped_persons += 1;
                log_person_export!(&person_id, "skipped", elapsed);
            }
        },
        Ok((person_id, Err(e), _)) => {
            tracing::error!(person_id = %person_id, error = %e, "Failed to export person");
            let mut detail = ExportErrorDetail::new(e.to_string()).with_person_id(person_id.as_str());
            if let CdwError::Write { table, .. } = &e {
                detail = detail.with_table(table.clone());
            }
            summary.record_failure(detail);
        }
        Err(e) => {
            tracing::error!(error = %e, "Person export task failed");
            summary.record_failure(ExportErrorDetail::new(format!("worker task failed: {e}")));
        }
    }

    if done % PROGRESS_INTERVAL == 0 {
        log_progress!(done, summary.total_persons);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{
        ApplicationConfig, ExportConfig, LoggingConfig, PopulationConfig,
    };
    use std::path::Path;
    use tempfile::TempDir;

    fn config(output_dir: &Path, dry_run: bool) -> CdwConfig {
        CdwConfig {
            application: ApplicationConfig {
                dry_run,
                ..ApplicationConfig::default()
            },
            export: ExportConfig {
                output_dir: output_dir.to_path_buf(),
                key_start: 50_000,
                parallel_persons: 1,
                as_of: Some("2021-01-01T00:00:00Z".to_string()),
                verify: true,
            },
            population: PopulationConfig {
                path: output_dir.join("population.json"),
            },
            logging: LoggingConfig::default(),
        }
    }

    const POPULATION: &str = r#"{
        "providers": [{ "id": "prov-1", "name": "General Hospital", "state": "MA" }],
        "persons": [
            {
                "id": "p-1", "seed": 1, "veteran": "vietnam",
                "name": { "first": "Ann", "last": "Smith" },
                "birth_date": "1950-04-01T00:00:00Z",
                "encounters": [{
                    "start": "2020-01-01T10:00:00Z", "stop": "2020-01-01T10:30:00Z",
                    "provider_id": "prov-1",
                    "conditions": [{ "start": "2020-01-01T10:00:00Z",
                                     "codes": [{ "code": "44054006", "display": "Diabetes" }] }]
                }]
            },
            {
                "id": "p-2", "seed": 2,
                "name": { "first": "Bob", "last": "Jones" },
                "birth_date": "1960-04-01T00:00:00Z"
            }
        ]
    }"#;

    #[tokio::test]
    async fn test_export_population_finalizes_and_verifies() {
        let dir = TempDir::new().unwrap();
        let (_tx, rx) = watch::channel(false);
        let coordinator = ExportCoordinator::new(config(dir.path(), false), rx);

        let population = Population::from_json(POPULATION).unwrap();
        let summary = coordinator.export_population(population).await.unwrap();

        assert_eq!(summary.total_persons, 2);
        assert_eq!(summary.exported_persons, 1);
        assert_eq!(summary.skipped_persons, 1);
        assert!(summary.is_finalized());
        assert!(summary.verification_report.as_ref().unwrap().is_success());
        assert!(summary.is_successful());
        assert!(dir.path().join("location.csv").exists());
    }

    #[tokio::test]
    async fn test_shutdown_before_start_skips_finalization() {
        let dir = TempDir::new().unwrap();
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let coordinator = ExportCoordinator::new(config(dir.path(), false), rx);

        let population = Population::from_json(POPULATION).unwrap();
        let summary = coordinator.export_population(population).await.unwrap();

        assert!(summary.interrupted);
        assert!(!summary.is_finalized());
        assert!(dir.path().join("spatient.csv").exists());
        assert!(!dir.path().join("location.csv").exists());
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let (_tx, rx) = watch::channel(false);
        let coordinator = ExportCoordinator::new(config(&out, true), rx);

        let population = Population::from_json(POPULATION).unwrap();
        let summary = coordinator.export_population(population).await.unwrap();

        assert_eq!(summary.exported_persons, 1);
        assert!(summary.is_finalized());
        assert!(summary.verification_report.is_none());
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_setup_failure_aborts() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let (_tx, rx) = watch::channel(false);
        let coordinator = ExportCoordinator::new(config(&blocker, false), rx);

        let err = coordinator
            .export_population(Population::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CdwError::Setup { .. }));
    }
}
