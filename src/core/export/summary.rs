//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting export results.

use super::finalize::FinalizeReport;
use crate::core::verification::report::VerificationReport;
use crate::domain::ExportErrorDetail;
use std::time::Duration;

/// Summary of an export run
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    /// Persons read from the population
    pub total_persons: usize,

    /// Persons whose rows were written
    pub exported_persons: usize,

    /// Persons the formatter excluded
    pub skipped_persons: usize,

    /// Persons whose export failed part way
    pub failed_persons: usize,

    /// Rows per dimension table, filled in by finalization
    pub dimensions: Option<FinalizeReport>,

    /// Duration of the run
    pub duration: Duration,

    /// Errors encountered during export
    pub errors: Vec<ExportErrorDetail>,

    /// Referential integrity report (if verification was run)
    pub verification_report: Option<VerificationReport>,

    /// The run stopped on a shutdown signal before finalization
    pub interrupted: bool,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record a person-level failure
    pub fn record_failure(&mut self, error: ExportErrorDetail) {
        self.failed_persons += 1;
        self.errors.push(error);
    }

    /// Add an error that is not tied to one person
    pub fn add_error(&mut self, error: ExportErrorDetail) {
        self.errors.push(error);
    }

    /// Set the verification report
    pub fn set_verification_report(&mut self, report: VerificationReport) {
        self.verification_report = Some(report);
    }

    /// Whether the dimension tables were written
    pub fn is_finalized(&self) -> bool {
        self.dimensions.is_some()
    }

    /// Check if the export was successful (no failures)
    pub fn is_successful(&self) -> bool {
        !self.interrupted
            && self.failed_persons == 0
            && self.errors.is_empty()
            && self.is_finalized()
            && self
                .verification_report
                .as_ref()
                .map_or(true, VerificationReport::is_success)
    }

    /// Percentage of attempted persons that were exported
    pub fn success_rate(&self) -> f64 {
        let attempted = self.exported_persons + self.failed_persons;
        if attempted == 0 {
            return 100.0;
        }
        (self.exported_persons as f64 / attempted as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total_persons = self.total_persons,
            exported = self.exported_persons,
            skipped = self.skipped_persons,
            failed = self.failed_persons,
            interrupted = self.interrupted,
            dimension_rows = self.dimensions.as_ref().map_or(0, FinalizeReport::total_rows),
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Export completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len(),
                "Export completed with errors"
            );
            for error in &self.errors {
                tracing::warn!(
                    person_id = error.person_id.as_deref().unwrap_or("-"),
                    table = error.table.as_deref().unwrap_or("-"),
                    message = %error.message,
                    "Export error"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_summary_creation() {
        let summary = ExportSummary::new();

        assert_eq!(summary.total_persons, 0);
        assert_eq!(summary.exported_persons, 0);
        assert_eq!(summary.failed_persons, 0);
        assert_eq!(summary.duration, Duration::from_secs(0));
        assert!(summary.errors.is_empty());
        assert!(!summary.is_finalized());
    }

    #[test]
    fn test_export_summary_with_duration() {
        let summary = ExportSummary::new().with_duration(Duration::from_secs(120));
        assert_eq!(summary.duration, Duration::from_secs(120));
    }

    #[test]
    fn test_success_requires_finalization() {
        let mut summary = ExportSummary::new();
        summary.exported_persons = 10;
        assert!(!summary.is_successful());

        summary.dimensions = Some(FinalizeReport::default());
        assert!(summary.is_successful());

        summary.record_failure(ExportErrorDetail::new("disk full").with_person_id("p-1"));
        assert!(!summary.is_successful());
        assert_eq!(summary.failed_persons, 1);
    }

    #[test]
    fn test_success_rate_ignores_skipped() {
        let mut summary = ExportSummary::new();
        assert_eq!(summary.success_rate(), 100.0);

        summary.exported_persons = 3;
        summary.skipped_persons = 10;
        summary.failed_persons = 1;
        assert_eq!(summary.success_rate(), 75.0);
    }
}
