//! Verification report structures
//!
//! This module defines the structures for reporting verification results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// Verification report containing results of post-export validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// When the verification was performed
    pub verified_at: DateTime<Utc>,

    /// Total number of checks performed
    pub total_checked: usize,

    /// Number of checks that passed
    pub passed: usize,

    /// Number of checks that failed
    pub failed: usize,

    /// Number of checks that could not run (e.g. a table file is missing)
    pub skipped: usize,

    /// List of failed checks with details
    pub failures: Vec<IntegrityFailure>,

    /// Duration of verification in milliseconds
    pub duration_ms: u64,
}

/// Kind of integrity check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// The header line matches the table's columns
    Header,
    /// Every key in a table's first column is distinct
    PrimaryKey,
    /// Every non-empty value of a column exists in the referenced table
    ForeignKey,
}

/// Details of a failed check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityFailure {
    /// Which check failed
    pub kind: CheckKind,

    /// Table holding the offending value
    pub table: String,

    /// Column holding the offending value
    pub column: String,

    /// First offending value
    pub value: String,

    /// Number of offending values in the column
    pub occurrences: usize,

    /// Reason for failure
    pub reason: String,
}

impl VerificationReport {
    /// Create a new verification report
    pub fn new() -> Self {
        Self {
            verified_at: Utc::now(),
            total_checked: 0,
            passed: 0,
            failed: 0,
            skipped: 0,
            failures: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Record a successful check
    pub fn record_pass(&mut self) {
        self.total_checked += 1;
        self.passed += 1;
    }

    /// Record a failed check
    pub fn record_failure(&mut self, failure: IntegrityFailure) {
        self.total_checked += 1;
        self.failed += 1;
        self.failures.push(failure);
    }

    /// Record a check that could not run
    pub fn record_skip(&mut self) {
        self.total_checked += 1;
        self.skipped += 1;
    }

    /// Set the duration of verification
    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    /// Check if all checks passed
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Get the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_checked == 0 {
            return 100.0;
        }
        (self.passed as f64 / self.total_checked as f64) * 100.0
    }

    /// Failures of one kind of check
    pub fn failures_of(&self, kind: CheckKind) -> impl Iterator<Item = &IntegrityFailure> {
        self.failures.iter().filter(move |f| f.kind == kind)
    }

    /// Human-readable report, failures grouped by kind of check
    pub fn format_summary(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = writeln!(
            out,
            "Integrity report ({} ms, {:.2}% passed)",
            self.duration_ms,
            self.success_rate()
        );
        let _ = writeln!(
            out,
            "  checks: {}  passed: {}  failed: {}  skipped: {}",
            self.total_checked, self.passed, self.failed, self.skipped
        );

        for kind in [CheckKind::Header, CheckKind::PrimaryKey, CheckKind::ForeignKey] {
            let mut failures = self.failures_of(kind).peekable();
            if failures.peek().is_none() {
                continue;
            }
            let _ = writeln!(out, "  {kind} failures:");
            for failure in failures {
                let _ = writeln!(
                    out,
                    "    {}.{} = {} x{}: {}",
                    failure.table, failure.column, failure.value, failure.occurrences, failure.reason
                );
            }
        }
        out
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CheckKind::Header => "header",
            CheckKind::PrimaryKey => "primary key",
            CheckKind::ForeignKey => "foreign key",
        };
        f.write_str(label)
    }
}

impl Default for VerificationReport {
    fn default() -> Self {
        Self::new()
    }
}
