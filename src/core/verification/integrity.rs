//! Referential integrity of a finalized output directory
//!
//! The verifier reads every table back and checks, per table, that the
//! header matches the catalogue and that the first column holds distinct
//! keys, then checks every declared foreign-key column against the keys of
//! the table it references. Empty values are absent references and are not
//! checked.

use super::report::{CheckKind, IntegrityFailure, VerificationReport};
use crate::core::export::tables::{self, ForeignKey, TableSpec};
use crate::domain::{CdwError, Result};
use csv::{Reader, ReaderBuilder};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Verifies the tables of one output directory
#[derive(Debug, Clone)]
pub struct IntegrityVerifier {
    output_dir: PathBuf,
}

/// Offending values found in one column
#[derive(Default)]
struct Offenders {
    first: Option<String>,
    count: usize,
}

impl Offenders {
    fn push(&mut self, value: &str) {
        if self.first.is_none() {
            self.first = Some(value.to_string());
        }
        self.count += 1;
    }

    fn into_failure(
        self,
        kind: CheckKind,
        table: &str,
        column: &str,
        reason: String,
    ) -> Option<IntegrityFailure> {
        let value = self.first?;
        Some(IntegrityFailure {
            kind,
            table: table.to_string(),
            column: column.to_string(),
            value,
            occurrences: self.count,
            reason,
        })
    }
}

impl IntegrityVerifier {
    /// Creates a verifier for `output_dir`
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    fn open(&self, spec: &TableSpec) -> Result<Option<Reader<File>>> {
        let path = self.output_dir.join(spec.file_name());
        if !path.exists() {
            return Ok(None);
        }
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::None)
            .from_path(&path)
            .map_err(|e| CdwError::Verification(format!("{}: {e}", path.display())))?;
        Ok(Some(reader))
    }

    /// Runs every check
    ///
    /// # Errors
    ///
    /// Returns [`CdwError::Verification`] if a table file exists but cannot
    /// be read. Missing table files are counted as skipped checks.
    pub fn verify(&self) -> Result<VerificationReport> {
        let start = Instant::now();
        let mut report = VerificationReport::new();

        tracing::info!(
            output_dir = %self.output_dir.display(),
            "Starting referential integrity verification"
        );

        let mut keys: HashMap<&'static str, HashSet<String>> = HashMap::new();
        for spec in tables::DETAIL_TABLES.iter().chain(tables::DIMENSION_TABLES) {
            match self.check_table(spec, &mut report)? {
                Some(table_keys) => {
                    keys.insert(spec.name, table_keys);
                }
                None => {
                    tracing::warn!(table = spec.name, "Table file missing, skipping checks");
                    report.record_skip();
                }
            }
        }

        for spec in tables::DETAIL_TABLES.iter().chain(tables::DIMENSION_TABLES) {
            let foreign_keys: Vec<&ForeignKey> = tables::FOREIGN_KEYS
                .iter()
                .filter(|fk| fk.table == spec.name)
                .collect();
            if !foreign_keys.is_empty() {
                self.check_references(spec, &foreign_keys, &keys, &mut report)?;
            }
        }

        report.set_duration(start.elapsed().as_millis() as u64);
        tracing::info!(
            checked = report.total_checked,
            passed = report.passed,
            failed = report.failed,
            skipped = report.skipped,
            "Verification completed"
        );
        Ok(report)
    }

    /// Header and primary key checks; returns the table's keys
    fn check_table(
        &self,
        spec: &TableSpec,
        report: &mut VerificationReport,
    ) -> Result<Option<HashSet<String>>> {
        let Some(mut reader) = self.open(spec)? else {
            return Ok(None);
        };

        let header = reader
            .headers()
            .map_err(|e| CdwError::Verification(format!("{}: {e}", spec.name)))?
            .clone();
        if header.iter().eq(spec.header.iter().copied()) {
            report.record_pass();
        } else {
            report.record_failure(IntegrityFailure {
                kind: CheckKind::Header,
                table: spec.name.to_string(),
                column: spec.key_column().to_string(),
                value: header.iter().collect::<Vec<_>>().join(","),
                occurrences: 1,
                reason: format!("expected header {}", spec.header.join(",")),
            });
        }

        let mut table_keys = HashSet::new();
        let mut duplicates = Offenders::default();
        for record in reader.records() {
            let record =
                record.map_err(|e| CdwError::Verification(format!("{}: {e}", spec.name)))?;
            let key = record.get(0).unwrap_or_default();
            if !table_keys.insert(key.to_string()) {
                duplicates.push(key);
            }
        }

        let reason = format!("duplicate {}", spec.key_column());
        match duplicates.into_failure(CheckKind::PrimaryKey, spec.name, spec.key_column(), reason) {
            Some(failure) => report.record_failure(failure),
            None => report.record_pass(),
        }
        Ok(Some(table_keys))
    }

    /// Foreign key checks of one referencing table
    fn check_references(
        &self,
        spec: &TableSpec,
        foreign_keys: &[&ForeignKey],
        keys: &HashMap<&'static str, HashSet<String>>,
        report: &mut VerificationReport,
    ) -> Result<()> {
        let Some(mut reader) = self.open(spec)? else {
            for _ in foreign_keys {
                report.record_skip();
            }
            return Ok(());
        };

        // Checks whose column or referenced table is unavailable are skipped
        let mut checks = Vec::new();
        for fk in foreign_keys {
            let position = spec.header.iter().position(|c| *c == fk.column);
            match (position, keys.get(fk.references)) {
                (Some(position), Some(targets)) => {
                    checks.push((*fk, position, targets, Offenders::default()));
                }
                _ => report.record_skip(),
            }
        }

        for record in reader.records() {
            let record =
                record.map_err(|e| CdwError::Verification(format!("{}: {e}", spec.name)))?;
            for (_, position, targets, offenders) in checks.iter_mut() {
                let value = record.get(*position).unwrap_or_default();
                if !value.is_empty() && !targets.contains(value) {
                    offenders.push(value);
                }
            }
        }

        for (fk, _, _, offenders) in checks {
            let reason = format!("no row in {}", fk.references);
            match offenders.into_failure(CheckKind::ForeignKey, fk.table, fk.column, reason) {
                Some(failure) => {
                    tracing::warn!(
                        table = %failure.table,
                        column = %failure.column,
                        value = %failure.value,
                        occurrences = failure.occurrences,
                        "Dangling reference"
                    );
                    report.record_failure(failure);
                }
                None => report.record_pass(),
            }
        }
        Ok(())
    }
}
