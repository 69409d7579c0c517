//! Dimension table finalization
//!
//! Detail tables are written while the run progresses; dimension tables can
//! only be written once every person has been exported, because any person
//! may still add a row. Finalization happens exactly once per run.

use super::context::RunContext;
use crate::domain::{CdwError, Result};
use std::fs::File;
use std::io;
use std::sync::atomic::Ordering;
use tracing::debug;

/// Rows written per dimension table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizeReport {
    /// Table name and row count, in finalization order
    pub tables: Vec<(String, usize)>,
}

impl FinalizeReport {
    /// Total dimension rows written
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|(_, rows)| rows).sum()
    }

    /// Row count of one table
    pub fn rows(&self, table: &str) -> Option<usize> {
        self.tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, rows)| *rows)
    }
}

impl RunContext {
    /// Closes the detail tables and writes every dimension table
    ///
    /// Each dimension table goes to `<output_dir>/<table>.csv`, header first,
    /// then its rows in first-seen order. A dry run writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CdwError::AlreadyFinalized`] on a second call, a setup
    /// failure if a dimension file cannot be created, or a write failure.
    pub fn finalize(&self) -> Result<FinalizeReport> {
        if self.finalized.swap(true, Ordering::AcqRel) {
            return Err(CdwError::AlreadyFinalized);
        }

        self.detail().close_all()?;

        let mut report = FinalizeReport::default();
        for table in self.dimensions().all() {
            let rows = match self.output_dir() {
                Some(dir) => {
                    let path = dir.join(format!("{}.csv", table.name()));
                    let file = File::create(&path)
                        .map_err(|e| CdwError::setup(path.display().to_string(), e))?;
                    table.write(file)?
                }
                None => table.write(io::sink())?,
            };
            debug!(table = table.name(), rows, "Wrote dimension table");
            report.tables.push((table.name().to_string(), rows));
        }

        debug!(
            tables = report.tables.len(),
            rows = report.total_rows(),
            "Dimension tables finalized"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::export::tables::DIMENSION_TABLES;
    use crate::core::keys::KeySpace;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_finalize_writes_every_dimension_table_once() {
        let dir = TempDir::new().unwrap();
        let ctx = RunContext::create(dir.path(), KeySpace::new(1).unwrap()).unwrap();
        ctx.dimensions()
            .location
            .add_fact("prov-1", vec!["General Hospital".to_string()]);

        let report = ctx.finalize().unwrap();
        assert_eq!(report.tables.len(), DIMENSION_TABLES.len());
        assert_eq!(report.rows("sstaff"), Some(100));
        assert_eq!(report.rows("location"), Some(1));
        assert_eq!(report.rows("dosageform"), Some(1));

        for spec in DIMENSION_TABLES {
            assert!(dir.path().join(spec.file_name()).exists());
        }
        let location = fs::read_to_string(dir.path().join("location.csv")).unwrap();
        assert_eq!(location, "LocationSID,LocationName\n0,General Hospital\n");

        assert!(matches!(ctx.finalize(), Err(CdwError::AlreadyFinalized)));
        assert!(ctx.is_finalized());
    }

    #[test]
    fn test_dry_run_finalize_writes_nothing() {
        let ctx = RunContext::dry_run(
            KeySpace::default(),
            std::sync::Arc::new(crate::core::format::CdwFormatter),
        );
        let report = ctx.finalize().unwrap();
        assert_eq!(report.rows("sstaff"), Some(100));
        assert!(ctx.output_dir().is_none());
    }
}
