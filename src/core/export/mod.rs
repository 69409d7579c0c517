//! Export of a population into the warehouse tables
//!
//! - [`context`] - the shared state of one run (tables, roster, formatter)
//! - [`exporter`] - per-person export into the detail tables
//! - [`finalize`] - one-time writing of the dimension tables
//! - [`coordinator`] - the population driver
//! - [`tables`] - the table catalogue and its foreign keys

mod clinical;
pub mod context;
pub mod coordinator;
mod encounter;
pub mod exporter;
pub mod finalize;
mod medication;
mod patient;
pub mod summary;
pub mod tables;

pub use context::{DetailTables, DimensionTables, RunContext, CLINICIANS, DEFAULT_DOSAGE_KEY};
pub use coordinator::ExportCoordinator;
pub use exporter::{CdwExporter, PersonOutcome};
pub use finalize::FinalizeReport;
pub use medication::duration_span;
pub use summary::ExportSummary;
