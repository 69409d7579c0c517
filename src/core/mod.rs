//! Core export logic.
//!
//! # Modules
//!
//! - [`keys`] - surrogate key allocation and dimension deduplication
//! - [`output`] - row rendering and detail table writers
//! - [`format`] - vocabulary mapping and inclusion rules
//! - [`export`] - per-person export, finalization and the population driver
//! - [`verification`] - referential integrity checks of the output
//!
//! # Export Workflow
//!
//! 1. **Open**: create the run context; every detail file is opened and its
//!    header written
//! 2. **Export**: walk each person; detail rows are appended as they are
//!    produced and dimension rows are registered once per natural key
//! 3. **Finalize**: write each dimension table once, in first-seen order
//! 4. **Verify** (optional): read the output back and check every key
//!
//! # Example
//!
//! ```rust,no_run
//! use cdw_export::config::load_config;
//! use cdw_export::core::export::ExportCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("cdw-export.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = ExportCoordinator::new(config, shutdown_rx);
//! let summary = coordinator.execute_export().await?;
//!
//! println!("Exported: {}", summary.exported_persons);
//! println!("Failed: {}", summary.failed_persons);
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod format;
pub mod keys;
pub mod output;
pub mod verification;
