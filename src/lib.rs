// CDW Export - Star-schema CSV exporter for synthetic patient populations
// Copyright (c) 2025 CDW Export Contributors
// Licensed under the MIT License

//! # CDW Export
//!
//! Exports a simulated patient population as a set of delimited tables laid
//! out like a clinical data warehouse star schema: per-event detail tables
//! that reference shared, de-duplicated dimension tables through integer
//! surrogate keys.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Key allocation, table writers, formatting rules, the export
//!   pipeline and post-export verification
//! - [`adapters`] - Population file loading
//! - [`domain`] - Record model, identifiers and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cdw_export::config::load_config;
//! use cdw_export::core::export::ExportCoordinator;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("cdw-export.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!
//!     let coordinator = ExportCoordinator::new(config, shutdown_rx);
//!     let summary = coordinator.execute_export().await?;
//!
//!     println!("Exported {} persons", summary.exported_persons);
//!     Ok(())
//! }
//! ```
//!
//! ## Key Ranges
//!
//! Every detail table allocates keys from the configured `key_start`;
//! dimension tables start at `key_start / 10000`. Runs exported with disjoint
//! starts (for example 1 and 1000001) can be loaded side by side.
//!
//! ## Lifecycle
//!
//! Detail rows are written as each person is exported. Dimension tables are
//! held in memory and written once by [`core::export::RunContext::finalize`]
//! after the last person; exporting after that fails with
//! [`domain::CdwError::AlreadyFinalized`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
