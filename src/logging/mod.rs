//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - Console output on stderr
//! - Configurable log levels (`RUST_LOG` overrides the configured level)
//! - Optional JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use cdw_export::logging::init_logging;
//! use cdw_export::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the outcome of one person's export
///
/// # Example
///
/// ```no_run
/// use cdw_export::log_person_export;
/// use cdw_export::domain::PersonId;
/// use std::time::Duration;
///
/// let person_id = PersonId::new("p-1").unwrap();
/// log_person_export!(&person_id, "exported", Duration::from_millis(12));
/// ```
#[macro_export]
macro_rules! log_person_export {
    ($person_id:expr, $outcome:expr, $duration:expr) => {
        tracing::debug!(
            person_id = %$person_id,
            outcome = $outcome,
            duration_ms = $duration.as_millis() as u64,
            "Person export finished"
        );
    };
}

/// Log the completion of dimension finalization
///
/// # Example
///
/// ```no_run
/// use cdw_export::log_finalize_complete;
/// use std::time::Duration;
///
/// log_finalize_complete!(14, 2_310, Duration::from_millis(40));
/// ```
#[macro_export]
macro_rules! log_finalize_complete {
    ($tables:expr, $rows:expr, $duration:expr) => {
        tracing::info!(
            tables = $tables,
            rows = $rows,
            duration_ms = $duration.as_millis() as u64,
            "Finalization completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use cdw_export::log_error_with_context;
/// use cdw_export::domain::CdwError;
///
/// let error = CdwError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log progress through the population
///
/// # Example
///
/// ```no_run
/// use cdw_export::log_progress;
///
/// log_progress!(100, 1000);
/// ```
#[macro_export]
macro_rules! log_progress {
    ($current:expr, $total:expr) => {
        tracing::info!(
            current = $current,
            total = $total,
            progress_pct = ($current as f64 / $total as f64 * 100.0),
            "Export progress"
        );
    };
}
