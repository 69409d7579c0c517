//! Domain error types
//!
//! This module defines the error hierarchy for the CDW exporter.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main exporter error type
///
/// This is the primary error type used throughout the crate. The variants
/// follow the run's failure taxonomy: setup failures abort the run, write
/// failures belong to a single person's export, and dedup lookup failures
/// signal an internal inconsistency.
#[derive(Debug, Error)]
pub enum CdwError {
    /// An output resource could not be opened at run start
    #[error("Setup failure for {resource}: {message}")]
    Setup {
        /// File or directory that could not be opened
        resource: String,
        /// Underlying cause
        message: String,
    },

    /// A surrogate key was looked up that was never registered
    #[error("Dedup lookup failure in table {table}: {detail}")]
    DedupLookup {
        /// Dimension table name
        table: String,
        /// What was missing
        detail: String,
    },

    /// Appending a line to an output table failed
    #[error("Write failure on table {table}: {message}")]
    Write {
        /// Detail table name
        table: String,
        /// Underlying cause
        message: String,
    },

    /// Finalization was requested a second time
    #[error("Dimension tables have already been finalized")]
    AlreadyFinalized,

    /// A person or population record is malformed
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Post-run verification could not be performed
    #[error("Verification error: {0}")]
    Verification(String),

    /// I/O errors outside a specific table
    #[error("I/O error: {0}")]
    Io(String),
}

impl CdwError {
    /// Builds a setup failure for the given resource
    pub fn setup(resource: impl Into<String>, message: impl ToString) -> Self {
        CdwError::Setup {
            resource: resource.into(),
            message: message.to_string(),
        }
    }

    /// Builds a write failure for the given table
    pub fn write(table: impl Into<String>, message: impl ToString) -> Self {
        CdwError::Write {
            table: table.into(),
            message: message.to_string(),
        }
    }

    /// Returns true if this error must abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CdwError::Setup { .. } | CdwError::Configuration(_) | CdwError::AlreadyFinalized
        )
    }
}

/// Export-specific error details
///
/// Provides additional context for a failed person export
#[derive(Debug, Clone)]
pub struct ExportErrorDetail {
    /// Person identifier associated with the error
    pub person_id: Option<String>,

    /// Table associated with the error
    pub table: Option<String>,

    /// Error message
    pub message: String,
}

impl ExportErrorDetail {
    /// Creates a new export error detail
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            person_id: None,
            table: None,
            message: message.into(),
        }
    }

    /// Sets the person identifier
    pub fn with_person_id(mut self, person_id: impl Into<String>) -> Self {
        self.person_id = Some(person_id.into());
        self
    }

    /// Sets the table name
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for CdwError {
    fn from(err: std::io::Error) -> Self {
        CdwError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CdwError {
    fn from(err: serde_json::Error) -> Self {
        CdwError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CdwError {
    fn from(err: toml::de::Error) -> Self {
        CdwError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv reader/writer errors
impl From<csv::Error> for CdwError {
    fn from(err: csv::Error) -> Self {
        CdwError::Serialization(format!("CSV error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_error_display() {
        let err = CdwError::setup("out/visit.csv", "permission denied");
        assert_eq!(
            err.to_string(),
            "Setup failure for out/visit.csv: permission denied"
        );
        assert!(err.is_fatal());
    }

    #[test]
    fn test_write_error_is_not_fatal() {
        let err = CdwError::write("visit", "disk full");
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("visit"));
    }

    #[test]
    fn test_dedup_lookup_display() {
        let err = CdwError::DedupLookup {
            table: "dosageform".to_string(),
            detail: "no row with key 42".to_string(),
        };
        assert!(err.to_string().contains("dosageform"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_export_error_detail_builder() {
        let detail = ExportErrorDetail::new("Test error")
            .with_person_id("person-123")
            .with_table("visit");

        assert_eq!(detail.person_id, Some("person-123".to_string()));
        assert_eq!(detail.table, Some("visit".to_string()));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: CdwError = io_err.into();
        assert!(matches!(err, CdwError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: CdwError = json_err.into();
        assert!(matches!(err, CdwError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: CdwError = toml_err.into();
        assert!(matches!(err, CdwError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_cdw_error_implements_std_error() {
        let err = CdwError::AlreadyFinalized;
        let _: &dyn std::error::Error = &err;
    }
}
