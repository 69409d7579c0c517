//! Result type alias for the exporter
//!
//! This module provides a convenient Result type alias that uses CdwError
//! as the error type.

use super::errors::CdwError;

/// Result type alias for exporter operations
///
/// # Examples
///
/// ```
/// use cdw_export::domain::result::Result;
/// use cdw_export::domain::errors::CdwError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(CdwError::InvalidRecord("encounter without start".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, CdwError>;
