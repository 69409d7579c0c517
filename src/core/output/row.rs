//! Row rendering
//!
//! Every output line is assembled into a [`Row`] before any table lock is
//! taken. Free text is cleaned so that a rendered field never contains the
//! delimiter or a line break.

use crate::domain::SurrogateKey;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// Timestamp layout used by every table
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

fn separator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\r\n|\r|\n|,").expect("separator pattern is valid"))
}

/// Replaces commas and line breaks with a single space and trims the result
///
/// # Examples
///
/// ```
/// use cdw_export::core::output::clean;
///
/// assert_eq!(clean(" Amlodipine, 5 MG\r\nOral "), "Amlodipine  5 MG Oral");
/// ```
pub fn clean(src: &str) -> String {
    separator_pattern().replace_all(src, " ").trim().to_string()
}

/// Renders a timestamp as `YYYY-MM-DDTHH:MM:SSZ`
pub fn iso8601(time: DateTime<Utc>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// One output line, held as separate fields until it is written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<String>,
}

impl Row {
    /// Starts an empty row
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Appends a surrogate key
    pub fn key(mut self, key: SurrogateKey) -> Self {
        self.fields.push(key.to_string());
        self
    }

    /// Appends a key, or an empty field when absent
    pub fn opt_key(mut self, key: Option<SurrogateKey>) -> Self {
        self.fields
            .push(key.map(|k| k.to_string()).unwrap_or_default());
        self
    }

    /// Appends free text, cleaned of separators
    pub fn text(mut self, value: &str) -> Self {
        self.fields.push(clean(value));
        self
    }

    /// Appends optional free text
    pub fn opt_text(self, value: Option<&str>) -> Self {
        self.text(value.unwrap_or_default())
    }

    /// Appends a value that is known to be separator free
    pub fn raw(mut self, value: impl ToString) -> Self {
        self.fields.push(value.to_string());
        self
    }

    /// Appends a timestamp
    pub fn timestamp(mut self, time: DateTime<Utc>) -> Self {
        self.fields.push(iso8601(time));
        self
    }

    /// Appends a timestamp, or an empty field when absent
    pub fn opt_timestamp(mut self, time: Option<DateTime<Utc>>) -> Self {
        self.fields.push(time.map(iso8601).unwrap_or_default());
        self
    }

    /// Appends `count` empty fields
    pub fn empty(mut self, count: usize) -> Self {
        self.fields
            .extend(std::iter::repeat(String::new()).take(count));
        self
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the row has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Rendered fields
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}
