//! Record formatting rules
//!
//! This module defines the seam between the exporter, which walks the record
//! and manages keys, and the rules that decide who is exported and how
//! person attributes map onto warehouse vocabulary.

pub mod cdw;
pub mod geography;

pub use cdw::CdwFormatter;

use crate::domain::Person;

/// Marital status as written to the patient and dimension tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaritalStatus {
    /// Legal code, used as the dimension's natural key
    pub code: &'static str,
    /// Display text on the patient row
    pub label: &'static str,
}

/// Gender columns of the patient row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenderColumns {
    /// Administrative gender code
    pub code: &'static str,
    /// Self-identified gender text
    pub label: &'static str,
}

/// Rules applied to a person's attributes during export
///
/// Implementations must be pure functions of their inputs so concurrent
/// exports stay deterministic.
pub trait RecordFormatter: Send + Sync {
    /// Whether the person belongs in the extract
    fn include(&self, person: &Person) -> bool;

    /// Warehouse race category
    fn race(&self, person: &Person) -> &'static str;

    /// Warehouse ethnicity category
    fn ethnicity(&self, person: &Person) -> &'static str;

    /// Marital status code and label
    fn marital_status(&self, person: &Person) -> MaritalStatus;

    /// Gender code and label
    fn gender(&self, person: &Person) -> GenderColumns;

    /// Time zone for a station located in `state`
    fn timezone(&self, state: Option<&str>) -> &'static str;

    /// Number of doses that completes the series for a CVX code
    fn max_doses(&self, cvx: &str) -> u32;

    /// Whether an allergy reactant is a food
    fn is_food_allergy(&self, reactant: &str) -> bool;

    /// Names for the clinician roster, generated deterministically
    fn clinician_names(&self, count: usize) -> Vec<String>;
}
