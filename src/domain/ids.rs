//! Domain identifier types with validation
//!
//! This module provides newtype wrappers for the identifiers that flow through
//! an export: the process-assigned [`SurrogateKey`] and the natural identifiers
//! of persons and providers coming from the population.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Process-assigned integer key for a warehouse row
///
/// Unique within its table and shard. Renders as a plain base-10 integer.
///
/// # Examples
///
/// ```
/// use cdw_export::domain::ids::SurrogateKey;
///
/// let key = SurrogateKey::new(50_000);
/// assert_eq!(key.to_string(), "50000");
/// assert_eq!(key.value(), 50_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurrogateKey(u64);

impl SurrogateKey {
    /// Wraps a raw key value
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw key value
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurrogateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SurrogateKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| format!("Invalid surrogate key '{s}': {e}"))
    }
}

impl From<SurrogateKey> for u64 {
    fn from(key: SurrogateKey) -> Self {
        key.0
    }
}

/// Person identifier newtype wrapper
///
/// Identifies a simulated person in the population file.
///
/// # Examples
///
/// ```
/// use cdw_export::domain::ids::PersonId;
/// use std::str::FromStr;
///
/// let id = PersonId::from_str("b1c6a2f0-0001").unwrap();
/// assert_eq!(id.as_str(), "b1c6a2f0-0001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonId(String);

impl PersonId {
    /// Creates a new PersonId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(PersonId)` if the ID is valid, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Person ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the person ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PersonId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PersonId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PersonId> for String {
    fn from(id: PersonId) -> Self {
        id.0
    }
}

/// Provider identifier newtype wrapper
///
/// The natural key used to deduplicate station and location dimension rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderId(String);

impl ProviderId {
    /// Creates a new ProviderId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Provider ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the provider ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ProviderId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProviderId> for String {
    fn from(id: ProviderId) -> Self {
        id.0
    }
}

impl AsRef<str> for ProviderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
