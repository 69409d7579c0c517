//! Domain models and types for the CDW exporter.
//!
//! This module contains the record model consumed by the exporter and the
//! error and identifier types shared by every layer.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`SurrogateKey`], [`PersonId`], [`ProviderId`])
//! - **Record model** ([`Person`], [`Encounter`], [`Provider`] and clinical events)
//! - **Error types** ([`CdwError`], [`ExportErrorDetail`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Natural identifiers and warehouse keys are distinct types:
//!
//! ```rust
//! use cdw_export::domain::{PersonId, SurrogateKey};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let person = PersonId::new("7f1d-0001")?;
//! let key = SurrogateKey::new(50_000);
//!
//! // let wrong: SurrogateKey = person;  // Compile error!
//! # let _ = (person, key);
//! # Ok(())
//! # }
//! ```
//!
//! # Builder Pattern
//!
//! Persons are assembled with a builder:
//!
//! ```rust
//! use cdw_export::domain::{Person, PersonId};
//! use chrono::{TimeZone, Utc};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let person = Person::builder(
//!     PersonId::new("7f1d-0001")?,
//!     "Ada",
//!     "Lovelace",
//!     Utc.with_ymd_and_hms(1950, 6, 15, 0, 0, 0).unwrap(),
//! )
//! .veteran("vietnam")
//! .build();
//! assert!(person.veteran.is_some());
//! # Ok(())
//! # }
//! ```

pub mod encounter;
pub mod errors;
pub mod ids;
pub mod person;
pub mod provider;
pub mod result;

// Re-export commonly used types for convenience
pub use encounter::{
    CarePlan, Code, Dosage, Encounter, EncounterType, Entry, ImagingInstance, ImagingSeries,
    ImagingStudy, Immunization, Medication, Observation, ObservationValue, Prescription,
    PrescriptionDuration, Procedure,
};
pub use errors::{CdwError, ExportErrorDetail};
pub use ids::{PersonId, ProviderId, SurrogateKey};
pub use person::{Address, Gender, Person, PersonBuilder, PersonName};
pub use provider::{Provider, ResolvedProviderKeys};
pub use result::Result;
