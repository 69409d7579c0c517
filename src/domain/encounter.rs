//! Encounter and clinical event models
//!
//! An encounter is one visit of a person to a provider. Every clinical event
//! recorded during the visit hangs off the encounter.

use super::ids::ProviderId;
use super::provider::Provider;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A coded concept with its display text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    /// Code value (SNOMED CT, RxNorm, CVX, ...)
    pub code: String,

    /// Human readable display
    pub display: String,

    /// Code system URI or short name
    #[serde(default)]
    pub system: Option<String>,
}

impl Code {
    /// Creates a code without a system
    pub fn new(code: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display: display.into(),
            system: None,
        }
    }
}

/// Encounter class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EncounterType {
    /// Wellness visit
    Wellness,
    /// Ambulatory visit
    #[default]
    Ambulatory,
    /// Outpatient visit
    Outpatient,
    /// Inpatient stay
    Inpatient,
    /// Emergency visit
    Emergency,
    /// Urgent care visit
    UrgentCare,
    /// Anything the exporter has no special handling for
    #[serde(other)]
    Other,
}

impl fmt::Display for EncounterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Wellness => "wellness",
            Self::Ambulatory => "ambulatory",
            Self::Outpatient => "outpatient",
            Self::Inpatient => "inpatient",
            Self::Emergency => "emergency",
            Self::UrgentCare => "urgentcare",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// Generic timed, coded record entry (conditions, allergies)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// When the entry started
    pub start: DateTime<Utc>,

    /// When the entry ended, if it has
    #[serde(default)]
    pub stop: Option<DateTime<Utc>>,

    /// Codes describing the entry; the first one is authoritative
    pub codes: Vec<Code>,
}

impl Entry {
    /// Creates an entry with one code
    pub fn new(start: DateTime<Utc>, code: Code) -> Self {
        Self {
            start,
            stop: None,
            codes: vec![code],
        }
    }

    /// Sets the stop time
    pub fn stopped_at(mut self, stop: DateTime<Utc>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Returns the authoritative code
    pub fn primary_code(&self) -> Option<&Code> {
        self.codes.first()
    }
}

/// Observation value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservationValue {
    /// Numeric measurement
    Numeric(f64),
    /// Coded value
    Coded(Code),
    /// Free text
    Text(String),
}

impl ObservationValue {
    /// Value type label as written to the extract
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::Numeric(_) => "numeric",
            Self::Coded(_) => "coded",
            Self::Text(_) => "text",
        }
    }

    /// Rendered value
    pub fn render(&self) -> String {
        match self {
            Self::Numeric(v) => format!("{v:.1}"),
            Self::Coded(code) => code.display.clone(),
            Self::Text(text) => text.clone(),
        }
    }
}

/// Observation, possibly a panel of child observations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Timing and codes
    #[serde(flatten)]
    pub entry: Entry,

    /// Observed value; panels carry none
    #[serde(default)]
    pub value: Option<ObservationValue>,

    /// Unit of measure
    #[serde(default)]
    pub unit: Option<String>,

    /// Child observations of a panel
    #[serde(default)]
    pub observations: Vec<Observation>,
}

/// Procedure performed during an encounter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Procedure {
    /// Timing and codes
    #[serde(flatten)]
    pub entry: Entry,

    /// Reasons for the procedure; the first one is reported
    #[serde(default)]
    pub reasons: Vec<Code>,

    /// Cost of the procedure
    #[serde(default)]
    pub cost: f64,
}

/// Dosage instruction of a prescription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dosage {
    /// Doses per administration
    pub amount: u32,
    /// Administrations per period
    pub frequency: u32,
    /// Period length
    pub period: u32,
    /// Period unit (e.g. "days")
    pub unit: String,
}

impl Dosage {
    /// Renders the dosage as instruction text
    pub fn describe(&self) -> String {
        format!(
            "{} dose(s) {} time(s) per {} {}",
            self.amount, self.frequency, self.period, self.unit
        )
    }
}

/// Prescription duration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionDuration {
    /// Number of units
    pub quantity: i64,
    /// Time unit (years, months, weeks, days, hours, minutes, seconds)
    pub unit: String,
}

/// Prescription details attached to a medication
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Prescription {
    /// Dosage instruction
    #[serde(default)]
    pub dosage: Option<Dosage>,

    /// Duration of the prescription
    #[serde(default)]
    pub duration: Option<PrescriptionDuration>,

    /// Authorized refills
    #[serde(default)]
    pub refills: Option<u32>,
}

/// Medication ordered during an encounter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    /// Timing and codes
    #[serde(flatten)]
    pub entry: Entry,

    /// Prescription details, when the order carried any
    #[serde(default)]
    pub prescription: Option<Prescription>,
}

/// Immunization administered during an encounter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Immunization {
    /// Timing and CVX code
    #[serde(flatten)]
    pub entry: Entry,

    /// Dose number within the series
    #[serde(default = "default_series")]
    pub series: u32,
}

fn default_series() -> u32 {
    1
}

/// Care plan started during an encounter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarePlan {
    /// Timing and codes
    #[serde(flatten)]
    pub entry: Entry,

    /// Reasons for the plan; the first one is reported
    #[serde(default)]
    pub reasons: Vec<Code>,
}

/// One instance within an imaging series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagingInstance {
    /// DICOM SOP class
    pub sop_class: Code,
}

/// One series of an imaging study
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagingSeries {
    /// Body site imaged
    pub body_site: Code,
    /// Modality used
    pub modality: Code,
    /// Instances in the series
    #[serde(default)]
    pub instances: Vec<ImagingInstance>,
}

/// Imaging study performed during an encounter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagingStudy {
    /// When the study was performed
    pub start: DateTime<Utc>,
    /// Series in the study
    #[serde(default)]
    pub series: Vec<ImagingSeries>,
}

/// One visit of a person to a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Encounter {
    /// Start of the visit
    pub start: DateTime<Utc>,

    /// End of the visit
    pub stop: DateTime<Utc>,

    /// Encounter class
    #[serde(rename = "type", default)]
    pub encounter_type: EncounterType,

    /// Provider reference as found in the population file
    #[serde(default)]
    pub provider_id: Option<ProviderId>,

    /// Provider linked by the population loader
    #[serde(skip)]
    pub provider: Option<Arc<Provider>>,

    /// Conditions diagnosed
    #[serde(default)]
    pub conditions: Vec<Entry>,

    /// Allergies recorded
    #[serde(default)]
    pub allergies: Vec<Entry>,

    /// Observations taken
    #[serde(default)]
    pub observations: Vec<Observation>,

    /// Procedures performed
    #[serde(default)]
    pub procedures: Vec<Procedure>,

    /// Medications ordered
    #[serde(default)]
    pub medications: Vec<Medication>,

    /// Immunizations given
    #[serde(default)]
    pub immunizations: Vec<Immunization>,

    /// Care plans started
    #[serde(default)]
    pub careplans: Vec<CarePlan>,

    /// Imaging studies performed
    #[serde(default)]
    pub imaging_studies: Vec<ImagingStudy>,
}

impl Encounter {
    /// Creates an empty encounter of the given type
    pub fn new(start: DateTime<Utc>, stop: DateTime<Utc>, encounter_type: EncounterType) -> Self {
        Self {
            start,
            stop,
            encounter_type,
            provider_id: None,
            provider: None,
            conditions: Vec::new(),
            allergies: Vec::new(),
            observations: Vec::new(),
            procedures: Vec::new(),
            medications: Vec::new(),
            immunizations: Vec::new(),
            careplans: Vec::new(),
            imaging_studies: Vec::new(),
        }
    }

    /// Links the encounter to a provider
    pub fn with_provider(mut self, provider: Arc<Provider>) -> Self {
        self.provider_id = Some(provider.id.clone());
        self.provider = Some(provider);
        self
    }

    /// Length of the visit in whole minutes
    pub fn length_minutes(&self) -> i64 {
        (self.stop - self.start).num_minutes()
    }

    /// Whether this encounter is an inpatient stay
    pub fn is_inpatient(&self) -> bool {
        self.encounter_type == EncounterType::Inpatient
    }
}
