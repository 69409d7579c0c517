//! Person domain model
//!
//! A person is one simulated patient together with their longitudinal record.

use super::encounter::Encounter;
use super::ids::{PersonId, ProviderId};
use super::provider::Provider;
use chrono::{DateTime, Datelike, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Administrative gender as recorded on the person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Gender {
    /// Male
    #[serde(rename = "M")]
    Male,
    /// Female
    #[serde(rename = "F")]
    #[default]
    Female,
}

/// Person name parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    /// Honorific prefix
    #[serde(default)]
    pub prefix: Option<String>,
    /// Given name
    pub first: String,
    /// Family name
    pub last: String,
    /// Suffix such as "Jr." or "PhD"
    #[serde(default)]
    pub suffix: Option<String>,
}

impl PersonName {
    /// Full name with prefix and suffix
    pub fn full(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(4);
        if let Some(prefix) = &self.prefix {
            parts.push(prefix);
        }
        parts.push(&self.first);
        parts.push(&self.last);
        if let Some(suffix) = &self.suffix {
            parts.push(suffix);
        }
        parts.join(" ")
    }

    /// First and last name only
    pub fn contact(&self) -> String {
        format!("{} {}", self.first, self.last)
    }
}

/// Residential address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Street line
    #[serde(default)]
    pub line: String,
    /// City
    #[serde(default)]
    pub city: String,
    /// State, as a full name
    #[serde(default)]
    pub state: String,
    /// Postal code
    #[serde(default)]
    pub zip: String,
    /// Longitude and latitude
    #[serde(default)]
    pub coordinate: Option<(f64, f64)>,
}

/// A simulated person and their record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    /// Natural identifier
    pub id: PersonId,

    /// Seed of the person's random stream
    #[serde(default)]
    pub seed: u64,

    /// Name parts
    pub name: PersonName,

    /// Social security number
    #[serde(default)]
    pub ssn: Option<String>,

    /// Birth time
    pub birth_date: DateTime<Utc>,

    /// Death time, if the person died during the simulation
    #[serde(default)]
    pub death_date: Option<DateTime<Utc>>,

    /// Administrative gender
    #[serde(default)]
    pub gender: Gender,

    /// Marital status code ("M", "S", ...)
    #[serde(default)]
    pub marital_status: Option<String>,

    /// Race category (white, hispanic, black, asian, native, other)
    #[serde(default)]
    pub race: String,

    /// Residential address
    #[serde(default)]
    pub address: Address,

    /// Phone number
    #[serde(default)]
    pub telecom: Option<String>,

    /// Veteran cohort attribute; persons without it are not exported
    #[serde(default)]
    pub veteran: Option<String>,

    /// Ambulatory provider reference
    #[serde(default)]
    pub ambulatory_provider_id: Option<ProviderId>,

    /// Ambulatory provider linked by the population loader
    #[serde(skip)]
    pub ambulatory_provider: Option<Arc<Provider>>,

    /// Encounters in chronological order
    #[serde(default)]
    pub encounters: Vec<Encounter>,
}

impl Person {
    /// Starts building a person
    pub fn builder(
        id: PersonId,
        first: impl Into<String>,
        last: impl Into<String>,
        birth_date: DateTime<Utc>,
    ) -> PersonBuilder {
        PersonBuilder::new(id, first, last, birth_date)
    }

    /// Whether the person is alive at `time`
    pub fn is_alive(&self, time: DateTime<Utc>) -> bool {
        match self.death_date {
            Some(death) => death > time,
            None => true,
        }
    }

    /// Age in whole years at `time`
    pub fn age_in_years(&self, time: DateTime<Utc>) -> u32 {
        let birth = self.birth_date;
        let mut years = time.year() - birth.year();
        if (time.month(), time.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        years.max(0) as u32
    }

    /// Age reported on the patient row: at `as_of` when alive, at death otherwise
    pub fn reported_age(&self, as_of: DateTime<Utc>) -> u32 {
        match self.death_date {
            Some(death) if death <= as_of => self.age_in_years(death),
            _ => self.age_in_years(as_of),
        }
    }

    /// Fresh deterministic random stream for this person
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }
}

/// Builder for [`Person`]
#[derive(Debug, Clone)]
pub struct PersonBuilder {
    person: Person,
}

impl PersonBuilder {
    fn new(
        id: PersonId,
        first: impl Into<String>,
        last: impl Into<String>,
        birth_date: DateTime<Utc>,
    ) -> Self {
        Self {
            person: Person {
                id,
                seed: 0,
                name: PersonName {
                    prefix: None,
                    first: first.into(),
                    last: last.into(),
                    suffix: None,
                },
                ssn: None,
                birth_date,
                death_date: None,
                gender: Gender::default(),
                marital_status: None,
                race: "white".to_string(),
                address: Address::default(),
                telecom: None,
                veteran: None,
                ambulatory_provider_id: None,
                ambulatory_provider: None,
                encounters: Vec::new(),
            },
        }
    }

    /// Sets the random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.person.seed = seed;
        self
    }

    /// Marks the person as a veteran
    pub fn veteran(mut self, era: impl Into<String>) -> Self {
        self.person.veteran = Some(era.into());
        self
    }

    /// Sets the gender
    pub fn gender(mut self, gender: Gender) -> Self {
        self.person.gender = gender;
        self
    }

    /// Sets the race category
    pub fn race(mut self, race: impl Into<String>) -> Self {
        self.person.race = race.into();
        self
    }

    /// Sets the marital status code
    pub fn marital_status(mut self, status: impl Into<String>) -> Self {
        self.person.marital_status = Some(status.into());
        self
    }

    /// Sets the death time
    pub fn died(mut self, death: DateTime<Utc>) -> Self {
        self.person.death_date = Some(death);
        self
    }

    /// Sets the address
    pub fn address(mut self, address: Address) -> Self {
        self.person.address = address;
        self
    }

    /// Sets the phone number
    pub fn telecom(mut self, telecom: impl Into<String>) -> Self {
        self.person.telecom = Some(telecom.into());
        self
    }

    /// Links the ambulatory provider
    pub fn ambulatory_provider(mut self, provider: Arc<Provider>) -> Self {
        self.person.ambulatory_provider_id = Some(provider.id.clone());
        self.person.ambulatory_provider = Some(provider);
        self
    }

    /// Appends an encounter
    pub fn encounter(mut self, encounter: Encounter) -> Self {
        self.person.encounters.push(encounter);
        self
    }

    /// Finishes the person
    pub fn build(self) -> Person {
        self.person
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn born_1950() -> Person {
        Person::builder(
            PersonId::new("p-1").unwrap(),
            "Ada",
            "Lovelace",
            Utc.with_ymd_and_hms(1950, 6, 15, 0, 0, 0).unwrap(),
        )
        .build()
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        let person = born_1950();
        let before = Utc.with_ymd_and_hms(2020, 6, 14, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2020, 6, 15, 0, 0, 0).unwrap();
        assert_eq!(person.age_in_years(before), 69);
        assert_eq!(person.age_in_years(after), 70);
    }

    #[test]
    fn test_reported_age_uses_death_date() {
        let death = Utc.with_ymd_and_hms(2000, 7, 1, 0, 0, 0).unwrap();
        let mut person = born_1950();
        person.death_date = Some(death);
        let as_of = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert!(!person.is_alive(as_of));
        assert_eq!(person.reported_age(as_of), 50);
    }

    #[test]
    fn test_full_name_with_prefix_and_suffix() {
        let name = PersonName {
            prefix: Some("Mrs.".to_string()),
            first: "Ada".to_string(),
            last: "Lovelace".to_string(),
            suffix: Some("PhD".to_string()),
        };
        assert_eq!(name.full(), "Mrs. Ada Lovelace PhD");
        assert_eq!(name.contact(), "Ada Lovelace");
    }

    #[test]
    fn test_rng_is_deterministic() {
        use rand::Rng;
        let person = born_1950();
        let a: u64 = person.rng().gen();
        let b: u64 = person.rng().gen();
        assert_eq!(a, b);
    }

    #[test]
    fn test_gender_serde_codes() {
        let gender: Gender = serde_json::from_str("\"M\"").unwrap();
        assert_eq!(gender, Gender::Male);
    }
}
