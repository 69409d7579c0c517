//! Population file reader
//!
//! A population is a JSON document holding the providers and the persons of
//! one simulation:
//!
//! ```json
//! {
//!   "providers": [{ "id": "prov-1", "name": "General Hospital", "state": "MA" }],
//!   "persons": [{ "id": "p-1", "name": { "first": "Ann", "last": "Smith" }, ... }]
//! }
//! ```
//!
//! Persons and encounters reference providers by id. The loader replaces each
//! reference with a shared [`Arc<Provider>`], so every encounter at the same
//! provider sees the same provider value.

use crate::domain::{CdwError, Person, Provider, ProviderId, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct PopulationDocument {
    #[serde(default)]
    providers: Vec<Provider>,
    #[serde(default)]
    persons: Vec<Person>,
}

/// Providers and persons of one simulation, with provider references linked
#[derive(Debug, Clone, Default)]
pub struct Population {
    /// Every provider, in document order
    pub providers: Vec<Arc<Provider>>,
    /// Every person, in document order
    pub persons: Vec<Person>,
}

impl Population {
    /// Parses a population document and links provider references
    ///
    /// # Errors
    ///
    /// Returns [`CdwError::Serialization`] for malformed JSON and
    /// [`CdwError::InvalidRecord`] for a duplicate provider id or a reference
    /// to an unknown provider.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: PopulationDocument = serde_json::from_str(json)?;

        let mut by_id: HashMap<ProviderId, Arc<Provider>> = HashMap::new();
        let mut providers = Vec::with_capacity(document.providers.len());
        for provider in document.providers {
            let provider = Arc::new(provider);
            if by_id.insert(provider.id.clone(), provider.clone()).is_some() {
                return Err(CdwError::InvalidRecord(format!(
                    "duplicate provider id {}",
                    provider.id
                )));
            }
            providers.push(provider);
        }

        let resolve = |id: &ProviderId, person: &Person| {
            by_id.get(id).cloned().ok_or_else(|| {
                CdwError::InvalidRecord(format!(
                    "person {} references unknown provider {id}",
                    person.id
                ))
            })
        };

        let mut persons = document.persons;
        for person in &mut persons {
            if let Some(id) = &person.ambulatory_provider_id {
                person.ambulatory_provider = Some(resolve(id, person)?);
            }
            let mut linked = Vec::with_capacity(person.encounters.len());
            for encounter in &person.encounters {
                linked.push(match &encounter.provider_id {
                    Some(id) => Some(resolve(id, person)?),
                    None => None,
                });
            }
            for (encounter, provider) in person.encounters.iter_mut().zip(linked) {
                encounter.provider = provider;
            }
        }

        Ok(Self { providers, persons })
    }

    /// Number of persons
    pub fn len(&self) -> usize {
        self.persons.len()
    }

    /// Whether the population has no persons
    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }
}

/// Reads and links a population file
///
/// # Errors
///
/// Returns [`CdwError::Io`] if the file cannot be read, otherwise the errors
/// of [`Population::from_json`].
pub fn load_population(path: impl AsRef<Path>) -> Result<Population> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        CdwError::Io(format!(
            "Failed to read population file {}: {e}",
            path.display()
        ))
    })?;
    let population = Population::from_json(&contents)?;

    tracing::info!(
        path = %path.display(),
        providers = population.providers.len(),
        persons = population.persons.len(),
        "Loaded population"
    );
    Ok(population)
}

#[cfg(test)]
mod tests {
    use super::*;

    const POPULATION: &str = r#"{
        "providers": [
            { "id": "prov-1", "name": "General Hospital", "state": "MA" },
            { "id": "prov-2", "name": "Community Clinic", "state": "Texas" }
        ],
        "persons": [
            {
                "id": "p-1",
                "seed": 7,
                "name": { "first": "Ann", "last": "Smith" },
                "birth_date": "1950-04-01T00:00:00Z",
                "veteran": "vietnam",
                "ambulatory_provider_id": "prov-2",
                "encounters": [
                    {
                        "start": "2020-01-01T10:00:00Z",
                        "stop": "2020-01-01T10:30:00Z",
                        "provider_id": "prov-1"
                    },
                    {
                        "start": "2020-02-01T10:00:00Z",
                        "stop": "2020-02-01T10:30:00Z",
                        "provider_id": "prov-1"
                    },
                    {
                        "start": "2020-03-01T10:00:00Z",
                        "stop": "2020-03-01T10:30:00Z"
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_providers_are_shared() {
        let population = Population::from_json(POPULATION).unwrap();
        assert_eq!(population.providers.len(), 2);
        assert_eq!(population.len(), 1);

        let person = &population.persons[0];
        let first = person.encounters[0].provider.as_ref().unwrap();
        let second = person.encounters[1].provider.as_ref().unwrap();
        assert!(Arc::ptr_eq(first, second));
        assert!(Arc::ptr_eq(first, &population.providers[0]));
        assert!(person.encounters[2].provider.is_none());
        assert_eq!(
            person.ambulatory_provider.as_ref().unwrap().name,
            "Community Clinic"
        );
    }

    #[test]
    fn test_unknown_provider_is_invalid() {
        let json = r#"{
            "persons": [{
                "id": "p-1",
                "name": { "first": "Ann", "last": "Smith" },
                "birth_date": "1950-04-01T00:00:00Z",
                "ambulatory_provider_id": "nowhere"
            }]
        }"#;
        let err = Population::from_json(json).unwrap_err();
        assert!(matches!(err, CdwError::InvalidRecord(_)));
        assert!(err.to_string().contains("nowhere"));
    }

    #[test]
    fn test_duplicate_provider_is_invalid() {
        let json = r#"{
            "providers": [
                { "id": "prov-1", "name": "A" },
                { "id": "prov-1", "name": "B" }
            ]
        }"#;
        assert!(matches!(
            Population::from_json(json),
            Err(CdwError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        assert!(matches!(
            Population::from_json("{ not json"),
            Err(CdwError::Serialization(_))
        ));
    }

    #[test]
    fn test_load_population_missing_file() {
        assert!(matches!(
            load_population("/nonexistent/population.json"),
            Err(CdwError::Io(_))
        ));
    }
}
