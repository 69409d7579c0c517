//! Per-person export
//!
//! [`CdwExporter::export_person`] walks one person's record depth first:
//! the patient rows, then every encounter, then every clinical event inside
//! the encounter. Keys are allocated as rows are produced and threaded down
//! to the children that reference them.

use super::context::RunContext;
use crate::core::output::clean;
use crate::domain::{CdwError, Encounter, Entry, Observation, Person, Provider, Result, SurrogateKey};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// Result of exporting one person
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonOutcome {
    /// The person was written under this patient key
    Exported {
        /// Key of the person's `spatient` row
        patient: SurrogateKey,
    },
    /// The person is not part of the extract
    Skipped,
}

/// Keys shared by every row of one person
#[derive(Debug, Clone, Copy)]
pub(super) struct PatientKeys {
    pub patient: SurrogateKey,
    pub primary_station: Option<SurrogateKey>,
}

/// Keys shared by every row of one encounter
#[derive(Debug, Clone, Copy)]
pub(super) struct VisitKeys {
    pub visit: SurrogateKey,
    /// Station of the encounter's provider, else the primary station
    pub station: Option<SurrogateKey>,
    /// Clinician recorded on the encounter's clinical rows
    pub staff: SurrogateKey,
}

/// Writes persons into the tables of one run
///
/// Cloning is cheap; every clone shares the same [`RunContext`].
#[derive(Debug, Clone)]
pub struct CdwExporter {
    context: Arc<RunContext>,
}

impl CdwExporter {
    /// Creates an exporter over a run context
    pub fn new(context: Arc<RunContext>) -> Self {
        Self { context }
    }

    /// The shared run context
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Writes every detail row for `person`
    ///
    /// `as_of` is the end of the simulation; ages and deceased flags are
    /// computed against it. Persons the formatter excludes are skipped with no
    /// side effects. Every detail table is flushed before returning.
    ///
    /// # Errors
    ///
    /// Returns [`CdwError::InvalidRecord`] if an event has no code (nothing is
    /// written in that case), [`CdwError::Write`] if appending a row fails,
    /// and [`CdwError::AlreadyFinalized`] once the run has been finalized.
    /// Keys allocated before a failure are not reused.
    pub fn export_person(&self, person: &Person, as_of: DateTime<Utc>) -> Result<PersonOutcome> {
        let ctx = self.context();
        if ctx.is_finalized() {
            return Err(CdwError::AlreadyFinalized);
        }
        if !ctx.formatter().include(person) {
            debug!(person_id = %person.id, "Person excluded from extract");
            return Ok(PersonOutcome::Skipped);
        }
        validate_record(person)?;

        let mut rng = person.rng();
        let primary_station = person
            .ambulatory_provider
            .as_deref()
            .map(|provider| self.station_key(provider));

        let patient = self.write_patient(person, primary_station, as_of, &mut rng)?;
        let keys = PatientKeys {
            patient,
            primary_station,
        };

        for encounter in &person.encounters {
            let visit = self.write_encounter(&keys, encounter, &mut rng)?;

            for condition in &encounter.conditions {
                self.write_condition(&keys, &visit, encounter, condition)?;
            }
            for allergy in &encounter.allergies {
                self.write_allergy(&keys, &visit, allergy, &mut rng)?;
            }
            for observation in &encounter.observations {
                self.write_observation(&keys, &visit, observation)?;
            }
            for procedure in &encounter.procedures {
                self.write_procedure(&keys, &visit, procedure)?;
            }
            for medication in &encounter.medications {
                self.write_medication(&keys, &visit, medication)?;
            }
            for immunization in &encounter.immunizations {
                self.write_immunization(&keys, &visit, immunization, &mut rng)?;
            }
            for careplan in &encounter.careplans {
                self.write_careplan(&keys, &visit, careplan)?;
            }
            for study in &encounter.imaging_studies {
                self.write_imaging_study(&keys, &visit, study)?;
            }
        }

        ctx.detail().flush_all()?;
        Ok(PersonOutcome::Exported { patient })
    }

    /// `sta3n` row of a provider
    pub(super) fn station_key(&self, provider: &Provider) -> SurrogateKey {
        let ctx = self.context();
        ctx.dimensions().sta3n.add_fact_with(provider.id.as_str(), || {
            vec![
                clean(&provider.name),
                ctx.formatter().timezone(provider.state.as_deref()).to_string(),
            ]
        })
    }

    /// `location` row of a provider
    fn location_key(&self, provider: &Provider) -> SurrogateKey {
        self.context()
            .dimensions()
            .location
            .add_fact_with(provider.id.as_str(), || vec![clean(&provider.name)])
    }

    /// Station and location keys of a provider, cached on the provider
    pub(super) fn provider_keys(&self, provider: &Provider) -> (SurrogateKey, SurrogateKey) {
        let resolve = || (self.station_key(provider), self.location_key(provider));
        match provider.keys_for_run(self.context().run_id(), resolve) {
            Some(keys) => (keys.station, keys.location),
            None => (self.station_key(provider), self.location_key(provider)),
        }
    }

    /// Picks a clinician from the roster
    pub(super) fn pick_clinician(&self, rng: &mut StdRng) -> SurrogateKey {
        let roster = self.context().clinicians();
        if roster.is_empty() {
            return self.context().fallback_staff();
        }
        roster[rng.gen_range(0..roster.len())]
    }
}

/// Picks one of `options` using the person's random stream
pub(super) fn pick<'a>(rng: &mut StdRng, options: &[&'a str]) -> &'a str {
    options[rng.gen_range(0..options.len())]
}

fn require_code(entry: &Entry, kind: &str, encounter: &Encounter, person: &Person) -> Result<()> {
    if entry.primary_code().is_none() {
        return Err(CdwError::InvalidRecord(format!(
            "{kind} without a code in encounter at {} of person {}",
            encounter.start, person.id
        )));
    }
    Ok(())
}

fn require_observation_codes(
    observation: &Observation,
    encounter: &Encounter,
    person: &Person,
) -> Result<()> {
    require_code(&observation.entry, "observation", encounter, person)?;
    for child in &observation.observations {
        require_observation_codes(child, encounter, person)?;
    }
    Ok(())
}

/// Checks that every event carries the code its rows are keyed on
fn validate_record(person: &Person) -> Result<()> {
    for encounter in &person.encounters {
        for entry in &encounter.conditions {
            require_code(entry, "condition", encounter, person)?;
        }
        for entry in &encounter.allergies {
            require_code(entry, "allergy", encounter, person)?;
        }
        for observation in &encounter.observations {
            require_observation_codes(observation, encounter, person)?;
        }
        for procedure in &encounter.procedures {
            require_code(&procedure.entry, "procedure", encounter, person)?;
        }
        for medication in &encounter.medications {
            require_code(&medication.entry, "medication", encounter, person)?;
        }
        for immunization in &encounter.immunizations {
            require_code(&immunization.entry, "immunization", encounter, person)?;
        }
        for careplan in &encounter.careplans {
            require_code(&careplan.entry, "care plan", encounter, person)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::CdwFormatter;
    use crate::core::keys::KeySpace;
    use crate::domain::{Code, EncounterType, PersonId, ProviderId};
    use chrono::TimeZone;

    fn exporter(key_start: u64) -> CdwExporter {
        let ctx = RunContext::dry_run(KeySpace::new(key_start).unwrap(), Arc::new(CdwFormatter));
        CdwExporter::new(Arc::new(ctx))
    }

    fn at(year: i32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, 3, 1, 9, 0, 0).unwrap()
    }

    fn veteran(id: &str) -> Person {
        Person::builder(PersonId::new(id).unwrap(), "Ann", "Smith", at(1950))
            .veteran("vietnam")
            .build()
    }

    fn checkup(provider: Option<Arc<Provider>>) -> Encounter {
        let encounter = Encounter::new(at(2020), at(2020), EncounterType::Ambulatory);
        match provider {
            Some(provider) => encounter.with_provider(provider),
            None => encounter,
        }
    }

    #[test]
    fn test_patient_keys_follow_key_start() {
        let exporter = exporter(50_000);

        let first = exporter.export_person(&veteran("p-1"), at(2021)).unwrap();
        let second = exporter.export_person(&veteran("p-2"), at(2021)).unwrap();

        assert_eq!(first, PersonOutcome::Exported { patient: SurrogateKey::new(50_000) });
        assert_eq!(second, PersonOutcome::Exported { patient: SurrogateKey::new(50_001) });
        assert_eq!(exporter.context().detail().spatient.rows_written(), 2);
    }

    #[test]
    fn test_non_veteran_is_skipped() {
        let exporter = exporter(1);
        let civilian = Person::builder(PersonId::new("p-1").unwrap(), "Bob", "Jones", at(1960)).build();

        let outcome = exporter.export_person(&civilian, at(2021)).unwrap();

        assert_eq!(outcome, PersonOutcome::Skipped);
        assert_eq!(exporter.context().detail().spatient.rows_written(), 0);
        assert_eq!(exporter.context().detail().spatient.peek_key(), SurrogateKey::new(1));
    }

    #[test]
    fn test_uncoded_event_writes_nothing() {
        let exporter = exporter(1);
        let mut encounter = checkup(None);
        encounter
            .conditions
            .push(Entry::new(at(2020), Code::new("44054006", "Diabetes")));
        let mut uncoded = Entry::new(at(2020), Code::new("1", "x"));
        uncoded.codes.clear();
        encounter.allergies.push(uncoded);
        let mut person = veteran("p-1");
        person.encounters.push(encounter);

        let err = exporter.export_person(&person, at(2021)).unwrap_err();

        assert!(matches!(err, CdwError::InvalidRecord(_)));
        let detail = exporter.context().detail();
        for table in detail.all() {
            assert_eq!(table.rows_written(), 0, "{} has rows", table.name());
        }
    }

    #[test]
    fn test_shared_provider_resolves_to_one_location() {
        let exporter = exporter(1);
        let provider = Arc::new(
            Provider::new(ProviderId::new("prov-1").unwrap(), "General Hospital").with_state("MA"),
        );
        let mut person = veteran("p-1");
        person.encounters.push(checkup(Some(provider.clone())));
        person.encounters.push(checkup(Some(provider)));

        exporter.export_person(&person, at(2021)).unwrap();

        let ctx = exporter.context();
        assert_eq!(ctx.detail().visit.rows_written(), 2);
        assert_eq!(ctx.dimensions().location.len(), 1);
        assert_eq!(ctx.dimensions().sta3n.len(), 1);
    }

    #[test]
    fn test_export_after_finalize_fails() {
        let exporter = exporter(1);
        exporter.export_person(&veteran("p-1"), at(2021)).unwrap();
        exporter.context().finalize().unwrap();

        let err = exporter.export_person(&veteran("p-2"), at(2021)).unwrap_err();

        assert!(matches!(err, CdwError::AlreadyFinalized));
        assert_eq!(exporter.context().detail().spatient.rows_written(), 1);
    }
}
