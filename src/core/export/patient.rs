//! Patient rows

use super::exporter::CdwExporter;
use crate::core::output::Row;
use crate::domain::{Person, Result, SurrogateKey};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::Rng;

/// Time between a veteran's entry into the system and the end of the run
const ENTERED_YEARS_BEFORE: i64 = 10;

impl CdwExporter {
    /// Writes the patient, address, phone, race and ethnicity rows
    ///
    /// Returns the patient key.
    pub(super) fn write_patient(
        &self,
        person: &Person,
        primary_station: Option<SurrogateKey>,
        as_of: DateTime<Utc>,
        rng: &mut StdRng,
    ) -> Result<SurrogateKey> {
        let ctx = self.context();
        let tables = ctx.detail();
        let formatter = ctx.formatter();
        let full_name = person.name.full();
        let contact = person.name.contact();

        let patient = tables.spatient.next_key();

        tables.lookuppatient.append_row(
            Row::new()
                .key(patient)
                .opt_key(primary_station)
                .key(patient)
                .key(patient)
                .key(patient)
                .text(&full_name)
                .raw(1),
        )?;

        let alive = person.is_alive(as_of);
        let gender = formatter.gender(person);
        let marital = formatter.marital_status(person);
        let marital_key = ctx
            .dimensions()
            .maritalstatus
            .add_fact(marital.code, vec![marital.code.to_string()]);
        let entered = as_of - Duration::days(365 * ENTERED_YEARS_BEFORE);

        tables.spatient.append_row(
            Row::new()
                .key(patient)
                .text(&full_name)
                .text(&person.name.last)
                .text(&person.name.first)
                .opt_text(person.ssn.as_deref())
                .raw(person.reported_age(as_of))
                .timestamp(person.birth_date)
                .raw(if alive { "N" } else { "Y" })
                .opt_timestamp(if alive { None } else { person.death_date })
                .raw(gender.code)
                .raw(gender.label)
                .raw("None")
                .raw(marital.label)
                .key(marital_key)
                .timestamp(entered),
        )?;

        let address = &person.address;
        let (longitude, latitude) = match address.coordinate {
            Some((x, y)) => (x.to_string(), y.to_string()),
            None => (String::new(), String::new()),
        };
        tables.spatientaddress.append_row(
            Row::new()
                .key(tables.spatientaddress.next_key())
                .key(patient)
                .raw("Legal Residence")
                .text(&contact)
                .raw("Self")
                .text(&address.line)
                .empty(2)
                .text(&address.city)
                .text(&address.state)
                .text(&address.zip)
                .text(&address.zip)
                .raw("USA")
                .empty(2)
                .raw(longitude)
                .raw(latitude)
                .empty(1),
        )?;

        tables.spatientphone.append_row(
            Row::new()
                .key(tables.spatientphone.next_key())
                .key(patient)
                .raw("Patient Cell Phone")
                .text(&contact)
                .raw("Self")
                .opt_text(person.telecom.as_deref())
                .empty(2),
        )?;

        if rng.gen::<bool>() {
            let email = format!("{}.{}@email.example", person.name.first, person.name.last);
            tables.spatientphone.append_row(
                Row::new()
                    .key(tables.spatientphone.next_key())
                    .key(patient)
                    .raw("Patient Email")
                    .text(&contact)
                    .raw("Self")
                    .empty(2)
                    .text(&email),
            )?;
        }

        tables.patientrace.append_row(
            Row::new()
                .key(tables.patientrace.next_key())
                .key(patient)
                .raw(formatter.race(person)),
        )?;

        tables.patientethnicity.append_row(
            Row::new()
                .key(tables.patientethnicity.next_key())
                .key(patient)
                .raw(formatter.ethnicity(person)),
        )?;

        Ok(patient)
    }
}
