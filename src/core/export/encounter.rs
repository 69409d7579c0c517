//! Encounter rows

use super::exporter::{pick, CdwExporter, PatientKeys, VisitKeys};
use crate::core::output::Row;
use crate::domain::{Encounter, Result};
use rand::rngs::StdRng;

/// Scheduling request type codes
const SCHEDULING_REQUEST_TYPES: &[&str] = &["N", "C", "P", "W", "M", "A", "O"];

/// Purpose of visit: scheduled visit
const SCHEDULED_VISIT: &str = "3";

impl CdwExporter {
    /// Writes the consult, visit, appointment and inpatient rows
    pub(super) fn write_encounter(
        &self,
        patient: &PatientKeys,
        encounter: &Encounter,
        rng: &mut StdRng,
    ) -> Result<VisitKeys> {
        let ctx = self.context();
        let tables = ctx.detail();

        let consult = tables.consult.next_key();
        tables
            .consult
            .append_row(Row::new().key(consult).key(consult))?;

        let visit = tables.visit.next_key();
        let clinician = self.pick_clinician(rng);
        let provider = encounter.provider.as_deref();
        let (station, location, staff) = match provider {
            Some(provider) => {
                let (station, location) = self.provider_keys(provider);
                (Some(station), Some(location), clinician)
            }
            None => (patient.primary_station, None, ctx.fallback_staff()),
        };

        tables.visit.append_row(
            Row::new()
                .key(visit)
                .timestamp(encounter.start)
                .key(clinician)
                .opt_key(location)
                .key(patient.patient),
        )?;

        tables.appointment.append_row(
            Row::new()
                .key(tables.appointment.next_key())
                .opt_key(station)
                .key(patient.patient)
                .timestamp(encounter.start)
                .timestamp(encounter.start)
                .empty(2)
                .key(visit)
                .opt_key(location)
                .raw(SCHEDULED_VISIT)
                .raw(pick(rng, SCHEDULING_REQUEST_TYPES))
                .raw(0)
                .raw(encounter.length_minutes())
                .key(consult)
                .timestamp(encounter.start)
                .timestamp(encounter.stop),
        )?;

        if encounter.is_inpatient() {
            tables.inpatient.append_row(
                Row::new()
                    .key(tables.inpatient.next_key())
                    .key(patient.patient)
                    .timestamp(encounter.start),
            )?;
        }

        Ok(VisitKeys {
            visit,
            station,
            staff,
        })
    }
}
