//! Clinical event rows: conditions, allergies, observations, procedures,
//! immunizations, care plans and imaging studies

use super::exporter::{pick, CdwExporter, PatientKeys, VisitKeys};
use crate::core::output::{clean, Row};
use crate::domain::{
    CarePlan, CdwError, Code, Encounter, Entry, ImagingStudy, Immunization, Observation,
    Procedure, Result,
};
use rand::rngs::StdRng;
use rand::Rng;

const REACTIONS: &[&str] = &[
    "Sneezing and Coughing",
    "Inflammation of Skin",
    "Itchy Watery Eyes",
    "Difficulty Breathing",
];

/// Observed (`o`) or historical (`h`)
const OBSERVED_HISTORICAL: &[&str] = &["o", "h"];

/// Upper bound of the immunization reaction code
const IMMUNIZATION_REACTIONS: u32 = 12;

fn primary_code<'a>(entry: &'a Entry, kind: &str) -> Result<&'a Code> {
    entry
        .primary_code()
        .ok_or_else(|| CdwError::InvalidRecord(format!("{kind} without a code")))
}

impl CdwExporter {
    /// Writes the problem list and diagnosis rows of a condition
    pub(super) fn write_condition(
        &self,
        patient: &PatientKeys,
        visit: &VisitKeys,
        encounter: &Encounter,
        condition: &Entry,
    ) -> Result<()> {
        let ctx = self.context();
        let tables = ctx.detail();
        let code = primary_code(condition, "condition")?;
        let narrative = ctx
            .dimensions()
            .providernarrative
            .add_fact_with(&code.code, || vec![clean(&code.display)]);

        let problem = tables.problemlist.next_key();
        tables.problemlist.append_row(
            Row::new()
                .key(problem)
                .opt_key(visit.station)
                .empty(2)
                .key(patient.patient)
                .key(narrative)
                .timestamp(encounter.start)
                .timestamp(condition.start)
                .raw("P")
                .key(visit.staff)
                .opt_timestamp(condition.stop)
                .text(&code.code),
        )?;

        tables.vdiagnosis.append_row(
            Row::new()
                .key(tables.vdiagnosis.next_key())
                .opt_key(visit.station)
                .empty(2)
                .key(patient.patient)
                .key(visit.visit)
                .timestamp(encounter.start)
                .timestamp(condition.start)
                .key(narrative)
                .key(problem)
                .key(visit.staff)
                .key(visit.staff),
        )?;
        Ok(())
    }

    /// Writes the allergy, reaction and comment rows of an allergy
    pub(super) fn write_allergy(
        &self,
        patient: &PatientKeys,
        visit: &VisitKeys,
        allergy: &Entry,
        rng: &mut StdRng,
    ) -> Result<()> {
        let ctx = self.context();
        let tables = ctx.detail();
        let code = primary_code(allergy, "allergy")?;
        let reactant = clean(&code.display);
        let allergy_type = if ctx.formatter().is_food_allergy(&code.display) {
            "F"
        } else {
            "O"
        };

        let allergy_key = tables.allergy.next_key();
        tables.allergy.append_row(
            Row::new()
                .key(allergy_key)
                .key(allergy_key)
                .opt_key(visit.station)
                .key(patient.patient)
                .raw(allergy_type)
                .raw(&reactant)
                .empty(5)
                .timestamp(allergy.start)
                .key(visit.staff)
                .raw(pick(rng, OBSERVED_HISTORICAL))
                .raw("A")
                .raw(1)
                .timestamp(allergy.start)
                .key(visit.staff)
                .empty(1),
        )?;

        let reaction_display = pick(rng, REACTIONS);
        let reaction_row = tables.allergicreaction.next_key();
        let reaction = ctx.dimensions().reaction.add_fact_with(reaction_display, || {
            vec![reaction_display.to_string(), reaction_row.to_string()]
        });
        tables.allergicreaction.append_row(
            Row::new()
                .key(reaction_row)
                .key(allergy_key)
                .key(allergy_key)
                .opt_key(visit.station)
                .key(reaction),
        )?;

        tables.allergycomment.append_row(
            Row::new()
                .key(tables.allergycomment.next_key())
                .key(allergy_key)
                .key(allergy_key)
                .opt_key(visit.station)
                .key(patient.patient)
                .timestamp(allergy.start)
                .key(visit.staff)
                .raw(&reactant)
                .timestamp(allergy.start),
        )?;
        Ok(())
    }

    /// Writes an observation; panels are flattened into their members
    pub(super) fn write_observation(
        &self,
        patient: &PatientKeys,
        visit: &VisitKeys,
        observation: &Observation,
    ) -> Result<()> {
        let Some(value) = &observation.value else {
            for child in &observation.observations {
                self.write_observation(patient, visit, child)?;
            }
            return Ok(());
        };

        let tables = self.context().detail();
        let code = primary_code(&observation.entry, "observation")?;
        tables.observation.append_row(
            Row::new()
                .key(tables.observation.next_key())
                .timestamp(observation.entry.start)
                .key(patient.patient)
                .key(visit.visit)
                .text(&code.code)
                .text(&code.display)
                .text(&value.render())
                .opt_text(observation.unit.as_deref())
                .raw(value.type_label()),
        )
    }

    /// Writes a procedure row
    pub(super) fn write_procedure(
        &self,
        patient: &PatientKeys,
        visit: &VisitKeys,
        procedure: &Procedure,
    ) -> Result<()> {
        let tables = self.context().detail();
        let code = primary_code(&procedure.entry, "procedure")?;
        let reason = procedure.reasons.first();
        tables.procedure.append_row(
            Row::new()
                .key(tables.procedure.next_key())
                .timestamp(procedure.entry.start)
                .key(patient.patient)
                .key(visit.visit)
                .text(&code.code)
                .text(&code.display)
                .raw(format!("{:.2}", procedure.cost))
                .opt_text(reason.map(|r| r.code.as_str()))
                .opt_text(reason.map(|r| r.display.as_str())),
        )
    }

    /// Writes an immunization row and registers its vaccine
    pub(super) fn write_immunization(
        &self,
        patient: &PatientKeys,
        visit: &VisitKeys,
        immunization: &Immunization,
        rng: &mut StdRng,
    ) -> Result<()> {
        let ctx = self.context();
        let tables = ctx.detail();
        let cvx = primary_code(&immunization.entry, "immunization")?;
        let max_doses = ctx.formatter().max_doses(&cvx.code);
        let vaccine = clean(&cvx.display);
        let name_key = ctx.dimensions().immunizationname.add_fact_with(&cvx.code, || {
            vec![vaccine.clone(), clean(&cvx.code), max_doses.to_string()]
        });

        let series = immunization.series;
        let completion = if series == max_doses { "C" } else { "B" };
        let note = format!("Dose #{series} of {max_doses} of {vaccine} vaccine administered.");
        let key = tables.immunization.next_key();
        tables.immunization.append_row(
            Row::new()
                .key(key)
                .key(key)
                .opt_key(visit.station)
                .key(patient.patient)
                .key(name_key)
                .raw(completion)
                .raw(rng.gen_range(0..IMMUNIZATION_REACTIONS))
                .timestamp(immunization.entry.start)
                .timestamp(immunization.entry.start)
                .key(visit.staff)
                .key(visit.staff)
                .key(visit.visit)
                .text(&note)
                .text(&note),
        )
    }

    /// Writes a care plan row
    pub(super) fn write_careplan(
        &self,
        patient: &PatientKeys,
        visit: &VisitKeys,
        careplan: &CarePlan,
    ) -> Result<()> {
        let tables = self.context().detail();
        let code = primary_code(&careplan.entry, "care plan")?;
        let reason = careplan.reasons.first();
        tables.careplan.append_row(
            Row::new()
                .key(tables.careplan.next_key())
                .timestamp(careplan.entry.start)
                .opt_timestamp(careplan.entry.stop)
                .key(patient.patient)
                .key(visit.visit)
                .text(&code.code)
                .text(&code.display)
                .opt_text(reason.map(|r| r.code.as_str()))
                .opt_text(reason.map(|r| r.display.as_str())),
        )
    }

    /// Writes an imaging study row from its first series and instance
    pub(super) fn write_imaging_study(
        &self,
        patient: &PatientKeys,
        visit: &VisitKeys,
        study: &ImagingStudy,
    ) -> Result<()> {
        let tables = self.context().detail();
        let series = study.series.first();
        let sop_class = series
            .and_then(|s| s.instances.first())
            .map(|instance| &instance.sop_class);
        let body_site = series.map(|s| &s.body_site);
        let modality = series.map(|s| &s.modality);

        tables.imagingstudy.append_row(
            Row::new()
                .key(tables.imagingstudy.next_key())
                .timestamp(study.start)
                .key(patient.patient)
                .key(visit.visit)
                .opt_text(body_site.map(|c| c.code.as_str()))
                .opt_text(body_site.map(|c| c.display.as_str()))
                .opt_text(modality.map(|c| c.code.as_str()))
                .opt_text(modality.map(|c| c.display.as_str()))
                .opt_text(sop_class.map(|c| c.code.as_str()))
                .opt_text(sop_class.map(|c| c.display.as_str())),
        )
    }
}
