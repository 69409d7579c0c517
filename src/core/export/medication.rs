//! Medication rows
//!
//! One medication produces an outpatient prescription with a single fill, a
//! CPRS order with its ordered item, and a non-VA medication row. The drug
//! itself is described by five dimension tables.

use super::exporter::{CdwExporter, PatientKeys, VisitKeys};
use crate::core::output::{clean, Row};
use crate::domain::{CdwError, Medication, PrescriptionDuration, Result, SurrogateKey};
use chrono::Duration;

const OUTPATIENT_PHARMACY: &str = "OUTPATIENT PHARMACY";
const AS_DIRECTED: &str = "As directed by physician.";

/// Converts a prescription duration into a time span
///
/// Returns `None` for an unknown unit or an out of range quantity.
pub fn duration_span(duration: &PrescriptionDuration) -> Option<Duration> {
    let quantity = duration.quantity;
    match duration.unit.as_str() {
        "years" => Duration::try_days(quantity.checked_mul(365)?),
        "months" => Duration::try_days(quantity.checked_mul(30)?),
        "weeks" => Duration::try_weeks(quantity),
        "days" => Duration::try_days(quantity),
        "hours" => Duration::try_hours(quantity),
        "minutes" => Duration::try_minutes(quantity),
        "seconds" => Duration::try_seconds(quantity),
        _ => None,
    }
}

/// Dimension keys describing one drug
struct DrugKeys {
    pharmacy_item: SurrogateKey,
    orderable_item: SurrogateKey,
    dosage: SurrogateKey,
    national: SurrogateKey,
    local: SurrogateKey,
}

impl CdwExporter {
    fn drug_keys(&self, visit: &VisitKeys, medication: &Medication) -> Result<DrugKeys> {
        let ctx = self.context();
        let dims = ctx.dimensions();
        let code = medication
            .entry
            .primary_code()
            .ok_or_else(|| CdwError::InvalidRecord("medication without a code".to_string()))?;
        let display = clean(&code.display);

        let pharmacy_item = dims
            .pharmacyorderableitem
            .add_fact_with(&code.code, || vec![display.clone(), "1".to_string()]);
        let orderable_item = dims.orderableitem.add_fact_with(&code.code, || {
            vec![display.clone(), "0".to_string(), "0".to_string()]
        });

        let dosage = match medication
            .prescription
            .as_ref()
            .and_then(|rx| rx.dosage.as_ref())
        {
            Some(dosage) => dims.dosageform.add_fact_with(&code.code, || {
                vec![pharmacy_item.to_string(), clean(&dosage.describe())]
            }),
            None => ctx.default_dosage(),
        };

        let national = dims.nationaldrug.add_fact_with(&code.code, || {
            vec![
                display.clone(),
                dosage.to_string(),
                String::new(),
                clean(&code.code),
            ]
        });
        let station = visit.station.map(|s| s.to_string()).unwrap_or_default();
        let local = dims.localdrug.add_fact_with(&code.code, || {
            vec![
                national.to_string(),
                station,
                display.clone(),
                national.to_string(),
                display.clone(),
                pharmacy_item.to_string(),
            ]
        });

        Ok(DrugKeys {
            pharmacy_item,
            orderable_item,
            dosage,
            national,
            local,
        })
    }

    /// Writes the prescription, order and non-VA medication rows
    pub(super) fn write_medication(
        &self,
        patient: &PatientKeys,
        visit: &VisitKeys,
        medication: &Medication,
    ) -> Result<()> {
        let ctx = self.context();
        let tables = ctx.detail();
        let dims = ctx.dimensions();
        let drug = self.drug_keys(visit, medication)?;
        let entry = &medication.entry;
        let prescription = medication.prescription.as_ref();

        let finishing = prescription
            .and_then(|rx| rx.duration.as_ref())
            .and_then(duration_span)
            .and_then(|span| entry.start.checked_add_signed(span));
        let status = if entry.stop.is_some() { "EXPIRED" } else { "ACTIVE" };

        let rx = tables.rxoutpatient.next_key();
        tables.rxoutpatient.append_row(
            Row::new()
                .key(rx)
                .opt_key(visit.station)
                .key(rx)
                .timestamp(entry.start)
                .opt_timestamp(entry.stop)
                .opt_timestamp(finishing)
                .key(patient.patient)
                .key(visit.staff)
                .key(visit.staff)
                .key(drug.local)
                .key(drug.national)
                .key(drug.pharmacy_item)
                .raw(
                    prescription
                        .and_then(|rx| rx.refills)
                        .map(|r| r.to_string())
                        .unwrap_or_default(),
                )
                .raw(status)
                .empty(1),
        )?;

        tables.rxoutpatfill.append_row(
            Row::new()
                .key(tables.rxoutpatfill.next_key())
                .key(rx)
                .raw(1)
                .raw(30),
        )?;

        let order_status = dims
            .orderstatus
            .add_fact(status, vec![status.to_string()]);
        let package = dims
            .vistapackage
            .add_fact(OUTPATIENT_PHARMACY, vec![OUTPATIENT_PHARMACY.to_string()]);

        let order = tables.cprsorder.next_key();
        tables.cprsorder.append_row(
            Row::new()
                .key(order)
                .opt_key(visit.station)
                .key(patient.patient)
                .key(visit.staff)
                .key(visit.staff)
                .timestamp(entry.start)
                .key(order_status)
                .key(package)
                .timestamp(entry.start)
                .opt_timestamp(entry.stop)
                .raw(OUTPATIENT_PHARMACY),
        )?;

        tables.ordereditem.append_row(
            Row::new()
                .key(tables.ordereditem.next_key())
                .key(order)
                .key(drug.orderable_item),
        )?;

        let dosage_text = dims.dosageform.field(drug.dosage, "DosageForm")?;
        let status_text = dims.orderstatus.field(order_status, "OrderStatus")?;
        let nonva = tables.nonvamed.next_key();
        tables.nonvamed.append_row(
            Row::new()
                .key(nonva)
                .key(patient.patient)
                .key(nonva)
                .opt_key(visit.station)
                .key(drug.local)
                .text(&dosage_text)
                .raw(AS_DIRECTED)
                .raw(AS_DIRECTED)
                .raw(status_text)
                .key(order)
                .timestamp(entry.start)
                .timestamp(entry.start)
                .opt_text(
                    entry
                        .primary_code()
                        .map(|code| code.display.as_str()),
                ),
        )
    }
}
