//! What a run leaves on disk, with and without finalization

use cdw_export::adapters::Population;
use cdw_export::core::export::tables::DIMENSION_TABLES;
use cdw_export::core::export::{CdwExporter, PersonOutcome, RunContext};
use cdw_export::core::keys::KeySpace;
use chrono::{DateTime, TimeZone, Utc};
use csv::ReaderBuilder;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const PERSON_A: &str = r#"{
    "providers": [{ "id": "prov-1", "name": "Harbor Clinic", "state": "ME" }],
    "persons": [{
        "id": "p-a", "seed": 5, "veteran": "vietnam",
        "name": { "first": "Ann", "last": "Smith" },
        "birth_date": "1949-02-01T00:00:00Z",
        "encounters": [
            { "start": "2019-03-01T09:00:00Z", "stop": "2019-03-01T09:30:00Z", "provider_id": "prov-1" },
            { "start": "2020-03-01T09:00:00Z", "stop": "2020-03-01T09:30:00Z", "provider_id": "prov-1",
              "medications": [
                  { "start": "2020-03-01T09:10:00Z",
                    "codes": [{ "code": "1", "display": "Metformin 500 MG" }],
                    "prescription": { "dosage": { "amount": 1, "frequency": 2, "period": 1,
                                                  "unit": "day, with food\nif tolerated" } } },
                  { "start": "2020-03-01T09:12:00Z",
                    "codes": [{ "code": "314076", "display": "Lisinopril 10 MG" }] }
              ] }
        ]
    }]
}"#;

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
}

fn context(dir: &Path) -> Arc<RunContext> {
    Arc::new(RunContext::create(dir, KeySpace::new(1).unwrap()).unwrap())
}

fn column(dir: &Path, table: &str, name: &str) -> Vec<String> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(dir.join(format!("{table}.csv")))
        .unwrap();
    let index = reader
        .headers()
        .unwrap()
        .iter()
        .position(|h| h == name)
        .unwrap();
    reader
        .records()
        .map(|r| r.unwrap().get(index).unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_stopped_before_finalize_keeps_detail_rows_only() {
    let dir = TempDir::new().unwrap();
    let population = Population::from_json(PERSON_A).unwrap();
    let ctx = context(dir.path());
    let exporter = CdwExporter::new(ctx.clone());

    let outcome = exporter.export_person(&population.persons[0], as_of()).unwrap();
    let PersonOutcome::Exported { patient } = outcome else {
        panic!("person A was skipped");
    };
    // The run stops here; dropping the writers is all that happens
    drop(exporter);
    drop(ctx);

    assert_eq!(column(dir.path(), "spatient", "PatientSID"), [patient.to_string()]);
    let visits = column(dir.path(), "visit", "PatientSID");
    assert_eq!(visits.len(), 2);
    assert!(visits.iter().all(|p| *p == patient.to_string()));
    for spec in DIMENSION_TABLES {
        assert!(!dir.path().join(spec.file_name()).exists(), "{} written", spec.name);
    }
}

#[test]
fn test_dosage_text_is_cleaned_in_both_tables() {
    let dir = TempDir::new().unwrap();
    let population = Population::from_json(PERSON_A).unwrap();
    let ctx = context(dir.path());
    CdwExporter::new(ctx.clone())
        .export_person(&population.persons[0], as_of())
        .unwrap();
    ctx.finalize().unwrap();

    let raw = fs::read_to_string(dir.path().join("dosageform.csv")).unwrap();
    let lines: Vec<_> = raw.lines().collect();
    assert_eq!(lines.len(), 3, "{raw}");
    for line in &lines {
        assert_eq!(line.split(',').count(), 3, "split row: {line}");
    }

    let forms = column(dir.path(), "dosageform", "DosageForm");
    assert_eq!(forms[0], "Once per day.");
    assert!(!forms[1].contains(',') && !forms[1].contains('\n'));
    assert!(forms[1].contains("with food"));
    assert!(column(dir.path(), "nonvamed", "Dosage").contains(&forms[1]));
}

#[test]
fn test_drug_coded_one_gets_its_own_dosage_row() {
    let dir = TempDir::new().unwrap();
    let population = Population::from_json(PERSON_A).unwrap();
    let ctx = context(dir.path());
    CdwExporter::new(ctx.clone())
        .export_person(&population.persons[0], as_of())
        .unwrap();

    let dosage = &ctx.dimensions().dosageform;
    let coded_one = dosage.lookup("1").unwrap();
    assert_ne!(coded_one, ctx.default_dosage());
    assert_eq!(dosage.len(), 2);
}
