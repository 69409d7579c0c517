//! Referential integrity checks over a real export

use cdw_export::adapters::Population;
use cdw_export::core::export::{CdwExporter, RunContext};
use cdw_export::core::keys::KeySpace;
use cdw_export::core::verification::{CheckKind, IntegrityVerifier};
use chrono::{TimeZone, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const POPULATION: &str = r#"{
    "providers": [{ "id": "prov-1", "name": "Harbor Clinic", "state": "Maine" }],
    "persons": [{
        "id": "p-1", "seed": 42, "veteran": "vietnam",
        "name": { "first": "Ann", "last": "Smith" },
        "birth_date": "1948-04-01T00:00:00Z",
        "ambulatory_provider_id": "prov-1",
        "encounters": [{
            "start": "2020-01-01T10:00:00Z", "stop": "2020-01-01T10:30:00Z",
            "provider_id": "prov-1",
            "conditions": [{ "start": "2020-01-01T10:00:00Z",
                             "codes": [{ "code": "44054006", "display": "Diabetes" }] }],
            "allergies": [{ "start": "2020-01-01T10:00:00Z",
                            "codes": [{ "code": "91935009", "display": "Allergy to peanuts" }] }],
            "procedures": [{ "start": "2020-01-01T10:05:00Z",
                             "codes": [{ "code": "710824005", "display": "Assessment" }],
                             "cost": 120.5 }]
        }]
    }]
}"#;

fn export(dir: &Path) {
    let population = Population::from_json(POPULATION).unwrap();
    let ctx = Arc::new(RunContext::create(dir, KeySpace::new(1).unwrap()).unwrap());
    let exporter = CdwExporter::new(ctx.clone());
    let as_of = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
    for person in &population.persons {
        exporter.export_person(person, as_of).unwrap();
    }
    ctx.finalize().unwrap();
}

#[test]
fn test_clean_export_verifies() {
    let dir = TempDir::new().unwrap();
    export(dir.path());

    let report = IntegrityVerifier::new(dir.path()).verify().unwrap();

    assert!(report.is_success(), "{}", report.format_summary());
    assert!(report.passed > 0);
    assert_eq!(report.failed, 0);
}

#[test]
fn test_dangling_location_is_reported() {
    let dir = TempDir::new().unwrap();
    export(dir.path());
    let mut visit = OpenOptions::new()
        .append(true)
        .open(dir.path().join("visit.csv"))
        .unwrap();
    writeln!(visit, "999,2020-01-01 10:00:00,0,77,1").unwrap();

    let report = IntegrityVerifier::new(dir.path()).verify().unwrap();

    assert!(!report.is_success());
    let failure = report
        .failures
        .iter()
        .find(|f| f.kind == CheckKind::ForeignKey && f.column == "LocationSID")
        .unwrap();
    assert_eq!(failure.table, "visit");
    assert_eq!(failure.value, "77");
}

#[test]
fn test_missing_dimension_table_is_skipped() {
    let dir = TempDir::new().unwrap();
    export(dir.path());
    fs::remove_file(dir.path().join("reaction.csv")).unwrap();

    let report = IntegrityVerifier::new(dir.path()).verify().unwrap();

    assert!(report.skipped > 0);
}
