//! Many workers exporting into one run

use cdw_export::adapters::Population;
use cdw_export::core::export::{CdwExporter, PersonOutcome, RunContext};
use cdw_export::core::keys::KeySpace;
use cdw_export::core::verification::IntegrityVerifier;
use chrono::{TimeZone, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const WORKERS: usize = 8;
const PERSONS: usize = 400;
const PROVIDERS: [&str; 3] = ["prov-a", "prov-b", "prov-c"];

fn population() -> Population {
    let persons: Vec<String> = (0..PERSONS)
        .map(|i| {
            let provider = PROVIDERS[i % PROVIDERS.len()];
            let other = PROVIDERS[(i + 1) % PROVIDERS.len()];
            format!(
                r#"{{
                    "id": "p-{i}", "seed": {i}, "veteran": "gulf war",
                    "name": {{ "first": "Pat{i}", "last": "Lee" }},
                    "birth_date": "1960-01-01T00:00:00Z",
                    "ambulatory_provider_id": "{provider}",
                    "encounters": [
                        {{ "start": "2019-05-01T10:00:00Z", "stop": "2019-05-01T10:30:00Z",
                           "provider_id": "{provider}",
                           "conditions": [{{ "start": "2019-05-01T10:00:00Z",
                                             "codes": [{{ "code": "38341003", "display": "Hypertension" }}] }}],
                           "allergies": [{{ "start": "2019-05-01T10:00:00Z",
                                            "codes": [{{ "code": "300913006", "display": "Shellfish allergy" }}] }}] }},
                        {{ "start": "2020-05-01T10:00:00Z", "stop": "2020-05-01T11:00:00Z",
                           "provider_id": "{other}",
                           "medications": [{{ "start": "2020-05-01T10:20:00Z",
                                              "codes": [{{ "code": "314076", "display": "Lisinopril 10 MG" }}] }}] }}
                    ]
                }}"#
            )
        })
        .collect();

    let json = format!(
        r#"{{
            "providers": [
                {{ "id": "prov-a", "name": "Alder Hospital", "state": "MA" }},
                {{ "id": "prov-b", "name": "Beacon Clinic", "state": "NY" }},
                {{ "id": "prov-c", "name": "Cedar Center", "state": "TX" }}
            ],
            "persons": [{}]
        }}"#,
        persons.join(",")
    );
    Population::from_json(&json).unwrap()
}

#[test]
fn test_parallel_workers_share_one_consistent_run() {
    let dir = TempDir::new().unwrap();
    let population = population();
    let ctx = Arc::new(RunContext::create(dir.path(), KeySpace::new(1).unwrap()).unwrap());
    let as_of = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();

    let chunk = PERSONS.div_ceil(WORKERS);
    let patients: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = population
            .persons
            .chunks(chunk)
            .map(|persons| {
                let exporter = CdwExporter::new(ctx.clone());
                scope.spawn(move || {
                    persons
                        .iter()
                        .map(|person| exporter.export_person(person, as_of).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect()
    });

    let keys: HashSet<_> = patients
        .iter()
        .map(|outcome| match outcome {
            PersonOutcome::Exported { patient } => patient.value(),
            PersonOutcome::Skipped => panic!("veteran skipped"),
        })
        .collect();
    assert_eq!(keys.len(), PERSONS);
    assert_eq!(keys.iter().min(), Some(&1));
    assert_eq!(keys.iter().max(), Some(&(PERSONS as u64)));

    let dims = ctx.dimensions();
    assert_eq!(dims.location.len(), PROVIDERS.len());
    assert_eq!(dims.sta3n.len(), PROVIDERS.len());
    assert_eq!(ctx.detail().visit.rows_written(), 2 * PERSONS as u64);

    ctx.finalize().unwrap();
    let report = IntegrityVerifier::new(dir.path()).verify().unwrap();
    assert!(report.is_success(), "{}", report.format_summary());
    assert_eq!(report.failed, 0);
}
