//! Runs with disjoint key starts produce disjoint keys

use cdw_export::adapters::Population;
use cdw_export::core::export::{CdwExporter, RunContext};
use cdw_export::core::keys::KeySpace;
use chrono::{TimeZone, Utc};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const POPULATION: &str = r#"{
    "providers": [{ "id": "prov-1", "name": "General Hospital", "state": "MA" }],
    "persons": [
        {
            "id": "p-1", "seed": 11, "veteran": "vietnam",
            "name": { "first": "Ann", "last": "Smith" },
            "birth_date": "1950-04-01T00:00:00Z",
            "encounters": [
                { "start": "2019-06-01T10:00:00Z", "stop": "2019-06-01T10:20:00Z", "provider_id": "prov-1",
                  "conditions": [{ "start": "2019-06-01T10:00:00Z",
                                   "codes": [{ "code": "38341003", "display": "Hypertension" }] }] },
                { "start": "2020-06-01T10:00:00Z", "stop": "2020-06-01T10:40:00Z", "provider_id": "prov-1" }
            ]
        },
        {
            "id": "p-2", "seed": 12, "veteran": "korea",
            "name": { "first": "Carl", "last": "Diaz" },
            "birth_date": "1930-09-12T00:00:00Z",
            "encounters": [
                { "start": "2020-02-01T08:00:00Z", "stop": "2020-02-01T09:00:00Z", "provider_id": "prov-1" }
            ]
        }
    ]
}"#;

fn run_shard(dir: &Path, key_start: u64) {
    let population = Population::from_json(POPULATION).unwrap();
    let ctx = Arc::new(RunContext::create(dir, KeySpace::new(key_start).unwrap()).unwrap());
    let exporter = CdwExporter::new(ctx.clone());
    let as_of = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
    for person in &population.persons {
        exporter.export_person(person, as_of).unwrap();
    }
    ctx.finalize().unwrap();
}

fn keys(dir: &Path, table: &str) -> HashSet<u64> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(dir.join(format!("{table}.csv")))
        .unwrap();
    reader
        .records()
        .map(|r| r.unwrap()[0].parse().unwrap())
        .collect()
}

#[test]
fn test_shards_do_not_overlap() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    run_shard(first.path(), 1);
    run_shard(second.path(), 1_000_001);

    for table in ["spatient", "visit", "appointment", "consult", "problemlist", "sstaff"] {
        let a = keys(first.path(), table);
        let b = keys(second.path(), table);
        assert!(!a.is_empty(), "{table} is empty");
        assert!(a.is_disjoint(&b), "{table} keys overlap");
    }

    assert_eq!(keys(first.path(), "spatient"), HashSet::from([1, 2]));
    assert_eq!(
        keys(second.path(), "spatient"),
        HashSet::from([1_000_001, 1_000_002])
    );
}

#[test]
fn test_dimension_keys_start_at_scaled_offset() {
    let dir = TempDir::new().unwrap();
    run_shard(dir.path(), 1_000_001);

    let staff = keys(dir.path(), "sstaff");
    assert_eq!(staff.iter().min(), Some(&100));
    assert_eq!(keys(dir.path(), "location"), HashSet::from([100]));
}
