//! Concurrent use of a deduplicating dimension table

use cdw_export::core::keys::DedupTable;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const NATURAL_KEYS: usize = 200;

#[test]
fn test_concurrent_add_fact_assigns_one_key_per_natural_key() {
    let table = Arc::new(DedupTable::new("location", 100).with_header(&["LocationSID", "LocationName"]));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let table = table.clone();
            thread::spawn(move || {
                // Each thread walks the keys from a different offset
                (0..NATURAL_KEYS)
                    .map(|i| {
                        let natural = format!("prov-{}", (i + t * 17) % NATURAL_KEYS);
                        let key = table.add_fact(&natural, vec![natural.clone()]);
                        (natural, key)
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashMap::new();
    for handle in handles {
        for (natural, key) in handle.join().unwrap() {
            let previous = seen.insert(natural.clone(), key);
            assert!(previous.map_or(true, |p| p == key), "{natural} got two keys");
        }
    }

    assert_eq!(table.len(), NATURAL_KEYS);
    let keys: HashSet<_> = seen.values().map(|k| k.value()).collect();
    assert_eq!(keys.len(), NATURAL_KEYS);
    assert_eq!(keys.iter().min(), Some(&100));
    assert_eq!(keys.iter().max(), Some(&(100 + NATURAL_KEYS as u64 - 1)));

    for (natural, key) in &seen {
        assert_eq!(table.lookup(natural), Some(*key));
        assert_eq!(table.field(*key, "LocationName").unwrap(), *natural);
    }
}

#[test]
fn test_rows_are_written_in_first_seen_order() {
    let table = DedupTable::new("reaction", 0).with_header(&["ReactionSID", "Reaction", "VUID"]);
    table.add_fact("hives", vec!["Hives".to_string(), "4538635".to_string()]);
    table.add_fact("cough", vec!["Cough".to_string(), "4538558".to_string()]);
    table.add_fact("hives", vec!["ignored".to_string(), "0".to_string()]);

    let mut out = Vec::new();
    let rows = table.write(&mut out).unwrap();

    assert_eq!(rows, 2);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "ReactionSID,Reaction,VUID\n0,Hives,4538635\n1,Cough,4538558\n"
    );
}
