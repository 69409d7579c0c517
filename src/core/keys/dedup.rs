//! Deduplicating dimension table
//!
//! Maps natural keys to surrogate keys and keeps the resulting rows in the
//! order their natural keys were first seen.

use super::sequence::SequenceAllocator;
use crate::core::output::csv_writer;
use crate::domain::{CdwError, Result, SurrogateKey};
use std::collections::HashMap;
use std::io::Write;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// One dimension row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionRow {
    /// Surrogate key, the row's first column
    pub key: SurrogateKey,
    /// Natural key the row was registered under
    pub natural_key: String,
    /// Remaining columns, in header order
    pub fields: Vec<String>,
}

#[derive(Debug, Default)]
struct Inner {
    by_natural: HashMap<String, SurrogateKey>,
    by_key: HashMap<SurrogateKey, usize>,
    rows: Vec<DimensionRow>,
}

/// Natural key to surrogate key map with insertion-ordered rows
#[derive(Debug)]
pub struct DedupTable {
    name: String,
    header: Vec<String>,
    sequence: SequenceAllocator,
    inner: RwLock<Inner>,
}

impl DedupTable {
    /// Creates an empty table whose first key is `key_start`
    pub fn new(name: impl Into<String>, key_start: u64) -> Self {
        Self {
            name: name.into(),
            header: Vec::new(),
            sequence: SequenceAllocator::starting_at(key_start),
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Declares the output columns; the first column holds the key
    pub fn set_header(&mut self, columns: &[&str]) {
        self.header = columns.iter().map(|c| c.to_string()).collect();
    }

    /// Builder form of [`set_header`](Self::set_header)
    pub fn with_header(mut self, columns: &[&str]) -> Self {
        self.set_header(columns);
        self
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared columns
    pub fn header(&self) -> &[String] {
        &self.header
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the key for `natural_key`, registering `fields` on first sighting
    pub fn add_fact(&self, natural_key: &str, fields: Vec<String>) -> SurrogateKey {
        self.add_fact_with(natural_key, || fields)
    }

    /// Like [`add_fact`](Self::add_fact), rendering the fields only when the
    /// natural key is new
    pub fn add_fact_with(
        &self,
        natural_key: &str,
        fields: impl FnOnce() -> Vec<String>,
    ) -> SurrogateKey {
        if let Some(key) = self.read().by_natural.get(natural_key) {
            return *key;
        }

        let mut inner = self.write_lock();
        // Another caller may have registered the key between the two locks
        if let Some(key) = inner.by_natural.get(natural_key) {
            return *key;
        }

        let key = self.sequence.allocate();
        let index = inner.rows.len();
        inner.rows.push(DimensionRow {
            key,
            natural_key: natural_key.to_string(),
            fields: fields(),
        });
        inner.by_key.insert(key, index);
        inner.by_natural.insert(natural_key.to_string(), key);
        key
    }

    /// Returns the key registered for `natural_key`, if any
    pub fn lookup(&self, natural_key: &str) -> Option<SurrogateKey> {
        self.read().by_natural.get(natural_key).copied()
    }

    /// Returns the fields stored under `key`
    ///
    /// # Errors
    ///
    /// Returns [`CdwError::DedupLookup`] if no row has that key.
    pub fn get_fact_by_id(&self, key: SurrogateKey) -> Result<Vec<String>> {
        let inner = self.read();
        inner
            .by_key
            .get(&key)
            .map(|&index| inner.rows[index].fields.clone())
            .ok_or_else(|| self.missing_key(key))
    }

    /// Returns one named column of the row stored under `key`
    ///
    /// # Errors
    ///
    /// Returns [`CdwError::DedupLookup`] if the key or the column is unknown.
    pub fn field(&self, key: SurrogateKey, column: &str) -> Result<String> {
        let position = self
            .header
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| CdwError::DedupLookup {
                table: self.name.clone(),
                detail: format!("no column named {column}"),
            })?;
        if position == 0 {
            return Ok(key.to_string());
        }

        let fields = self.get_fact_by_id(key)?;
        fields
            .get(position - 1)
            .cloned()
            .ok_or_else(|| CdwError::DedupLookup {
                table: self.name.clone(),
                detail: format!("row {key} has no value for column {column}"),
            })
    }

    fn missing_key(&self, key: SurrogateKey) -> CdwError {
        CdwError::DedupLookup {
            table: self.name.clone(),
            detail: format!("no row with key {key}"),
        }
    }

    /// Number of distinct natural keys seen
    pub fn len(&self) -> usize {
        self.read().rows.len()
    }

    /// Whether no natural key has been seen
    pub fn is_empty(&self) -> bool {
        self.read().rows.is_empty()
    }

    /// Snapshot of the rows in first-seen order
    pub fn rows(&self) -> Vec<DimensionRow> {
        self.read().rows.clone()
    }

    /// Key the next new natural key would receive
    pub fn peek_key(&self) -> SurrogateKey {
        self.sequence.peek()
    }

    /// Writes the header and every row, in first-seen order
    ///
    /// Returns the number of rows written.
    pub fn write<W: Write>(&self, sink: W) -> Result<usize> {
        let mut out = csv_writer(sink);
        out.write_record(&self.header)?;

        let inner = self.read();
        for row in &inner.rows {
            let key = row.key.to_string();
            let record = std::iter::once(key.as_str()).chain(row.fields.iter().map(String::as_str));
            out.write_record(record)?;
        }
        out.flush()?;
        Ok(inner.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn location() -> DedupTable {
        DedupTable::new("location", 1).with_header(&["LocationSID", "LocationName"])
    }

    #[test]
    fn test_add_fact_is_idempotent() {
        let table = location();
        let first = table.add_fact("prov-1", vec!["General Hospital".to_string()]);
        let again = table.add_fact("prov-1", vec!["Ignored".to_string()]);
        assert_eq!(first, again);
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get_fact_by_id(first).unwrap(),
            vec!["General Hospital".to_string()]
        );
    }

    #[test]
    fn test_distinct_natural_keys_get_distinct_surrogates() {
        let table = location();
        let a = table.add_fact("a", vec!["A".to_string()]);
        let b = table.add_fact("b", vec!["B".to_string()]);
        assert_ne!(a, b);
        assert_eq!(table.lookup("b"), Some(b));
        assert_eq!(table.lookup("c"), None);
    }

    #[test]
    fn test_fields_rendered_only_on_first_sighting() {
        let table = location();
        table.add_fact_with("a", || vec!["A".to_string()]);
        table.add_fact_with("a", || panic!("already registered"));
    }

    #[test]
    fn test_unknown_key_is_lookup_failure() {
        let table = location();
        let err = table.get_fact_by_id(SurrogateKey::new(999)).unwrap_err();
        assert!(matches!(err, CdwError::DedupLookup { .. }));
    }

    #[test]
    fn test_field_by_column() {
        let table = DedupTable::new("dosageform", 0).with_header(&[
            "DosageFormSID",
            "DosageFormIEN",
            "DosageForm",
        ]);
        let key = table.add_fact("1", vec!["1".to_string(), "Once per day.".to_string()]);
        assert_eq!(table.field(key, "DosageForm").unwrap(), "Once per day.");
        assert_eq!(table.field(key, "DosageFormSID").unwrap(), "0");
        assert!(table.field(key, "Route").is_err());
    }

    #[test]
    fn test_write_in_first_seen_order() {
        let table = location();
        table.add_fact("z", vec!["Zeta".to_string()]);
        table.add_fact("a", vec!["Alpha".to_string()]);
        table.add_fact("z", vec!["Zeta".to_string()]);

        let mut out = Vec::new();
        let written = table.write(&mut out).unwrap();
        assert_eq!(written, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "LocationSID,LocationName\n1,Zeta\n2,Alpha\n"
        );
    }

    #[test]
    fn test_concurrent_add_fact_allocates_once() {
        let table = Arc::new(location());
        let barrier = Arc::new(Barrier::new(16));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let table = Arc::clone(&table);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    table.add_fact("shared", vec!["Shared".to_string()])
                })
            })
            .collect();

        let keys: HashSet<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(keys.len(), 1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.peek_key(), SurrogateKey::new(2));
    }
}
