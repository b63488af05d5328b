//! Deduplicating row store
//!
//! Rows are keyed by the identity attribute of the element they were read
//! from. The first sighting of an identifier wins: re-sampling the same row
//! later never replaces, duplicates or reorders it.

use serde::Serialize;
use std::collections::HashSet;

/// One extracted row: fixed-width cells plus the source element's identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRecord {
    id: String,
    cells: Vec<String>,
}

impl RowRecord {
    /// Build a record, truncating or padding `cells` to exactly `width`
    pub fn new(id: impl Into<String>, mut cells: Vec<String>, width: usize) -> Self {
        cells.resize(width, String::new());
        Self {
            id: id.into(),
            cells,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

/// Insertion-ordered collection with at most one record per identifier
#[derive(Debug, Default)]
pub struct RowStore {
    ids: HashSet<String>,
    rows: Vec<RowRecord>,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Insert a record unless its identifier is already stored
    ///
    /// Returns `true` if the record was added.
    pub fn insert(&mut self, record: RowRecord) -> bool {
        if !self.ids.insert(record.id.clone()) {
            return false;
        }
        self.rows.push(record);
        true
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    /// Consume the store, yielding rows in insertion order
    pub fn into_rows(self) -> Vec<RowRecord> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_record_pads_short_rows() {
        let record = RowRecord::new("a", cells(&["x"]), 3);
        assert_eq!(record.cells(), &["x", "", ""]);
    }

    #[test]
    fn test_record_truncates_wide_rows() {
        let record = RowRecord::new("a", cells(&["1", "2", "3", "4", "5"]), 4);
        assert_eq!(record.cells(), &["1", "2", "3", "4"]);
    }

    #[test]
    fn test_first_sighting_wins() {
        let mut store = RowStore::new();
        assert!(store.insert(RowRecord::new("a", cells(&["first"]), 1)));
        assert!(store.insert(RowRecord::new("b", cells(&["other"]), 1)));
        assert!(!store.insert(RowRecord::new("a", cells(&["second"]), 1)));

        assert_eq!(store.len(), 2);
        assert_eq!(store.rows()[0].cells(), &["first"]);
        assert_eq!(store.rows()[1].id(), "b");
    }

    proptest! {
        /// No sequence of inserts ever stores two records with one identifier,
        /// and the surviving order is the order of first sightings
        #[test]
        fn prop_identifiers_stay_unique(ids in prop::collection::vec(0..40u32, 0..200)) {
            let mut store = RowStore::new();
            let mut first_seen: Vec<String> = Vec::new();

            for (n, id) in ids.iter().enumerate() {
                let id = format!("row-{id}");
                if !first_seen.contains(&id) {
                    first_seen.push(id.clone());
                }
                store.insert(RowRecord::new(id, vec![n.to_string()], 1));
            }

            let stored: Vec<&str> = store.rows().iter().map(|r| r.id()).collect();
            let unique: HashSet<&str> = stored.iter().copied().collect();
            prop_assert_eq!(unique.len(), stored.len());
            prop_assert_eq!(stored, first_seen.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }
}
