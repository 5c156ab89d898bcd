use std::collections::BTreeMap;
use std::io;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod file;
pub mod mem;

pub use file::FileStore;
pub use mem::MemStore;

pub static COUNTER_COLLECTION_NAME: &str = "counters.json";

/// Boundary over the persisted record collections. Implementations hold named
/// JSON documents; every mutation is a full rewrite of one collection.
///
/// `load` never fails: a missing or corrupt collection falls back to the
/// type's default value with a logged warning.
pub trait RecordStore: Send + Sync {
    /// Raw collection text, `None` when the collection doesn't exist or can't
    /// be read. Implementations log the reason.
    fn read(&self, name: &str) -> Option<String>;

    /// Overwrite a collection with the given text.
    fn write(&self, name: &str, contents: &str) -> io::Result<()>;

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        match self.read(name) {
            None => {
                tracing::warn!("{} not found. Using default data.", name);
                T::default()
            }
            Some(text) => match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("Failed to load {}. Reason: {}. Using default data.", name, e);
                    T::default()
                }
            },
        }
    }

    fn save<T: Serialize>(&self, name: &str, value: &T) -> io::Result<()> {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.write(name, &text)
    }

    /// Issue the next id for a prefix (`R` -> `R1`, `R2`, ...) from the
    /// persisted per-prefix counters. Counters only move forward; ids are
    /// never reused.
    fn next_id(&self, prefix: &str) -> io::Result<String> {
        let mut counters: BTreeMap<String, u64> = self.load(COUNTER_COLLECTION_NAME);
        let n = counters.entry(prefix.to_string()).or_insert(0);
        *n += 1;
        let id = format!("{}{}", prefix, n);
        self.save(COUNTER_COLLECTION_NAME, &counters)?;
        Ok(id)
    }

    /// Raise a prefix counter to at least `floor`. Used when adopting a data
    /// directory that already contains records.
    fn sync_counter(&self, prefix: &str, floor: u64) -> io::Result<()> {
        let mut counters: BTreeMap<String, u64> = self.load(COUNTER_COLLECTION_NAME);
        let n = counters.entry(prefix.to_string()).or_insert(0);
        if *n < floor {
            *n = floor;
        }
        self.save(COUNTER_COLLECTION_NAME, &counters)
    }
}

/// Records addressable by their unique string id.
pub trait Identified {
    fn id(&self) -> &str;
}

/// Uniform identity resolution within a loaded collection. Absence is a
/// regular outcome, never an error.
pub fn find_by_id<'a, T: Identified>(records: &'a [T], id: &str) -> Option<&'a T> {
    records.iter().find(|r| r.id() == id)
}

pub fn find_by_id_mut<'a, T: Identified>(records: &'a mut [T], id: &str) -> Option<&'a mut T> {
    records.iter_mut().find(|r| r.id() == id)
}

/// Largest numeric suffix among ids carrying the given prefix. Ids with a
/// foreign prefix or a non-numeric suffix are skipped.
pub fn max_id_suffix<'a>(ids: impl Iterator<Item = &'a str>, prefix: &str) -> u64 {
    ids.filter_map(|id| id.strip_prefix(prefix))
        .filter_map(|suffix| suffix.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, serde::Deserialize)]
    struct Record {
        id: String,
    }

    impl Identified for Record {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn record(id: &str) -> Record {
        Record { id: id.to_string() }
    }

    #[test]
    fn load_returns_default_when_collection_missing() {
        let store = MemStore::new();
        let records: Vec<Record> = store.load("missing.json");
        assert!(records.is_empty());
    }

    #[test]
    fn load_returns_default_when_collection_corrupt() {
        let store = MemStore::new();
        store.write("bad.json", "{not json").unwrap();

        let records: Vec<Record> = store.load("bad.json");
        assert!(records.is_empty());
    }

    #[test]
    fn save_round_trips_through_load() {
        let store = MemStore::new();
        let records = vec![record("R1"), record("R2")];
        store.save("requests.json", &records).unwrap();

        let loaded: Vec<Record> = store.load("requests.json");
        assert_eq!(loaded, records);
    }

    #[test]
    fn next_id_is_monotonic_per_prefix() {
        let store = MemStore::new();
        assert_eq!(store.next_id("R").unwrap(), "R1");
        assert_eq!(store.next_id("R").unwrap(), "R2");
        assert_eq!(store.next_id("T").unwrap(), "T1");
        assert_eq!(store.next_id("R").unwrap(), "R3");
    }

    #[test]
    fn sync_counter_never_moves_backwards() {
        let store = MemStore::new();
        store.sync_counter("R", 7).unwrap();
        assert_eq!(store.next_id("R").unwrap(), "R8");

        store.sync_counter("R", 3).unwrap();
        assert_eq!(store.next_id("R").unwrap(), "R9");
    }

    #[test]
    fn find_by_id_resolves_or_reports_absence() {
        let records = vec![record("S1001"), record("S1002")];
        assert_eq!(find_by_id(&records, "S1002").map(|r| r.id()), Some("S1002"));
        assert!(find_by_id(&records, "S9999").is_none());
    }

    #[test]
    fn max_id_suffix_skips_foreign_and_malformed_ids() {
        let ids = ["R1", "R17", "T4", "Rx", "R3"];
        assert_eq!(max_id_suffix(ids.iter().copied(), "R"), 17);
        assert_eq!(max_id_suffix(ids.iter().copied(), "T"), 4);
        assert_eq!(max_id_suffix(ids.iter().copied(), "D"), 0);
    }
}
