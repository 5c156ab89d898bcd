use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

use super::RecordStore;

/// In-memory record store. Stands in for [`super::FileStore`] in unit tests so
/// the lifecycle engine can be exercised without touching the filesystem.
#[derive(Debug, Default)]
pub struct MemStore {
    collections: Mutex<HashMap<String, String>>,
}

impl MemStore {
    pub fn new() -> MemStore {
        MemStore::default()
    }
}

impl RecordStore for MemStore {
    fn read(&self, name: &str) -> Option<String> {
        self.collections
            .lock()
            .expect("record store mutex poisoned")
            .get(name)
            .cloned()
    }

    fn write(&self, name: &str, contents: &str) -> io::Result<()> {
        self.collections
            .lock()
            .expect("record store mutex poisoned")
            .insert(name.to_string(), contents.to_string());
        Ok(())
    }
}
