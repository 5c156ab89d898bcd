use std::fs;
use std::io;
use std::path::PathBuf;

use super::RecordStore;

/// Record store persisting each collection as a pretty-printed JSON file in
/// the configured data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> io::Result<FileStore> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(FileStore { data_dir })
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }
}

impl RecordStore for FileStore {
    fn read(&self, name: &str) -> Option<String> {
        match fs::read_to_string(self.data_dir.join(name)) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Unable to read {}: {}", name, e);
                None
            }
        }
    }

    fn write(&self, name: &str, contents: &str) -> io::Result<()> {
        fs::write(self.data_dir.join(name), contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collections_persist_across_store_instances() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileStore::new(dir.path()).unwrap();
        store.write("users.json", "[]").unwrap();

        let reopened = FileStore::new(dir.path()).unwrap();
        assert_eq!(reopened.read("users.json").as_deref(), Some("[]"));
        assert_eq!(reopened.read("requests.json"), None);
    }
}
