//! JSON-file-backed persistence port.
//!
//! One flat `key -> string` map in a single file under the config
//! directory. Writes go through on every mutation; a file that fails to
//! parse is logged and replaced, never fatal.

use draftpad_core::persist::PersistencePort;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

const STORE_FILE: &str = "store.json";

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open (or start) the store under `dir`.
    pub fn open(dir: PathBuf) -> Self {
        let path = dir.join(STORE_FILE);
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(map) => map,
                Err(err) => {
                    tracing::warn!(error = %err, path = %path.display(), "store file is malformed; starting empty");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn flush(&self, entries: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                tracing::warn!(error = %err, "failed to create store directory");
                return;
            }
        }
        match serde_json::to_string_pretty(entries) {
            Ok(content) => {
                if let Err(err) = std::fs::write(&self.path, content) {
                    tracing::warn!(error = %err, path = %self.path.display(), "failed to write store file");
                }
            }
            Err(err) => tracing::warn!(error = %err, "failed to serialize store"),
        }
    }
}

impl PersistencePort for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
        self.flush(&entries);
    }
}
