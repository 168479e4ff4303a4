//! Memory store backends
//!
//! Two [`MemoryStore`] implementations: a process-local map for tests and
//! ephemeral sessions, and a JSON file store for durable single-user
//! deployments. Both hold whole `serde_json::Value` blobs per key.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use parking_lot::RwLock;
use tracing::debug;

use deco_voice_core::{Error, MemoryStore, Result};

/// Volatile in-process store. Contents are lost when the process exits.
#[derive(Default)]
pub struct InMemoryStore {
    map: RwLock<HashMap<String, serde_json::Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.map.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        self.map.write().insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// File-backed store keeping all keys in a single JSON object.
///
/// Every `set` rewrites the whole file; fine for the one small blob the
/// assistant persists.
pub struct JsonFileStore {
    path: PathBuf,
    // guards the read-modify-write cycle on the file
    lock: RwLock<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    fn read_all(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                let value: serde_json::Value = serde_json::from_str(&text)
                    .map_err(|e| Error::Storage(format!("corrupt store file: {e}")))?;
                match value {
                    serde_json::Value::Object(map) => Ok(map),
                    _ => Err(Error::Storage("store file is not a JSON object".into())),
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file absent, starting empty");
                Ok(serde_json::Map::new())
            }
            Err(e) => Err(Error::Storage(format!("read {}: {e}", self.path.display()))),
        }
    }
}

impl MemoryStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let _guard = self.lock.read();
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let _guard = self.lock.write();
        let mut map = self.read_all()?;
        map.insert(key.to_string(), value.clone());
        let text = serde_json::to_string_pretty(&serde_json::Value::Object(map))
            .map_err(|e| Error::Storage(format!("serialize store: {e}")))?;
        fs::write(&self.path, text)
            .map_err(|e| Error::Storage(format!("write {}: {e}", self.path.display())))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_in_memory_roundtrip() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", &json!({"a": 1})).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!({"a": 1})));
        store.set("k", &json!(2)).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!(2)));
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        let store = JsonFileStore::new(&path);

        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", &json!({"a": 1})).unwrap();
        store.set("other", &json!("x")).unwrap();

        // a fresh store over the same file sees both keys
        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("k").unwrap(), Some(json!({"a": 1})));
        assert_eq!(reopened.get("other").unwrap(), Some(json!("x")));
    }

    #[test]
    fn test_json_file_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(store.get("k").is_err());
    }
}
