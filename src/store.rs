use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

/// Persisted key-value preference storage. Failures surface as errors; the
/// callers that can live without the value discard them explicitly.
pub trait PrefStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(flatten)]
    entries: BTreeMap<String, String>,
}

/// JSON-file-backed store. A missing file reads as "no value"; writes
/// create the file (and parent directories) as needed.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_state(&self) -> anyhow::Result<StateFile> {
        if !self.path.exists() {
            return Ok(StateFile::default());
        }
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("parse {}", self.path.display()))
    }
}

impl PrefStore for FileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.read_state()?.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        // A corrupt state file is overwritten rather than kept fatal.
        let mut state = self.read_state().unwrap_or_default();
        state.entries.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(&state).context("serialize state")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory store with failure injection, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl PrefStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        if self.fail_reads {
            anyhow::bail!("storage unavailable");
        }
        Ok(self
            .entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned()))
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        if self.fail_writes {
            anyhow::bail!("storage unavailable");
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_store_roundtrip() {
        let tmp = tempdir().unwrap();
        let store = FileStore::new(tmp.path().join("state.json"));

        assert_eq!(store.get("theme").unwrap(), None);
        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));

        // Re-open: value persists across store instances.
        let store = FileStore::new(tmp.path().join("state.json"));
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn file_store_keeps_unrelated_keys() {
        let tmp = tempdir().unwrap();
        let store = FileStore::new(tmp.path().join("state.json"));
        store.set("theme", "light").unwrap();
        store.set("other", "x").unwrap();
        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("other").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn file_store_corrupt_file_errors_on_get_but_recovers_on_set() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::new(path);
        assert!(store.get("theme").is_err());
        store.set("theme", "light").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn memory_store_failure_injection() {
        let mut store = MemoryStore::with_entry("theme", "dark");
        store.fail_reads = true;
        assert!(store.get("theme").is_err());
        store.fail_reads = false;
        store.fail_writes = true;
        assert!(store.set("theme", "light").is_err());
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }
}
