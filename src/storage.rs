//! Durable client storage for user preferences.
//!
//! The locale core only reads and writes [`LANG_KEY`]. Other keys (the admin
//! panel keeps its session token here) pass through untouched.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Key under which the active language code is persisted.
pub const LANG_KEY: &str = "lang";

/// Key-value storage that survives across sessions.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store. Nothing survives the process; used for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("preference store lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store persisted as a flat JSON object on disk.
///
/// The file is read once on open and rewritten in full on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file starts an empty store; a file
    /// that exists but is not a JSON object of strings is an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read preferences at {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid preferences file {}", path.display()))?
        } else {
            debug!("No preferences file at {}, starting empty", path.display());
            BTreeMap::new()
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("preference store lock poisoned"))?;
        let mut updated = values.clone();
        updated.insert(key.to_string(), value.to_string());

        let content =
            serde_json::to_string_pretty(&updated).context("Failed to serialize preferences")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write preferences to {}", self.path.display()))?;

        // Only what reached the disk becomes visible.
        *values = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get(LANG_KEY), None);

        store.set(LANG_KEY, "en").unwrap();
        assert_eq!(store.get(LANG_KEY), Some("en".to_string()));

        store.set(LANG_KEY, "ar").unwrap();
        assert_eq!(store.get(LANG_KEY), Some("ar".to_string()));
    }

    #[test]
    fn test_memory_store_with_entries() {
        let store = MemoryStore::with_entries([(LANG_KEY, "ru"), ("adminToken", "opaque")]);
        assert_eq!(store.get(LANG_KEY), Some("ru".to_string()));
        assert_eq!(store.get("adminToken"), Some("opaque".to_string()));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.json");

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get(LANG_KEY), None);
        store.set(LANG_KEY, "en").unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(LANG_KEY), Some("en".to_string()));
    }

    #[test]
    fn test_file_store_keeps_unrelated_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"adminToken": "abc"}"#).unwrap();

        let store = FileStore::open(&path).unwrap();
        store.set(LANG_KEY, "tr").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("adminToken"));
        assert!(content.contains("\"tr\""));
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileStore::open(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid preferences file"));
    }

    #[test]
    fn test_file_store_set_fails_when_directory_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path().join("missing/prefs.json")).unwrap();
        assert!(store.set(LANG_KEY, "en").is_err());
        assert_eq!(store.get(LANG_KEY), None);
    }

    #[test]
    fn test_file_store_failed_write_keeps_previous_value() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.json");
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.path(), path.as_path());
        store.set(LANG_KEY, "tr").unwrap();

        // A directory in place of the file makes the next write fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(store.set(LANG_KEY, "ar").is_err());
        assert_eq!(store.get(LANG_KEY), Some("tr".to_string()));
    }
}
