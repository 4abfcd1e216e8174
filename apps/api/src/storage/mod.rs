//! Local persistence port — durable key→JSON slots.
//!
//! Two slots exist today: the signed-in identity and the history archive.
//! Each is read once at startup and rewritten in full on every change
//! (last write wins, no partial updates, no schema versioning). The port is
//! injected into the stores so tests run against `MemoryStore`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde_json::Value;

/// The persistence boundary. Implementations must be cheap enough to call
/// inline on every mutation; blobs here are small (one user's state).
pub trait StateStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Value>>;
    fn save(&self, key: &str, value: &Value) -> Result<()>;
    fn clear(&self, key: &str) -> Result<()>;
}

/// File-backed store: one `<key>.json` per slot under the data directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let value = serde_json::from_str(&raw)
            .with_context(|| format!("Corrupt state blob at {}", path.display()))?;
        Ok(Some(value))
    }

    fn save(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.path_for(key);
        let raw = serde_json::to_string_pretty(value)?;
        std::fs::write(&path, raw)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
    }
}

/// In-memory store for tests and ephemeral runs.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, Value>>,
}

#[allow(dead_code)]
impl MemoryStore {
    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        // A poisoned lock only means a panic elsewhere; the map is still usable.
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StateStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.slots().get(key).cloned())
    }

    fn save(&self, key: &str, value: &Value) -> Result<()> {
        self.slots().insert(key.to_string(), value.clone());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        self.slots().remove(key);
        Ok(())
    }
}
