//! Durable storage for the persisted part of the application state
//!
//! Entries are raw JSON strings keyed by name. The entry body is an envelope
//! `{"state": {...}, "version": N}` around [`PersistedState`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::warn;

use super::state::PersistedState;
use crate::{Error, Result};

/// Storage entry name used by the application
pub const DEFAULT_STORAGE_NAME: &str = "make-a-task-storage";

/// Layout version written into every entry
pub const STORAGE_VERSION: u32 = 0;

/// Key-value storage for serialized state entries
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Read an entry, `None` if it was never written
    async fn load(&self, name: &str) -> Result<Option<String>>;

    /// Write an entry, replacing any previous content
    async fn save(&self, name: &str, content: &str) -> Result<()>;
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: &'a PersistedState,
    version: u32,
}

#[derive(Deserialize)]
struct Envelope {
    state: PersistedState,
}

/// Serialize the persisted subset into an entry body
pub fn encode(state: &PersistedState) -> Result<String> {
    Ok(serde_json::to_string(&EnvelopeRef {
        state,
        version: STORAGE_VERSION,
    })?)
}

/// Parse an entry body
pub fn decode(content: &str) -> Result<PersistedState> {
    let envelope: Envelope = serde_json::from_str(content)?;
    Ok(envelope.state)
}

/// Load and parse an entry
///
/// Unparseable content is treated like a missing entry.
pub async fn read_entry(storage: &dyn StateStorage, name: &str) -> Result<Option<PersistedState>> {
    let Some(content) = storage.load(name).await? else {
        return Ok(None);
    };
    match decode(&content) {
        Ok(state) => Ok(Some(state)),
        Err(e) => {
            warn!("Ignoring unreadable storage entry {}: {}", name, e);
            Ok(None)
        }
    }
}

/// Serialize and write an entry
pub async fn write_entry(
    storage: &dyn StateStorage,
    name: &str,
    state: &PersistedState,
) -> Result<()> {
    let content = encode(state)?;
    storage.save(name, &content).await
}

/// File-based storage, one JSON file per entry
///
/// Writes go to a temporary file that is renamed over the entry, so readers
/// never observe a half-written entry.
#[derive(Debug)]
pub struct FileStateStorage {
    dir: PathBuf,
    write_seq: AtomicU64,
}

impl FileStateStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_seq: AtomicU64::new(0),
        }
    }

    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl StateStorage for FileStateStorage {
    async fn load(&self, name: &str) -> Result<Option<String>> {
        let path = self.entry_path(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn save(&self, name: &str, content: &str) -> Result<()> {
        // Ensure parent directory exists
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::Storage(format!("Failed to create directory: {}", e)))?;

        let path = self.entry_path(name);
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("json.{}.{}.tmp", std::process::id(), seq));
        tokio::fs::write(&tmp, content).await.map_err(|e| {
            Error::Storage(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        tokio::fs::rename(&tmp, &path).await.map_err(|e| {
            Error::Storage(format!("Failed to replace {}: {}", path.display(), e))
        })?;
        Ok(())
    }
}

/// In-process storage
#[derive(Debug, Default)]
pub struct MemoryStateStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStateStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry with the given state
    pub fn with_state(name: &str, state: &PersistedState) -> Result<Self> {
        let storage = Self::new();
        storage.insert(name, encode(state)?);
        Ok(storage)
    }

    pub fn insert(&self, name: &str, content: impl Into<String>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(name.to_string(), content.into());
        }
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.entries.lock().ok()?.get(name).cloned()
    }
}

#[async_trait]
impl StateStorage for MemoryStateStorage {
    async fn load(&self, name: &str) -> Result<Option<String>> {
        Ok(self.get(name))
    }

    async fn save(&self, name: &str, content: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| Error::Storage("Storage lock poisoned".into()))?;
        entries.insert(name.to_string(), content.to_string());
        Ok(())
    }
}
