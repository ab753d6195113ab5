use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use super::layout::TabGroup;
use crate::config::SessionConfig;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session storage is unavailable")]
    Unavailable,
    #[error("Session storage quota exceeded ({size} bytes, limit {limit})")]
    QuotaExceeded { size: usize, limit: usize },
    #[error("I/O error on session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Corrupt session data: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("Failed to serialize session data: {0}")]
    Serialize(#[source] serde_json::Error),
}

type StoreResult<T> = Result<T, StoreError>;

/// Session-scoped key/value storage (the host's session storage)
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug, Default)]
struct MemoryInner {
    values: HashMap<String, String>,
    writable: bool,
    quota: Option<usize>,
}

/// In-memory session store.
///
/// Cloning yields another handle to the same storage. Writes can be disabled
/// or capped to reproduce host storage failures.
#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    inner: Arc<RwLock<MemoryInner>>,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryInner {
                writable: true,
                ..Default::default()
            })),
        }
    }

    /// Enable or disable writes (disabled writes fail with `Unavailable`)
    pub fn set_writable(&self, writable: bool) {
        self.inner.write().writable = writable;
    }

    /// Limit the size of a single stored value
    pub fn set_quota(&self, quota: Option<usize>) {
        self.inner.write().quota = quota;
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.inner.read().values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if !inner.writable {
            return Err(StoreError::Unavailable);
        }
        if let Some(limit) = inner.quota {
            if value.len() > limit {
                return Err(StoreError::QuotaExceeded {
                    size: value.len(),
                    limit,
                });
            }
        }
        inner.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.inner.write().values.remove(key);
        Ok(())
    }
}

// ============================================================================
// File-backed store
// ============================================================================

/// Session store backed by a JSON object file (used by the CLI driver)
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    /// Get the default session file path (session.json in local data directory)
    pub fn default_path() -> PathBuf {
        const FILENAME: &str = "session.json";
        if let Some(mut path) = dirs::data_local_dir() {
            path.push("portfolio-shell");
            path.push(FILENAME);
            return path;
        }

        // Fallback to home directory
        if let Some(mut path) = dirs::home_dir() {
            path.push(".portfolio-shell");
            path.push(FILENAME);
            return path;
        }

        PathBuf::from(FILENAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_all(&self) -> StoreResult<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        serde_json::from_str(&content).map_err(StoreError::Corrupt)
    }

    /// Like `read_all`, but a corrupt file reads as empty so the next write
    /// replaces it. I/O errors still propagate.
    fn read_for_update(&self) -> StoreResult<HashMap<String, String>> {
        match self.read_all() {
            Err(StoreError::Corrupt(e)) => {
                tracing::warn!(%e, path = %self.path.display(), "Replacing corrupt session file");
                Ok(HashMap::new())
            }
            other => other,
        }
    }

    fn write_all(&self, values: &HashMap<String, String>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let content = serde_json::to_string_pretty(values).map_err(StoreError::Serialize)?;
        fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let _guard = self.lock.read();
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let _guard = self.lock.write();
        let mut values = self.read_for_update()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let _guard = self.lock.write();
        let mut values = self.read_for_update()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tab snapshot
// ============================================================================

/// Persisted descriptor of a single tab (content provider is re-resolved)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedTab {
    pub id: String,
    pub title: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_position: Option<f64>,
}

/// Minimal tab state written to the session store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSnapshot {
    pub tabs: Vec<PersistedTab>,
    #[serde(default)]
    pub active_tab_id: Option<String>,
}

impl From<&TabGroup> for TabSnapshot {
    fn from(group: &TabGroup) -> Self {
        Self {
            tabs: group
                .tabs()
                .iter()
                .map(|tab| PersistedTab {
                    id: tab.id.clone(),
                    title: tab.title.clone(),
                    path: tab.path.clone(),
                    scroll_position: tab.scroll_position,
                })
                .collect(),
            active_tab_id: group.active_tab_id().map(str::to_string),
        }
    }
}

/// Owner of the snapshot key and the deep-link redirect slot.
///
/// Storage failures are logged here and never reach callers of tab
/// operations; the in-memory state stays authoritative.
#[derive(Clone)]
pub struct PersistenceStore {
    store: Arc<dyn SessionStore>,
    storage_key: String,
    redirect_key: String,
}

impl PersistenceStore {
    pub fn new(store: Arc<dyn SessionStore>, config: &SessionConfig) -> Self {
        Self {
            store,
            storage_key: config.storage_key.clone(),
            redirect_key: config.redirect_key.clone(),
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Write the group's snapshot. An empty group is never written so a
    /// transient all-closed state cannot destroy a still-valid snapshot.
    ///
    /// Returns `true` if the snapshot was written.
    pub fn save_group(&self, group: &TabGroup) -> bool {
        if group.is_empty() {
            tracing::debug!(group_id = group.id(), "Skipping snapshot of empty group");
            return false;
        }

        let snapshot = TabSnapshot::from(group);
        match self.write_snapshot(&snapshot) {
            Ok(()) => {
                tracing::debug!(
                    key = %self.storage_key,
                    tabs = snapshot.tabs.len(),
                    active = ?snapshot.active_tab_id,
                    "Saved tab snapshot"
                );
                true
            }
            Err(e) => {
                tracing::warn!(%e, key = %self.storage_key, "Failed to save tab snapshot");
                false
            }
        }
    }

    fn write_snapshot(&self, snapshot: &TabSnapshot) -> StoreResult<()> {
        let content = serde_json::to_string(snapshot).map_err(StoreError::Serialize)?;
        self.store.set(&self.storage_key, &content)
    }

    /// Read the stored snapshot, if any
    pub fn load(&self) -> StoreResult<Option<TabSnapshot>> {
        let Some(content) = self.store.get(&self.storage_key)? else {
            return Ok(None);
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(StoreError::Corrupt)
    }

    /// Remove the snapshot (called when leaving the IDE presentation mode)
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(&self.storage_key) {
            tracing::warn!(%e, key = %self.storage_key, "Failed to clear tab snapshot");
        }
    }

    /// Stash a deep-link redirect target for the next startup
    pub fn stash_redirect(&self, path: &str) -> StoreResult<()> {
        self.store.set(&self.redirect_key, path)
    }

    /// Read the pending redirect without consuming it
    pub fn peek_redirect(&self) -> Option<String> {
        self.store.get(&self.redirect_key).ok().flatten()
    }

    /// Consume the pending redirect. The slot is deleted immediately so a
    /// stale redirect can never fire on a later navigation.
    pub fn take_redirect(&self) -> Option<String> {
        let target = match self.store.get(&self.redirect_key) {
            Ok(target) => target?,
            Err(e) => {
                tracing::warn!(%e, "Failed to read pending redirect");
                return None;
            }
        };
        if let Err(e) = self.store.remove(&self.redirect_key) {
            tracing::warn!(%e, "Failed to delete pending redirect");
        }
        Some(target)
    }
}
