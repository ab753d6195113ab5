//! Host navigation history.
//!
//! `HostHistory` is the seam between the tab core and the browser's
//! location/history object. `MemoryHistory` is a navigable in-memory
//! implementation used by the CLI driver and by tests to produce synthetic
//! back/forward events.

use parking_lot::RwLock;
use std::sync::Arc;

/// The host's location and history stack
pub trait HostHistory {
    /// Current browser pathname
    fn current_path(&self) -> String;
    /// Push a new history entry
    fn push(&mut self, path: &str);
    /// Replace the current history entry
    fn replace(&mut self, path: &str);
}

/// Push `path` as a new history entry unless the browser is already there.
///
/// This is the only way the tab core adds history entries. Returns `true` if
/// an entry was pushed.
pub fn update_browser_path(history: &mut dyn HostHistory, path: &str) -> bool {
    if history.current_path() == path {
        return false;
    }
    history.push(path);
    true
}

#[derive(Debug, Clone, PartialEq)]
struct HistoryStack {
    entries: Vec<String>,
    current_index: usize,
}

/// In-memory navigable history.
///
/// Cloning yields another handle to the same stack, so a test can keep one
/// handle while the tab manager owns the other.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    inner: Arc<RwLock<HistoryStack>>,
}

impl MemoryHistory {
    /// Create a history whose only entry is `initial_path`
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HistoryStack {
                entries: vec![initial_path.into()],
                current_index: 0,
            })),
        }
    }

    /// Check if we can go back
    pub fn can_go_back(&self) -> bool {
        self.inner.read().current_index > 0
    }

    /// Check if we can go forward
    pub fn can_go_forward(&self) -> bool {
        let inner = self.inner.read();
        inner.current_index < inner.entries.len().saturating_sub(1)
    }

    /// Go back in history, returns the pathname the host moved to
    pub fn back(&self) -> Option<String> {
        let mut inner = self.inner.write();
        if inner.current_index == 0 {
            return None;
        }
        inner.current_index -= 1;
        inner.entries.get(inner.current_index).cloned()
    }

    /// Go forward in history, returns the pathname the host moved to
    pub fn forward(&self) -> Option<String> {
        let mut inner = self.inner.write();
        if inner.current_index + 1 >= inner.entries.len() {
            return None;
        }
        inner.current_index += 1;
        inner.entries.get(inner.current_index).cloned()
    }

    /// All entries, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.inner.read().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }
}

impl HostHistory for MemoryHistory {
    fn current_path(&self) -> String {
        let inner = self.inner.read();
        inner
            .entries
            .get(inner.current_index)
            .cloned()
            .unwrap_or_else(|| "/".to_string())
    }

    /// Clears forward history if not at the end
    fn push(&mut self, path: &str) {
        let mut inner = self.inner.write();
        let keep = inner.current_index + 1;
        inner.entries.truncate(keep);
        inner.entries.push(path.to_string());
        inner.current_index = inner.entries.len() - 1;
    }

    fn replace(&mut self, path: &str) {
        let mut inner = self.inner.write();
        let index = inner.current_index;
        match inner.entries.get_mut(index) {
            Some(entry) => *entry = path.to_string(),
            None => inner.entries.push(path.to_string()),
        }
    }
}
