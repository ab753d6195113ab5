use super::tab::ContentProviderId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Tab id → content provider mapping.
///
/// Cloning yields another handle to the same map, so the renderer side can
/// hold one while the tab manager mutates it. Only `TabManager` writes.
#[derive(Debug, Clone, Default)]
pub struct ContentProviders {
    inner: Arc<RwLock<HashMap<String, ContentProviderId>>>,
}

impl ContentProviders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the content provider registered for a tab id
    pub fn get(&self, tab_id: &str) -> Option<ContentProviderId> {
        self.inner.read().get(tab_id).cloned()
    }

    pub fn contains(&self, tab_id: &str) -> bool {
        self.inner.read().contains_key(tab_id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub(crate) fn register(&self, tab_id: impl Into<String>, provider: ContentProviderId) {
        self.inner.write().insert(tab_id.into(), provider);
    }

    pub(crate) fn unregister(&self, tab_id: &str) -> Option<ContentProviderId> {
        self.inner.write().remove(tab_id)
    }
}
