//! Navigation bridge between page identity and the host's location/history.
//!
//! Three path forms are in play:
//!
//! ```text
//!   logical path   "projects/lumen"          registry key, no prefix, no slashes at the ends
//!   browser path   "/ide/projects/lumen"     logical path + optional view-mode prefix
//!   tab path       "/ide/projects/lumen"     browser path at the time the tab was opened
//! ```
//!
//! Host back/forward signals reach the bridge as a `HistoryChange` event
//! (emitted by a thin adapter over the host's native signal), so the
//! reconciliation logic runs against synthetic events in tests.

use percent_encoding::percent_decode_str;
use std::sync::Arc;

use crate::config::NavigationConfig;
use crate::registry::{PageRegistry, ResolvedPage};
use crate::state::{tab_id_for, tab_title, Tab, TabManager};

/// Host navigation event carrying the pathname the host moved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryChange {
    pub pathname: String,
}

impl HistoryChange {
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
        }
    }
}

/// Navigation state derived from the host and the session store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub browser_path: String,
    /// Whether the view-mode prefix applies to new navigations
    pub view_mode_active: bool,
    /// Deep-link redirect waiting to be consumed at startup
    pub pending_redirect: Option<String>,
}

pub struct Navigator {
    config: NavigationConfig,
    registry: Arc<dyn PageRegistry>,
}

impl Navigator {
    pub fn new(config: NavigationConfig, registry: Arc<dyn PageRegistry>) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn registry(&self) -> &dyn PageRegistry {
        self.registry.as_ref()
    }

    fn segments(path: &str) -> impl Iterator<Item = &str> {
        path.trim().split('/').filter(|segment| !segment.is_empty())
    }

    /// Check if a path starts with the view-mode prefix segment
    pub fn has_view_mode_prefix(&self, path: &str) -> bool {
        let prefix = self.config.view_mode_prefix.as_str();
        !prefix.is_empty() && Self::segments(path).next() == Some(prefix)
    }

    /// Strip the view-mode prefix, the legacy home segment and any
    /// leading/trailing/duplicate slashes
    pub fn logical_path(&self, path: &str) -> String {
        let mut segments = Self::segments(path).peekable();
        if self.has_view_mode_prefix(path) {
            segments.next();
        }
        if segments.peek() == Some(&self.config.legacy_home_segment.as_str()) {
            segments.next();
        }
        segments.collect::<Vec<_>>().join("/")
    }

    /// Build the browser path of a logical path
    pub fn browser_path(&self, logical_path: &str, with_prefix: bool) -> String {
        let mut path = String::new();
        if with_prefix && !self.config.view_mode_prefix.is_empty() {
            path.push('/');
            path.push_str(&self.config.view_mode_prefix);
        }
        if !logical_path.is_empty() {
            path.push('/');
            path.push_str(logical_path);
        }
        if path.is_empty() {
            path.push('/');
        }
        path
    }

    /// Normalize a navigation target against the current browser location.
    ///
    /// The target is percent-decoded, so host pathnames and tab paths compare
    /// equal. The result has a single leading slash and no legacy home
    /// segment. The view-mode prefix is kept if either the target or the
    /// current location carries it, so relative navigations never drop out
    /// of the view mode. Idempotent for paths without a literal `%`.
    pub fn normalize_path(&self, path: &str, current_location: &str) -> String {
        let path = percent_decode_str(path).decode_utf8_lossy();
        let with_prefix =
            self.has_view_mode_prefix(&path) || self.has_view_mode_prefix(current_location);
        self.browser_path(&self.logical_path(&path), with_prefix)
    }

    pub fn tab_id(&self, logical_path: &str) -> String {
        tab_id_for(logical_path, &self.config.home_id)
    }

    pub fn tab_title(&self, logical_path: &str) -> String {
        tab_title(logical_path, &self.config.home_title)
    }

    /// Look up a logical path: exact key first, then case-insensitive
    pub fn resolve(&self, logical_path: &str) -> Option<ResolvedPage> {
        self.registry.resolve(logical_path)
    }

    /// Navigate to a path, opening (or re-activating) its tab.
    ///
    /// Unknown routes are a deliberate no-op: no tab is opened and nothing
    /// is registered. Returns `true` if a tab was opened.
    pub fn navigate_to(&self, manager: &mut TabManager, path: &str, update_history: bool) -> bool {
        let current = manager.history().current_path();
        let normalized = self.normalize_path(path, &current);
        if update_history {
            manager.push_history(&normalized);
        }

        let logical = self.logical_path(&normalized);
        let Some(page) = self.resolve(&logical) else {
            tracing::debug!(path = %normalized, %logical, "No page registered for path");
            return false;
        };

        // A case-insensitive hit opens the canonical page
        let tab_path = if page.key == logical {
            normalized.clone()
        } else {
            self.browser_path(&page.key, self.has_view_mode_prefix(&normalized))
        };

        let tab = Tab::new(
            self.tab_id(&page.key),
            self.tab_title(&page.key),
            tab_path.clone(),
            page.entry.provider,
        );
        tracing::debug!(path = %tab_path, tab_id = %tab.id, matched_by = ?page.matched_by, "Navigating");
        manager.open_tab(tab);

        let browser_path = manager.history().current_path();
        if tab_path != normalized && self.normalize_path(&browser_path, &browser_path) == normalized {
            manager.replace_history(&tab_path);
        }
        true
    }

    /// Reconcile a host back/forward navigation.
    ///
    /// The host has already moved, so no history entry is pushed: an open
    /// tab with that exact path is activated, otherwise the path is opened.
    pub fn on_history_change(&self, manager: &mut TabManager, change: &HistoryChange) {
        let normalized = self.normalize_path(&change.pathname, &change.pathname);

        if manager.activate_tab_by_path(&normalized) {
            tracing::debug!(path = %normalized, "History change activated existing tab");
            return;
        }
        self.navigate_to(manager, &normalized, false);
    }

    /// Derive the current navigation state
    pub fn state(&self, manager: &TabManager) -> NavigationState {
        let browser_path = manager.history().current_path();
        NavigationState {
            view_mode_active: self.has_view_mode_prefix(&browser_path),
            pending_redirect: manager.persistence().peek_redirect(),
            browser_path,
        }
    }
}
