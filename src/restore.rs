//! Startup session restoration.
//!
//! Runs once, after a short grace period that lets the page registry
//! finish building. The order below is a priority list:
//!
//! 1. a restored tab whose path equals the browser path exactly
//! 2. the current route, freshly opened
//! 3. the snapshot's last active tab, replacing the history entry
//!
//! so a reload on the same page and a deep link to a different page are
//! told apart even when stale tabs exist.

use std::time::Duration;

use crate::navigation::Navigator;
use crate::state::{logical_path_for_id, Tab, TabManager, TabSnapshot};

/// Which restoration rule decided the active tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A restored tab matched the browser path exactly
    ExactPath { tab_id: String },
    /// The current route was opened fresh
    CurrentRoute { path: String },
    /// The snapshot's last active tab was re-activated
    LastActive { tab_id: String },
    /// Tabs were restored but none of the rules picked an active tab
    Restored { tabs: usize },
    /// Nothing was restored; the root page was opened
    Root { path: String },
    /// Nothing could be opened at all
    Empty,
}

/// Consume the one-shot deep-link redirect, if any.
///
/// The slot is deleted before anything else happens and the current history
/// entry is replaced, not pushed. Returns the normalized target.
pub fn consume_pending_redirect(manager: &mut TabManager, navigator: &Navigator) -> Option<String> {
    let target = manager.persistence().take_redirect()?;
    let current = manager.history().current_path();
    let normalized = navigator.normalize_path(&target, &current);

    tracing::info!(target = %normalized, "Consuming pending redirect");
    manager.replace_history(&normalized);
    Some(normalized)
}

/// Read the stored snapshot; a corrupt or unreadable one counts as absent
fn load_snapshot(manager: &TabManager) -> Option<TabSnapshot> {
    match manager.persistence().load() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!(%e, "Ignoring unreadable tab snapshot");
            None
        }
    }
}

/// Re-open every persisted tab that still resolves, in snapshot order
fn reopen_tabs(manager: &mut TabManager, navigator: &Navigator, snapshot: &TabSnapshot) -> usize {
    let home_id = navigator.config().home_id.clone();
    let mut restored = 0;

    for persisted in &snapshot.tabs {
        let logical = logical_path_for_id(&persisted.id, &home_id);
        let Some(page) = navigator.resolve(logical) else {
            tracing::debug!(tab_id = %persisted.id, "Dropping unresolvable tab");
            continue;
        };
        let tab = Tab::new(
            navigator.tab_id(&page.key),
            persisted.title.clone(),
            persisted.path.clone(),
            page.entry.provider,
        )
        .with_scroll_position(persisted.scroll_position);
        manager.open_tab(tab);
        restored += 1;
    }
    restored
}

/// Open the current route, or the root page if the route is unknown
fn open_current_or_root(manager: &mut TabManager, navigator: &Navigator, current: &str) -> RestoreOutcome {
    if navigator.navigate_to(manager, current, false) {
        return RestoreOutcome::CurrentRoute {
            path: current.to_string(),
        };
    }
    let root = navigator.normalize_path("/", current);
    if navigator.navigate_to(manager, &root, true) {
        return RestoreOutcome::Root { path: root };
    }
    RestoreOutcome::Empty
}

/// Restore the tab set from the session snapshot and pick the active tab
pub fn restore_session(manager: &mut TabManager, navigator: &Navigator) -> RestoreOutcome {
    let browser_path = manager.history().current_path();
    let current = navigator.normalize_path(&browser_path, &browser_path);
    let logical = navigator.logical_path(&current);

    let outcome = match load_snapshot(manager) {
        Some(snapshot) => restore_from_snapshot(manager, navigator, &snapshot, &current, &logical),
        None => open_current_or_root(manager, navigator, &current),
    };

    tracing::info!(?outcome, path = %current, tabs = manager.all_tabs().len(), "Session restored");
    outcome
}

fn restore_from_snapshot(
    manager: &mut TabManager,
    navigator: &Navigator,
    snapshot: &TabSnapshot,
    current: &str,
    logical: &str,
) -> RestoreOutcome {
    let restored = reopen_tabs(manager, navigator, snapshot);
    if restored == 0 {
        tracing::debug!("No snapshot tab resolved, starting fresh");
        return open_current_or_root(manager, navigator, current);
    }

    if manager.activate_tab_by_path(current) {
        let tab_id = manager
            .active_tab()
            .map(|tab| tab.id.clone())
            .unwrap_or_default();
        return RestoreOutcome::ExactPath { tab_id };
    }

    if navigator.resolve(logical).is_some() && navigator.navigate_to(manager, current, false) {
        return RestoreOutcome::CurrentRoute {
            path: current.to_string(),
        };
    }

    if let Some(tab_id) = snapshot.active_tab_id.as_deref() {
        if manager.set_active_tab(tab_id, false) {
            if let Some(path) = manager.active_tab().map(|tab| tab.path.clone()) {
                manager.replace_history(&path);
            }
            return RestoreOutcome::LastActive {
                tab_id: tab_id.to_string(),
            };
        }
    }

    RestoreOutcome::Restored { tabs: restored }
}

/// Wait out the startup grace period, then restore
pub async fn restore_after_grace(
    manager: &mut TabManager,
    navigator: &Navigator,
    delay: Duration,
) -> RestoreOutcome {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    restore_session(manager, navigator)
}
