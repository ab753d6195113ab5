//! Tab group manager: open / close / activate / move over the layout tree.
//!
//! Every committed mutation runs in a fixed order:
//! 1. layout tree mutation
//! 2. content-provider map update
//! 3. snapshot write of the root group
//! 4. `TabChange` notification
//!
//! so a listener never observes a mutated tree with a stale provider mapping.
//! Unknown group ids and unknown tab ids are silent no-ops.

use super::layout::{LayoutNode, SplitDirection, TabGroup};
use super::persistence::PersistenceStore;
use super::providers::ContentProviders;
use super::tab::Tab;
use crate::events::{TabChange, TabChangeKind, TabEvents};
use crate::history::{self, HostHistory};
use tokio::sync::broadcast;

/// Owner of the layout tree and the only writer of the content-provider map
pub struct TabManager {
    layout: LayoutNode,
    root_group_id: String,
    providers: ContentProviders,
    persistence: PersistenceStore,
    history: Box<dyn HostHistory>,
    events: TabEvents,
}

fn unknown_group(group_id: &str) {
    if cfg!(debug_assertions) {
        tracing::warn!(group_id, "Tab operation on unknown group ignored");
    } else {
        tracing::debug!(group_id, "Tab operation on unknown group ignored");
    }
}

impl TabManager {
    /// Create a manager with a single root group
    pub fn new(
        root_group_id: impl Into<String>,
        providers: ContentProviders,
        persistence: PersistenceStore,
        history: Box<dyn HostHistory>,
    ) -> Self {
        let root_group_id = root_group_id.into();
        let layout = LayoutNode::group(root_group_id.clone());
        Self::with_layout(layout, root_group_id, providers, persistence, history)
    }

    /// Create a manager over an existing layout tree.
    ///
    /// `root_group_id` names the group that is snapshotted and that the
    /// group-less operations address.
    pub fn with_layout(
        layout: LayoutNode,
        root_group_id: impl Into<String>,
        providers: ContentProviders,
        persistence: PersistenceStore,
        history: Box<dyn HostHistory>,
    ) -> Self {
        Self {
            layout,
            root_group_id: root_group_id.into(),
            providers,
            persistence,
            history,
            events: TabEvents::new(),
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn layout(&self) -> &LayoutNode {
        &self.layout
    }

    pub fn root_group_id(&self) -> &str {
        &self.root_group_id
    }

    pub fn group(&self, group_id: &str) -> Option<&TabGroup> {
        self.layout.find_group(group_id)
    }

    pub fn root_group(&self) -> Option<&TabGroup> {
        self.layout.find_group(&self.root_group_id)
    }

    /// Active tab of the root group
    pub fn active_tab(&self) -> Option<&Tab> {
        self.root_group().and_then(TabGroup::active_tab)
    }

    /// Tabs of the root group, in order
    pub fn all_tabs(&self) -> &[Tab] {
        self.root_group().map(TabGroup::tabs).unwrap_or(&[])
    }

    pub fn providers(&self) -> &ContentProviders {
        &self.providers
    }

    pub fn persistence(&self) -> &PersistenceStore {
        &self.persistence
    }

    pub fn history(&self) -> &dyn HostHistory {
        self.history.as_ref()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TabChange> {
        self.events.subscribe()
    }

    // ========================================================================
    // Host history
    // ========================================================================

    /// Push a history entry unless the browser is already at `path`
    pub(crate) fn push_history(&mut self, path: &str) -> bool {
        history::update_browser_path(self.history.as_mut(), path)
    }

    /// Replace the current history entry
    pub(crate) fn replace_history(&mut self, path: &str) {
        if self.history.current_path() != path {
            self.history.replace(path);
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    pub fn open_tab(&mut self, tab: Tab) {
        let group_id = self.root_group_id.clone();
        self.open_tab_in(&group_id, tab);
    }

    /// Open a tab, or update it in place if its id is already open.
    ///
    /// Tab ids are unique across the whole tree: if the id lives in another
    /// group, that group's record is updated and activated instead of
    /// creating a duplicate.
    pub fn open_tab_in(&mut self, group_id: &str, tab: Tab) {
        let target = match self.layout.group_containing(&tab.id) {
            Some(owner) => {
                if owner.id() != group_id {
                    tracing::debug!(
                        tab_id = %tab.id,
                        requested = group_id,
                        owner = owner.id(),
                        "Tab already open in another group"
                    );
                }
                owner.id().to_string()
            }
            None => group_id.to_string(),
        };

        let Some(group) = self.layout.find_group_mut(&target) else {
            unknown_group(&target);
            return;
        };

        let tab_id = tab.id.clone();
        let provider = tab.content_provider.clone();
        group.upsert(tab);
        self.providers.register(tab_id.clone(), provider);

        tracing::debug!(tab_id = %tab_id, group_id = %target, "Opened tab");
        self.commit(TabChangeKind::Opened, &[target.as_str()]);
    }

    pub fn close_tab(&mut self, tab_id: &str) {
        let group_id = self.root_group_id.clone();
        self.close_tab_in(&group_id, tab_id);
    }

    /// Close a tab. If it was active, the tab at `max(0, index - 1)` of the
    /// remaining list becomes active and the browser follows it.
    pub fn close_tab_in(&mut self, group_id: &str, tab_id: &str) {
        let Some(group) = self.layout.find_group_mut(group_id) else {
            unknown_group(group_id);
            return;
        };
        let Some(removed) = group.remove(tab_id) else {
            tracing::debug!(tab_id, group_id, "Close ignored, tab not open");
            return;
        };

        let neighbor_path = if removed.was_active {
            group
                .select_after_close(removed.index)
                .map(|tab| tab.path.clone())
        } else {
            None
        };

        self.providers.unregister(tab_id);
        if let Some(path) = neighbor_path {
            self.push_history(&path);
        }

        tracing::debug!(tab_id, group_id, index = removed.index, "Closed tab");
        self.commit(TabChangeKind::Closed, &[group_id]);
    }

    pub fn set_active_tab(&mut self, tab_id: &str, update_history: bool) -> bool {
        let group_id = self.root_group_id.clone();
        self.set_active_tab_in(&group_id, tab_id, update_history)
    }

    /// Activate a tab. With `update_history`, a history entry is pushed when
    /// the tab's path differs from the current browser path.
    ///
    /// Returns `false` if the group or tab does not exist.
    pub fn set_active_tab_in(&mut self, group_id: &str, tab_id: &str, update_history: bool) -> bool {
        let Some(group) = self.layout.find_group_mut(group_id) else {
            unknown_group(group_id);
            return false;
        };
        let Some(tab) = group.set_active(tab_id) else {
            tracing::debug!(tab_id, group_id, "Activate ignored, tab not open");
            return false;
        };
        let path = tab.path.clone();

        if update_history {
            self.push_history(&path);
        }
        self.commit(TabChangeKind::Activated, &[group_id]);
        true
    }

    /// Activate the root group's tab whose path matches exactly, without
    /// touching history (the browser is already there)
    pub fn activate_tab_by_path(&mut self, path: &str) -> bool {
        let Some(tab_id) = self
            .root_group()
            .and_then(|group| group.find_by_path(path))
            .map(|tab| tab.id.clone())
        else {
            return false;
        };
        let group_id = self.root_group_id.clone();
        self.set_active_tab_in(&group_id, &tab_id, false)
    }

    /// Move a tab to `position` (clamped) in the destination group.
    ///
    /// Within one group this is a reorder and an active tab stays active.
    /// Across groups the moved tab is not activated in the destination
    /// (unless the destination was empty) and the source re-selects its
    /// first remaining tab if the moved tab was active there.
    pub fn move_tab(&mut self, tab_id: &str, from_group: &str, to_group: &str, position: usize) -> bool {
        if from_group == to_group {
            return self.reorder_tab(tab_id, from_group, position);
        }

        if self.layout.find_group(to_group).is_none() {
            unknown_group(to_group);
            return false;
        }
        let Some(source) = self.layout.find_group_mut(from_group) else {
            unknown_group(from_group);
            return false;
        };
        let Some(removed) = source.remove(tab_id) else {
            tracing::debug!(tab_id, from_group, "Move ignored, tab not in source group");
            return false;
        };
        if removed.was_active {
            source.select_first();
        }

        let Some(destination) = self.layout.find_group_mut(to_group) else {
            unknown_group(to_group);
            return false;
        };
        let index = destination.insert_at(removed.tab, position);

        tracing::debug!(tab_id, from_group, to_group, index, "Moved tab across groups");
        self.commit(TabChangeKind::Moved, &[from_group, to_group]);
        true
    }

    fn reorder_tab(&mut self, tab_id: &str, group_id: &str, position: usize) -> bool {
        let Some(group) = self.layout.find_group_mut(group_id) else {
            unknown_group(group_id);
            return false;
        };
        let Some(removed) = group.remove(tab_id) else {
            tracing::debug!(tab_id, group_id, "Reorder ignored, tab not open");
            return false;
        };
        let index = group.insert_at(removed.tab, position);

        let active_path = if removed.was_active {
            group.set_active(tab_id).map(|tab| tab.path.clone())
        } else {
            None
        };
        if let Some(path) = active_path {
            self.push_history(&path);
        }

        tracing::debug!(tab_id, group_id, from = removed.index, to = index, "Reordered tab");
        self.commit(TabChangeKind::Moved, &[group_id]);
        true
    }

    /// Close every tab in the root group except `keep_id`
    pub fn close_other_tabs(&mut self, keep_id: &str) {
        let group_id = self.root_group_id.clone();
        let Some(group) = self.layout.find_group_mut(&group_id) else {
            unknown_group(&group_id);
            return;
        };
        if !group.contains(keep_id) {
            return;
        }

        let previous_active = group.active_tab_id().map(str::to_string);
        let removed = group.retain(|tab| tab.id == keep_id);
        if removed.is_empty() {
            return;
        }
        let active_path = group
            .active_tab()
            .filter(|tab| previous_active.as_deref() != Some(tab.id.as_str()))
            .map(|tab| tab.path.clone());

        for tab in &removed {
            self.providers.unregister(&tab.id);
        }
        if let Some(path) = active_path {
            self.push_history(&path);
        }

        tracing::debug!(keep_id, closed = removed.len(), "Closed other tabs");
        self.commit(TabChangeKind::Closed, &[group_id.as_str()]);
    }

    /// Close every tab in the root group.
    ///
    /// The empty group is not written, so the previous snapshot survives.
    pub fn close_all_tabs(&mut self) {
        let group_id = self.root_group_id.clone();
        let Some(group) = self.layout.find_group_mut(&group_id) else {
            unknown_group(&group_id);
            return;
        };
        let removed = group.clear();
        if removed.is_empty() {
            return;
        }
        for tab in &removed {
            self.providers.unregister(&tab.id);
        }

        tracing::debug!(closed = removed.len(), "Closed all tabs");
        self.commit(TabChangeKind::Closed, &[group_id.as_str()]);
    }

    /// Record a tab's scroll position so it survives a reload
    pub fn save_scroll_position(&mut self, tab_id: &str, scroll_position: f64) {
        if !scroll_position.is_finite() {
            return;
        }
        let Some(group_id) = self
            .layout
            .group_containing(tab_id)
            .map(|group| group.id().to_string())
        else {
            return;
        };
        let Some(tab) = self
            .layout
            .find_group_mut(&group_id)
            .and_then(|group| group.get_mut(tab_id))
        else {
            return;
        };
        tab.scroll_position = Some(scroll_position);
        self.commit(TabChangeKind::Updated, &[group_id.as_str()]);
    }

    /// Activate the next tab of the root group, wrapping around
    pub fn activate_next_tab(&mut self) -> bool {
        self.activate_relative(1)
    }

    /// Activate the previous tab of the root group, wrapping around
    pub fn activate_previous_tab(&mut self) -> bool {
        self.activate_relative(-1)
    }

    fn activate_relative(&mut self, step: isize) -> bool {
        let Some(group) = self.root_group() else {
            return false;
        };
        let len = group.len();
        if len < 2 {
            return false;
        }
        let current = group
            .active_tab_id()
            .and_then(|id| group.position(id))
            .unwrap_or(0);
        let next = (current as isize + step).rem_euclid(len as isize) as usize;
        let tab_id = group.tabs()[next].id.clone();

        let group_id = self.root_group_id.clone();
        self.set_active_tab_in(&group_id, &tab_id, true)
    }

    /// Split a group into two panes. The new group is empty; returns its id.
    pub fn split_group(&mut self, group_id: &str, direction: SplitDirection) -> Option<String> {
        let Some(new_id) = self.layout.split_group(group_id, direction) else {
            unknown_group(group_id);
            return None;
        };
        tracing::debug!(group_id, new_group_id = %new_id, ?direction, "Split group");
        Some(new_id)
    }

    /// Persist the root group and notify listeners about each touched group
    fn commit(&self, kind: TabChangeKind, group_ids: &[&str]) {
        if let Some(root) = self.root_group() {
            self.persistence.save_group(root);
        }
        for group_id in group_ids {
            let active = self
                .layout
                .find_group(group_id)
                .and_then(TabGroup::active_tab)
                .cloned();
            self.events.emit(TabChange {
                kind,
                group_id: group_id.to_string(),
                active,
            });
        }
    }
}
