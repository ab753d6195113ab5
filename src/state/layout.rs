//! Layout tree holding the tab groups.
//!
//! Only a single `Group` node is instantiated by the shell today, but every
//! traversal descends into `Split` children so multi-pane layouts work
//! without changing the mutation contract.

use super::tab::Tab;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SplitDirection {
    Horizontal,
    Vertical,
}

/// A tab removed from a group, with where it was and whether it was active
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedTab {
    pub index: usize,
    pub tab: Tab,
    pub was_active: bool,
}

/// An ordered list of tabs sharing one active-tab pointer.
///
/// `active_tab_id` is `None` exactly when `tabs` is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabGroup {
    id: String,
    tabs: Vec<Tab>,
    active_tab_id: Option<String>,
}

impl TabGroup {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tabs: Vec::new(),
            active_tab_id: None,
        }
    }

    /// Create a group with a random id (for groups created by splits)
    pub fn with_random_id() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn active_tab_id(&self) -> Option<&str> {
        self.active_tab_id.as_deref()
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        let id = self.active_tab_id.as_deref()?;
        self.get(id)
    }

    pub fn position(&self, tab_id: &str) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.id == tab_id)
    }

    pub fn get(&self, tab_id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id == tab_id)
    }

    pub fn get_mut(&mut self, tab_id: &str) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|tab| tab.id == tab_id)
    }

    pub fn contains(&self, tab_id: &str) -> bool {
        self.position(tab_id).is_some()
    }

    /// Find a tab whose browser path matches exactly
    pub fn find_by_path(&self, path: &str) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.path == path)
    }

    /// Replace the tab with the same id in place, or append it. Either way it
    /// becomes the active tab.
    pub fn upsert(&mut self, tab: Tab) -> &Tab {
        let id = tab.id.clone();
        let index = match self.position(&id) {
            Some(index) => {
                self.tabs[index] = tab;
                index
            }
            None => {
                self.tabs.push(tab);
                self.tabs.len() - 1
            }
        };
        self.active_tab_id = Some(id);
        &self.tabs[index]
    }

    /// Insert at position (clamped to the valid range), returns the index used
    pub fn insert_at(&mut self, tab: Tab, position: usize) -> usize {
        let index = position.min(self.tabs.len());
        self.tabs.insert(index, tab);
        if self.active_tab_id.is_none() {
            self.active_tab_id = Some(self.tabs[index].id.clone());
        }
        index
    }

    /// Remove a tab without choosing a new active tab.
    ///
    /// Callers must follow up with [`select_after_close`](Self::select_after_close)
    /// or [`select_first`](Self::select_first) when `was_active` is set.
    pub fn remove(&mut self, tab_id: &str) -> Option<RemovedTab> {
        let index = self.position(tab_id)?;
        let tab = self.tabs.remove(index);
        let was_active = self.active_tab_id.as_deref() == Some(tab_id);
        if was_active {
            self.active_tab_id = None;
        }
        Some(RemovedTab {
            index,
            tab,
            was_active,
        })
    }

    /// Activate the neighbor of a tab closed at `closed_index`:
    /// `max(0, closed_index - 1)` in the post-removal list.
    pub fn select_after_close(&mut self, closed_index: usize) -> Option<&Tab> {
        if self.tabs.is_empty() {
            self.active_tab_id = None;
            return None;
        }
        let index = closed_index.saturating_sub(1).min(self.tabs.len() - 1);
        self.active_tab_id = Some(self.tabs[index].id.clone());
        self.tabs.get(index)
    }

    /// Activate the first tab (or clear the active tab when empty)
    pub fn select_first(&mut self) -> Option<&Tab> {
        self.active_tab_id = self.tabs.first().map(|tab| tab.id.clone());
        self.tabs.first()
    }

    /// Set the active tab. Returns `None` (and changes nothing) if absent.
    pub fn set_active(&mut self, tab_id: &str) -> Option<&Tab> {
        let index = self.position(tab_id)?;
        self.active_tab_id = Some(tab_id.to_string());
        self.tabs.get(index)
    }

    /// Remove every tab, returning them in order
    pub fn clear(&mut self) -> Vec<Tab> {
        self.active_tab_id = None;
        std::mem::take(&mut self.tabs)
    }

    /// Keep only tabs matching the predicate, returning the removed ones.
    /// The active tab is re-selected if it was removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&Tab) -> bool) -> Vec<Tab> {
        let (kept, removed): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.tabs).into_iter().partition(|tab| keep(tab));
        self.tabs = kept;
        let active_survives = self
            .active_tab_id
            .as_deref()
            .is_some_and(|id| self.contains(id));
        if !active_survives {
            self.select_first();
        }
        removed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitNode {
    pub direction: SplitDirection,
    /// Relative sizes, one per child
    pub sizes: Vec<f64>,
    pub children: Vec<LayoutNode>,
}

/// A layout tree node: a single tab group or a split of child nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LayoutNode {
    Group(TabGroup),
    Split(SplitNode),
}

impl LayoutNode {
    pub fn group(id: impl Into<String>) -> Self {
        Self::Group(TabGroup::new(id))
    }

    /// Build a split with equal relative sizes
    pub fn split(direction: SplitDirection, children: Vec<LayoutNode>) -> Self {
        let size = if children.is_empty() {
            0.0
        } else {
            1.0 / children.len() as f64
        };
        Self::Split(SplitNode {
            direction,
            sizes: vec![size; children.len()],
            children,
        })
    }

    /// Replace a group node with a split of itself and a new empty group.
    /// Returns the new group's id.
    pub fn split_group(&mut self, group_id: &str, direction: SplitDirection) -> Option<String> {
        if matches!(self, LayoutNode::Group(group) if group.id == group_id) {
            let new_group = TabGroup::with_random_id();
            let new_id = new_group.id.clone();
            let existing = std::mem::replace(self, LayoutNode::split(direction, Vec::new()));
            *self = LayoutNode::split(direction, vec![existing, LayoutNode::Group(new_group)]);
            return Some(new_id);
        }
        match self {
            LayoutNode::Group(_) => None,
            LayoutNode::Split(split) => split
                .children
                .iter_mut()
                .find_map(|child| child.split_group(group_id, direction)),
        }
    }

    pub fn find_group(&self, group_id: &str) -> Option<&TabGroup> {
        match self {
            LayoutNode::Group(group) if group.id == group_id => Some(group),
            LayoutNode::Group(_) => None,
            LayoutNode::Split(split) => split
                .children
                .iter()
                .find_map(|child| child.find_group(group_id)),
        }
    }

    pub fn find_group_mut(&mut self, group_id: &str) -> Option<&mut TabGroup> {
        match self {
            LayoutNode::Group(group) if group.id == group_id => Some(group),
            LayoutNode::Group(_) => None,
            LayoutNode::Split(split) => split
                .children
                .iter_mut()
                .find_map(|child| child.find_group_mut(group_id)),
        }
    }

    /// Find the group that currently holds a tab id
    pub fn group_containing(&self, tab_id: &str) -> Option<&TabGroup> {
        match self {
            LayoutNode::Group(group) if group.contains(tab_id) => Some(group),
            LayoutNode::Group(_) => None,
            LayoutNode::Split(split) => split
                .children
                .iter()
                .find_map(|child| child.group_containing(tab_id)),
        }
    }

    /// All groups in depth-first order
    pub fn groups(&self) -> Vec<&TabGroup> {
        let mut groups = Vec::new();
        self.collect_groups(&mut groups);
        groups
    }

    fn collect_groups<'a>(&'a self, out: &mut Vec<&'a TabGroup>) {
        match self {
            LayoutNode::Group(group) => out.push(group),
            LayoutNode::Split(split) => {
                for child in &split.children {
                    child.collect_groups(out);
                }
            }
        }
    }

    /// Total number of tabs across all groups
    pub fn tab_count(&self) -> usize {
        self.groups().iter().map(|group| group.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(id: &str) -> Tab {
        Tab::new(id, id.to_uppercase(), format!("/ide/{id}"), format!("page:{id}").as_str())
    }

    fn group_with(ids: &[&str]) -> TabGroup {
        let mut group = TabGroup::new("main");
        for id in ids {
            group.upsert(tab(id));
        }
        group
    }

    fn ids(group: &TabGroup) -> Vec<&str> {
        group.tabs().iter().map(|tab| tab.id.as_str()).collect()
    }

    #[test]
    fn test_empty_group_has_no_active() {
        let group = TabGroup::new("main");
        assert!(group.is_empty());
        assert_eq!(group.active_tab_id(), None);
        assert_eq!(group.active_tab(), None);
    }

    #[test]
    fn test_upsert_appends_and_activates() {
        let group = group_with(&["a", "b"]);
        assert_eq!(ids(&group), vec!["a", "b"]);
        assert_eq!(group.active_tab_id(), Some("b"));
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut group = group_with(&["a", "b", "c"]);
        let mut updated = tab("a");
        updated.title = "Renamed".to_string();
        group.upsert(updated);

        assert_eq!(ids(&group), vec!["a", "b", "c"]);
        assert_eq!(group.tabs()[0].title, "Renamed");
        assert_eq!(group.active_tab_id(), Some("a"));
    }

    #[test]
    fn test_remove_reports_index_and_active() {
        let mut group = group_with(&["a", "b", "c"]);
        group.set_active("b");

        let removed = group.remove("b").unwrap();
        assert_eq!(removed.index, 1);
        assert!(removed.was_active);
        assert_eq!(group.active_tab_id(), None);

        assert!(group.remove("missing").is_none());
    }

    #[test]
    fn test_select_after_close_middle() {
        let mut group = group_with(&["a", "b", "c"]);
        let removed = group.remove("b").unwrap();
        group.select_after_close(removed.index);
        assert_eq!(group.active_tab_id(), Some("a"));
    }

    #[test]
    fn test_select_after_close_head() {
        let mut group = group_with(&["a", "b", "c"]);
        let removed = group.remove("a").unwrap();
        group.select_after_close(removed.index);
        assert_eq!(group.active_tab_id(), Some("b"));
    }

    #[test]
    fn test_select_after_close_empty() {
        let mut group = group_with(&["a"]);
        let removed = group.remove("a").unwrap();
        assert!(group.select_after_close(removed.index).is_none());
        assert_eq!(group.active_tab_id(), None);
    }

    #[test]
    fn test_insert_at_clamps() {
        let mut group = group_with(&["a", "b"]);
        assert_eq!(group.insert_at(tab("c"), 99), 2);
        assert_eq!(ids(&group), vec!["a", "b", "c"]);
        // Active tab is untouched when one exists
        assert_eq!(group.active_tab_id(), Some("b"));
    }

    #[test]
    fn test_insert_into_empty_group_activates() {
        let mut group = TabGroup::new("side");
        group.insert_at(tab("a"), 0);
        assert_eq!(group.active_tab_id(), Some("a"));
    }

    #[test]
    fn test_set_active_missing_is_noop() {
        let mut group = group_with(&["a", "b"]);
        assert!(group.set_active("zzz").is_none());
        assert_eq!(group.active_tab_id(), Some("b"));
    }

    #[test]
    fn test_retain_reselects_when_active_removed() {
        let mut group = group_with(&["a", "b", "c"]);
        let removed = group.retain(|tab| tab.id != "c");
        assert_eq!(removed.len(), 1);
        assert_eq!(ids(&group), vec!["a", "b"]);
        assert_eq!(group.active_tab_id(), Some("a"));
    }

    #[test]
    fn test_find_by_path() {
        let group = group_with(&["a", "b"]);
        assert_eq!(group.find_by_path("/ide/b").map(|t| t.id.as_str()), Some("b"));
        assert!(group.find_by_path("/ide/B").is_none());
    }

    #[test]
    fn test_find_group_descends_into_splits() {
        let mut inner = LayoutNode::split(
            SplitDirection::Vertical,
            vec![LayoutNode::group("left"), LayoutNode::group("deep")],
        );
        if let LayoutNode::Split(split) = &mut inner {
            assert_eq!(split.sizes, vec![0.5, 0.5]);
        }
        let mut root = LayoutNode::split(
            SplitDirection::Horizontal,
            vec![LayoutNode::group("main"), inner],
        );

        assert!(root.find_group("deep").is_some());
        assert!(root.find_group("missing").is_none());

        root.find_group_mut("deep").unwrap().upsert(tab("x"));
        assert_eq!(root.group_containing("x").map(|g| g.id()), Some("deep"));
        assert_eq!(root.tab_count(), 1);

        let ids: Vec<&str> = root.groups().iter().map(|g| g.id()).collect();
        assert_eq!(ids, vec!["main", "left", "deep"]);
    }

    #[test]
    fn test_split_group() {
        let mut root = LayoutNode::group("main");
        root.find_group_mut("main").unwrap().upsert(tab("a"));

        let side = root.split_group("main", SplitDirection::Horizontal).unwrap();
        assert_ne!(side, "main");
        let ids: Vec<&str> = root.groups().iter().map(|g| g.id()).collect();
        assert_eq!(ids, vec!["main", side.as_str()]);
        assert_eq!(root.group_containing("a").map(|g| g.id()), Some("main"));
        assert!(root.find_group(&side).unwrap().is_empty());

        // Nested splits get distinct ids
        let other = root.split_group(&side, SplitDirection::Vertical).unwrap();
        assert_ne!(other, side);
        assert_eq!(root.groups().len(), 3);
        assert!(root.split_group("missing", SplitDirection::Vertical).is_none());
    }
}
