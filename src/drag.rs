// Drag module - tab drag-and-drop reorder state machine
//
//   Idle ──start_drag──→ Dragging { tab, source group, drop zone }
//                          │  drag_over: overwrite the drop zone
//                          ├── drop ───────→ one TabManager::move_tab, then Idle
//                          └── end_drag ───→ Idle (cancelled)
//
// Nothing is mutated until the drop, and the drop is a single tree
// operation, so there is no partial state to roll back.

use crate::state::{Tab, TabManager};

// ============================================================================
// Constants
// ============================================================================

/// Fixed tab width in pixels (must match the tab strip's CSS width)
pub const TAB_WIDTH: f64 = 140.0;

/// Pointer travel in pixels before a press becomes a drag
pub const DRAG_THRESHOLD: f64 = 5.0;

// ============================================================================
// Pointer helpers
// ============================================================================

/// Check if the pointer moved far enough from the press point to start a drag
pub fn exceeds_drag_threshold(start: (f64, f64), current: (f64, f64)) -> bool {
    let dx = (current.0 - start.0).abs();
    let dy = (current.1 - start.1).abs();
    dx > DRAG_THRESHOLD || dy > DRAG_THRESHOLD
}

/// Map an x offset within the tab strip to an insertion index.
///
/// Tab `i` spans `[i * TAB_WIDTH, (i + 1) * TAB_WIDTH)`. The result is
/// clamped to `[0, tab_count]`; `tab_count` means append.
pub fn drop_index_from_offset(offset_x: f64, tab_count: usize) -> usize {
    if !offset_x.is_finite() || offset_x <= 0.0 {
        return 0;
    }
    let raw_index = (offset_x / TAB_WIDTH).floor() as usize;
    raw_index.min(tab_count)
}

// ============================================================================
// Drag State
// ============================================================================

/// Data for a tab being dragged
#[derive(Debug, Clone, PartialEq)]
pub struct DraggedTab {
    pub tab: Tab,
    pub source_group_id: String,
}

/// Transient insertion point, overwritten on every pointer-over event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropZone {
    pub target_group_id: String,
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        dragged: DraggedTab,
        drop_zone: Option<DropZone>,
    },
}

/// Drag-and-drop controller for one tab strip (or a set of them)
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Check if tab dragging is active
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Get the currently dragged tab data (if any)
    pub fn dragged_tab(&self) -> Option<&DraggedTab> {
        match &self.state {
            DragState::Dragging { dragged, .. } => Some(dragged),
            DragState::Idle => None,
        }
    }

    pub fn drop_zone(&self) -> Option<&DropZone> {
        match &self.state {
            DragState::Dragging { drop_zone, .. } => drop_zone.as_ref(),
            DragState::Idle => None,
        }
    }

    /// Start a tab drag. A drag already in progress is replaced.
    pub fn start_drag(&mut self, tab: Tab, source_group_id: impl Into<String>) {
        let source_group_id = source_group_id.into();
        tracing::debug!(tab_id = %tab.id, %source_group_id, "Drag started");
        self.state = DragState::Dragging {
            dragged: DraggedTab {
                tab,
                source_group_id,
            },
            drop_zone: None,
        };
    }

    /// Record the slot under the pointer. Ignored when not dragging.
    pub fn drag_over(&mut self, target_group_id: impl Into<String>, index: usize) {
        if let DragState::Dragging { drop_zone, .. } = &mut self.state {
            *drop_zone = Some(DropZone {
                target_group_id: target_group_id.into(),
                index,
            });
        }
    }

    /// Drop at the last known drop zone.
    ///
    /// Issues exactly one `move_tab` and returns to `Idle`. Returns `false`
    /// if there was no drag, no drop zone, or the move was rejected.
    pub fn drop(&mut self, manager: &mut TabManager) -> bool {
        let DragState::Dragging { dragged, drop_zone } = std::mem::take(&mut self.state) else {
            return false;
        };
        let Some(zone) = drop_zone else {
            tracing::debug!(tab_id = %dragged.tab.id, "Drop without a drop zone");
            return false;
        };

        manager.move_tab(
            &dragged.tab.id,
            &dragged.source_group_id,
            &zone.target_group_id,
            zone.index,
        )
    }

    /// End current drag operation, whether or not it dropped
    pub fn end_drag(&mut self) {
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::history::{HostHistory, MemoryHistory};
    use crate::state::{ContentProviders, LayoutNode, MemorySessionStore, PersistenceStore, SplitDirection};
    use std::sync::Arc;

    fn manager_with(layout: LayoutNode, history: &MemoryHistory) -> TabManager {
        let persistence = PersistenceStore::new(
            Arc::new(MemorySessionStore::new()),
            &SessionConfig::default(),
        );
        TabManager::with_layout(
            layout,
            "main",
            ContentProviders::new(),
            persistence,
            Box::new(history.clone()),
        )
    }

    fn page(id: &str) -> Tab {
        Tab::new(id, id.to_uppercase(), format!("/ide/{id}"), "page:test")
    }

    fn ids(manager: &TabManager, group_id: &str) -> Vec<String> {
        manager
            .group(group_id)
            .map(|group| group.tabs().iter().map(|tab| tab.id.clone()).collect())
            .unwrap_or_default()
    }

    fn abc(history: &MemoryHistory) -> TabManager {
        let mut manager = manager_with(LayoutNode::group("main"), history);
        for id in ["a", "b", "c"] {
            manager.open_tab(page(id));
        }
        manager
    }

    #[test]
    fn test_threshold() {
        assert!(!exceeds_drag_threshold((10.0, 10.0), (14.0, 13.0)));
        assert!(!exceeds_drag_threshold((10.0, 10.0), (15.0, 10.0)));
        assert!(exceeds_drag_threshold((10.0, 10.0), (16.0, 10.0)));
        assert!(exceeds_drag_threshold((10.0, 10.0), (10.0, 3.0)));
    }

    #[test]
    fn test_drop_index_from_offset() {
        assert_eq!(drop_index_from_offset(-30.0, 3), 0);
        assert_eq!(drop_index_from_offset(0.0, 3), 0);
        assert_eq!(drop_index_from_offset(139.0, 3), 0);
        assert_eq!(drop_index_from_offset(140.0, 3), 1);
        assert_eq!(drop_index_from_offset(300.0, 3), 2);
        assert_eq!(drop_index_from_offset(5000.0, 3), 3);
        assert_eq!(drop_index_from_offset(f64::NAN, 3), 0);
    }

    #[test]
    fn test_drag_over_overwrites_drop_zone() {
        let mut drag = DragController::new();
        drag.drag_over("main", 1);
        assert!(drag.drop_zone().is_none());

        drag.start_drag(page("a"), "main");
        drag.drag_over("main", 1);
        drag.drag_over("main", 2);
        assert_eq!(
            drag.drop_zone(),
            Some(&DropZone {
                target_group_id: "main".to_string(),
                index: 2
            })
        );
    }

    #[test]
    fn test_drop_reorders_and_keeps_active() {
        let history = MemoryHistory::new("/ide");
        let mut manager = abc(&history);
        manager.set_active_tab("a", true);

        let mut drag = DragController::new();
        drag.start_drag(page("a"), "main");
        drag.drag_over("main", 2);
        assert!(drag.drop(&mut manager));

        assert_eq!(ids(&manager, "main"), vec!["b", "c", "a"]);
        assert_eq!(manager.active_tab().map(|tab| tab.id.as_str()), Some("a"));
        assert_eq!(history.current_path(), "/ide/a");
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_drop_past_last_tab_appends() {
        let history = MemoryHistory::new("/ide");
        let mut manager = abc(&history);

        let mut drag = DragController::new();
        drag.start_drag(page("b"), "main");
        drag.drag_over("main", 3);
        assert!(drag.drop(&mut manager));
        assert_eq!(ids(&manager, "main"), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_drop_issues_single_move() {
        let history = MemoryHistory::new("/ide");
        let mut manager = abc(&history);
        let mut rx = manager.subscribe();

        let mut drag = DragController::new();
        drag.start_drag(page("a"), "main");
        drag.drag_over("main", 1);
        drag.drag_over("main", 2);
        drag.drop(&mut manager);

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
        // A second drop is a no-op
        assert!(!drag.drop(&mut manager));
    }

    #[test]
    fn test_cancelled_drag_changes_nothing() {
        let history = MemoryHistory::new("/ide");
        let mut manager = abc(&history);

        let mut drag = DragController::new();
        drag.start_drag(page("a"), "main");
        drag.drag_over("main", 2);
        drag.end_drag();
        drag.end_drag();

        assert_eq!(drag.state(), &DragState::Idle);
        assert!(!drag.drop(&mut manager));
        assert_eq!(ids(&manager, "main"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_drop_without_zone() {
        let history = MemoryHistory::new("/ide");
        let mut manager = abc(&history);

        let mut drag = DragController::new();
        drag.start_drag(page("a"), "main");
        assert!(!drag.drop(&mut manager));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_drop_into_other_group() {
        let history = MemoryHistory::new("/ide");
        let layout = LayoutNode::split(
            SplitDirection::Vertical,
            vec![LayoutNode::group("main"), LayoutNode::group("side")],
        );
        let mut manager = manager_with(layout, &history);
        manager.open_tab(page("a"));
        manager.open_tab(page("b"));

        let mut drag = DragController::new();
        drag.start_drag(page("b"), "main");
        drag.drag_over("side", drop_index_from_offset(10.0, 0));
        assert!(drag.drop(&mut manager));

        assert_eq!(ids(&manager, "main"), vec!["a"]);
        assert_eq!(ids(&manager, "side"), vec!["b"]);
    }
}
