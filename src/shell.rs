//! IDE shell composition root.
//!
//! Wires the page registry, host history and session store into one
//! `TabManager` + `Navigator` pair. Every collaborator is injected, so any
//! number of independent shells can exist side by side (tests build one
//! per case).

use std::sync::Arc;

use crate::config::Config;
use crate::drag::DragController;
use crate::history::HostHistory;
use crate::navigation::{HistoryChange, NavigationState, Navigator};
use crate::registry::PageRegistry;
use crate::restore::{self, RestoreOutcome};
use crate::state::{ContentProviders, PersistenceStore, SessionStore, TabManager};

pub struct Shell {
    config: Config,
    navigator: Navigator,
    manager: TabManager,
    drag: DragController,
    mounted: bool,
}

impl Shell {
    pub fn new(
        config: Config,
        registry: Arc<dyn PageRegistry>,
        history: Box<dyn HostHistory>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let persistence = PersistenceStore::new(store, &config.session);
        let manager = TabManager::new(
            config.navigation.root_group_id.clone(),
            ContentProviders::new(),
            persistence,
            history,
        );
        let navigator = Navigator::new(config.navigation.clone(), registry);
        Self {
            config,
            navigator,
            manager,
            drag: DragController::new(),
            mounted: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn manager(&self) -> &TabManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut TabManager {
        &mut self.manager
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Consume the pending redirect and restore the session.
    ///
    /// Runs at most once per shell; later calls return `None`.
    pub fn mount(&mut self) -> Option<RestoreOutcome> {
        if self.mounted {
            tracing::debug!("Shell already mounted");
            return None;
        }
        self.mounted = true;
        restore::consume_pending_redirect(&mut self.manager, &self.navigator);
        Some(restore::restore_session(&mut self.manager, &self.navigator))
    }

    /// Like [`Shell::mount`], after the configured grace period
    pub async fn mount_after_grace(&mut self) -> Option<RestoreOutcome> {
        if self.mounted {
            return None;
        }
        self.mounted = true;
        restore::consume_pending_redirect(&mut self.manager, &self.navigator);
        let delay = self.config.session.restore_delay();
        Some(restore::restore_after_grace(&mut self.manager, &self.navigator, delay).await)
    }

    /// In-app navigation (link click, command palette, ...)
    pub fn navigate(&mut self, path: &str) -> bool {
        self.navigator.navigate_to(&mut self.manager, path, true)
    }

    /// Host back/forward
    pub fn on_history_change(&mut self, change: &HistoryChange) {
        self.navigator.on_history_change(&mut self.manager, change);
    }

    pub fn navigation_state(&self) -> NavigationState {
        self.navigator.state(&self.manager)
    }

    /// Leaving the IDE presentation mode drops the saved tab set
    pub fn leave_view_mode(&self) {
        tracing::info!("Leaving view mode, clearing tab snapshot");
        self.manager.persistence().clear();
    }

    // ========================================================================
    // Drag and drop
    // ========================================================================

    /// Start dragging an open tab. Returns `false` if it is not open there.
    pub fn start_drag(&mut self, group_id: &str, tab_id: &str) -> bool {
        let Some(tab) = self
            .manager
            .group(group_id)
            .and_then(|group| group.get(tab_id))
            .cloned()
        else {
            return false;
        };
        self.drag.start_drag(tab, group_id);
        true
    }

    pub fn drag_over(&mut self, group_id: &str, index: usize) {
        self.drag.drag_over(group_id, index);
    }

    pub fn drop_tab(&mut self) -> bool {
        self.drag.drop(&mut self.manager)
    }

    pub fn end_drag(&mut self) {
        self.drag.end_drag();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistory;
    use crate::registry::StaticPageRegistry;
    use crate::state::MemorySessionStore;

    fn shell(location: &str, store: &MemorySessionStore) -> (Shell, MemoryHistory) {
        let history = MemoryHistory::new(location);
        let shell = Shell::new(
            Config::default(),
            Arc::new(StaticPageRegistry::portfolio_seed()),
            Box::new(history.clone()),
            Arc::new(store.clone()),
        );
        (shell, history)
    }

    fn ids(shell: &Shell) -> Vec<&str> {
        shell.manager().all_tabs().iter().map(|tab| tab.id.as_str()).collect()
    }

    #[test]
    fn test_mount_opens_current_route() {
        let store = MemorySessionStore::new();
        let (mut shell, _history) = shell("/ide/about", &store);

        assert_eq!(
            shell.mount(),
            Some(RestoreOutcome::CurrentRoute {
                path: "/ide/about".to_string()
            })
        );
        assert_eq!(shell.mount(), None);
        assert_eq!(ids(&shell), vec!["about"]);
    }

    #[test]
    fn test_mount_follows_pending_redirect() {
        let store = MemorySessionStore::new();
        let (mut shell, history) = shell("/ide", &store);
        shell.manager().persistence().stash_redirect("/ide/projects").unwrap();

        shell.mount();
        assert_eq!(ids(&shell), vec!["projects"]);
        assert_eq!(history.entries(), vec!["/ide/projects"]);
        assert_eq!(shell.navigation_state().pending_redirect, None);
    }

    #[test]
    fn test_reload_restores_tabs() {
        let store = MemorySessionStore::new();
        {
            let (mut first, _history) = shell("/ide", &store);
            first.mount();
            first.navigate("/about");
            first.navigate("/skills");
        }

        let (mut second, _history) = shell("/ide/about", &store);
        assert_eq!(
            second.mount(),
            Some(RestoreOutcome::ExactPath {
                tab_id: "about".to_string()
            })
        );
        assert_eq!(ids(&second), vec!["home", "about", "skills"]);
    }

    #[test]
    fn test_leave_view_mode_clears_snapshot() {
        let store = MemorySessionStore::new();
        let (mut shell, _history) = shell("/ide/about", &store);
        shell.mount();
        shell.leave_view_mode();
        assert!(shell.manager().persistence().load().unwrap().is_none());
    }

    #[test]
    fn test_drag_through_shell() {
        let store = MemorySessionStore::new();
        let (mut shell, _history) = shell("/ide", &store);
        shell.mount();
        shell.navigate("/about");
        shell.navigate("/contact");

        assert!(!shell.start_drag("main", "missing"));
        assert!(shell.start_drag("main", "home"));
        shell.drag_over("main", 3);
        assert!(shell.drop_tab());
        assert_eq!(ids(&shell), vec!["about", "contact", "home"]);
        assert!(!shell.drag().is_dragging());
    }

    #[test]
    fn test_back_navigation() {
        let store = MemorySessionStore::new();
        let (mut shell, history) = shell("/ide", &store);
        shell.mount();
        shell.navigate("/about");

        let pathname = history.back().unwrap();
        shell.on_history_change(&HistoryChange::new(pathname));
        assert_eq!(shell.manager().active_tab().unwrap().id, "home");
        assert!(shell.navigation_state().view_mode_active);
    }

    #[tokio::test]
    async fn test_mount_after_grace() {
        let store = MemorySessionStore::new();
        let (mut shell, _history) = shell("/ide/contact", &store);
        assert!(shell.mount_after_grace().await.is_some());
        assert!(shell.is_mounted());
        assert_eq!(ids(&shell), vec!["contact"]);
    }
}
