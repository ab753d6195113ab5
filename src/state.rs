// State module - tabs, the layout tree and session persistence

mod layout;
pub use layout::{LayoutNode, RemovedTab, SplitDirection, SplitNode, TabGroup};

mod persistence;
pub use persistence::{
    FileSessionStore, MemorySessionStore, PersistedTab, PersistenceStore, SessionStore, StoreError,
    TabSnapshot,
};

mod providers;
pub use providers::ContentProviders;

mod tab;
pub use tab::{logical_path_for_id, tab_id_for, tab_title, ContentProviderId, Tab};

mod tab_manager;
pub use tab_manager::TabManager;
