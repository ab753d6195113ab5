//! Change notifications for tab mutations.
//!
//! Each `TabManager` owns a `TabEvents` broadcast sender and emits one
//! `TabChange` after every committed mutation. The tree, the content-provider
//! map and the snapshot are all up to date by the time it is sent.
//!
//! ```text
//!   TabManager mutation
//!        │ 1. layout tree
//!        │ 2. content-provider map
//!        │ 3. snapshot write
//!        v
//!   TabEvents::emit ──→ rx.recv() (renderer, tab bar, tests, ...)
//! ```
//!
//! `tokio::sync::broadcast` is used so any number of listeners can subscribe
//! and unsubscribe at runtime without the manager knowing about them.

use crate::state::Tab;
use tokio::sync::broadcast;

/// Channel capacity; slow receivers lag rather than block the manager
const CHANNEL_CAPACITY: usize = 64;

/// What kind of mutation produced a change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabChangeKind {
    Opened,
    Closed,
    Activated,
    Moved,
    Updated,
}

/// Notification sent after a committed mutation
#[derive(Debug, Clone, PartialEq)]
pub struct TabChange {
    pub kind: TabChangeKind,
    pub group_id: String,
    /// The group's active tab after the mutation
    pub active: Option<Tab>,
}

#[derive(Debug, Clone)]
pub struct TabEvents {
    sender: broadcast::Sender<TabChange>,
}

impl Default for TabEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl TabEvents {
    pub fn new() -> Self {
        Self {
            sender: broadcast::channel(CHANNEL_CAPACITY).0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TabChange> {
        self.sender.subscribe()
    }

    /// Send a change to all current subscribers (no subscribers is fine)
    pub(crate) fn emit(&self, change: TabChange) {
        self.sender.send(change).ok();
    }
}
