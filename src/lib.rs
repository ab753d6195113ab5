//! Tab and window management core of an IDE-style portfolio shell.
//!
//! Pages are opened as tabs inside a layout tree of tab groups, kept in sync
//! with the host's location/history and persisted per session so a reload
//! restores the open tab set.

pub mod config;
pub mod drag;
pub mod events;
pub mod history;
pub mod navigation;
pub mod registry;
pub mod restore;
pub mod shell;
pub mod state;
