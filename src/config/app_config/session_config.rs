use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Storage key of the persisted tab snapshot
pub const DEFAULT_STORAGE_KEY: &str = "tabs_state";

/// Default grace period before restoration runs
pub const DEFAULT_RESTORE_DELAY_MS: u64 = 100;

/// Configuration for session persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Key the tab snapshot is stored under
    pub storage_key: String,
    /// Key of the one-shot deep-link redirect slot
    pub redirect_key: String,
    /// Delay before restoration, letting the page registry populate
    pub restore_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            redirect_key: "redirect".to_string(),
            restore_delay_ms: DEFAULT_RESTORE_DELAY_MS,
        }
    }
}

impl SessionConfig {
    pub fn restore_delay(&self) -> Duration {
        Duration::from_millis(self.restore_delay_ms)
    }
}
