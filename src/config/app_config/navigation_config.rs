use serde::{Deserialize, Serialize};

/// Path segment that marks the IDE presentation mode
pub const DEFAULT_VIEW_MODE_PREFIX: &str = "ide";

/// Tab id reserved for the empty logical path
pub const DEFAULT_HOME_ID: &str = "home";

/// Configuration for path handling and tab identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigationConfig {
    /// View-mode path segment (empty disables prefixing)
    pub view_mode_prefix: String,
    /// Tab id used for the empty logical path
    pub home_id: String,
    /// Title shown for the home tab
    pub home_title: String,
    /// Legacy pseudo-segment stripped from incoming paths
    pub legacy_home_segment: String,
    /// Id of the root tab group
    pub root_group_id: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            view_mode_prefix: DEFAULT_VIEW_MODE_PREFIX.to_string(),
            home_id: DEFAULT_HOME_ID.to_string(),
            home_title: "Home".to_string(),
            legacy_home_segment: "homepage".to_string(),
            root_group_id: "main".to_string(),
        }
    }
}
