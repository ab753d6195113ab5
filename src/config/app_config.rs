use serde::{Deserialize, Serialize};

mod navigation_config;
mod session_config;

pub use navigation_config::NavigationConfig;
pub use session_config::SessionConfig;

/// Global shell configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub navigation: NavigationConfig,
    pub session: SessionConfig,
}
