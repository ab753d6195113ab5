use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to the renderer of a page, resolved from the page registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentProviderId(String);

impl ContentProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContentProviderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ContentProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single open content pane
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    /// Unique across the whole layout tree, derived from the logical path
    pub id: String,
    pub title: String,
    /// Browser-facing path, including the view-mode prefix when active
    pub path: String,
    pub content_provider: ContentProviderId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_position: Option<f64>,
}

impl Tab {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        path: impl Into<String>,
        content_provider: impl Into<ContentProviderId>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            path: path.into(),
            content_provider: content_provider.into(),
            scroll_position: None,
        }
    }

    pub fn with_scroll_position(mut self, scroll_position: Option<f64>) -> Self {
        self.scroll_position = scroll_position;
        self
    }
}

/// Derive a tab id from a logical path (the empty path maps to `home_id`)
pub fn tab_id_for(logical_path: &str, home_id: &str) -> String {
    if logical_path.is_empty() {
        home_id.to_string()
    } else {
        logical_path.to_string()
    }
}

/// Inverse of [`tab_id_for`]
pub fn logical_path_for_id<'a>(tab_id: &'a str, home_id: &str) -> &'a str {
    if tab_id == home_id {
        ""
    } else {
        tab_id
    }
}

/// Get display title for a logical path.
///
/// The last segment is split on hyphens and each word capitalized:
/// `projects/my-cool-app` becomes `My Cool App`.
pub fn tab_title(logical_path: &str, home_title: &str) -> String {
    let Some(last) = logical_path.rsplit('/').find(|segment| !segment.is_empty()) else {
        return home_title.to_string();
    };

    last.split('-')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_id_for_home() {
        assert_eq!(tab_id_for("", "home"), "home");
        assert_eq!(tab_id_for("about", "home"), "about");
        assert_eq!(tab_id_for("projects/lumen", "home"), "projects/lumen");
    }

    #[test]
    fn test_logical_path_for_id() {
        assert_eq!(logical_path_for_id("home", "home"), "");
        assert_eq!(logical_path_for_id("about", "home"), "about");
    }

    #[test]
    fn test_tab_title_home() {
        assert_eq!(tab_title("", "Home"), "Home");
    }

    #[test]
    fn test_tab_title_single_word() {
        assert_eq!(tab_title("about", "Home"), "About");
    }

    #[test]
    fn test_tab_title_hyphenated() {
        assert_eq!(tab_title("work-experience", "Home"), "Work Experience");
    }

    #[test]
    fn test_tab_title_uses_last_segment() {
        assert_eq!(tab_title("projects/my-cool-app", "Home"), "My Cool App");
    }

    #[test]
    fn test_tab_title_collapses_empty_words() {
        assert_eq!(tab_title("a--b", "Home"), "A B");
    }

    #[test]
    fn test_tab_title_unicode() {
        assert_eq!(tab_title("élan-vital", "Home"), "Élan Vital");
    }

    #[test]
    fn test_tab_serializes_camel_case() {
        let tab = Tab::new("about", "About", "/ide/about", "page:about");
        let json = serde_json::to_value(&tab).unwrap();
        assert_eq!(json["contentProvider"], "page:about");
        assert!(json.get("scrollPosition").is_none());
    }
}
