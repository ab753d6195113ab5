//! Page registry: logical path → content provider.
//!
//! The registry is built once at startup and is read-only to the tab core.
//! Lookups support an exact key match and a case-insensitive fallback.

use crate::state::ContentProviderId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Optional metadata attached to a registered page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageMeta {
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageEntry {
    pub provider: ContentProviderId,
    pub meta: Option<PageMeta>,
}

impl PageEntry {
    pub fn new(provider: impl Into<ContentProviderId>) -> Self {
        Self {
            provider: provider.into(),
            meta: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    CaseInsensitive,
}

/// A successful lookup, carrying the canonical registry key
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPage {
    pub key: String,
    pub entry: PageEntry,
    pub matched_by: MatchKind,
}

pub trait PageRegistry: Send + Sync {
    /// Exact-key lookup
    fn get(&self, logical_path: &str) -> Option<&PageEntry>;

    /// Case-insensitive lookup, returning the canonical key
    fn get_case_insensitive(&self, logical_path: &str) -> Option<(&str, &PageEntry)>;

    /// Exact match first, then the case-insensitive fallback
    fn resolve(&self, logical_path: &str) -> Option<ResolvedPage> {
        if let Some(entry) = self.get(logical_path) {
            return Some(ResolvedPage {
                key: logical_path.to_string(),
                entry: entry.clone(),
                matched_by: MatchKind::Exact,
            });
        }
        self.get_case_insensitive(logical_path)
            .map(|(key, entry)| ResolvedPage {
                key: key.to_string(),
                entry: entry.clone(),
                matched_by: MatchKind::CaseInsensitive,
            })
    }
}

/// Collapse separators and strip leading/trailing slashes
fn registry_key(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// HashMap-backed registry
#[derive(Debug, Clone, Default)]
pub struct StaticPageRegistry {
    pages: HashMap<String, PageEntry>,
    lowercase_keys: HashMap<String, String>,
}

impl StaticPageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page. The empty path is the home page.
    pub fn register(&mut self, logical_path: &str, entry: PageEntry) {
        let key = registry_key(logical_path);
        self.lowercase_keys
            .entry(key.to_lowercase())
            .or_insert_with(|| key.clone());
        self.pages.insert(key, entry);
    }

    /// Builder-style registration of a page with no metadata
    pub fn with_page(mut self, logical_path: &str, provider: &str) -> Self {
        self.register(logical_path, PageEntry::new(provider));
        self
    }

    /// Build from a logical path → provider id map
    pub fn from_providers(providers: HashMap<String, String>) -> Self {
        let mut registry = Self::new();
        for (path, provider) in providers {
            registry.register(&path, PageEntry::new(provider.as_str()));
        }
        registry
    }

    /// The portfolio's built-in pages
    pub fn portfolio_seed() -> Self {
        let pages: [(&str, &str, &str); 7] = [
            ("", "page:home", "Landing page"),
            ("about", "page:about", "Background and interests"),
            ("experience", "page:experience", "Work history"),
            ("projects", "page:projects", "Project index"),
            ("skills", "page:skills", "Languages and tools"),
            ("contact", "page:contact", "How to get in touch"),
            ("terminal", "page:terminal", "Interactive terminal"),
        ];

        let mut registry = Self::new();
        for (path, provider, description) in pages {
            registry.register(
                path,
                PageEntry {
                    provider: provider.into(),
                    meta: Some(PageMeta {
                        description: Some(description.to_string()),
                    }),
                },
            );
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl PageRegistry for StaticPageRegistry {
    fn get(&self, logical_path: &str) -> Option<&PageEntry> {
        self.pages.get(logical_path)
    }

    fn get_case_insensitive(&self, logical_path: &str) -> Option<(&str, &PageEntry)> {
        let key = self.lowercase_keys.get(&logical_path.to_lowercase())?;
        self.pages.get(key).map(|entry| (key.as_str(), entry))
    }
}
