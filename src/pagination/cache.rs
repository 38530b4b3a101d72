//! Template cache keyed by query identity.

use super::scheme::{PaginationScheme, UrlTemplate};
use std::collections::HashMap;
use std::sync::RwLock;

/// Identity of a logical query: never includes a page number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub first_page_url: String,
    pub page_size: u32,
    pub sort_order: u32,
}

impl QueryKey {
    pub fn new(first_page_url: impl Into<String>, page_size: u32, sort_order: u32) -> Self {
        Self {
            first_page_url: first_page_url.into(),
            page_size,
            sort_order,
        }
    }
}

/// A discovered template together with its scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedTemplate {
    pub template: UrlTemplate,
    pub scheme: PaginationScheme,
}

/// Storage for discovered templates.
///
/// Entries are insert-only: once a key has a template, later inserts for
/// that key are ignored.
pub trait TemplateCache: Send + Sync {
    /// Looks up the template for a query.
    fn get(&self, key: &QueryKey) -> Option<CachedTemplate>;

    /// Stores a template unless the key already has one.
    ///
    /// Returns true if the entry was written.
    fn insert(&self, key: QueryKey, entry: CachedTemplate) -> bool;

    /// Number of cached queries.
    fn len(&self) -> usize;

    /// Returns true if nothing is cached.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process template cache.
#[derive(Debug, Default)]
pub struct MemoryTemplateCache {
    entries: RwLock<HashMap<QueryKey, CachedTemplate>>,
}

impl MemoryTemplateCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemplateCache for MemoryTemplateCache {
    fn get(&self, key: &QueryKey) -> Option<CachedTemplate> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn insert(&self, key: QueryKey, entry: CachedTemplate) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.contains_key(&key) {
            return false;
        }
        entries.insert(key, entry);
        true
    }

    fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}
