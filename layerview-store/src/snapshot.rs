use layerview_types::Application;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Immutable view of the store, grouped by category.
///
/// Records are shared with the store but never mutated; a later upsert
/// swaps the store's pointer and leaves existing snapshots untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedSnapshot {
    groups: BTreeMap<String, Vec<Arc<Application>>>,
}

impl GroupedSnapshot {
    pub(crate) fn from_groups(groups: BTreeMap<String, Vec<Arc<Application>>>) -> Self {
        Self { groups }
    }

    /// Category keys present, in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Applications in `category`; empty if the category is absent.
    pub fn apps(&self, category: &str) -> &[Arc<Application>] {
        self.groups.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_category(&self, category: &str) -> bool {
        self.groups.contains_key(category)
    }

    /// Every `(category, applications)` pair.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Arc<Application>])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Looks an application up by name across all categories.
    pub fn find(&self, name: &str) -> Option<&Arc<Application>> {
        self.groups.values().flatten().find(|app| app.name() == name)
    }

    /// Total number of applications.
    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
