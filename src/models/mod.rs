// src/models/mod.rs

//! Domain models for the classfetch application.

use std::collections::{BTreeMap, BTreeSet};

/// Raw category discovery result: category name to ordered member list.
pub type CategoryMap = BTreeMap<String, Vec<String>>;

/// Metadata mined from an individual class page.
///
/// Each field is independently optional; a class page may expose any
/// subset of the three table rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassMetadata {
    /// DoomEd (editor) number
    pub editor_id: Option<u32>,
    /// Spawn ID
    pub spawn_id: Option<u32>,
    /// Scriptable identifier string
    pub identifier: Option<String>,
}

impl ClassMetadata {
    /// True if no field was found on the page.
    pub fn is_empty(&self) -> bool {
        self.editor_id.is_none() && self.spawn_id.is_none() && self.identifier.is_none()
    }
}

/// A validated assignment of every known class to exactly one category.
///
/// Constructed only by the resolver after the partition invariant has
/// been checked; ordering is deterministic throughout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPartition {
    categories: BTreeMap<String, BTreeSet<String>>,
}

impl CategoryPartition {
    pub(crate) fn new(categories: BTreeMap<String, BTreeSet<String>>) -> Self {
        Self { categories }
    }

    /// Category names and their member sets, sorted by category name.
    pub fn categories(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.categories
    }

    /// Flattened mapping from class name to category name, sorted by class.
    pub fn class_to_category(&self) -> BTreeMap<&str, &str> {
        let mut map = BTreeMap::new();
        for (category, members) in &self.categories {
            for class in members {
                map.insert(class.as_str(), category.as_str());
            }
        }
        map
    }

    /// Number of categories.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Total number of classes across all categories.
    pub fn class_count(&self) -> usize {
        self.categories.values().map(BTreeSet::len).sum()
    }
}
