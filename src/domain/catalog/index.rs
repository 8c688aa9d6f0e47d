//! In-memory cross-reference over one catalog snapshot.
//!
//! Pages (and the `related_objects` arrays riding along with them) may repeat an
//! object. The index keeps exactly one entry per id: the one seen last. Ordering
//! follows the first time an id was seen, so listings stay stable across pages.
//!
//! The index applies no policy. Deleted and hidden entries are indexed like any
//! other and are filtered by the callers.

use std::collections::HashMap;

use super::{CatalogEntry, CatalogObjectType, Category, EntryKind, Image, Item};

#[derive(Clone, Debug, Default)]
pub struct CatalogIndex {
    entries: HashMap<String, CatalogEntry>,
    order: Vec<String>,
    items_by_category: HashMap<String, Vec<String>>,
}

impl CatalogIndex {
    pub fn build(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut index = Self::default();
        for entry in entries {
            let id = entry.id().to_string();
            if index.entries.insert(id.clone(), entry).is_none() {
                index.order.push(id);
            }
        }
        index.group_items();
        index
    }

    /// Groupings are derived from the deduplicated map, never from the raw input.
    fn group_items(&mut self) {
        for id in &self.order {
            let Some(item) = self.entries.get(id).and_then(CatalogEntry::as_item) else {
                continue;
            };
            if let Some(category_id) = &item.category_id {
                self.items_by_category
                    .entry(category_id.clone())
                    .or_default()
                    .push(id.clone());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// All entries in first-seen order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn count_of(&self, kind: CatalogObjectType) -> usize {
        self.entries().filter(|e| e.object_type() == kind).count()
    }

    pub fn items(&self) -> impl Iterator<Item = (&CatalogEntry, &Item)> {
        self.entries().filter_map(|e| e.as_item().map(|item| (e, item)))
    }

    pub fn categories(&self) -> impl Iterator<Item = (&CatalogEntry, &Category)> {
        self.entries().filter_map(|e| e.as_category().map(|c| (e, c)))
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.get(id).and_then(CatalogEntry::as_item)
    }

    pub fn image(&self, id: &str) -> Option<&Image> {
        self.get(id).and_then(CatalogEntry::as_image)
    }

    pub fn category(&self, id: &str) -> Option<(&CatalogEntry, &Category)> {
        let entry = self.get(id)?;
        match &entry.kind {
            EntryKind::Category(category) => Some((entry, category)),
            _ => None,
        }
    }

    pub fn items_in_category(&self, category_id: &str) -> impl Iterator<Item = (&CatalogEntry, &Item)> {
        self.items_by_category
            .get(category_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.entries.get(id))
            .filter_map(|e| e.as_item().map(|item| (e, item)))
    }
}
