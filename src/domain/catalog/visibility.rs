//! Storefront visibility rules.
//!
//! A catalog entry whose display name starts with [`HIDDEN_MARKER`] is a draft or
//! internal entry and must not surface anywhere: listings, category pages and
//! lookup-by-name all go through [`is_listed`].

use super::CatalogEntry;

pub const HIDDEN_MARKER: char = '_';

pub fn is_visible_name(name: Option<&str>) -> bool {
    match name {
        Some(name) => !name.starts_with(HIDDEN_MARKER),
        None => false,
    }
}

/// Name rule only: present and not marked hidden.
pub fn is_visible(entry: &CatalogEntry) -> bool {
    is_visible_name(entry.name())
}

/// Name rule plus soft-delete. This is the filter every storefront surface uses.
pub fn is_listed(entry: &CatalogEntry) -> bool {
    !entry.is_deleted() && is_visible(entry)
}
