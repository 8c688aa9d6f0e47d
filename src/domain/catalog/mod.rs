//! Catalog entries as the storefront sees them.
//!
//! The commerce platform hands back one flat object shape with a type tag and a
//! pile of optional, type-dependent payloads. Everything under this module works
//! on the narrowed form instead: shared [`EntryMeta`] plus one [`EntryKind`].

pub mod index;
pub mod projection;
pub mod visibility;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::domain::value_objects::Money;

pub use index::CatalogIndex;
pub use projection::{
    primary_variation, CategorySummary, CategoryView, ProductView, ProjectionOptions, Projector,
};
pub use visibility::{is_listed, is_visible, is_visible_name, HIDDEN_MARKER};

// =============================================================================
// Object Types
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CatalogObjectType {
    Item,
    Category,
    Image,
    Tax,
}

impl CatalogObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Item => "ITEM",
            Self::Category => "CATEGORY",
            Self::Image => "IMAGE",
            Self::Tax => "TAX",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ITEM" => Some(Self::Item),
            "CATEGORY" => Some(Self::Category),
            "IMAGE" => Some(Self::Image),
            "TAX" => Some(Self::Tax),
            _ => None,
        }
    }
}

/// Comma-separated type filter, as the list endpoint expects it.
pub fn types_filter(types: &[CatalogObjectType]) -> String {
    types.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(",")
}

// =============================================================================
// Entries
// =============================================================================

/// Fields every catalog object carries regardless of kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryMeta {
    pub id: String,
    pub version: i64,
    pub is_deleted: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub present_at_all_locations: bool,
    pub present_at_location_ids: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatalogEntry {
    pub meta: EntryMeta,
    pub kind: EntryKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EntryKind {
    Item(Item),
    Category(Category),
    Image(Image),
    Tax(Tax),
}

impl CatalogEntry {
    pub fn new(meta: EntryMeta, kind: EntryKind) -> Self {
        Self { meta, kind }
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn is_deleted(&self) -> bool {
        self.meta.is_deleted
    }

    pub fn object_type(&self) -> CatalogObjectType {
        match &self.kind {
            EntryKind::Item(_) => CatalogObjectType::Item,
            EntryKind::Category(_) => CatalogObjectType::Category,
            EntryKind::Image(_) => CatalogObjectType::Image,
            EntryKind::Tax(_) => CatalogObjectType::Tax,
        }
    }

    /// Display name of the entry, if it has one.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Item(item) => item.name.as_deref(),
            EntryKind::Category(category) => category.name.as_deref(),
            EntryKind::Image(image) => image.name.as_deref(),
            EntryKind::Tax(tax) => tax.name.as_deref(),
        }
    }

    pub fn as_item(&self) -> Option<&Item> {
        match &self.kind {
            EntryKind::Item(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_category(&self) -> Option<&Category> {
        match &self.kind {
            EntryKind::Category(category) => Some(category),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Image> {
        match &self.kind {
            EntryKind::Image(image) => Some(image),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Item {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub variations: Vec<Variation>,
    pub image_ids: Vec<String>,
    pub custom_attributes: HashMap<String, CustomAttributeValue>,
}

/// A sellable variation. Owned by exactly one [`Item`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Variation {
    pub id: String,
    pub item_id: String,
    pub name: Option<String>,
    pub ordinal: Option<i64>,
    pub price: Option<Money>,
    pub sellable: bool,
    pub stockable: bool,
    pub track_inventory: bool,
    /// Keyed by location id.
    pub location_overrides: HashMap<String, LocationOverride>,
    /// Keyed by custom attribute key.
    pub custom_attributes: HashMap<String, CustomAttributeValue>,
}

impl Variation {
    pub fn is_sold_out_at(&self, location_id: &str) -> bool {
        self.location_overrides
            .get(location_id)
            .map(|o| o.sold_out)
            .unwrap_or(false)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocationOverride {
    pub sold_out: bool,
    pub track_inventory: bool,
}

/// A custom attribute value. Matched by `name`, never owned by the definition.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomAttributeValue {
    pub definition_id: String,
    pub name: String,
    pub key: Option<String>,
    pub value: AttributeValue,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    Boolean(bool),
    Number(Decimal),
    String(String),
    Selection(Vec<String>),
}

impl AttributeValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Category {
    pub name: Option<String>,
    pub ordinal: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Image {
    pub url: String,
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tax {
    pub name: Option<String>,
    pub percentage: Option<Decimal>,
    pub inclusion_type: Option<String>,
    pub enabled: bool,
}
