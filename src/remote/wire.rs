//! Catalog objects as the platform sends them, and their narrowing into
//! [`CatalogEntry`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;

use crate::domain::catalog::{
    AttributeValue, CatalogEntry, CatalogObjectType, Category, CustomAttributeValue, EntryKind,
    EntryMeta, Image, Item, LocationOverride, Tax, Variation,
};
use crate::domain::value_objects::Money;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListCatalogResponse {
    #[serde(default)]
    pub objects: Vec<WireObject>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchCatalogResponse {
    #[serde(default)]
    pub objects: Vec<WireObject>,
    #[serde(default)]
    pub related_objects: Vec<WireObject>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireObject {
    #[serde(rename = "type")]
    pub object_type: String,
    pub id: String,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub present_at_all_locations: bool,
    #[serde(default)]
    pub present_at_location_ids: Vec<String>,
    #[serde(default)]
    pub custom_attribute_values: HashMap<String, WireAttribute>,
    #[serde(default)]
    pub item_data: Option<WireItemData>,
    #[serde(default)]
    pub category_data: Option<WireCategoryData>,
    #[serde(default)]
    pub image_data: Option<WireImageData>,
    #[serde(default)]
    pub tax_data: Option<WireTaxData>,
    #[serde(default)]
    pub item_variation_data: Option<WireVariationData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireItemData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub variations: Vec<WireObject>,
    #[serde(default)]
    pub image_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireVariationData {
    #[serde(default)]
    pub item_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ordinal: Option<i64>,
    #[serde(default)]
    pub price_money: Option<Money>,
    #[serde(default)]
    pub location_overrides: Vec<WireLocationOverride>,
    #[serde(default)]
    pub track_inventory: Option<bool>,
    #[serde(default)]
    pub sellable: bool,
    #[serde(default)]
    pub stockable: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireLocationOverride {
    pub location_id: String,
    #[serde(default)]
    pub track_inventory: bool,
    #[serde(default)]
    pub sold_out: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireCategoryData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ordinal: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireImageData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireTaxData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub percentage: Option<String>,
    #[serde(default)]
    pub inclusion_type: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireAttribute {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub custom_attribute_definition_id: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(rename = "type", default)]
    pub value_type: String,
    #[serde(default)]
    pub boolean_value: Option<bool>,
    #[serde(default)]
    pub number_value: Option<String>,
    #[serde(default)]
    pub string_value: Option<String>,
    #[serde(default)]
    pub selection_uid_values: Option<Vec<String>>,
}

// =============================================================================
// Narrowing
// =============================================================================

/// Narrow a batch, dropping objects the storefront has no use for.
pub(crate) fn into_entries(objects: Vec<WireObject>) -> Vec<CatalogEntry> {
    objects.into_iter().filter_map(WireObject::into_entry).collect()
}

impl WireObject {
    pub fn into_entry(self) -> Option<CatalogEntry> {
        let Some(object_type) = CatalogObjectType::parse(&self.object_type) else {
            tracing::debug!(id = %self.id, object_type = %self.object_type, "Skipping catalog object type");
            return None;
        };
        let meta = EntryMeta {
            id: self.id,
            version: self.version,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
            present_at_all_locations: self.present_at_all_locations,
            present_at_location_ids: self.present_at_location_ids,
        };
        let kind = match object_type {
            CatalogObjectType::Item => self.item_data.map(|data| {
                EntryKind::Item(Item {
                    name: data.name,
                    description: data.description,
                    category_id: data.category_id,
                    variations: data.variations.into_iter().filter_map(WireObject::into_variation).collect(),
                    image_ids: data.image_ids,
                    custom_attributes: narrow_attributes(self.custom_attribute_values),
                })
            }),
            CatalogObjectType::Category => self.category_data.map(|data| {
                EntryKind::Category(Category { name: data.name, ordinal: data.ordinal })
            }),
            CatalogObjectType::Image => self
                .image_data
                .and_then(|data| Some(EntryKind::Image(Image { url: data.url?, name: data.name }))),
            CatalogObjectType::Tax => self.tax_data.map(|data| {
                EntryKind::Tax(Tax {
                    name: data.name,
                    percentage: data.percentage.and_then(|p| Decimal::from_str(&p).ok()),
                    inclusion_type: data.inclusion_type,
                    enabled: data.enabled,
                })
            }),
        };
        match kind {
            Some(kind) => Some(CatalogEntry::new(meta, kind)),
            None => {
                tracing::debug!(id = %meta.id, object_type = object_type.as_str(), "Catalog object without payload");
                None
            }
        }
    }

    fn into_variation(self) -> Option<Variation> {
        if self.is_deleted {
            return None;
        }
        let data = self.item_variation_data?;
        Some(Variation {
            id: self.id,
            item_id: data.item_id,
            name: data.name,
            ordinal: data.ordinal,
            price: data.price_money,
            sellable: data.sellable,
            stockable: data.stockable,
            track_inventory: data.track_inventory.unwrap_or(false),
            location_overrides: data
                .location_overrides
                .into_iter()
                .map(|o| {
                    (o.location_id, LocationOverride { sold_out: o.sold_out, track_inventory: o.track_inventory })
                })
                .collect(),
            custom_attributes: narrow_attributes(self.custom_attribute_values),
        })
    }
}

fn narrow_attributes(values: HashMap<String, WireAttribute>) -> HashMap<String, CustomAttributeValue> {
    values
        .into_iter()
        .filter_map(|(key, attr)| attr.into_value().map(|v| (key, v)))
        .collect()
}

impl WireAttribute {
    fn into_value(self) -> Option<CustomAttributeValue> {
        let value = match self.value_type.as_str() {
            "BOOLEAN" => AttributeValue::Boolean(self.boolean_value?),
            "NUMBER" => AttributeValue::Number(Decimal::from_str(self.number_value?.trim()).ok()?),
            "STRING" => AttributeValue::String(self.string_value?),
            "SELECTION" => AttributeValue::Selection(self.selection_uid_values.unwrap_or_default()),
            _ => return None,
        };
        Some(CustomAttributeValue {
            definition_id: self.custom_attribute_definition_id,
            name: self.name,
            key: self.key,
            value,
        })
    }
}
