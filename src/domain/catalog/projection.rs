//! Product and category views.
//!
//! A view is built per request from an item and whatever the index can resolve
//! for it. Related objects lag behind primary ones on the platform side, so a
//! missing image, category or price leaves that field empty; projecting never
//! fails.

use serde::Serialize;

use super::{is_listed, CatalogEntry, CatalogIndex, Category, Item, Variation};
use crate::domain::value_objects::{Money, Slug};

pub const DEFAULT_FEATURED_ATTRIBUTE: &str = "All-Natural";

#[derive(Clone, Debug)]
pub struct ProjectionOptions {
    /// Custom attribute name that marks a product as featured.
    pub featured_attribute: String,
    /// Location whose sold-out overrides apply.
    pub location_id: String,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            featured_attribute: DEFAULT_FEATURED_ATTRIBUTE.to_string(),
            location_id: String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category: Option<CategorySummary>,
    pub price: Option<Money>,
    /// Variation to reference when adding this product to an order.
    pub variation_id: Option<String>,
    pub is_featured: bool,
    pub sold_out: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    pub slug: Slug,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub slug: Slug,
    pub ordinal: i64,
}

impl CategoryView {
    /// Ordinal first, name second.
    pub fn sort_key(&self) -> (i64, &str) {
        (self.ordinal, &self.name)
    }
}

/// Pricing and feature policy: the first variation stands for the whole item.
pub fn primary_variation(item: &Item) -> Option<&Variation> {
    item.variations.first()
}

/// True when the variation carries `attribute` with a boolean `true` value.
pub fn has_flag_attribute(variation: &Variation, attribute: &str) -> bool {
    variation
        .custom_attributes
        .values()
        .any(|v| v.name == attribute && v.value.as_bool() == Some(true))
}

pub fn project_category(entry: &CatalogEntry, category: &Category) -> CategoryView {
    let name = category.name.clone().unwrap_or_default();
    CategoryView {
        id: entry.id().to_string(),
        slug: Slug::from_name(&name),
        name,
        ordinal: category.ordinal.unwrap_or(i64::MAX),
    }
}

pub struct Projector<'a> {
    index: &'a CatalogIndex,
    options: &'a ProjectionOptions,
}

impl<'a> Projector<'a> {
    pub fn new(index: &'a CatalogIndex, options: &'a ProjectionOptions) -> Self {
        Self { index, options }
    }

    pub fn project_item(&self, entry: &CatalogEntry, item: &Item) -> ProductView {
        let name = item.name.clone().unwrap_or_default();
        let image = item
            .image_ids
            .first()
            .and_then(|id| self.index.get(id))
            .filter(|entry| !entry.is_deleted())
            .and_then(CatalogEntry::as_image)
            .map(|image| image.url.clone());
        let category = item
            .category_id
            .as_deref()
            .and_then(|id| self.index.category(id))
            .filter(|(entry, _)| is_listed(entry))
            .map(|(entry, category)| {
                let view = project_category(entry, category);
                CategorySummary { id: view.id, name: view.name, slug: view.slug }
            });
        let variation = primary_variation(item);

        ProductView {
            id: entry.id().to_string(),
            slug: Slug::from_name(&name),
            name,
            description: item.description.clone(),
            image,
            category,
            price: variation.and_then(|v| v.price.clone()),
            variation_id: variation.map(|v| v.id.clone()),
            is_featured: variation
                .map(|v| has_flag_attribute(v, &self.options.featured_attribute))
                .unwrap_or(false),
            sold_out: variation
                .map(|v| v.is_sold_out_at(&self.options.location_id))
                .unwrap_or(false),
        }
    }

    /// Listed products in catalog order, optionally restricted to one category.
    pub fn products(&self, category_id: Option<&str>) -> Vec<ProductView> {
        let listed = |(entry, _): &(&CatalogEntry, &Item)| is_listed(entry);
        match category_id {
            Some(id) if !self.index.category(id).is_some_and(|(entry, _)| is_listed(entry)) => vec![],
            Some(id) => self
                .index
                .items_in_category(id)
                .filter(listed)
                .map(|(entry, item)| self.project_item(entry, item))
                .collect(),
            None => self
                .index
                .items()
                .filter(listed)
                .map(|(entry, item)| self.project_item(entry, item))
                .collect(),
        }
    }

    /// Lookup-by-name through the same visibility rule as listings.
    pub fn product_by_slug(&self, slug: &str) -> Option<ProductView> {
        self.index
            .items()
            .filter(|(entry, _)| is_listed(entry))
            .find(|(_, item)| {
                item.name
                    .as_deref()
                    .map(|name| Slug::from_name(name).matches(slug))
                    .unwrap_or(false)
            })
            .map(|(entry, item)| self.project_item(entry, item))
    }

    pub fn categories(&self) -> Vec<CategoryView> {
        let mut views: Vec<_> = self
            .index
            .categories()
            .filter(|(entry, _)| is_listed(entry))
            .map(|(entry, category)| project_category(entry, category))
            .collect();
        views.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        views
    }

    pub fn category_by_slug(&self, slug: &str) -> Option<CategoryView> {
        self.categories().into_iter().find(|c| c.slug.matches(slug))
    }
}
