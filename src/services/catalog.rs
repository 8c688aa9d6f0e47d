//! Catalog Fetcher and the storefront catalog queries built on it.
//!
//! Every query works on a freshly built [`CatalogIndex`]. With a non-zero TTL
//! the index is kept for that long per type filter; a failed fetch leaves the
//! cache untouched.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::domain::catalog::{
    types_filter, CatalogEntry, CatalogIndex, CatalogObjectType, CategoryView, ProductView,
    ProjectionOptions, Projector,
};
use crate::remote::CatalogApi;
use crate::{Result, StorefrontError};

/// Object types every storefront page needs.
pub const STOREFRONT_TYPES: [CatalogObjectType; 3] =
    [CatalogObjectType::Item, CatalogObjectType::Image, CatalogObjectType::Category];

// =============================================================================
// Fetcher
// =============================================================================

#[derive(Clone, Copy)]
enum Endpoint {
    List,
    Search { include_related: bool },
}

/// Page the list endpoint until the cursor runs out.
pub async fn fetch_all_catalog_entries(
    api: &dyn CatalogApi,
    types: &[CatalogObjectType],
) -> Result<Vec<CatalogEntry>> {
    drain(api, types, Endpoint::List).await
}

/// Page the search endpoint; each page contributes its objects, then its related objects.
pub async fn search_all_catalog_entries(
    api: &dyn CatalogApi,
    types: &[CatalogObjectType],
    include_related: bool,
) -> Result<Vec<CatalogEntry>> {
    drain(api, types, Endpoint::Search { include_related }).await
}

async fn drain(
    api: &dyn CatalogApi,
    types: &[CatalogObjectType],
    endpoint: Endpoint,
) -> Result<Vec<CatalogEntry>> {
    let mut entries = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = match endpoint {
            Endpoint::List => api.list_catalog(cursor.take(), types).await,
            Endpoint::Search { include_related } => {
                api.search_catalog(cursor.take(), types, include_related).await
            }
        }
        .map_err(|e| {
            tracing::warn!(error = %e, pages, "Catalog page request failed, discarding partial results");
            e
        })?;
        pages += 1;
        tracing::debug!(page = pages, entries = page.entries.len(), related = page.related.len(), "Catalog page fetched");

        entries.extend(page.entries);
        entries.extend(page.related);

        match page.cursor.filter(|c| !c.is_empty()) {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    tracing::info!(types = %types_filter(types), pages, entries = entries.len(), "Catalog fetched");
    Ok(entries)
}

// =============================================================================
// Cache
// =============================================================================

struct CacheEntry {
    index: Arc<CatalogIndex>,
    expires_at: Instant,
}

/// Time-bounded cache of built indexes, keyed by type filter.
#[derive(Clone)]
pub struct CatalogCache {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl CatalogCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Arc::new(RwLock::new(HashMap::new())) }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub async fn get(&self, key: &str) -> Option<Arc<CatalogIndex>> {
        if !self.is_enabled() {
            return None;
        }
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.index.clone())
    }

    pub async fn insert(&self, key: String, index: Arc<CatalogIndex>) {
        if !self.is_enabled() {
            return;
        }
        let mut entries = self.entries.write().await;
        entries.insert(key, CacheEntry { index, expires_at: Instant::now() + self.ttl });
    }
}

// =============================================================================
// Service
// =============================================================================

#[derive(Clone, Debug, Serialize)]
pub struct CategoryPage {
    pub category: CategoryView,
    pub products: Vec<ProductView>,
}

pub struct CatalogService {
    api: Arc<dyn CatalogApi>,
    cache: CatalogCache,
    options: ProjectionOptions,
}

impl CatalogService {
    pub fn new(api: Arc<dyn CatalogApi>, cache: CatalogCache, options: ProjectionOptions) -> Self {
        Self { api, cache, options }
    }

    pub async fn index(&self) -> Result<Arc<CatalogIndex>> {
        let key = types_filter(&STOREFRONT_TYPES);
        if let Some(index) = self.cache.get(&key).await {
            tracing::debug!(types = %key, "Catalog cache hit");
            return Ok(index);
        }

        let entries = fetch_all_catalog_entries(self.api.as_ref(), &STOREFRONT_TYPES).await?;
        let index = Arc::new(CatalogIndex::build(entries));
        tracing::info!(
            items = index.count_of(CatalogObjectType::Item),
            categories = index.count_of(CatalogObjectType::Category),
            images = index.count_of(CatalogObjectType::Image),
            "Catalog index built"
        );
        self.cache.insert(key, index.clone()).await;
        Ok(index)
    }

    pub async fn products(&self, category_id: Option<&str>) -> Result<Vec<ProductView>> {
        let index = self.index().await?;
        Ok(Projector::new(&index, &self.options).products(category_id))
    }

    pub async fn product_by_slug(&self, slug: &str) -> Result<ProductView> {
        let index = self.index().await?;
        Projector::new(&index, &self.options)
            .product_by_slug(slug)
            .ok_or_else(|| StorefrontError::not_found("Product"))
    }

    pub async fn categories(&self) -> Result<Vec<CategoryView>> {
        let index = self.index().await?;
        Ok(Projector::new(&index, &self.options).categories())
    }

    pub async fn category_page(&self, slug: &str) -> Result<CategoryPage> {
        let index = self.index().await?;
        let projector = Projector::new(&index, &self.options);
        let category = projector
            .category_by_slug(slug)
            .ok_or_else(|| StorefrontError::not_found("Category"))?;
        let products = projector.products(Some(&category.id));
        Ok(CategoryPage { category, products })
    }
}
