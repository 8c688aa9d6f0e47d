use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::AppState;
use crate::domain::catalog::{CategoryView, ProductView};
use crate::services::CategoryPage;
use crate::StorefrontError;

#[derive(Debug, Deserialize)]
pub struct ProductParams {
    pub category: Option<String>,
}

pub async fn list_products(State(s): State<AppState>, Query(p): Query<ProductParams>) -> Result<Json<Vec<ProductView>>, StorefrontError> {
    Ok(Json(s.catalog.products(p.category.as_deref()).await?))
}

pub async fn get_product(State(s): State<AppState>, Path(slug): Path<String>) -> Result<Json<ProductView>, StorefrontError> {
    Ok(Json(s.catalog.product_by_slug(&slug).await?))
}

pub async fn list_categories(State(s): State<AppState>) -> Result<Json<Vec<CategoryView>>, StorefrontError> {
    Ok(Json(s.catalog.categories().await?))
}

pub async fn get_category(State(s): State<AppState>, Path(slug): Path<String>) -> Result<Json<CategoryPage>, StorefrontError> {
    Ok(Json(s.catalog.category_page(&slug).await?))
}
