//! HTTP surface.

pub mod catalog;
pub mod checkout;
pub mod contact;
pub mod error;
pub mod webhook;

use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::services::{CatalogService, CheckoutService, ContactService, OrderLifecycleTracker};

pub use error::json_error;
pub use webhook::{WebhookVerifier, SIGNATURE_HEADER};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub checkout: Arc<CheckoutService>,
    pub lifecycle: Arc<OrderLifecycleTracker>,
    pub contact: Arc<ContactService>,
    pub webhook: WebhookVerifier,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "cheekco-storefront"})) }))
        .route("/api/v1/products", get(catalog::list_products))
        .route("/api/v1/products/:slug", get(catalog::get_product))
        .route("/api/v1/categories", get(catalog::list_categories))
        .route("/api/v1/categories/:slug", get(catalog::get_category))
        .route("/api/v1/checkout/orders", post(checkout::create_order))
        .route("/api/v1/checkout/payments", post(checkout::create_payment))
        .route("/api/v1/checkout/orders/:id/complete", post(checkout::complete_payment))
        .route("/api/v1/orders/:id", get(checkout::get_order))
        .route("/api/v1/customers/:email/orders", get(checkout::customer_orders))
        .route("/api/v1/webhooks/square", post(webhook::square_webhook))
        .route("/api/v1/contact", post(contact::send_message))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
