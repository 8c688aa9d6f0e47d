//! Orchestration over the remote seams, the order store and the pure domain.

pub mod catalog;
pub mod checkout;
pub mod contact;
pub mod events;
pub mod lifecycle;

pub use catalog::{
    fetch_all_catalog_entries, search_all_catalog_entries, CatalogCache, CatalogService, CategoryPage,
};
pub use checkout::{CheckoutService, CreateOrderRequest, CreatePaymentRequest, OrderLine};
pub use contact::{ContactRequest, ContactService};
pub use events::EventPublisher;
pub use lifecycle::{NotificationSettings, OrderLifecycleTracker, WebhookOutcome};

/// Fresh idempotency key for one mutating remote call.
pub(crate) fn idempotency_key() -> String {
    uuid::Uuid::new_v4().to_string()
}
