//! Collaborator seams.
//!
//! Everything the storefront asks of the outside world goes through the traits
//! in this module. Production wiring uses [`square::SquareClient`] and
//! [`email::SendGridClient`]; tests swap in fakes.

pub mod commerce;
pub mod email;
pub mod square;
mod wire;

use async_trait::async_trait;

use crate::domain::catalog::{CatalogEntry, CatalogObjectType};
use crate::Result;

pub use commerce::{
    Address, CustomerDetails, CustomerRecord, Fulfillment, NewLineItem, NewOrder, NewPayment,
    PaymentRecord, PickupDetails, Recipient, RemoteLineItem, RemoteOrder, ShipmentDetails,
};
pub use email::{DeliveryStatus, EmailSender, SendGridClient, TemplateEmail};
pub use square::SquareClient;

/// One page of catalog objects.
#[derive(Clone, Debug, Default)]
pub struct CatalogPage {
    pub entries: Vec<CatalogEntry>,
    /// Objects referenced by `entries` (images, taxes, categories).
    pub related: Vec<CatalogEntry>,
    /// Opaque continuation token. Absent or empty means this was the last page.
    pub cursor: Option<String>,
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_catalog(
        &self,
        cursor: Option<String>,
        types: &[CatalogObjectType],
    ) -> Result<CatalogPage>;

    async fn search_catalog(
        &self,
        cursor: Option<String>,
        types: &[CatalogObjectType],
        include_related: bool,
    ) -> Result<CatalogPage>;
}

/// Orders, payments and customers. Every mutating call carries a caller-chosen
/// idempotency key so retries are safe.
#[async_trait]
pub trait CommerceApi: Send + Sync {
    async fn create_order(&self, order: &NewOrder, idempotency_key: &str) -> Result<RemoteOrder>;

    /// `None` when the platform has no such order.
    async fn retrieve_order(&self, order_id: &str) -> Result<Option<RemoteOrder>>;

    async fn pay_order(
        &self,
        order_id: &str,
        payment_ids: &[String],
        idempotency_key: &str,
    ) -> Result<RemoteOrder>;

    async fn search_orders(&self, location_id: &str, customer_id: &str) -> Result<Vec<RemoteOrder>>;

    async fn create_payment(&self, payment: &NewPayment, idempotency_key: &str) -> Result<PaymentRecord>;

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<CustomerRecord>>;

    async fn create_customer(
        &self,
        customer: &CustomerDetails,
        idempotency_key: &str,
    ) -> Result<CustomerRecord>;

    async fn update_customer(
        &self,
        customer_id: &str,
        customer: &CustomerDetails,
    ) -> Result<CustomerRecord>;
}
