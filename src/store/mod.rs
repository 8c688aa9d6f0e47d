//! Persisted Order Store.
//!
//! Guards are only ever flipped through [`OrderStore::claim_notification`], a
//! single conditional update. Two concurrent webhook deliveries can both read a
//! guard as unset; only one of them can claim it.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::aggregates::{Notification, Order};
use crate::Result;

pub use memory::MemoryOrderStore;
pub use postgres::PgOrderStore;

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a new order. Returns `false` if one with the same id already exists.
    async fn create(&self, order: &Order) -> Result<bool>;

    async fn find(&self, order_id: &str) -> Result<Option<Order>>;

    /// Set the guard to sent at `at` if and only if it is currently unset.
    /// Returns `true` when this call flipped it.
    async fn claim_notification(
        &self,
        order_id: &str,
        kind: Notification,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Clear a guard claimed by a send that then failed.
    async fn release_notification(&self, order_id: &str, kind: Notification) -> Result<()>;
}
