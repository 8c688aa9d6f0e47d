//! In-process order store. Same guard semantics as Postgres, behind one lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::OrderStore;
use crate::domain::aggregates::{Notification, Order};
use crate::Result;

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<HashMap<String, Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, order: &Order) -> Result<bool> {
        let mut orders = self.orders.lock().await;
        if orders.contains_key(order.id()) {
            return Ok(false);
        }
        orders.insert(order.id().to_string(), order.clone());
        Ok(true)
    }

    async fn find(&self, order_id: &str) -> Result<Option<Order>> {
        Ok(self.orders.lock().await.get(order_id).cloned())
    }

    async fn claim_notification(
        &self,
        order_id: &str,
        kind: Notification,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut orders = self.orders.lock().await;
        Ok(orders
            .get_mut(order_id)
            .map(|order| order.mark_sent(kind, at).is_ok())
            .unwrap_or(false))
    }

    async fn release_notification(&self, order_id: &str, kind: Notification) -> Result<()> {
        if let Some(order) = self.orders.lock().await.get_mut(order_id) {
            order.release(kind);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::LineItem;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let store = MemoryOrderStore::new();
        let order = Order::create("ORD1", "jo@example.com", vec![LineItem::new("V1", 1)]);
        assert!(store.create(&order).await.unwrap());
        assert!(!store.create(&order).await.unwrap());
        assert_eq!(store.orders.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_claims_have_one_winner() {
        let store = Arc::new(MemoryOrderStore::new());
        store.create(&Order::create("ORD1", "jo@example.com", vec![])).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.claim_notification("ORD1", Notification::OrderShipped, Utc::now()).await.unwrap()
                })
            })
            .collect();
        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_release_allows_reclaim() {
        let store = MemoryOrderStore::new();
        store.create(&Order::create("ORD1", "jo@example.com", vec![])).await.unwrap();
        assert!(store.claim_notification("ORD1", Notification::OrderConfirmed, Utc::now()).await.unwrap());
        store.release_notification("ORD1", Notification::OrderConfirmed).await.unwrap();
        assert!(store.claim_notification("ORD1", Notification::OrderConfirmed, Utc::now()).await.unwrap());
        assert!(!store.claim_notification("missing", Notification::OrderConfirmed, Utc::now()).await.unwrap());
    }
}
