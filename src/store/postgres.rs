use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::OrderStore;
use crate::domain::aggregates::{LineItem, Notification, NotificationGuard, Order};
use crate::Result;

#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    customer_email: String,
    order_confirmed_email_sent: bool,
    order_confirmed_email_sent_at: Option<DateTime<Utc>>,
    order_shipped_email_sent: bool,
    order_shipped_email_sent_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct LineItemRow {
    id: Uuid,
    product_id: String,
    quantity: i32,
}

/// (sent flag, sent timestamp) columns for a guard.
fn guard_columns(kind: Notification) -> (&'static str, &'static str) {
    match kind {
        Notification::OrderConfirmed => ("order_confirmed_email_sent", "order_confirmed_email_sent_at"),
        Notification::OrderShipped => ("order_shipped_email_sent", "order_shipped_email_sent_at"),
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, order: &Order) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query(
            "INSERT INTO orders (id, customer_email, created_at) VALUES ($1, $2, $3)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(order.id())
        .bind(order.customer_email())
        .bind(order.created_at())
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }
        for (position, item) in order.line_items().iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_line_items (id, order_id, position, product_id, quantity)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(item.id)
            .bind(order.id())
            .bind(i32::try_from(position).unwrap_or(i32::MAX))
            .bind(&item.product_id)
            .bind(i32::try_from(item.quantity).unwrap_or(i32::MAX))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(true)
    }

    async fn find(&self, order_id: &str) -> Result<Option<Order>> {
        let Some(row) = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };
        let items = sqlx::query_as::<_, LineItemRow>(
            "SELECT id, product_id, quantity FROM order_line_items WHERE order_id = $1 ORDER BY position",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Order::restore(
            row.id,
            row.customer_email,
            items
                .into_iter()
                .map(|i| LineItem { id: i.id, product_id: i.product_id, quantity: i.quantity.max(0) as u32 })
                .collect(),
            NotificationGuard { sent: row.order_confirmed_email_sent, sent_at: row.order_confirmed_email_sent_at },
            NotificationGuard { sent: row.order_shipped_email_sent, sent_at: row.order_shipped_email_sent_at },
            row.created_at,
        )))
    }

    async fn claim_notification(
        &self,
        order_id: &str,
        kind: Notification,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let (sent, sent_at) = guard_columns(kind);
        let result = sqlx::query(&format!(
            "UPDATE orders SET {sent} = TRUE, {sent_at} = $2 WHERE id = $1 AND {sent} = FALSE"
        ))
        .bind(order_id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn release_notification(&self, order_id: &str, kind: Notification) -> Result<()> {
        let (sent, sent_at) = guard_columns(kind);
        sqlx::query(&format!("UPDATE orders SET {sent} = FALSE, {sent_at} = NULL WHERE id = $1"))
            .bind(order_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
