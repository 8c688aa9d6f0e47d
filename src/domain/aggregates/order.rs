//! Order Aggregate
//!
//! The local record of a paid order. Catalog, totals and fulfillment live on the
//! commerce platform; locally we keep what the lifecycle webhooks need: who to
//! email and whether each one-shot notification already went out.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Order {
    id: String,
    customer_email: String,
    line_items: Vec<LineItem>,
    confirmation: NotificationGuard,
    shipment: NotificationGuard,
    created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LineItem {
    pub id: Uuid,
    pub product_id: String,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self { id: Uuid::new_v4(), product_id: product_id.into(), quantity }
    }
}

/// The two customer emails that must go out at most once per order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notification {
    OrderConfirmed,
    OrderShipped,
}

impl Notification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderConfirmed => "order_confirmed",
            Self::OrderShipped => "order_shipped",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NotificationGuard {
    pub sent: bool,
    pub sent_at: Option<DateTime<Utc>>,
}

impl NotificationGuard {
    pub fn sent_at(at: DateTime<Utc>) -> Self {
        Self { sent: true, sent_at: Some(at) }
    }
}

impl Order {
    pub fn create(id: impl Into<String>, customer_email: impl Into<String>, line_items: Vec<LineItem>) -> Self {
        Self {
            id: id.into(),
            customer_email: customer_email.into(),
            line_items,
            confirmation: NotificationGuard::default(),
            shipment: NotificationGuard::default(),
            created_at: Utc::now(),
        }
    }

    /// Rebuild a stored order without touching its guards.
    pub fn restore(
        id: String,
        customer_email: String,
        line_items: Vec<LineItem>,
        confirmation: NotificationGuard,
        shipment: NotificationGuard,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self { id, customer_email, line_items, confirmation, shipment, created_at }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn customer_email(&self) -> &str {
        &self.customer_email
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn guard(&self, kind: Notification) -> &NotificationGuard {
        match kind {
            Notification::OrderConfirmed => &self.confirmation,
            Notification::OrderShipped => &self.shipment,
        }
    }

    pub fn is_sent(&self, kind: Notification) -> bool {
        self.guard(kind).sent
    }

    /// Flip the guard false -> true. Fails if it is already set.
    pub fn mark_sent(&mut self, kind: Notification, at: DateTime<Utc>) -> Result<(), OrderError> {
        let guard = self.guard_mut(kind);
        if guard.sent {
            return Err(OrderError::AlreadySent(kind));
        }
        *guard = NotificationGuard::sent_at(at);
        Ok(())
    }

    /// Undo a claim whose email never went out.
    pub fn release(&mut self, kind: Notification) {
        *self.guard_mut(kind) = NotificationGuard::default();
    }

    fn guard_mut(&mut self, kind: Notification) -> &mut NotificationGuard {
        match kind {
            Notification::OrderConfirmed => &mut self.confirmation,
            Notification::OrderShipped => &mut self.shipment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    AlreadySent(Notification),
}

impl std::error::Error for OrderError {}

impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadySent(kind) => write!(f, "{} email already sent", kind.as_str()),
        }
    }
}
