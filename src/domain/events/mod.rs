//! Domain events
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::aggregates::Notification;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrderEvent {
    Recorded { order_id: String, customer_email: String, line_items: usize },
    NotificationSent { order_id: String, notification: Notification, recipient: String, sent_at: DateTime<Utc> },
}

impl OrderEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> String {
        match self {
            Self::Recorded { .. } => "storefront.orders.recorded".to_string(),
            Self::NotificationSent { notification, .. } => format!("storefront.orders.{}", notification.as_str()),
        }
    }

    pub fn order_id(&self) -> &str {
        match self { Self::Recorded { order_id, .. } | Self::NotificationSent { order_id, .. } => order_id }
    }
}
