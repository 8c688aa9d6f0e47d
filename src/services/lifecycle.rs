//! Order Lifecycle Tracker.
//!
//! Turns platform webhooks into at most one confirmation email and at most one
//! shipment email per order. The guard is claimed in the store before the email
//! goes out and released again if the send fails, so a redelivered webhook can
//! retry while a concurrent duplicate cannot double-send.

use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

use super::EventPublisher;
use crate::config::{EmailConfig, StoreConfig};
use crate::domain::aggregates::{Notification, Order};
use crate::domain::events::OrderEvent;
use crate::domain::lifecycle::{plan, LifecycleAction, WebhookEvent};
use crate::domain::value_objects::{Money, OrderTotals};
use crate::remote::{CommerceApi, EmailSender, RemoteOrder, TemplateEmail};
use crate::store::OrderStore;
use crate::{Result, StorefrontError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WebhookOutcome {
    EmailSent(Notification),
    AlreadySent(Notification),
    InProgress,
    Ignored,
}

impl WebhookOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            Self::EmailSent(_) => "Email sent and order updated",
            Self::AlreadySent(Notification::OrderConfirmed) => "Order email already sent",
            Self::AlreadySent(Notification::OrderShipped) => "Shipment email already sent",
            Self::InProgress => "No need to email for in-progress orders",
            Self::Ignored => "Event ignored",
        }
    }
}

/// Templates and store defaults used to compose notification emails.
#[derive(Clone, Debug)]
pub struct NotificationSettings {
    pub order_confirmed_template: String,
    pub order_shipped_template: String,
    pub currency: String,
    /// Used when the shipment carries no carrier of its own.
    pub carrier: String,
}

impl NotificationSettings {
    pub fn from_config(email: &EmailConfig, store: &StoreConfig) -> Self {
        Self {
            order_confirmed_template: email.order_confirmed_template.clone(),
            order_shipped_template: email.order_shipped_template.clone(),
            currency: store.currency.clone(),
            carrier: store.carrier.clone(),
        }
    }

    fn template(&self, kind: Notification) -> &str {
        match kind {
            Notification::OrderConfirmed => &self.order_confirmed_template,
            Notification::OrderShipped => &self.order_shipped_template,
        }
    }
}

fn subject(kind: Notification) -> &'static str {
    match kind {
        Notification::OrderConfirmed => "Thanks! Your order has been received!",
        Notification::OrderShipped => "Great news! Your order has been shipped!",
    }
}

pub struct OrderLifecycleTracker {
    commerce: Arc<dyn CommerceApi>,
    store: Arc<dyn OrderStore>,
    email: Arc<dyn EmailSender>,
    events: EventPublisher,
    settings: NotificationSettings,
}

impl OrderLifecycleTracker {
    pub fn new(
        commerce: Arc<dyn CommerceApi>,
        store: Arc<dyn OrderStore>,
        email: Arc<dyn EmailSender>,
        events: EventPublisher,
        settings: NotificationSettings,
    ) -> Self {
        Self { commerce, store, email, events, settings }
    }

    pub async fn handle(&self, event: &WebhookEvent) -> Result<WebhookOutcome> {
        let order_id = event.order_id();
        let Some(order) = self.store.find(order_id).await? else {
            tracing::warn!(order_id, event_type = %event.event_type, "Webhook for unknown order");
            return Err(StorefrontError::not_found("Order"));
        };

        let kind = match plan(event) {
            LifecycleAction::Notify(kind) => kind,
            LifecycleAction::InProgress => {
                tracing::info!(order_id, event_type = %event.event_type, "Order in progress, nothing to send");
                return Ok(WebhookOutcome::InProgress);
            }
            LifecycleAction::Ignore => {
                tracing::info!(
                    order_id,
                    event_type = %event.event_type,
                    transition = ?event.transition(),
                    "Unhandled lifecycle event ignored"
                );
                return Ok(WebhookOutcome::Ignored);
            }
        };

        if order.is_sent(kind) {
            tracing::info!(order_id, notification = kind.as_str(), "Notification already sent");
            return Ok(WebhookOutcome::AlreadySent(kind));
        }

        let remote = self
            .commerce
            .retrieve_order(order_id)
            .await?
            .ok_or_else(|| StorefrontError::not_found("Remote order"))?;
        let email = self.compose(kind, &order, &remote);

        if !self.store.claim_notification(order_id, kind, Utc::now()).await? {
            tracing::info!(order_id, notification = kind.as_str(), "Notification claimed by another delivery");
            return Ok(WebhookOutcome::AlreadySent(kind));
        }

        let status = match self.email.send(&email).await {
            Ok(status) if status.is_accepted() => status,
            Ok(status) => {
                self.release(order_id, kind).await;
                tracing::warn!(order_id, notification = kind.as_str(), status = status.0, "Failed to send email");
                return Err(StorefrontError::EmailDelivery { status: status.0 });
            }
            Err(e) => {
                self.release(order_id, kind).await;
                tracing::warn!(order_id, notification = kind.as_str(), error = %e, "Failed to send email");
                return Err(e);
            }
        };

        tracing::info!(order_id, notification = kind.as_str(), status = status.0, to = %email.to, "Email sent and order updated");
        self.events
            .publish(&OrderEvent::NotificationSent {
                order_id: order_id.to_string(),
                notification: kind,
                recipient: email.to.clone(),
                sent_at: Utc::now(),
            })
            .await;
        Ok(WebhookOutcome::EmailSent(kind))
    }

    async fn release(&self, order_id: &str, kind: Notification) {
        if let Err(e) = self.store.release_notification(order_id, kind).await {
            tracing::error!(order_id, notification = kind.as_str(), error = %e, "Failed to release notification guard");
        }
    }

    fn compose(&self, kind: Notification, order: &Order, remote: &RemoteOrder) -> TemplateEmail {
        let recipient = remote
            .recipient_email()
            .unwrap_or_else(|| order.customer_email())
            .to_string();
        TemplateEmail {
            template_id: self.settings.template(kind).to_string(),
            to: recipient.clone(),
            subject: subject(kind).to_string(),
            data: template_data(kind, remote, &recipient, &self.settings),
        }
    }
}

/// Dynamic data for the confirmation and shipment templates.
pub fn template_data(
    kind: Notification,
    remote: &RemoteOrder,
    recipient: &str,
    settings: &NotificationSettings,
) -> Value {
    let total = remote
        .total_money
        .clone()
        .unwrap_or_else(|| Money::zero(&settings.currency));
    let totals = OrderTotals::from_tax_inclusive(total);
    let name = remote
        .recipient()
        .and_then(|r| r.display_name.clone())
        .unwrap_or_default();
    let line_items: Vec<Value> = remote
        .line_items
        .iter()
        .map(|item| {
            json!({
                "name": item.name.clone().unwrap_or_default(),
                "quantity": item.quantity,
                "price": item
                    .base_price_money
                    .as_ref()
                    .map(Money::display)
                    .unwrap_or_else(|| Money::zero(&settings.currency).display()),
            })
        })
        .collect();

    let mut order = json!({
        "id": remote.id,
        "subtotal": totals.subtotal.display(),
        "gst": totals.tax.display(),
        "total": totals.total.display(),
        "customer": { "name": name, "email": recipient },
        "lineItems": line_items,
    });
    if kind == Notification::OrderShipped {
        let shipment = remote.shipment();
        order["carrier"] = json!(shipment
            .and_then(|s| s.carrier.clone())
            .unwrap_or_else(|| settings.carrier.clone()));
        order["trackingNumber"] = json!(shipment.and_then(|s| s.tracking_number.clone()));
    }
    json!({ "order": order })
}
