//! Order lifecycle as seen through platform webhooks.
//!
//! Fulfillment states belong to the commerce platform. The storefront only
//! reacts to two things: a new order (confirmation email) and a fulfillment
//! moving from RESERVED to COMPLETED (shipment email). Everything else is
//! acknowledged and dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::aggregates::Notification;

pub const ORDER_CREATED: &str = "order.created";
pub const ORDER_FULFILLMENT_UPDATED: &str = "order.fulfillment.updated";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentState {
    Proposed,
    Reserved,
    Completed,
    Cancelled,
}

impl FulfillmentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proposed => "PROPOSED",
            Self::Reserved => "RESERVED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for FulfillmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownState(pub String);

impl FromStr for FulfillmentState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROPOSED" => Ok(Self::Proposed),
            "RESERVED" => Ok(Self::Reserved),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(UnknownState(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: FulfillmentState,
    pub to: FulfillmentState,
}

// =============================================================================
// Webhook payload
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub event_id: Option<String>,
    pub data: WebhookData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookData {
    /// Order id for every order.* event.
    pub id: String,
    #[serde(default)]
    pub object: WebhookObject,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookObject {
    #[serde(default)]
    pub order_fulfillment_updated: Option<FulfillmentUpdated>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FulfillmentUpdated {
    #[serde(default)]
    pub fulfillment_update: Vec<FulfillmentUpdate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FulfillmentUpdate {
    #[serde(default)]
    pub fulfillment_uid: Option<String>,
    #[serde(default)]
    pub old_state: Option<String>,
    #[serde(default)]
    pub new_state: Option<String>,
}

impl WebhookEvent {
    pub fn order_id(&self) -> &str {
        &self.data.id
    }

    /// First fulfillment update, if both of its states are known.
    pub fn transition(&self) -> Option<Transition> {
        let update = self
            .data
            .object
            .order_fulfillment_updated
            .as_ref()?
            .fulfillment_update
            .first()?;
        let from = update.old_state.as_deref()?.parse().ok()?;
        let to = update.new_state.as_deref()?.parse().ok()?;
        Some(Transition { from, to })
    }
}

// =============================================================================
// Decision
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Send this notification unless its guard is already set.
    Notify(Notification),
    /// PROPOSED -> RESERVED: acknowledged, nothing to send.
    InProgress,
    Ignore,
}

pub fn plan(event: &WebhookEvent) -> LifecycleAction {
    match event.event_type.as_str() {
        ORDER_CREATED => LifecycleAction::Notify(Notification::OrderConfirmed),
        ORDER_FULFILLMENT_UPDATED => match event.transition() {
            Some(Transition { from: FulfillmentState::Proposed, to: FulfillmentState::Reserved }) => {
                LifecycleAction::InProgress
            }
            Some(Transition { from: FulfillmentState::Reserved, to: FulfillmentState::Completed }) => {
                LifecycleAction::Notify(Notification::OrderShipped)
            }
            _ => LifecycleAction::Ignore,
        },
        _ => LifecycleAction::Ignore,
    }
}
