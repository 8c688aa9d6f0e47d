//! Order, payment and customer records exchanged with the commerce platform.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::value_objects::Money;

// =============================================================================
// Orders
// =============================================================================

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RemoteOrder {
    pub id: String,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub reference_id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub line_items: Vec<RemoteLineItem>,
    #[serde(default)]
    pub fulfillments: Vec<Fulfillment>,
    #[serde(default)]
    pub total_money: Option<Money>,
    #[serde(default)]
    pub version: Option<i64>,
}

impl RemoteOrder {
    /// Recipient of the first fulfillment: shipment if present, else pickup.
    pub fn recipient(&self) -> Option<&Recipient> {
        let fulfillment = self.fulfillments.first()?;
        fulfillment
            .shipment_details
            .as_ref()
            .and_then(|s| s.recipient.as_ref())
            .or_else(|| fulfillment.pickup_details.as_ref().and_then(|p| p.recipient.as_ref()))
    }

    pub fn recipient_email(&self) -> Option<&str> {
        self.recipient()
            .and_then(|r| r.email_address.as_deref())
            .filter(|e| !e.is_empty())
    }

    pub fn shipment(&self) -> Option<&ShipmentDetails> {
        self.fulfillments.first()?.shipment_details.as_ref()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RemoteLineItem {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Decimal string, as the platform sends it.
    pub quantity: String,
    #[serde(default)]
    pub catalog_object_id: Option<String>,
    #[serde(default)]
    pub base_price_money: Option<Money>,
}

impl RemoteLineItem {
    /// Whole-unit quantity, rounding fractional quantities up. `None` when the
    /// quantity is malformed or not positive.
    pub fn quantity_units(&self) -> Option<u32> {
        let quantity = Decimal::from_str(self.quantity.trim()).ok()?.ceil();
        u32::try_from(quantity).ok().filter(|units| *units > 0)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Fulfillment {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipment_details: Option<ShipmentDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_details: Option<PickupDetails>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShipmentDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Recipient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PickupDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Recipient>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line_2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrative_district_level_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct NewOrder {
    pub location_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub line_items: Vec<NewLineItem>,
    pub fulfillments: Vec<Fulfillment>,
}

#[derive(Clone, Debug, Serialize)]
pub struct NewLineItem {
    pub catalog_object_id: String,
    pub quantity: String,
}

// =============================================================================
// Payments
// =============================================================================

#[derive(Clone, Debug, Serialize)]
pub struct NewPayment {
    pub source_id: String,
    pub amount_money: Money,
    pub order_id: String,
    pub location_id: String,
    pub autocomplete: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub amount_money: Option<Money>,
    #[serde(default)]
    pub receipt_url: Option<String>,
}

// =============================================================================
// Customers
// =============================================================================

#[derive(Clone, Debug, Default, Serialize)]
pub struct CustomerDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: String,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
}
