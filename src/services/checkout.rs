//! Checkout: customer upsert, remote order, payment, and the local order record.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use super::{idempotency_key, EventPublisher};
use crate::config::StoreConfig;
use crate::domain::aggregates::{LineItem, Order};
use crate::domain::events::OrderEvent;
use crate::domain::lifecycle::FulfillmentState;
use crate::domain::value_objects::Money;
use crate::remote::{
    Address, CommerceApi, CustomerDetails, Fulfillment, NewLineItem, NewOrder, NewPayment,
    PaymentRecord, Recipient, RemoteOrder, ShipmentDetails,
};
use crate::store::OrderStore;
use crate::{Result, StorefrontError};

const SHIPMENT: &str = "SHIPMENT";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub given_name: String,
    #[validate(length(min = 1, max = 100))]
    pub family_name: String,
    pub company_name: Option<String>,
    pub phone_number: Option<String>,
    pub billing_address: Address,
    /// Defaults to the billing address.
    pub shipping_address: Option<Address>,
    #[validate(length(min = 1, message = "order must contain at least one line item"))]
    pub line_items: Vec<OrderLine>,
    pub reference_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub variation_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    #[validate(length(min = 1))]
    pub order_id: String,
    /// Minor units of the store currency.
    #[validate(range(min = 1))]
    pub amount: i64,
    /// Card nonce or token from the payment form.
    #[validate(length(min = 1))]
    pub source_id: String,
}

pub struct CheckoutService {
    commerce: Arc<dyn CommerceApi>,
    store: Arc<dyn OrderStore>,
    events: EventPublisher,
    location_id: String,
    currency: String,
    carrier: String,
}

fn invalid(e: validator::ValidationErrors) -> StorefrontError {
    StorefrontError::Validation(e.to_string())
}

impl CheckoutService {
    pub fn new(
        commerce: Arc<dyn CommerceApi>,
        store: Arc<dyn OrderStore>,
        events: EventPublisher,
        location_id: impl Into<String>,
        config: &StoreConfig,
    ) -> Self {
        Self {
            commerce,
            store,
            events,
            location_id: location_id.into(),
            currency: config.currency.clone(),
            carrier: config.carrier.clone(),
        }
    }

    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<RemoteOrder> {
        request.validate().map_err(invalid)?;
        if let Some(line) = request.line_items.iter().find(|l| l.quantity == 0 || l.variation_id.is_empty()) {
            return Err(StorefrontError::Validation(format!(
                "invalid line item {:?} (quantity {})",
                line.variation_id, line.quantity
            )));
        }

        let details = CustomerDetails {
            given_name: Some(request.given_name.clone()),
            family_name: Some(request.family_name.clone()),
            company_name: request.company_name.clone(),
            email_address: Some(request.email.clone()),
            phone_number: request.phone_number.clone(),
            address: Some(request.billing_address.clone()),
        };
        let customer = match self.commerce.find_customer_by_email(&request.email).await? {
            Some(existing) => {
                tracing::debug!(customer_id = %existing.id, "Updating existing customer");
                self.commerce.update_customer(&existing.id, &details).await?
            }
            None => {
                tracing::debug!("Creating customer");
                self.commerce.create_customer(&details, &idempotency_key()).await?
            }
        };

        let recipient = Recipient {
            display_name: Some(format!("{} {}", request.given_name, request.family_name)),
            email_address: Some(request.email.clone()),
            phone_number: request.phone_number.clone(),
            address: Some(request.shipping_address.unwrap_or(request.billing_address)),
        };
        let order = NewOrder {
            location_id: self.location_id.clone(),
            reference_id: request.reference_id,
            customer_id: Some(customer.id.clone()),
            line_items: request
                .line_items
                .into_iter()
                .map(|line| NewLineItem { catalog_object_id: line.variation_id, quantity: line.quantity.to_string() })
                .collect(),
            fulfillments: vec![Fulfillment {
                kind: Some(SHIPMENT.to_string()),
                state: Some(FulfillmentState::Proposed.to_string()),
                shipment_details: Some(ShipmentDetails {
                    recipient: Some(recipient),
                    carrier: Some(self.carrier.clone()),
                    tracking_number: None,
                }),
                pickup_details: None,
            }],
        };

        let created = self.commerce.create_order(&order, &idempotency_key()).await?;
        tracing::info!(order_id = %created.id, customer_id = %customer.id, line_items = created.line_items.len(), "Order created");
        Ok(created)
    }

    pub async fn create_payment(&self, request: CreatePaymentRequest) -> Result<PaymentRecord> {
        request.validate().map_err(invalid)?;
        let payment = NewPayment {
            source_id: request.source_id,
            amount_money: Money::new(request.amount, &self.currency),
            order_id: request.order_id,
            location_id: self.location_id.clone(),
            autocomplete: false,
        };
        let record = self.commerce.create_payment(&payment, &idempotency_key()).await?;
        tracing::info!(payment_id = %record.id, order_id = %payment.order_id, amount = request.amount, "Payment created");
        Ok(record)
    }

    /// Pay the order and start tracking it locally.
    pub async fn complete_payment(&self, order_id: &str, payment_id: &str) -> Result<RemoteOrder> {
        let paid = self
            .commerce
            .pay_order(order_id, &[payment_id.to_string()], &idempotency_key())
            .await?;

        let Some(email) = paid.recipient_email() else {
            tracing::warn!(order_id = %paid.id, "Paid order has no recipient email, not recording");
            return Ok(paid);
        };
        if paid.line_items.is_empty() {
            tracing::warn!(order_id = %paid.id, "Paid order has no line items, not recording");
            return Ok(paid);
        }

        let line_items = paid
            .line_items
            .iter()
            .filter_map(|item| {
                let id = item.catalog_object_id.as_ref()?;
                match item.quantity_units() {
                    Some(units) => Some(LineItem::new(id.clone(), units)),
                    None => {
                        tracing::warn!(order_id = %paid.id, product_id = %id, quantity = %item.quantity, "Skipping line item with unusable quantity");
                        None
                    }
                }
            })
            .collect();
        let order = Order::create(paid.id.clone(), email, line_items);
        if self.store.create(&order).await? {
            tracing::info!(order_id = %order.id(), "Order recorded");
            self.events
                .publish(&OrderEvent::Recorded {
                    order_id: order.id().to_string(),
                    customer_email: order.customer_email().to_string(),
                    line_items: order.line_items().len(),
                })
                .await;
        } else {
            tracing::debug!(order_id = %order.id(), "Order already recorded");
        }
        Ok(paid)
    }

    pub async fn order(&self, order_id: &str) -> Result<RemoteOrder> {
        self.commerce
            .retrieve_order(order_id)
            .await?
            .ok_or_else(|| StorefrontError::not_found("Order"))
    }

    pub async fn customer_orders(&self, email: &str) -> Result<Vec<RemoteOrder>> {
        match self.commerce.find_customer_by_email(email).await? {
            Some(customer) => self.commerce.search_orders(&self.location_id, &customer.id).await,
            None => Ok(vec![]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(line_items: serde_json::Value) -> CreateOrderRequest {
        serde_json::from_value(json!({
            "email": "jo@example.com",
            "given_name": "Jo",
            "family_name": "Citizen",
            "billing_address": { "address_line_1": "1 Esplanade", "locality": "Cairns" },
            "line_items": line_items
        }))
        .unwrap()
    }

    #[test]
    fn test_order_needs_at_least_one_line() {
        let errors = request(json!([])).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("line_items"));
        assert!(request(json!([{ "variation_id": "V1", "quantity": 1 }])).validate().is_ok());
    }
}
