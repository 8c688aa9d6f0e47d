//! Scripted collaborators shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cheekco_storefront::config::{EmailConfig, StoreConfig};
use cheekco_storefront::domain::catalog::{
    CatalogEntry, CatalogObjectType, Category, EntryKind, EntryMeta, Image, Item, Variation,
};
use cheekco_storefront::domain::value_objects::Money;
use cheekco_storefront::remote::{
    CatalogApi, CatalogPage, CommerceApi, CustomerDetails, CustomerRecord, DeliveryStatus, EmailSender,
    Fulfillment, NewOrder, NewPayment, PaymentRecord, Recipient, RemoteLineItem, RemoteOrder,
    ShipmentDetails, TemplateEmail,
};
use cheekco_storefront::services::{EventPublisher, NotificationSettings, OrderLifecycleTracker};
use cheekco_storefront::store::MemoryOrderStore;
use cheekco_storefront::{Result, StorefrontError};

// =============================================================================
// Catalog
// =============================================================================

/// Replays its pages in order; a request without a cursor starts a new pass.
pub struct FakeCatalog {
    pages: Mutex<Vec<CatalogPage>>,
    position: AtomicUsize,
    pub calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new(pages: Vec<CatalogPage>) -> Self {
        Self { pages: Mutex::new(pages), position: AtomicUsize::new(0), calls: AtomicUsize::new(0) }
    }

    fn next(&self, cursor: Option<String>) -> Result<CatalogPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if cursor.is_none() {
            self.position.store(0, Ordering::SeqCst);
        }
        let position = self.position.fetch_add(1, Ordering::SeqCst);
        let pages = self.pages.lock().unwrap();
        Ok(pages.get(position).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn list_catalog(&self, cursor: Option<String>, _: &[CatalogObjectType]) -> Result<CatalogPage> {
        self.next(cursor)
    }

    async fn search_catalog(&self, cursor: Option<String>, _: &[CatalogObjectType], _: bool) -> Result<CatalogPage> {
        self.next(cursor)
    }
}

pub fn item_entry(id: &str, name: &str, image_ids: &[&str], price: Option<i64>) -> CatalogEntry {
    let variations = price
        .map(|amount| {
            vec![Variation {
                id: format!("{id}-V1"),
                item_id: id.into(),
                price: Some(Money::aud(amount)),
                ..Default::default()
            }]
        })
        .unwrap_or_default();
    CatalogEntry::new(
        EntryMeta { id: id.into(), version: 1, ..Default::default() },
        EntryKind::Item(Item {
            name: Some(name.into()),
            image_ids: image_ids.iter().map(|s| s.to_string()).collect(),
            variations,
            ..Default::default()
        }),
    )
}

pub fn image_entry(id: &str, url: &str) -> CatalogEntry {
    CatalogEntry::new(
        EntryMeta { id: id.into(), version: 1, ..Default::default() },
        EntryKind::Image(Image { url: url.into(), name: None }),
    )
}

pub fn category_entry(id: &str, name: &str, ordinal: i64) -> CatalogEntry {
    CatalogEntry::new(
        EntryMeta { id: id.into(), version: 1, ..Default::default() },
        EntryKind::Category(Category { name: Some(name.into()), ordinal: Some(ordinal) }),
    )
}

// =============================================================================
// Commerce
// =============================================================================

#[derive(Default)]
pub struct FakeCommerce {
    pub orders: Mutex<HashMap<String, RemoteOrder>>,
    pub customers: Mutex<Vec<CustomerRecord>>,
    pub created_orders: Mutex<Vec<NewOrder>>,
    pub payments: Mutex<Vec<NewPayment>>,
    pub updated_customers: Mutex<Vec<String>>,
    pub retrievals: AtomicUsize,
}

impl FakeCommerce {
    pub fn with_order(order: RemoteOrder) -> Self {
        let fake = Self::default();
        fake.orders.lock().unwrap().insert(order.id.clone(), order);
        fake
    }

    pub fn with_customer(self, id: &str, email: &str) -> Self {
        self.customers.lock().unwrap().push(CustomerRecord {
            id: id.into(),
            email_address: Some(email.into()),
            ..Default::default()
        });
        self
    }
}

#[async_trait]
impl CommerceApi for FakeCommerce {
    async fn create_order(&self, order: &NewOrder, _: &str) -> Result<RemoteOrder> {
        let mut orders = self.orders.lock().unwrap();
        let remote = RemoteOrder {
            id: format!("ORD-{}", orders.len() + 1),
            location_id: Some(order.location_id.clone()),
            reference_id: order.reference_id.clone(),
            customer_id: order.customer_id.clone(),
            state: Some("OPEN".into()),
            line_items: order
                .line_items
                .iter()
                .map(|l| RemoteLineItem {
                    quantity: l.quantity.clone(),
                    catalog_object_id: Some(l.catalog_object_id.clone()),
                    ..Default::default()
                })
                .collect(),
            fulfillments: order.fulfillments.clone(),
            total_money: None,
            version: Some(1),
        };
        orders.insert(remote.id.clone(), remote.clone());
        self.created_orders.lock().unwrap().push(order.clone());
        Ok(remote)
    }

    async fn retrieve_order(&self, order_id: &str) -> Result<Option<RemoteOrder>> {
        self.retrievals.fetch_add(1, Ordering::SeqCst);
        Ok(self.orders.lock().unwrap().get(order_id).cloned())
    }

    async fn pay_order(&self, order_id: &str, _: &[String], _: &str) -> Result<RemoteOrder> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| StorefrontError::not_found("Order"))?;
        order.state = Some("COMPLETED".into());
        Ok(order.clone())
    }

    async fn search_orders(&self, _: &str, customer_id: &str) -> Result<Vec<RemoteOrder>> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.customer_id.as_deref() == Some(customer_id))
            .cloned()
            .collect())
    }

    async fn create_payment(&self, payment: &NewPayment, _: &str) -> Result<PaymentRecord> {
        self.payments.lock().unwrap().push(payment.clone());
        Ok(PaymentRecord {
            id: "PAY-1".into(),
            status: Some("APPROVED".into()),
            order_id: Some(payment.order_id.clone()),
            amount_money: Some(payment.amount_money.clone()),
            receipt_url: None,
        })
    }

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<CustomerRecord>> {
        Ok(self
            .customers
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.email_address.as_deref() == Some(email))
            .cloned())
    }

    async fn create_customer(&self, customer: &CustomerDetails, _: &str) -> Result<CustomerRecord> {
        let mut customers = self.customers.lock().unwrap();
        let record = CustomerRecord {
            id: format!("CUST-{}", customers.len() + 1),
            email_address: customer.email_address.clone(),
            given_name: customer.given_name.clone(),
            family_name: customer.family_name.clone(),
        };
        customers.push(record.clone());
        Ok(record)
    }

    async fn update_customer(&self, customer_id: &str, customer: &CustomerDetails) -> Result<CustomerRecord> {
        self.updated_customers.lock().unwrap().push(customer_id.to_string());
        Ok(CustomerRecord {
            id: customer_id.into(),
            email_address: customer.email_address.clone(),
            given_name: customer.given_name.clone(),
            family_name: customer.family_name.clone(),
        })
    }
}

pub fn shipped_order(id: &str, email: &str, total: i64) -> RemoteOrder {
    RemoteOrder {
        id: id.into(),
        total_money: Some(Money::aud(total)),
        line_items: vec![RemoteLineItem {
            name: Some("Soap".into()),
            quantity: "1".into(),
            catalog_object_id: Some("SOAP-V1".into()),
            base_price_money: Some(Money::aud(total)),
            ..Default::default()
        }],
        fulfillments: vec![Fulfillment {
            kind: Some("SHIPMENT".into()),
            state: Some("COMPLETED".into()),
            shipment_details: Some(ShipmentDetails {
                recipient: Some(Recipient {
                    display_name: Some("Jo Citizen".into()),
                    email_address: Some(email.into()),
                    ..Default::default()
                }),
                carrier: Some("Australia Post".into()),
                tracking_number: Some("AP0001".into()),
            }),
            pickup_details: None,
        }],
        ..Default::default()
    }
}

// =============================================================================
// Email
// =============================================================================

/// Answers with queued statuses, then 202 once the queue is empty.
#[derive(Default)]
pub struct Outbox {
    statuses: Mutex<Vec<u16>>,
    pub sent: Mutex<Vec<TemplateEmail>>,
}

impl Outbox {
    pub fn failing_once(status: u16) -> Self {
        Self { statuses: Mutex::new(vec![status]), sent: Mutex::new(vec![]) }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl EmailSender for Outbox {
    async fn send(&self, email: &TemplateEmail) -> Result<DeliveryStatus> {
        let status = {
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.is_empty() { 202 } else { statuses.remove(0) }
        };
        if status == 202 {
            self.sent.lock().unwrap().push(email.clone());
        }
        Ok(DeliveryStatus(status))
    }
}

// =============================================================================
// Wiring
// =============================================================================

pub fn store_config() -> StoreConfig {
    StoreConfig {
        currency: "AUD".into(),
        carrier: "Australia Post".into(),
        featured_attribute: "All-Natural".into(),
    }
}

pub fn email_config() -> EmailConfig {
    EmailConfig {
        api_key: "test".into(),
        base_url: "http://localhost".into(),
        from: "shop@example.com".into(),
        order_confirmed_template: "d-confirmed".into(),
        order_shipped_template: "d-shipped".into(),
        contact_template: "d-contact".into(),
        contact_inbox: "inbox@example.com".into(),
    }
}

pub fn tracker(
    commerce: Arc<FakeCommerce>,
    store: Arc<MemoryOrderStore>,
    outbox: Arc<Outbox>,
) -> OrderLifecycleTracker {
    OrderLifecycleTracker::new(
        commerce,
        store,
        outbox,
        EventPublisher::disabled(),
        NotificationSettings::from_config(&email_config(), &store_config()),
    )
}
