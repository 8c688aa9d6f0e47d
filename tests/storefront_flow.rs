//! Catalog and order lifecycle scenarios driven through the public services.

mod common;

use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use cheekco_storefront::domain::aggregates::{LineItem, Notification, Order};
use cheekco_storefront::domain::catalog::ProjectionOptions;
use cheekco_storefront::domain::lifecycle::WebhookEvent;
use cheekco_storefront::remote::{CatalogPage, RemoteLineItem};
use cheekco_storefront::services::{
    CatalogCache, CatalogService, CheckoutService, EventPublisher, WebhookOutcome,
};
use cheekco_storefront::store::{MemoryOrderStore, OrderStore};
use cheekco_storefront::StorefrontError;
use chrono::Utc;
use common::*;

fn order_created(order_id: &str) -> WebhookEvent {
    serde_json::from_value(json!({
        "type": "order.created",
        "event_id": "E-created",
        "data": { "type": "order", "id": order_id, "object": { "order_created": { "state": "OPEN" } } }
    }))
    .unwrap()
}

fn fulfillment_updated(order_id: &str, old: &str, new: &str) -> WebhookEvent {
    serde_json::from_value(json!({
        "type": "order.fulfillment.updated",
        "event_id": "E-fulfillment",
        "data": {
            "type": "order_fulfillment_updated",
            "id": order_id,
            "object": {
                "order_fulfillment_updated": {
                    "fulfillment_update": [{ "fulfillment_uid": "F1", "old_state": old, "new_state": new }]
                }
            }
        }
    }))
    .unwrap()
}

async fn recorded_store(order_id: &str) -> Arc<MemoryOrderStore> {
    let store = Arc::new(MemoryOrderStore::new());
    let order = Order::create(order_id, "jo@example.com", vec![LineItem::new("SOAP-V1", 1)]);
    store.create(&order).await.unwrap();
    store
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn two_pages_resolve_image_from_later_related_object() {
    let api = Arc::new(FakeCatalog::new(vec![
        CatalogPage {
            entries: vec![item_entry("SOAP", "Soap", &["IMG1"], Some(1200))],
            related: vec![],
            cursor: Some("abc".into()),
        },
        CatalogPage {
            entries: vec![],
            related: vec![image_entry("IMG1", "https://cdn.example.com/soap.jpg")],
            cursor: Some(String::new()),
        },
    ]));
    let service = CatalogService::new(api.clone(), CatalogCache::disabled(), ProjectionOptions::default());

    let index = service.index().await.unwrap();
    assert!(index.contains("SOAP"));
    assert!(index.contains("IMG1"));
    assert_eq!(api.calls.load(Ordering::SeqCst), 2);

    let products = service.products(None).await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].image.as_deref(), Some("https://cdn.example.com/soap.jpg"));
    assert_eq!(products[0].price.as_ref().map(|m| m.amount()), Some(1200));
    assert_eq!(api.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn hidden_item_stays_indexed_but_never_surfaces() {
    let api = Arc::new(FakeCatalog::new(vec![CatalogPage {
        entries: vec![
            item_entry("SOAP", "Soap", &[], Some(1200)),
            item_entry("HIDDEN", "_Hidden", &[], Some(100)),
            category_entry("CAT", "_Drafts", 1),
        ],
        related: vec![],
        cursor: None,
    }]));
    let service = CatalogService::new(api, CatalogCache::disabled(), ProjectionOptions::default());

    assert!(service.index().await.unwrap().contains("HIDDEN"));
    let names: Vec<_> = service.products(None).await.unwrap().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Soap"]);
    assert!(matches!(service.product_by_slug("_hidden").await, Err(StorefrontError::NotFound(_))));
    assert!(service.categories().await.unwrap().is_empty());
    assert!(service.product_by_slug("SOAP").await.is_ok());
}

#[tokio::test]
async fn item_without_variations_has_no_price() {
    let api = Arc::new(FakeCatalog::new(vec![CatalogPage {
        entries: vec![item_entry("GIFT", "Gift Card", &[], None)],
        related: vec![],
        cursor: None,
    }]));
    let service = CatalogService::new(api, CatalogCache::disabled(), ProjectionOptions::default());

    let view = service.product_by_slug("gift-card").await.unwrap();
    assert!(view.price.is_none());
    assert!(view.variation_id.is_none());
    assert!(!view.is_featured);
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn paid_order_keeps_line_order_and_rounds_quantities() {
    let mut paid = shipped_order("ORD1", "jo@example.com", 11000);
    let line = |id: &str, quantity: &str| RemoteLineItem {
        quantity: quantity.into(),
        catalog_object_id: Some(id.into()),
        ..Default::default()
    };
    paid.line_items = vec![line("V9", "1"), line("V1", "1.5"), line("V5", "0"), line("V3", "lots")];
    let commerce = Arc::new(FakeCommerce::with_order(paid));
    let store = Arc::new(MemoryOrderStore::new());
    let checkout = CheckoutService::new(commerce, store.clone(), EventPublisher::disabled(), "LOC1", &store_config());

    checkout.complete_payment("ORD1", "PAY-1").await.unwrap();

    let order = store.find("ORD1").await.unwrap().unwrap();
    let lines: Vec<_> = order.line_items().iter().map(|i| (i.product_id.as_str(), i.quantity)).collect();
    assert_eq!(lines, vec![("V9", 1), ("V1", 2)]);
}

// =============================================================================
// Order lifecycle
// =============================================================================

#[tokio::test]
async fn duplicate_order_created_sends_one_email() {
    let store = recorded_store("ORD1").await;
    let commerce = Arc::new(FakeCommerce::with_order(shipped_order("ORD1", "jo@example.com", 11000)));
    let outbox = Arc::new(Outbox::default());
    let tracker = tracker(commerce, store.clone(), outbox.clone());

    let first = tracker.handle(&order_created("ORD1")).await.unwrap();
    let second = tracker.handle(&order_created("ORD1")).await.unwrap();

    assert_eq!(first, WebhookOutcome::EmailSent(Notification::OrderConfirmed));
    assert_eq!(second, WebhookOutcome::AlreadySent(Notification::OrderConfirmed));
    assert_eq!(second.message(), "Order email already sent");
    assert_eq!(outbox.sent_count(), 1);

    let sent = outbox.sent.lock().unwrap();
    assert_eq!(sent[0].to, "jo@example.com");
    assert_eq!(sent[0].template_id, "d-confirmed");
    assert_eq!(sent[0].data["order"]["total"], "$110.00");
    assert_eq!(sent[0].data["order"]["subtotal"], "$99.00");
    assert_eq!(sent[0].data["order"]["gst"], "$11.00");
    drop(sent);

    let order = store.find("ORD1").await.unwrap().unwrap();
    assert!(order.is_sent(Notification::OrderConfirmed));
    assert!(order.guard(Notification::OrderConfirmed).sent_at.is_some());
    assert!(!order.is_sent(Notification::OrderShipped));
}

#[tokio::test]
async fn shipment_already_sent_is_a_quiet_no_op() {
    let store = recorded_store("ORD1").await;
    store
        .claim_notification("ORD1", Notification::OrderShipped, Utc::now())
        .await
        .unwrap();
    let commerce = Arc::new(FakeCommerce::with_order(shipped_order("ORD1", "jo@example.com", 11000)));
    let outbox = Arc::new(Outbox::default());
    let tracker = tracker(commerce.clone(), store, outbox.clone());

    let outcome = tracker
        .handle(&fulfillment_updated("ORD1", "RESERVED", "COMPLETED"))
        .await
        .unwrap();

    assert_eq!(outcome, WebhookOutcome::AlreadySent(Notification::OrderShipped));
    assert_eq!(outcome.message(), "Shipment email already sent");
    assert_eq!(outbox.sent_count(), 0);
    assert_eq!(commerce.retrievals.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn shipment_email_carries_tracking_details() {
    let store = recorded_store("ORD1").await;
    let commerce = Arc::new(FakeCommerce::with_order(shipped_order("ORD1", "jo@example.com", 5000)));
    let outbox = Arc::new(Outbox::default());
    let tracker = tracker(commerce, store.clone(), outbox.clone());

    let outcome = tracker
        .handle(&fulfillment_updated("ORD1", "RESERVED", "COMPLETED"))
        .await
        .unwrap();
    assert_eq!(outcome, WebhookOutcome::EmailSent(Notification::OrderShipped));

    let sent = outbox.sent.lock().unwrap();
    assert_eq!(sent[0].template_id, "d-shipped");
    assert_eq!(sent[0].data["order"]["trackingNumber"], "AP0001");
    assert_eq!(sent[0].data["order"]["carrier"], "Australia Post");
    drop(sent);
    assert!(store.find("ORD1").await.unwrap().unwrap().is_sent(Notification::OrderShipped));
}

#[tokio::test]
async fn failed_send_releases_guard_for_redelivery() {
    let store = recorded_store("ORD1").await;
    let commerce = Arc::new(FakeCommerce::with_order(shipped_order("ORD1", "jo@example.com", 11000)));
    let outbox = Arc::new(Outbox::failing_once(500));
    let tracker = tracker(commerce, store.clone(), outbox.clone());

    let err = tracker.handle(&order_created("ORD1")).await.unwrap_err();
    assert!(matches!(err, StorefrontError::EmailDelivery { status: 500 }));
    assert!(!store.find("ORD1").await.unwrap().unwrap().is_sent(Notification::OrderConfirmed));

    let retry = tracker.handle(&order_created("ORD1")).await.unwrap();
    assert_eq!(retry, WebhookOutcome::EmailSent(Notification::OrderConfirmed));
    assert_eq!(outbox.sent_count(), 1);
}

#[tokio::test]
async fn concurrent_deliveries_send_once() {
    let store = recorded_store("ORD1").await;
    let commerce = Arc::new(FakeCommerce::with_order(shipped_order("ORD1", "jo@example.com", 11000)));
    let outbox = Arc::new(Outbox::default());
    let tracker = Arc::new(tracker(commerce, store, outbox.clone()));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.handle(&order_created("ORD1")).await.unwrap() })
        })
        .collect();
    let mut sent = 0;
    for handle in handles {
        if handle.await.unwrap() == WebhookOutcome::EmailSent(Notification::OrderConfirmed) {
            sent += 1;
        }
    }
    assert_eq!(sent, 1);
    assert_eq!(outbox.sent_count(), 1);
}

#[tokio::test]
async fn unknown_order_is_not_found_and_sends_nothing() {
    let store = Arc::new(MemoryOrderStore::new());
    let commerce = Arc::new(FakeCommerce::with_order(shipped_order("ORD1", "jo@example.com", 11000)));
    let outbox = Arc::new(Outbox::default());
    let tracker = tracker(commerce, store.clone(), outbox.clone());

    let err = tracker.handle(&order_created("ORD1")).await.unwrap_err();
    assert_eq!(err.to_string(), "Order not found");
    assert_eq!(outbox.sent_count(), 0);
    assert!(store.find("ORD1").await.unwrap().is_none());
}

#[tokio::test]
async fn order_missing_on_platform_is_reported_separately() {
    let store = recorded_store("ORD1").await;
    let outbox = Arc::new(Outbox::default());
    let tracker = tracker(Arc::new(FakeCommerce::default()), store.clone(), outbox.clone());

    let err = tracker.handle(&order_created("ORD1")).await.unwrap_err();
    assert_eq!(err.to_string(), "Remote order not found");
    assert_eq!(outbox.sent_count(), 0);
    assert!(!store.find("ORD1").await.unwrap().unwrap().is_sent(Notification::OrderConfirmed));
}

#[tokio::test]
async fn in_progress_and_unrecognised_transitions_do_nothing() {
    let store = recorded_store("ORD1").await;
    let commerce = Arc::new(FakeCommerce::with_order(shipped_order("ORD1", "jo@example.com", 11000)));
    let outbox = Arc::new(Outbox::default());
    let tracker = tracker(commerce, store.clone(), outbox.clone());

    let in_progress = tracker
        .handle(&fulfillment_updated("ORD1", "PROPOSED", "RESERVED"))
        .await
        .unwrap();
    assert_eq!(in_progress, WebhookOutcome::InProgress);
    assert_eq!(in_progress.message(), "No need to email for in-progress orders");

    let cancelled = tracker
        .handle(&fulfillment_updated("ORD1", "RESERVED", "CANCELLED"))
        .await
        .unwrap();
    assert_eq!(cancelled, WebhookOutcome::Ignored);

    assert_eq!(outbox.sent_count(), 0);
    let order = store.find("ORD1").await.unwrap().unwrap();
    assert!(!order.is_sent(Notification::OrderConfirmed));
    assert!(!order.is_sent(Notification::OrderShipped));
}
