//! Order event publishing over NATS.
//!
//! Publishing happens after the side effect it reports has already succeeded,
//! so a publish failure is logged and never surfaced to the caller.

use crate::domain::events::OrderEvent;

#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self {
        Self { nats }
    }

    pub fn disabled() -> Self {
        Self { nats: None }
    }

    pub async fn publish(&self, event: &OrderEvent) {
        let Some(nats) = &self.nats else {
            tracing::debug!(order_id = event.order_id(), "NATS not configured, event dropped");
            return;
        };
        let payload = match serde_json::to_vec(event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode order event");
                return;
            }
        };
        let subject = event.subject();
        if let Err(e) = nats.publish(subject.clone(), payload.into()).await {
            tracing::warn!(error = %e, subject = %subject, order_id = event.order_id(), "Failed to publish order event");
        } else {
            tracing::debug!(subject = %subject, order_id = event.order_id(), "Order event published");
        }
    }
}
