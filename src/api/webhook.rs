//! Order lifecycle webhook.
//!
//! POST /api/v1/webhooks/square takes the raw body: the signature covers the
//! registered notification URL followed by the exact bytes received.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;

use super::AppState;
use crate::domain::lifecycle::WebhookEvent;
use crate::StorefrontError;

pub const SIGNATURE_HEADER: &str = "x-square-hmacsha256-signature";

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct WebhookVerifier {
    signature_key: String,
    notification_url: String,
}

impl WebhookVerifier {
    pub fn new(signature_key: impl Into<String>, notification_url: impl Into<String>) -> Self {
        Self { signature_key: signature_key.into(), notification_url: notification_url.into() }
    }

    fn mac(&self, body: &[u8]) -> Result<HmacSha256, &'static str> {
        let mut mac =
            HmacSha256::new_from_slice(self.signature_key.as_bytes()).map_err(|_| "HMAC key error")?;
        mac.update(self.notification_url.as_bytes());
        mac.update(body);
        Ok(mac)
    }

    /// base64(HMAC-SHA256(key, url || body)).
    pub fn sign(&self, body: &[u8]) -> Result<String, &'static str> {
        Ok(STANDARD.encode(self.mac(body)?.finalize().into_bytes()))
    }

    pub fn verify(&self, body: &[u8], signature: &str) -> Result<(), &'static str> {
        let expected = STANDARD.decode(signature.trim()).map_err(|_| "Invalid signature encoding")?;
        self.mac(body)?
            .verify_slice(&expected)
            .map_err(|_| "Webhook signature mismatch")
    }
}

pub async fn square_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, StorefrontError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing webhook signature header");
            StorefrontError::InvalidSignature("missing signature")
        })?;
    state.webhook.verify(&body, signature).map_err(|reason| {
        tracing::warn!(error = reason, "Webhook signature verification failed");
        StorefrontError::InvalidSignature(reason)
    })?;

    let event: WebhookEvent = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Failed to parse webhook JSON");
        StorefrontError::Validation(format!("malformed webhook payload: {e}"))
    })?;
    tracing::info!(
        event_type = %event.event_type,
        event_id = event.event_id.as_deref().unwrap_or(""),
        order_id = event.order_id(),
        "Received order webhook"
    );

    let outcome = state.lifecycle.handle(&event).await?;
    Ok(Json(json!({ "message": outcome.message() })))
}
