//! Transactional email.
//!
//! Templates live with the email provider; the storefront only supplies the
//! template id, recipient and the dynamic data. Delivery is accepted only on
//! `202 Accepted`; any other status is a failure.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

use crate::config::EmailConfig;
use crate::Result;

pub const ACCEPTED: u16 = 202;

#[derive(Clone, Debug, Serialize)]
pub struct TemplateEmail {
    pub template_id: String,
    pub to: String,
    pub subject: String,
    pub data: serde_json::Value,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeliveryStatus(pub u16);

impl DeliveryStatus {
    pub fn is_accepted(&self) -> bool {
        self.0 == ACCEPTED
    }
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Transport failures are errors; provider rejections come back as a status.
    async fn send(&self, email: &TemplateEmail) -> Result<DeliveryStatus>;
}

pub struct SendGridClient {
    client: Client,
    base_url: String,
    api_key: String,
    from: String,
}

impl SendGridClient {
    pub fn new(config: &EmailConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl EmailSender for SendGridClient {
    async fn send(&self, email: &TemplateEmail) -> Result<DeliveryStatus> {
        let body = json!({
            "from": { "email": self.from },
            "subject": email.subject,
            "template_id": email.template_id,
            "personalizations": [{
                "to": [{ "email": email.to }],
                "dynamic_template_data": email.data,
            }],
        });
        let response = self
            .client
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = DeliveryStatus(response.status().as_u16());
        if !status.is_accepted() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.0, to = %email.to, detail = %detail, "Email provider rejected message");
        }
        Ok(status)
    }
}
