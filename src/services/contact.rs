//! Contact form relay to the store inbox.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::config::EmailConfig;
use crate::remote::{EmailSender, TemplateEmail};
use crate::{Result, StorefrontError};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub company: Option<String>,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
    /// Present for special requests (custom orders, events).
    pub request_type: Option<String>,
    pub date_required: Option<NaiveDate>,
}

impl ContactRequest {
    pub fn is_special_request(&self) -> bool {
        self.request_type.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    fn subject(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        if self.is_special_request() {
            format!("{name} has sent you a special request!")
        } else {
            format!("{name} has sent you a message")
        }
    }
}

pub struct ContactService {
    email: Arc<dyn EmailSender>,
    template_id: String,
    inbox: String,
}

impl ContactService {
    pub fn new(email: Arc<dyn EmailSender>, config: &EmailConfig) -> Self {
        Self {
            email,
            template_id: config.contact_template.clone(),
            inbox: config.contact_inbox.clone(),
        }
    }

    pub async fn submit(&self, request: ContactRequest) -> Result<()> {
        request
            .validate()
            .map_err(|e| StorefrontError::Validation(e.to_string()))?;

        let message = TemplateEmail {
            template_id: self.template_id.clone(),
            to: self.inbox.clone(),
            subject: request.subject(),
            data: json!({
                "special": request.is_special_request(),
                "firstName": request.first_name,
                "lastName": request.last_name,
                "company": request.company,
                "email": request.email,
                "phoneNumber": request.phone,
                "message": request.message,
                "type": request.request_type,
                "dateRequired": request.date_required.map(|d| d.to_string()),
            }),
        };

        let status = self.email.send(&message).await?;
        if !status.is_accepted() {
            tracing::warn!(status = status.0, "Contact message rejected by email provider");
            return Err(StorefrontError::EmailDelivery { status: status.0 });
        }
        tracing::info!(special = request.is_special_request(), "Contact message relayed");
        Ok(())
    }
}
