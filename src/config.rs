//! Storefront configuration, read from the environment.

use anyhow::{anyhow, Context, Result};
use std::time::Duration;

use crate::domain::catalog::projection::DEFAULT_FEATURED_ATTRIBUTE;
use crate::domain::catalog::ProjectionOptions;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// development | staging | production
    pub environment: String,
    pub square: SquareConfig,
    pub email: EmailConfig,
    pub store: StoreConfig,
    /// Zero disables the catalog cache.
    pub catalog_cache_ttl: Duration,
    /// Applied to every outbound HTTP request.
    pub http_timeout: Duration,
    pub nats_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SquareConfig {
    pub access_token: String,
    pub base_url: String,
    pub api_version: String,
    pub location_id: String,
    pub webhook_signature_key: String,
    /// Notification URL registered for webhooks; part of the signed payload.
    pub webhook_url: String,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_key: String,
    pub base_url: String,
    pub from: String,
    pub order_confirmed_template: String,
    pub order_shipped_template: String,
    pub contact_template: String,
    pub contact_inbox: String,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub currency: String,
    pub carrier: String,
    pub featured_attribute: String,
}

impl Config {
    pub fn projection_options(&self) -> ProjectionOptions {
        ProjectionOptions {
            featured_attribute: self.store.featured_attribute.clone(),
            location_id: self.square.location_id.clone(),
        }
    }

    /// Secrets must be present outside development.
    fn require_secret(name: &str, environment: &str) -> Result<String> {
        let value = match std::env::var(name) {
            Ok(v) => v,
            Err(_) if environment == "development" => format!("dev-{name}-not-for-production"),
            Err(_) => return Err(anyhow!("{name} must be set in {environment} environment")),
        };
        if value.is_empty() && environment != "development" {
            return Err(anyhow!("{name} must not be empty in {environment} environment"));
        }
        Ok(value)
    }

    fn var_or(name: &str, default: &str) -> String {
        std::env::var(name).ok().filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
    }

    pub fn from_env() -> Result<Self> {
        let environment = Self::var_or("ENVIRONMENT", "development");

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: Self::parse_or("PORT", 8083),
            square: SquareConfig {
                access_token: Self::require_secret("SQUARE_ACCESS_TOKEN", &environment)?,
                base_url: Self::var_or("SQUARE_API_BASE_URL", "https://connect.squareup.com"),
                api_version: Self::var_or("SQUARE_API_VERSION", "2022-05-12"),
                location_id: Self::var_or("SQUARE_LOCATION_ID", ""),
                webhook_signature_key: Self::require_secret("SQUARE_WEBHOOK_SIGNATURE_KEY", &environment)?,
                webhook_url: Self::var_or("SQUARE_WEBHOOK_URL", "http://localhost:8083/api/v1/webhooks/square"),
            },
            email: EmailConfig {
                api_key: Self::require_secret("SENDGRID_API_KEY", &environment)?,
                base_url: Self::var_or("SENDGRID_API_BASE_URL", "https://api.sendgrid.com"),
                from: Self::var_or("EMAIL_FROM", "contact@thecheekco.com"),
                order_confirmed_template: Self::var_or("ORDER_CONFIRMED_TEMPLATE_ID", ""),
                order_shipped_template: Self::var_or("ORDER_SHIPPED_TEMPLATE_ID", ""),
                contact_template: Self::var_or("CONTACT_TEMPLATE_ID", ""),
                contact_inbox: Self::var_or("CONTACT_INBOX", "contact@thecheekco.com"),
            },
            store: StoreConfig {
                currency: Self::var_or("STORE_CURRENCY", "AUD"),
                carrier: Self::var_or("SHIPPING_CARRIER", "Australia Post"),
                featured_attribute: Self::var_or("FEATURED_ATTRIBUTE", DEFAULT_FEATURED_ATTRIBUTE),
            },
            catalog_cache_ttl: Duration::from_secs(Self::parse_or("CATALOG_CACHE_TTL_SECS", 0)),
            http_timeout: Duration::from_secs(Self::parse_or("HTTP_TIMEOUT_SECS", 10)),
            nats_url: std::env::var("NATS_URL").ok().filter(|s| !s.is_empty()),
            environment,
        })
    }
}
