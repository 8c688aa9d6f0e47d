//! Cheek Co. Storefront
//!
//! Backend for a small storefront whose catalog, orders and payments live on a
//! hosted commerce platform.
//!
//! ## Features
//! - Catalog paging, indexing and product/category views
//! - Hidden catalog entries (names starting with `_`)
//! - Checkout: customer upsert, order creation, payment
//! - Order lifecycle webhooks with one-shot notification emails
//! - Contact form relay

pub mod api;
pub mod config;
pub mod domain;
pub mod remote;
pub mod services;
pub mod store;

use reqwest::StatusCode;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Remote service error (status {status}): {message}")]
    Remote { status: StatusCode, message: String },

    #[error("Remote transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Failed to send email (status {status})")]
    EmailDelivery { status: u16 },

    #[error("Storage error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid webhook signature: {0}")]
    InvalidSignature(&'static str),

    #[error("Invalid request: {0}")]
    Validation(String),
}

impl StorefrontError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Errors raised by the commerce platform or the transport in front of it.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. } | Self::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
