//! Aggregates module
pub mod order;

pub use order::{LineItem, Notification, NotificationGuard, Order, OrderError};
