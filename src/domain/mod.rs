//! Pure storefront model: no I/O lives under this module.

pub mod aggregates;
pub mod catalog;
pub mod events;
pub mod lifecycle;
pub mod value_objects;
