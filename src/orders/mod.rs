//! Order Status Resolution Module
//!
//! Handles the return leg of a checkout: the external payer redirects the
//! browser back with a transaction id (and possibly an error code) in the
//! URL, and this module turns that into one of a small set of terminal
//! views, including per-item download-link issuance on the paid path.

pub mod models;
pub mod resolver;

pub use models::{FailureReason, PurchasedItem, Resolution, ReturnParams};
pub use resolver::OrderStatusResolver;
