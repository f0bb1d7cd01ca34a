//! Checkout Domain Module
//!
//! Turns a cart plus contact details into an external payment redirect,
//! and protects the order context across that redirect with a single-slot
//! pending-order snapshot.

pub mod coordinator;
pub mod models;

pub use coordinator::{CheckoutCoordinator, CheckoutPhase};
pub use models::{ContactForm, PendingOrderSnapshot};
