//! Shopping Cart Domain Module
//!
//! This module contains all shopping cart business logic, including:
//! - Domain models (CartItem, CartState)
//! - Merge and aggregate helpers
//! - The persistent cart store

pub mod helpers;
pub mod models;
pub mod state;

// Re-export commonly used types for convenience
pub use models::{CartItem, CartState};
pub use state::CartStore;
