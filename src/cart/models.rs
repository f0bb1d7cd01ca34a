//! Shopping Cart Domain Models
//!
//! Data structures for the cart business domain, including the persisted
//! snapshot shape. Wire/storage field names are camelCase, matching the
//! snapshots earlier releases of the storefront wrote.

use serde::{Deserialize, Serialize};

/// Returns the default quantity (1) for cart items
fn default_quantity() -> u32 {
    1
}

/// A line item in the shopping cart.
///
/// `name`, `price` and `image` are captured at add-time and never re-synced
/// with the catalog; the `id` is the stable product identifier and the
/// unique key within the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Stable product identifier
    pub id: String,

    /// Display name of the product
    pub name: String,

    /// Unit price captured at add-time
    pub price: f64,

    /// Quantity of this item (defaults to 1)
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Optional image URL, cosmetic only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// The full cart: ordered line items plus derived aggregates.
///
/// `total_items` and `total_price` are derived values. They are recomputed
/// from the item list on every mutation and never independently mutated,
/// so they cannot drift from the live sums.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    pub items: Vec<CartItem>,
    pub total_items: u64,
    pub total_price: f64,
}

impl CartState {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
