//! Shopping Cart Business Logic Helpers
//!
//! Pure functions over item lists: merging and aggregate recomputation.
//! Keeping them separate from the store makes them trivially testable.

use super::models::{CartItem, CartState};

/// Merges `incoming` into `items`, aggregating the quantity when an item
/// with the same `id` already exists and appending otherwise.
///
/// # Behaviour
///
/// * Existing entries keep their `name`, `price` and `image` untouched --
///   first write wins for display fields; only `quantity` is increased.
/// * New entries are appended, preserving insertion order.
///
/// This function mutates `items` in-place.
pub fn merge_item(items: &mut Vec<CartItem>, incoming: CartItem) {
    if let Some(existing) = items.iter_mut().find(|i| i.id == incoming.id) {
        // Aggregate quantities.
        existing.quantity += incoming.quantity;
    } else {
        // Insert a brand-new item.
        items.push(incoming);
    }
}

/// Recomputes both aggregates from scratch over the current item list.
///
/// Always a full sum, never an incremental adjustment: rapid interleaved
/// mutations and floating-point accumulation must not let the aggregates
/// drift from the live item list.
pub fn recompute_totals(state: &mut CartState) {
    state.total_items = state.items.iter().map(|i| u64::from(i.quantity)).sum();
    state.total_price = state
        .items
        .iter()
        .map(|i| i.price * f64::from(i.quantity))
        .sum();
}
