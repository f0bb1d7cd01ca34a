//! Persistent Cart Store
//!
//! Single source of truth for the shopping cart. The store is an explicit,
//! dependency-injected container: the host constructs one per application
//! lifetime and hands references to whatever needs it -- there is no
//! ambient global.
//!
//! Every successful mutation is a whole read-modify-write step under one
//! lock (so two rapid mutations cannot lose updates to each other) and is
//! followed by a durable write of the full snapshot, letting a reload
//! reconstruct the identical cart. Writes from other processes over the
//! same backend are last-writer-wins; that is accepted for a single-user
//! cart.

use super::helpers::{merge_item, recompute_totals};
use super::models::{CartItem, CartState};
use crate::error::StorageError;
use crate::storage::StorageBackend;
use crate::CART_STORAGE_KEY;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// The cart store. Cheap to share via `Arc`.
pub struct CartStore {
    storage: Arc<dyn StorageBackend>,
    state: RwLock<CartState>,
}

impl CartStore {
    /// Creates an empty store over the given backend without touching it.
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            state: RwLock::new(CartState::default()),
        }
    }

    /// Creates a store restored from the backend. A missing or unreadable
    /// snapshot yields the empty cart; restore never fails the caller.
    pub async fn load(storage: Arc<dyn StorageBackend>) -> Self {
        let state = match storage.get(CART_STORAGE_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<CartState>(&raw) {
                Ok(mut snapshot) => {
                    // Trust the item list, not the stored aggregates, and
                    // drop any entry that breaks the quantity invariant.
                    snapshot.items.retain(|i| i.quantity >= 1);
                    recompute_totals(&mut snapshot);
                    snapshot
                }
                Err(err) => {
                    warn!(%err, "discarding unparseable cart snapshot");
                    CartState::default()
                }
            },
            Ok(None) => CartState::default(),
            Err(err) => {
                warn!(%err, "cart snapshot unavailable, starting empty");
                CartState::default()
            }
        };

        Self {
            storage,
            state: RwLock::new(state),
        }
    }

    /// Returns a clone of the current state for readers.
    pub async fn snapshot(&self) -> CartState {
        self.state.read().await.clone()
    }

    /// Adds an item, merging by `id` (quantities aggregate; display fields
    /// of an existing entry are left untouched). A non-positive quantity
    /// is rejected as a no-op, never stored. Always succeeds apart from
    /// the durable write.
    pub async fn add_item(&self, item: CartItem) -> Result<(), StorageError> {
        if item.quantity < 1 {
            debug!(id = %item.id, quantity = item.quantity, "rejected add with quantity below 1");
            return Ok(());
        }
        self.mutate(|state| merge_item(&mut state.items, item)).await
    }

    /// Removes the entry with matching `id`; absent ids are a no-op.
    pub async fn remove_item(&self, id: &str) -> Result<(), StorageError> {
        self.mutate(|state| state.items.retain(|i| i.id != id)).await
    }

    /// Sets the quantity of the matching entry.
    ///
    /// The store enforces `quantity >= 1` itself: a zero quantity is
    /// rejected as a no-op rather than stored, so no call site can break
    /// the invariant. Absent ids are a no-op.
    pub async fn update_quantity(&self, id: &str, quantity: u32) -> Result<(), StorageError> {
        if quantity < 1 {
            debug!(id, quantity, "rejected quantity below 1");
            return Ok(());
        }
        self.mutate(|state| {
            if let Some(item) = state.items.iter_mut().find(|i| i.id == id) {
                item.quantity = quantity;
            }
        })
        .await
    }

    /// Increments the quantity of the matching entry by one.
    pub async fn increment(&self, id: &str) -> Result<(), StorageError> {
        self.mutate(|state| {
            if let Some(item) = state.items.iter_mut().find(|i| i.id == id) {
                item.quantity += 1;
            }
        })
        .await
    }

    /// Decrements the quantity of the matching entry by one, stopping at 1.
    pub async fn decrement(&self, id: &str) -> Result<(), StorageError> {
        self.mutate(|state| {
            if let Some(item) = state.items.iter_mut().find(|i| i.id == id) {
                if item.quantity > 1 {
                    item.quantity -= 1;
                }
            }
        })
        .await
    }

    /// Resets to the empty cart, both item list and aggregates.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.mutate(|state| state.items.clear()).await
    }

    /// Applies `op` under the write lock, recomputes the aggregates, then
    /// persists the full snapshot. The aggregate invariant holds on every
    /// exit path.
    ///
    /// The lock is held across the durable write so overlapping mutations
    /// cannot land their puts out of order: the last persisted snapshot is
    /// always the latest in-memory state.
    async fn mutate<F>(&self, op: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut CartState),
    {
        let mut state = self.state.write().await;
        op(&mut state);
        recompute_totals(&mut state);

        let raw = serde_json::to_string(&*state)?;
        self.storage.put(CART_STORAGE_KEY, &raw).await
    }
}
