//! Checkout Models and the Pending-Order Slot
//!
//! The pending-order snapshot is written just before the browsing context
//! navigates to the external payer, so the failure/landing views still
//! have order context if the round trip does not carry it. It lives in a
//! single fixed slot: a new checkout overwrites any prior snapshot.

use crate::cart::CartItem;
use crate::error::StorageError;
use crate::storage::StorageBackend;
use crate::PENDING_ORDER_KEY;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How long a pending snapshot stays readable before it is treated as
/// stale and deleted on the next read.
pub const PENDING_ORDER_TTL_SECS: i64 = 60 * 60;

/// Contact details from the checkout form.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
}

/// Frozen copy of the order context at submission time. Does not track
/// cart mutations made after the redirect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrderSnapshot {
    pub order_id: String,
    pub merchant_transaction_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub total_amount: f64,
    pub items: Vec<CartItem>,
    /// Absent on snapshots written before expiry existed; those are
    /// treated as stale.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl PendingOrderSnapshot {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.created_at {
            Some(created_at) => now - created_at < Duration::seconds(PENDING_ORDER_TTL_SECS),
            None => false,
        }
    }
}

/// Writes the snapshot into the single slot, overwriting any prior one.
pub async fn write_pending(
    storage: &dyn StorageBackend,
    snapshot: &PendingOrderSnapshot,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(snapshot)?;
    storage.put(PENDING_ORDER_KEY, &raw).await
}

/// Reads the slot, returning `None` for a missing, unreadable or stale
/// snapshot. Stale and unreadable snapshots are deleted on the way out.
pub async fn read_pending(storage: &dyn StorageBackend) -> Option<PendingOrderSnapshot> {
    let raw = match storage.get(PENDING_ORDER_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!(%err, "pending-order slot unreadable");
            return None;
        }
    };

    match serde_json::from_str::<PendingOrderSnapshot>(&raw) {
        Ok(snapshot) if snapshot.is_fresh(Utc::now()) => Some(snapshot),
        Ok(_) => {
            debug!("dropping stale pending-order snapshot");
            let _ = storage.remove(PENDING_ORDER_KEY).await;
            None
        }
        Err(err) => {
            warn!(%err, "dropping unparseable pending-order snapshot");
            let _ = storage.remove(PENDING_ORDER_KEY).await;
            None
        }
    }
}

/// Empties the slot. Called on both paid and failed resolutions so stale
/// snapshots do not linger.
pub async fn clear_pending(storage: &dyn StorageBackend) -> Result<(), StorageError> {
    storage.remove(PENDING_ORDER_KEY).await
}
