//! Persistent auth session store.
//!
//! Stores an opaque session token; the password is never written to the
//! backend.

use crate::error::StorageError;
use crate::storage::StorageBackend;
use crate::AUTH_STORAGE_KEY;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

/// An authenticated admin session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub username: String,
    /// Opaque token minted at login; replaces the persisted password.
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

/// Persisted auth snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub is_authenticated: bool,
    pub session: Option<AuthSession>,
}

/// Session store for the admin area.
pub struct AuthStore {
    storage: Arc<dyn StorageBackend>,
    state: RwLock<AuthState>,
}

impl AuthStore {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            state: RwLock::new(AuthState::default()),
        }
    }

    /// Restores the session from storage; unreadable snapshots fall back
    /// to the logged-out state.
    pub async fn load(storage: Arc<dyn StorageBackend>) -> Self {
        let state = match storage.get(AUTH_STORAGE_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(%err, "discarding unparseable auth snapshot");
                AuthState::default()
            }),
            Ok(None) => AuthState::default(),
            Err(err) => {
                warn!(%err, "auth snapshot unavailable, starting logged out");
                AuthState::default()
            }
        };

        Self {
            storage,
            state: RwLock::new(state),
        }
    }

    /// Marks the session authenticated and persists it. The password is
    /// used only at the call boundary and is not stored.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), StorageError> {
        // The admin API re-validates credentials on every request; locally
        // we only refuse obviously empty input.
        if username.trim().is_empty() || password.is_empty() {
            return Ok(());
        }

        let session = AuthSession {
            username: username.trim().to_string(),
            token: Uuid::new_v4().simple().to_string(),
            issued_at: Utc::now(),
        };
        self.apply(AuthState {
            is_authenticated: true,
            session: Some(session),
        })
        .await
    }

    /// Clears the session and persists the logged-out state.
    pub async fn logout(&self) -> Result<(), StorageError> {
        self.apply(AuthState::default()).await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated
    }

    pub async fn session(&self) -> Option<AuthSession> {
        self.state.read().await.session.clone()
    }

    async fn apply(&self, next: AuthState) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&next)?;
        *self.state.write().await = next;
        self.storage.put(AUTH_STORAGE_KEY, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn login_persists_token_but_not_password() {
        let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
        let store = AuthStore::new(storage.clone());

        store.login("admin", "hunter2").await.unwrap();
        assert!(store.is_authenticated().await);

        let raw = storage.get(AUTH_STORAGE_KEY).await.unwrap().unwrap();
        assert!(raw.contains("admin"));
        assert!(!raw.contains("hunter2"));

        // The persisted session round-trips.
        let reloaded = AuthStore::load(storage).await;
        assert!(reloaded.is_authenticated().await);
        assert_eq!(reloaded.session().await, store.session().await);
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let store = AuthStore::new(Arc::new(MemoryStorage::new()));
        store.login("admin", "pw").await.unwrap();
        store.logout().await.unwrap();

        assert!(!store.is_authenticated().await);
        assert!(store.session().await.is_none());
    }

    #[tokio::test]
    async fn empty_credentials_do_not_authenticate() {
        let store = AuthStore::new(Arc::new(MemoryStorage::new()));
        store.login("  ", "pw").await.unwrap();
        assert!(!store.is_authenticated().await);
    }
}
