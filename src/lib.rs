//! Storefront Core Library
//!
//! This library provides the core state management for a digital-goods
//! storefront: a persistent shopping cart, a minimal auth session, the
//! checkout handoff to an externally hosted payment page, and the order
//! status resolution that runs when the payer redirects back.
//!
//! Rendering, routing and the payment gateway's internals are the host
//! application's concern; everything here is UI-independent.

// Domain modules
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;

// Infrastructure
pub mod error;
pub mod gateway;
pub mod storage;

pub use crate::auth::AuthStore;
pub use crate::cart::{CartItem, CartState, CartStore};
pub use crate::checkout::{CheckoutCoordinator, CheckoutPhase, ContactForm};
pub use crate::error::{CheckoutError, GatewayError, StorageError};
pub use crate::gateway::{GatewayConfig, HttpOrderGateway, OrderGateway, OrderStatus};
pub use crate::orders::{OrderStatusResolver, Resolution, ReturnParams};
pub use crate::storage::{FileStorage, MemoryStorage, StorageBackend};

// =============================================================================
// Constants
// =============================================================================

/// Storage key holding the cart snapshot
pub const CART_STORAGE_KEY: &str = "cart-storage";
/// Storage key holding the auth session snapshot
pub const AUTH_STORAGE_KEY: &str = "auth-storage";
/// Single-slot storage key holding the pending-order snapshot written
/// just before the redirect to the external payer
pub const PENDING_ORDER_KEY: &str = "pendingOrder";
