//! Checkout Coordinator
//!
//! Drives one checkout attempt through its state machine:
//!
//! ```text
//! Idle -> Submitting -> Redirecting   (terminal, leaves app)
//! Idle -> Idle                        (validation failure, with message)
//! Submitting -> Failed -> Idle        (service failure, retry by resubmit)
//! ```
//!
//! Validation is a synchronous step inside `submit`, before `Submitting`
//! is entered; a failure reports its message without an observable phase
//! of its own. `Redirecting` is the cooperative suspension point: the coordinator
//! returns the payment URL and the host navigates the whole browsing
//! context there, so no code runs after it in this attempt.

use super::models::{write_pending, ContactForm, PendingOrderSnapshot};
use crate::cart::CartStore;
use crate::error::{CheckoutError, GatewayError};
use crate::gateway::{CreateOrderRequest, OrderGateway};
use crate::storage::StorageBackend;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Placeholder until the checkout form grows a phone field.
const PHONE_PLACEHOLDER: &str = "9999999999";

const GENERIC_FAILURE: &str = "Payment failed. Please try again.";

/// Observable phase of the current checkout attempt.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CheckoutPhase {
    #[default]
    Idle,
    Submitting,
    /// Order created; the host must navigate to this URL.
    Redirecting { payment_url: String },
    /// Submission failed; the user may resubmit without losing the form.
    Failed { message: String },
}

/// Coordinates cart + contact form into an external payment redirect.
pub struct CheckoutCoordinator {
    cart: Arc<CartStore>,
    gateway: Arc<dyn OrderGateway>,
    storage: Arc<dyn StorageBackend>,
    phase: RwLock<CheckoutPhase>,
}

impl CheckoutCoordinator {
    pub fn new(
        cart: Arc<CartStore>,
        gateway: Arc<dyn OrderGateway>,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            cart,
            gateway,
            storage,
            phase: RwLock::new(CheckoutPhase::Idle),
        }
    }

    /// Current phase, for the host to render (submit button state, error
    /// banner).
    pub async fn phase(&self) -> CheckoutPhase {
        self.phase.read().await.clone()
    }

    pub async fn is_submitting(&self) -> bool {
        matches!(*self.phase.read().await, CheckoutPhase::Submitting)
    }

    /// Runs one checkout attempt and returns the payment URL to navigate
    /// to.
    ///
    /// Validation failures never touch the network and leave the phase at
    /// `Idle`; submission failures land in `Failed` with a user-facing
    /// message and the cart untouched, ready for resubmission.
    pub async fn submit(&self, form: &ContactForm) -> Result<String, CheckoutError> {
        if let Err(message) = validate(form) {
            *self.phase.write().await = CheckoutPhase::Idle;
            return Err(CheckoutError::Validation(message));
        }

        let cart = self.cart.snapshot().await;
        if cart.is_empty() {
            *self.phase.write().await = CheckoutPhase::Idle;
            return Err(CheckoutError::Validation("Your cart is empty".to_string()));
        }

        *self.phase.write().await = CheckoutPhase::Submitting;

        let request = CreateOrderRequest {
            customer_name: form.name.trim().to_string(),
            customer_email: form.email.trim().to_string(),
            customer_phone: PHONE_PLACEHOLDER.to_string(),
            order_items: cart.items.clone(),
            total_amount: cart.total_price,
        };

        let created = match self.gateway.create_order(request).await {
            Ok(created) => created,
            Err(err) => return Err(self.fail(err).await),
        };

        let snapshot = PendingOrderSnapshot {
            order_id: created.order_id.clone(),
            merchant_transaction_id: created.merchant_transaction_id.clone(),
            customer_name: form.name.trim().to_string(),
            customer_email: form.email.trim().to_string(),
            total_amount: cart.total_price,
            items: cart.items,
            created_at: Some(Utc::now()),
        };
        if let Err(err) = write_pending(self.storage.as_ref(), &snapshot).await {
            // Without the snapshot the failure page loses its context;
            // stop here rather than redirect blind.
            warn!(%err, "could not write pending-order snapshot");
            let message = GENERIC_FAILURE.to_string();
            *self.phase.write().await = CheckoutPhase::Failed {
                message: message.clone(),
            };
            return Err(CheckoutError::Submission(message));
        }

        info!(
            order_id = %created.order_id,
            transaction_id = %created.merchant_transaction_id,
            "order created, handing off to payment page"
        );

        *self.phase.write().await = CheckoutPhase::Redirecting {
            payment_url: created.payment_url.clone(),
        };
        Ok(created.payment_url)
    }

    /// Resets a `Failed` phase back to `Idle` (the user dismissed the
    /// message or is editing the form again).
    pub async fn reset(&self) {
        let mut phase = self.phase.write().await;
        if matches!(*phase, CheckoutPhase::Failed { .. }) {
            *phase = CheckoutPhase::Idle;
        }
    }

    async fn fail(&self, err: GatewayError) -> CheckoutError {
        let message = match err {
            // Prefer the service-provided message.
            GatewayError::Rejected { message } => message,
            other => {
                warn!(%other, "order creation failed");
                GENERIC_FAILURE.to_string()
            }
        };
        *self.phase.write().await = CheckoutPhase::Failed {
            message: message.clone(),
        };
        CheckoutError::Submission(message)
    }
}

/// Minimal syntactic validation, deliberately permissive: trimmed name
/// non-empty, email non-empty and containing `@`.
fn validate(form: &ContactForm) -> Result<(), String> {
    if form.name.trim().is_empty() || form.email.trim().is_empty() {
        return Err("Please fill in all fields".to_string());
    }
    if !form.email.contains('@') {
        return Err("Please enter a valid email address".to_string());
    }
    Ok(())
}
