//! Order Service Gateway
//!
//! The Order Service is an external collaborator reached over HTTP: it
//! creates orders against the payment provider, resolves transactions to
//! order state and issues short-lived signed download links. This module
//! defines the client contract as a trait so the coordinator and resolver
//! can be driven against a fake in tests, plus the real `reqwest`-backed
//! implementation.

pub mod http;
pub mod models;

pub use http::{GatewayConfig, HttpOrderGateway};
pub use models::{
    CreateOrderRequest, CreatedOrder, OrderDetails, OrderItem, OrderStatus, Product,
};

use crate::error::GatewayError;
use async_trait::async_trait;

/// Client contract for the consumed Order Service endpoints.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// `POST /api/{provider}/create-order` -- registers a pending order and
    /// returns the externally hosted payment page to redirect to.
    async fn create_order(&self, request: CreateOrderRequest)
        -> Result<CreatedOrder, GatewayError>;

    /// `GET /api/orders/{transactionId}` -- authoritative order state.
    async fn fetch_order(&self, transaction_id: &str) -> Result<OrderDetails, GatewayError>;

    /// `GET /api/products/{id}` -- product metadata, used only to enrich
    /// the display of purchased items.
    async fn fetch_product(&self, id: &str) -> Result<Product, GatewayError>;

    /// `GET /api/signed-download/{productId}?transactionId=...` -- a
    /// short-lived signed URL for one purchased item.
    async fn signed_download(
        &self,
        product_id: &str,
        transaction_id: &str,
    ) -> Result<String, GatewayError>;
}
