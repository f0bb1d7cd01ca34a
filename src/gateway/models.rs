//! Order Service Wire Models
//!
//! Request and response shapes of the consumed endpoints. The create-order
//! surface speaks camelCase; the orders/products surface returns
//! snake_case fields. Both are kept exactly as the service defines them.

use crate::cart::CartItem;
use serde::{Deserialize, Serialize};

/// Body of the create-order call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub order_items: Vec<CartItem>,
    pub total_amount: f64,
}

/// Raw create-order response; `success: false` carries an optional
/// service-provided message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateOrderResponse {
    #[serde(default)]
    pub success: bool,
    pub order_id: Option<String>,
    pub merchant_transaction_id: Option<String>,
    pub payment_url: Option<String>,
    pub message: Option<String>,
}

/// A successfully created pending order.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedOrder {
    pub order_id: String,
    pub merchant_transaction_id: String,
    /// Externally hosted payment page the browsing context must navigate to.
    pub payment_url: String,
}

/// Canonical order status.
///
/// Every resolution view branches on this one enum; none infers status
/// from which page was reached. Values the service may add later land on
/// `Unknown` and are treated as still in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Delivered,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Payment has reached a good terminal state.
    pub fn is_paid(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Delivered)
    }
}

/// One purchased line item as the Order Service reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

/// Authoritative order state fetched by transaction id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDetails {
    pub id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub total_amount: f64,
    #[serde(default)]
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
}

/// Product metadata used to enrich the purchased-items view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub local_file_name: Option<String>,
}

/// Raw signed-download response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignedDownloadResponse {
    pub signed_url: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_wire_names() {
        for (raw, expected) in [
            ("pending", OrderStatus::Pending),
            ("processing", OrderStatus::Processing),
            ("completed", OrderStatus::Completed),
            ("delivered", OrderStatus::Delivered),
            ("failed", OrderStatus::Failed),
            ("whatever-new", OrderStatus::Unknown),
        ] {
            let status: OrderStatus = serde_json::from_value(json!(raw)).unwrap();
            assert_eq!(status, expected, "for {raw}");
        }
    }

    #[test]
    fn order_details_tolerates_missing_status() {
        let details: OrderDetails = serde_json::from_value(json!({
            "id": "ord_1",
            "customer_name": "A",
            "customer_email": "a@example.com",
            "total_amount": 300.0,
            "items": [{"id": "p1", "name": "Guide", "price": 100.0, "quantity": 3}],
        }))
        .unwrap();

        assert_eq!(details.status, OrderStatus::Unknown);
        assert!(!details.status.is_paid());
    }

    #[test]
    fn create_order_request_uses_camel_case() {
        let request = CreateOrderRequest {
            customer_name: "A".into(),
            customer_email: "a@example.com".into(),
            customer_phone: "9999999999".into(),
            order_items: vec![],
            total_amount: 10.0,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("customerName").is_some());
        assert!(value.get("orderItems").is_some());
        assert!(value.get("totalAmount").is_some());
    }
}
