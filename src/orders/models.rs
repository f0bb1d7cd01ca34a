//! Order Resolution Models
//!
//! The URL contract of the return redirect, the closed failure taxonomy
//! carried in its `error` parameter, and the resolution outcomes the host
//! renders.

use crate::checkout::PendingOrderSnapshot;
use crate::gateway::{OrderDetails, OrderItem, Product};

/// Query parameters the external payer sends on the redirect back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnParams {
    pub transaction_id: Option<String>,
    pub order_id: Option<String>,
    pub error: Option<String>,
}

impl ReturnParams {
    /// Parses a raw query string (`transactionId=...&orderId=...&error=...`).
    /// Unknown parameters are ignored; values are percent-decoded.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for pair in query.trim_start_matches('?').split('&') {
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) if !value.is_empty() => (key, value),
                _ => continue,
            };
            let value = decode_component(value);
            match key {
                "transactionId" => params.transaction_id = Some(value),
                "orderId" => params.order_id = Some(value),
                "error" => params.error = Some(value),
                _ => {}
            }
        }
        params
    }
}

/// Decodes one `application/x-www-form-urlencoded` component: `+` becomes
/// a space and `%XX` escapes become their byte. Malformed escapes pass
/// through verbatim.
fn decode_component(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi * 16 + lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}

/// Closed set of terminal payment-failure reasons, keyed by the `error`
/// query parameter. Anything unrecognized maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    OrderNotFound,
    CallbackFailed,
    Other,
}

impl FailureReason {
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("order-not-found") => FailureReason::OrderNotFound,
            Some("callback-failed") => FailureReason::CallbackFailed,
            _ => FailureReason::Other,
        }
    }

    /// Human message for the failure view. Every variant leaves the user
    /// with a next action (retry payment, contact support).
    pub fn message(self) -> &'static str {
        match self {
            FailureReason::OrderNotFound => {
                "Order not found. Please try creating a new order."
            }
            FailureReason::CallbackFailed => {
                "Payment verification failed. Please contact support."
            }
            FailureReason::Other => {
                "Your payment could not be processed. Please try again."
            }
        }
    }
}

/// One purchased item on the paid view, enriched with product metadata
/// when the lookup succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchasedItem {
    pub item: OrderItem,
    /// Product metadata; `None` when the lookup failed (the view falls
    /// back to the order's own line-item fields).
    pub product: Option<Product>,
    pub display_name: String,
    /// Safe local file name to save the download under.
    pub download_file_name: String,
}

/// Outcome of resolving a return redirect.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// No transaction id in the URL; nothing to look up.
    Indeterminate,
    /// Payment still processing; offer a manual refresh (resolve again).
    Pending { order: OrderDetails },
    /// Payment confirmed; purchased items carry per-item download state.
    Paid {
        order: OrderDetails,
        items: Vec<PurchasedItem>,
    },
    /// Terminal payment failure; `context` is the pending snapshot when a
    /// fresh one survived the redirect.
    Failed {
        reason: FailureReason,
        order_id: Option<String>,
        context: Option<PendingOrderSnapshot>,
    },
    /// The order lookup itself failed; resolving again is safe and is the
    /// retry action.
    Unavailable { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_return_query() {
        let params = ReturnParams::from_query("?transactionId=txn_1&orderId=ord_1&error=callback-failed");
        assert_eq!(params.transaction_id.as_deref(), Some("txn_1"));
        assert_eq!(params.order_id.as_deref(), Some("ord_1"));
        assert_eq!(params.error.as_deref(), Some("callback-failed"));

        assert_eq!(ReturnParams::from_query(""), ReturnParams::default());
        assert_eq!(
            ReturnParams::from_query("utm_source=payer&transactionId=t"),
            ReturnParams {
                transaction_id: Some("t".into()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn decodes_escaped_values() {
        let params = ReturnParams::from_query("transactionId=txn%2F1+a&error=order%2Dnot%2Dfound");
        assert_eq!(params.transaction_id.as_deref(), Some("txn/1 a"));
        assert_eq!(params.error.as_deref(), Some("order-not-found"));
        assert_eq!(
            FailureReason::from_code(params.error.as_deref()),
            FailureReason::OrderNotFound
        );

        // Malformed escapes pass through rather than dropping the value.
        assert_eq!(
            ReturnParams::from_query("transactionId=%zz%4").transaction_id.as_deref(),
            Some("%zz%4")
        );
    }

    #[test]
    fn failure_codes_map_to_closed_set() {
        assert_eq!(
            FailureReason::from_code(Some("order-not-found")),
            FailureReason::OrderNotFound
        );
        assert_eq!(
            FailureReason::from_code(Some("callback-failed")),
            FailureReason::CallbackFailed
        );
        assert_eq!(FailureReason::from_code(Some("surprise")), FailureReason::Other);
        assert_eq!(FailureReason::from_code(None), FailureReason::Other);
    }
}
