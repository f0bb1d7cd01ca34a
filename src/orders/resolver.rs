//! Order Status Resolver
//!
//! Given the parameters of the return redirect, fetches authoritative
//! order state and produces the resolution outcome. On the paid path it
//! clears the cart exactly once, empties the pending-order slot and
//! enriches the purchased items with product metadata via a bounded
//! parallel fan-out joined tolerantly: a failed lookup degrades that one
//! row, never the page.

use super::models::{FailureReason, PurchasedItem, Resolution, ReturnParams};
use crate::cart::CartStore;
use crate::checkout::models::{clear_pending, read_pending};
use crate::error::GatewayError;
use crate::gateway::{OrderDetails, OrderGateway, OrderItem, Product};
use crate::storage::StorageBackend;
use futures_util::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Upper bound on concurrent product-metadata fetches, so a large order
/// cannot fan out into a request storm.
pub const PRODUCT_FETCH_CONCURRENCY: usize = 4;

/// Resolves a returned transaction to a terminal view.
pub struct OrderStatusResolver {
    cart: Arc<CartStore>,
    gateway: Arc<dyn OrderGateway>,
    storage: Arc<dyn StorageBackend>,
    cart_cleared: AtomicBool,
}

impl OrderStatusResolver {
    pub fn new(
        cart: Arc<CartStore>,
        gateway: Arc<dyn OrderGateway>,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            cart,
            gateway,
            storage,
            cart_cleared: AtomicBool::new(false),
        }
    }

    /// Resolves the redirect-back parameters to an outcome.
    ///
    /// Idempotent and safe to call again: `Unavailable` retries re-issue
    /// the identical fetch, `Pending` refreshes re-poll, and the
    /// cart-clearing side effect of the paid path runs at most once per
    /// resolver instance.
    pub async fn resolve(&self, params: &ReturnParams) -> Resolution {
        if params.error.is_some() {
            return self.failed(
                FailureReason::from_code(params.error.as_deref()),
                params.order_id.clone(),
            )
            .await;
        }

        let transaction_id = match params.transaction_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => return Resolution::Indeterminate,
        };

        let order = match self.gateway.fetch_order(transaction_id).await {
            Ok(order) => order,
            Err(err) => {
                warn!(%err, transaction_id, "order lookup failed");
                return Resolution::Unavailable {
                    message: format!("Failed to fetch order: {err}"),
                };
            }
        };

        if order.status.is_paid() {
            return self.paid(order).await;
        }
        if order.status == crate::gateway::OrderStatus::Failed {
            return self.failed(FailureReason::Other, Some(order.id)).await;
        }
        Resolution::Pending { order }
    }

    /// Requests a signed download URL for one purchased item. Failures
    /// stay with that item; sibling downloads are unaffected.
    pub async fn download_link(
        &self,
        product_id: &str,
        transaction_id: &str,
    ) -> Result<String, GatewayError> {
        self.gateway.signed_download(product_id, transaction_id).await
    }

    async fn paid(&self, order: OrderDetails) -> Resolution {
        // The purchase emptied the cart; do it exactly once per load so a
        // re-render cannot clobber a cart the user started rebuilding.
        if !self.cart_cleared.swap(true, Ordering::SeqCst) {
            if let Err(err) = self.cart.clear().await {
                warn!(%err, "could not clear cart after successful payment");
            }
        }
        if let Err(err) = clear_pending(self.storage.as_ref()).await {
            warn!(%err, "could not clear pending-order slot");
        }

        let items = self.enrich_items(&order).await;
        Resolution::Paid { order, items }
    }

    async fn failed(&self, reason: FailureReason, order_id: Option<String>) -> Resolution {
        let context = read_pending(self.storage.as_ref()).await;
        if let Err(err) = clear_pending(self.storage.as_ref()).await {
            warn!(%err, "could not clear pending-order slot");
        }
        Resolution::Failed {
            reason,
            order_id,
            context,
        }
    }

    /// Fetches product metadata for the order's items with bounded
    /// concurrency and a tolerant join: misses fall back to the order's
    /// own line-item fields.
    async fn enrich_items(&self, order: &OrderDetails) -> Vec<PurchasedItem> {
        let mut unique_ids: Vec<String> = Vec::new();
        for item in &order.items {
            let id = item.id.trim();
            if !id.is_empty() && !unique_ids.iter().any(|seen| seen == id) {
                unique_ids.push(id.to_string());
            }
        }

        let fetched: Vec<(String, Result<Product, GatewayError>)> = stream::iter(unique_ids)
            .map(|id| {
                let gateway = Arc::clone(&self.gateway);
                async move {
                    let result = gateway.fetch_product(&id).await;
                    (id, result)
                }
            })
            .buffer_unordered(PRODUCT_FETCH_CONCURRENCY)
            .collect()
            .await;

        let mut products: HashMap<String, Product> = HashMap::new();
        for (id, result) in fetched {
            match result {
                Ok(product) => {
                    products.insert(id, product);
                }
                Err(err) => warn!(%err, product_id = %id, "product lookup failed"),
            }
        }

        order
            .items
            .iter()
            .map(|item| {
                let product = products.get(item.id.trim()).cloned();
                let display_name = product
                    .as_ref()
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| item.name.clone());
                let download_file_name = download_file_name(product.as_ref(), item);
                PurchasedItem {
                    item: item.clone(),
                    product,
                    display_name,
                    download_file_name,
                }
            })
            .collect()
    }
}

/// Best local file name for a purchased item's download: the product's
/// `file_name`, then `local_file_name`, then its display name, then a
/// `product_<id>` stub, sanitized into a `.pdf` name.
fn download_file_name(product: Option<&Product>, item: &OrderItem) -> String {
    let stub = format!("product_{}", item.id);
    let raw = match product {
        Some(product) => product
            .file_name
            .as_deref()
            .or(product.local_file_name.as_deref())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(if product.name.trim().is_empty() {
                stub.as_str()
            } else {
                product.name.as_str()
            }),
        None => {
            if item.name.trim().is_empty() {
                stub.as_str()
            } else {
                item.name.as_str()
            }
        }
    };
    make_safe_file_name(raw)
}

fn make_safe_file_name(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = safe.trim().to_string();
    if safe.is_empty() {
        return "download.pdf".to_string();
    }
    if safe.to_lowercase().ends_with(".pdf") {
        safe
    } else {
        format!("{safe}.pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartItem;
    use crate::checkout::models::{write_pending, PendingOrderSnapshot};
    use crate::error::GatewayError;
    use crate::gateway::{CreateOrderRequest, CreatedOrder, OrderStatus};
    use crate::storage::MemoryStorage;
    use crate::PENDING_ORDER_KEY;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// Scriptable gateway double: `fetch_order` pops from a queue so a
    /// retry can see a different answer; product lookups fail for ids in
    /// `broken_products`.
    #[derive(Default)]
    struct FakeGateway {
        orders: Mutex<Vec<Result<OrderDetails, u16>>>,
        order_calls: AtomicUsize,
        broken_products: HashSet<String>,
    }

    impl FakeGateway {
        fn with_order(order: OrderDetails) -> Self {
            Self {
                orders: Mutex::new(vec![Ok(order)]),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl OrderGateway for FakeGateway {
        async fn create_order(
            &self,
            _request: CreateOrderRequest,
        ) -> Result<CreatedOrder, GatewayError> {
            unimplemented!("not exercised here")
        }

        async fn fetch_order(&self, _transaction_id: &str) -> Result<OrderDetails, GatewayError> {
            self.order_calls.fetch_add(1, Ordering::SeqCst);
            let mut queue = self.orders.lock().unwrap();
            match queue.first().cloned() {
                Some(Ok(order)) => {
                    if queue.len() > 1 {
                        queue.remove(0);
                    }
                    Ok(order)
                }
                Some(Err(code)) => {
                    queue.remove(0);
                    Err(GatewayError::Status { code })
                }
                None => Err(GatewayError::Status { code: 500 }),
            }
        }

        async fn fetch_product(&self, id: &str) -> Result<Product, GatewayError> {
            if self.broken_products.contains(id) {
                return Err(GatewayError::Status { code: 404 });
            }
            Ok(Product {
                id: id.to_string(),
                name: format!("Catalog {id}"),
                price: Some(100.0),
                image: None,
                file_name: Some(format!("{id}.pdf")),
                local_file_name: None,
            })
        }

        async fn signed_download(
            &self,
            product_id: &str,
            transaction_id: &str,
        ) -> Result<String, GatewayError> {
            Ok(format!("https://files.example/{product_id}?t={transaction_id}"))
        }
    }

    fn order(status: OrderStatus) -> OrderDetails {
        OrderDetails {
            id: "ord_1".into(),
            customer_name: "A".into(),
            customer_email: "a@example.com".into(),
            total_amount: 300.0,
            status,
            items: vec![
                OrderItem {
                    id: "p1".into(),
                    name: "Guide".into(),
                    price: 100.0,
                    quantity: 2,
                },
                OrderItem {
                    id: "p2".into(),
                    name: "Workbook".into(),
                    price: 100.0,
                    quantity: 1,
                },
            ],
        }
    }

    struct Fixture {
        cart: Arc<CartStore>,
        storage: Arc<MemoryStorage>,
        gateway: Arc<FakeGateway>,
        resolver: OrderStatusResolver,
    }

    fn fixture(gateway: FakeGateway) -> Fixture {
        let storage = Arc::new(MemoryStorage::new());
        let backend: Arc<dyn StorageBackend> = storage.clone();
        let cart = Arc::new(CartStore::new(backend.clone()));
        let gateway = Arc::new(gateway);
        let resolver = OrderStatusResolver::new(cart.clone(), gateway.clone(), backend);
        Fixture {
            cart,
            storage,
            gateway,
            resolver,
        }
    }

    fn params(transaction_id: &str) -> ReturnParams {
        ReturnParams {
            transaction_id: Some(transaction_id.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn missing_transaction_id_stays_offline() {
        let fx = fixture(FakeGateway::default());
        let resolution = fx.resolver.resolve(&ReturnParams::default()).await;

        assert_eq!(resolution, Resolution::Indeterminate);
        assert_eq!(
            fx.gateway.order_calls.load(Ordering::SeqCst),
            0,
            "no network call without a transaction id"
        );
    }

    #[tokio::test]
    async fn lookup_failure_is_retryable() {
        let gateway = FakeGateway {
            orders: Mutex::new(vec![Err(404), Ok(order(OrderStatus::Pending))]),
            ..Default::default()
        };
        let fx = fixture(gateway);

        let first = fx.resolver.resolve(&params("txn_1")).await;
        assert!(matches!(first, Resolution::Unavailable { .. }));

        // The retry action is the same call; it now succeeds.
        let second = fx.resolver.resolve(&params("txn_1")).await;
        assert!(matches!(second, Resolution::Pending { .. }));
    }

    #[tokio::test]
    async fn pending_status_polls_again() {
        let fx = fixture(FakeGateway::with_order(order(OrderStatus::Processing)));
        let resolution = fx.resolver.resolve(&params("txn_1")).await;

        match resolution {
            Resolution::Pending { order } => assert_eq!(order.id, "ord_1"),
            other => panic!("expected Pending, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn paid_clears_cart_once_and_empties_slot() {
        let fx = fixture(FakeGateway::with_order(order(OrderStatus::Completed)));
        write_pending(
            fx.storage.as_ref(),
            &PendingOrderSnapshot {
                order_id: "ord_1".into(),
                merchant_transaction_id: "txn_1".into(),
                customer_name: "A".into(),
                customer_email: "a@example.com".into(),
                total_amount: 300.0,
                items: vec![],
                created_at: Some(Utc::now()),
            },
        )
        .await
        .unwrap();
        fx.cart
            .add_item(CartItem {
                id: "p1".into(),
                name: "Guide".into(),
                price: 100.0,
                quantity: 2,
                image: None,
            })
            .await
            .unwrap();

        let resolution = fx.resolver.resolve(&params("txn_1")).await;
        assert!(matches!(resolution, Resolution::Paid { .. }));
        assert!(fx.cart.snapshot().await.is_empty());
        assert!(fx.storage.get(PENDING_ORDER_KEY).await.unwrap().is_none());

        // A second resolve must not clear a cart the user has rebuilt.
        fx.cart
            .add_item(CartItem {
                id: "p9".into(),
                name: "New".into(),
                price: 10.0,
                quantity: 1,
                image: None,
            })
            .await
            .unwrap();
        fx.resolver.resolve(&params("txn_1")).await;
        assert_eq!(fx.cart.snapshot().await.total_items, 1);
    }

    #[tokio::test]
    async fn enrichment_tolerates_partial_failure() {
        let gateway = FakeGateway {
            orders: Mutex::new(vec![Ok(order(OrderStatus::Delivered))]),
            broken_products: HashSet::from(["p2".to_string()]),
            ..Default::default()
        };
        let fx = fixture(gateway);

        let resolution = fx.resolver.resolve(&params("txn_1")).await;
        let items = match resolution {
            Resolution::Paid { items, .. } => items,
            other => panic!("expected Paid, got {other:?}"),
        };

        assert_eq!(items.len(), 2);
        // Enriched row uses catalog metadata.
        assert_eq!(items[0].display_name, "Catalog p1");
        assert_eq!(items[0].download_file_name, "p1.pdf");
        // Failed lookup falls back to the order's own line item.
        assert!(items[1].product.is_none());
        assert_eq!(items[1].display_name, "Workbook");
        assert_eq!(items[1].download_file_name, "Workbook.pdf");
    }

    #[tokio::test]
    async fn error_code_resolves_failed_with_context() {
        let fx = fixture(FakeGateway::default());
        write_pending(
            fx.storage.as_ref(),
            &PendingOrderSnapshot {
                order_id: "ord_1".into(),
                merchant_transaction_id: "txn_1".into(),
                customer_name: "A".into(),
                customer_email: "a@example.com".into(),
                total_amount: 300.0,
                items: vec![],
                created_at: Some(Utc::now()),
            },
        )
        .await
        .unwrap();

        let resolution = fx
            .resolver
            .resolve(&ReturnParams {
                transaction_id: Some("txn_1".into()),
                order_id: Some("ord_1".into()),
                error: Some("callback-failed".into()),
            })
            .await;

        match resolution {
            Resolution::Failed {
                reason,
                order_id,
                context,
            } => {
                assert_eq!(reason, FailureReason::CallbackFailed);
                assert_eq!(order_id.as_deref(), Some("ord_1"));
                assert_eq!(context.unwrap().customer_name, "A");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        // The slot is emptied so the stale snapshot cannot linger.
        assert!(fx.storage.get(PENDING_ORDER_KEY).await.unwrap().is_none());
    }

    #[test]
    fn safe_file_names() {
        assert_eq!(make_safe_file_name("My Guide"), "My Guide.pdf");
        assert_eq!(make_safe_file_name("guide.PDF"), "guide.PDF");
        assert_eq!(make_safe_file_name("a/b:c"), "a_b_c.pdf");
        assert_eq!(make_safe_file_name(""), "download.pdf");
    }
}
