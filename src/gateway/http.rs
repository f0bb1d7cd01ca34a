//! HTTP implementation of the order gateway.
//!
//! A thin `reqwest` client over the Order Service's REST surface. No
//! timeouts are applied; a hung request leaves the caller in its loading
//! state until the host abandons it.

use super::models::{
    CreateOrderRequest, CreateOrderResponse, CreatedOrder, OrderDetails, Product,
    SignedDownloadResponse,
};
use super::OrderGateway;
use crate::error::GatewayError;
use async_trait::async_trait;
use tracing::debug;

/// Location of the Order Service.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL without a trailing slash, e.g. `https://api.example.com`.
    pub base_url: String,
    /// Payment-provider path segment of the create-order endpoint.
    pub provider: String,
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            provider: "phonepe".to_string(),
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }
}

/// `reqwest`-backed gateway client.
#[derive(Debug, Clone)]
pub struct HttpOrderGateway {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl HttpOrderGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<CreatedOrder, GatewayError> {
        let url = self.url(&format!("/api/{}/create-order", self.config.provider));
        debug!(%url, total = request.total_amount, "creating order");

        let response = self.http.post(url).json(&request).send().await?;
        let status = response.status();
        let body: CreateOrderResponse = match response.json().await {
            Ok(body) => body,
            // An error page without the expected JSON body: report the
            // HTTP status rather than a decode failure.
            Err(_) if !status.is_success() => {
                return Err(GatewayError::Status {
                    code: status.as_u16(),
                })
            }
            Err(err) => return Err(err.into()),
        };

        if !body.success {
            return Err(GatewayError::Rejected {
                message: body
                    .message
                    .unwrap_or_else(|| "Order creation failed".to_string()),
            });
        }

        match (body.order_id, body.merchant_transaction_id, body.payment_url) {
            (Some(order_id), Some(merchant_transaction_id), Some(payment_url)) => {
                Ok(CreatedOrder {
                    order_id,
                    merchant_transaction_id,
                    payment_url,
                })
            }
            _ => Err(GatewayError::MalformedResponse(
                "create-order succeeded without order identifiers".to_string(),
            )),
        }
    }

    async fn fetch_order(&self, transaction_id: &str) -> Result<OrderDetails, GatewayError> {
        let url = self.url(&format!("/api/orders/{transaction_id}"));
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(GatewayError::Status {
                code: response.status().as_u16(),
            });
        }
        Ok(response.json().await?)
    }

    async fn fetch_product(&self, id: &str) -> Result<Product, GatewayError> {
        let url = self.url(&format!("/api/products/{id}"));
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(GatewayError::Status {
                code: response.status().as_u16(),
            });
        }
        Ok(response.json().await?)
    }

    async fn signed_download(
        &self,
        product_id: &str,
        transaction_id: &str,
    ) -> Result<String, GatewayError> {
        let url = self.url(&format!("/api/signed-download/{product_id}"));
        let response = self
            .http
            .get(url)
            .query(&[("transactionId", transaction_id)])
            .send()
            .await?;

        let ok = response.status().is_success();
        let body: SignedDownloadResponse = response.json().await?;
        match body.signed_url {
            Some(signed_url) if ok => Ok(signed_url),
            _ => Err(GatewayError::Rejected {
                message: body.message.unwrap_or_else(|| "No signed url".to_string()),
            }),
        }
    }
}
