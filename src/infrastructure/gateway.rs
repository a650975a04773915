use crate::domain::money::MinorUnits;
use crate::domain::payment::{OrderRequest, PaymentOrder};
use crate::domain::ports::PaymentGateway;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.razorpay.com";

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    amount: u64,
    currency: String,
    #[serde(default)]
    receipt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Client for a Razorpay-compatible orders API, authenticated with the key id
/// and key secret over HTTP basic auth.
#[derive(Clone)]
pub struct RazorpayGateway {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayGateway {
    pub fn new(
        base_url: impl Into<String>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Gateway(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, request: OrderRequest) -> Result<PaymentOrder> {
        let response = self
            .client
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&request)
            .send()
            .await
            .map_err(|e| LedgerError::Gateway(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<ErrorResponse>().await {
                Ok(ErrorResponse { error }) => format!(
                    "{}: {}",
                    error.code.unwrap_or_else(|| "UNKNOWN".to_string()),
                    error.description.unwrap_or_default()
                ),
                Err(_) => "no error body".to_string(),
            };
            return Err(LedgerError::Gateway(format!("HTTP {status}: {detail}")));
        }

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::Gateway(format!("malformed order response: {e}")))?;
        Ok(PaymentOrder {
            id: order.id,
            amount: MinorUnits(order.amount),
            currency: order.currency,
            receipt: order.receipt,
        })
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}
