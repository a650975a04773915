use crate::domain::money::MinorUnits;
use crate::domain::payment::{OrderRequest, PaymentOrder};
use crate::domain::ports::PaymentGatewayRef;
use crate::domain::user::UserId;
use crate::error::{LedgerError, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, instrument};

/// What the client needs to open the gateway's checkout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedOrder {
    #[serde(flatten)]
    pub order: PaymentOrder,
    pub key_id: String,
}

/// Creates payment orders with the external gateway. Nothing is written to the
/// ledger: the wallet is only credited once the signed confirmation comes back.
#[derive(Clone)]
pub struct OrderService {
    gateway: PaymentGatewayRef,
    currency: String,
}

impl OrderService {
    pub fn new(gateway: PaymentGatewayRef, currency: impl Into<String>) -> Self {
        Self {
            gateway,
            currency: currency.into(),
        }
    }

    #[instrument(skip(self, user_id), fields(user = %user_id))]
    pub async fn create_order(&self, user_id: &UserId, amount: MinorUnits) -> Result<CreatedOrder> {
        let amount = amount.ensure_positive()?;
        let request = OrderRequest {
            amount,
            currency: self.currency.clone(),
            receipt: format!("receipt_order_{}", Utc::now().timestamp_millis()),
        };

        let order = self.gateway.create_order(request).await.map_err(|err| {
            error!(error = %err, "payment gateway order creation failed");
            match err {
                LedgerError::Gateway(_) => err,
                other => LedgerError::Gateway(other.to_string()),
            }
        })?;

        info!(order = %order.id, amount = %order.amount, "payment order created");
        Ok(CreatedOrder {
            order,
            key_id: self.gateway.key_id().to_string(),
        })
    }
}
