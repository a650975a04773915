use super::money::MinorUnits;
use super::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Idempotency key of a gateway payment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentKey {
    pub order_id: String,
    pub payment_id: String,
}

impl PaymentKey {
    pub fn new(order_id: impl Into<String>, payment_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            payment_id: payment_id.into(),
        }
    }
}

impl fmt::Display for PaymentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.order_id, self.payment_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Success,
}

/// Write-once record of a verified payment that was credited to a wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub key: PaymentKey,
    pub user_id: UserId,
    pub amount: MinorUnits,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// Order parameters sent to the payment gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub amount: MinorUnits,
    pub currency: String,
    pub receipt: String,
}

/// An order as created by the payment gateway. Owned by the gateway; the ledger
/// only relays it to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub id: String,
    pub amount: MinorUnits,
    pub currency: String,
    pub receipt: Option<String>,
}
