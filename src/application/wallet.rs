use super::coordinator::{TransactionCoordinator, UnitOfWork};
use super::signature::SignatureVerifier;
use crate::domain::money::MinorUnits;
use crate::domain::outcome::CreditOutcome;
use crate::domain::payment::{PaymentKey, PaymentRecord, PaymentStatus};
use crate::domain::ports::LedgerTransaction;
use crate::domain::user::UserId;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument, warn};

/// A gateway payment confirmation as submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub amount: MinorUnits,
}

/// Credits a wallet exactly once per verified gateway payment.
#[derive(Clone)]
pub struct WalletCreditService {
    verifier: SignatureVerifier,
    coordinator: TransactionCoordinator,
}

struct CreditPayment<'a> {
    user_id: &'a UserId,
    key: PaymentKey,
    amount: MinorUnits,
}

enum Credit {
    Applied,
    Replayed,
}

#[async_trait]
impl<'a> UnitOfWork for CreditPayment<'a> {
    type Output = Credit;
    const NAME: &'static str = "credit_wallet";

    async fn run(&self, tx: &mut dyn LedgerTransaction) -> Result<Credit> {
        if tx.payment(&self.key).await?.is_some() {
            return Ok(Credit::Replayed);
        }

        let mut user = tx
            .user(self.user_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("user", self.user_id))?;
        user.wallet_balance = user
            .wallet_balance
            .checked_add(self.amount.to_major())
            .ok_or_else(|| {
                LedgerError::InvalidRequest(format!(
                    "crediting {} would overflow the wallet of `{}`",
                    self.amount, self.user_id
                ))
            })?;

        tx.put_payment(PaymentRecord {
            key: self.key.clone(),
            user_id: self.user_id.clone(),
            amount: self.amount,
            status: PaymentStatus::Success,
            created_at: Utc::now(),
        })?;
        tx.put_user(user)?;
        Ok(Credit::Applied)
    }
}

impl WalletCreditService {
    pub fn new(verifier: SignatureVerifier, coordinator: TransactionCoordinator) -> Self {
        Self {
            verifier,
            coordinator,
        }
    }

    /// Verifies the confirmation's signature and, if valid, records the payment
    /// and credits `amount / 100` major units to the user's wallet in one
    /// transaction. A payment that was already recorded is reported as success
    /// without crediting again.
    #[instrument(
        skip(self, user_id, confirmation),
        fields(user = %user_id, order = %confirmation.order_id, payment = %confirmation.payment_id)
    )]
    pub async fn credit_wallet(
        &self,
        user_id: &UserId,
        confirmation: &PaymentConfirmation,
    ) -> Result<CreditOutcome> {
        if !self.verifier.verify(
            &confirmation.order_id,
            &confirmation.payment_id,
            &confirmation.signature,
        ) {
            warn!("payment signature rejected");
            return Ok(CreditOutcome::verification_failed());
        }
        let amount = confirmation.amount.ensure_positive()?;

        let work = CreditPayment {
            user_id,
            key: PaymentKey::new(&confirmation.order_id, &confirmation.payment_id),
            amount,
        };
        match self.coordinator.execute(&work).await? {
            Credit::Applied => {
                info!(amount = %amount, "wallet credited");
                Ok(CreditOutcome::credited())
            }
            Credit::Replayed => {
                info!("payment already processed, nothing credited");
                Ok(CreditOutcome::already_processed())
            }
        }
    }
}
