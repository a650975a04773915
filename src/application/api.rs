use super::contest::ContestEntryService;
use super::coordinator::{RetryPolicy, TransactionCoordinator};
use super::orders::{CreatedOrder, OrderService};
use super::signature::SignatureVerifier;
use super::wallet::{PaymentConfirmation, WalletCreditService};
use crate::domain::contest::ContestId;
use crate::domain::money::MinorUnits;
use crate::domain::outcome::{CreditOutcome, JoinOutcome};
use crate::domain::ports::{LedgerStoreRef, PaymentGatewayRef};
use crate::domain::user::UserId;
use crate::error::{LedgerError, Result};

/// Identity of the caller, as established by the transport's authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    user_id: Option<UserId>,
}

impl AuthContext {
    pub fn authenticated(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn require_user(&self) -> Result<&UserId> {
        self.user_id.as_ref().ok_or(LedgerError::Unauthenticated)
    }
}

/// The caller-facing operations of the ledger.
///
/// Every operation checks the [`AuthContext`] before touching anything else.
#[derive(Clone)]
pub struct LedgerApi {
    wallet: WalletCreditService,
    contests: ContestEntryService,
    orders: Option<OrderService>,
}

impl LedgerApi {
    /// Builds the services around one injected store handle.
    pub fn new(store: LedgerStoreRef, verifier: SignatureVerifier, policy: RetryPolicy) -> Self {
        let coordinator = TransactionCoordinator::new(store, policy);
        Self {
            wallet: WalletCreditService::new(verifier, coordinator.clone()),
            contests: ContestEntryService::new(coordinator),
            orders: None,
        }
    }

    pub fn with_gateway(mut self, gateway: PaymentGatewayRef, currency: impl Into<String>) -> Self {
        self.orders = Some(OrderService::new(gateway, currency));
        self
    }

    pub async fn create_order(
        &self,
        auth: &AuthContext,
        amount: MinorUnits,
    ) -> Result<CreatedOrder> {
        let user_id = auth.require_user()?;
        let orders = self
            .orders
            .as_ref()
            .ok_or_else(|| LedgerError::Gateway("no payment gateway configured".to_string()))?;
        orders.create_order(user_id, amount).await
    }

    pub async fn verify_and_credit(
        &self,
        auth: &AuthContext,
        confirmation: &PaymentConfirmation,
    ) -> Result<CreditOutcome> {
        let user_id = auth.require_user()?;
        self.wallet.credit_wallet(user_id, confirmation).await
    }

    pub async fn join_contest(
        &self,
        auth: &AuthContext,
        contest_id: &ContestId,
    ) -> Result<JoinOutcome> {
        let user_id = auth.require_user()?;
        self.contests.join_contest(user_id, contest_id).await
    }
}
