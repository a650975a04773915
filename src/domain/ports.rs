use super::contest::{Contest, ContestId, Participant, ParticipantKey};
use super::payment::{OrderRequest, PaymentKey, PaymentOrder, PaymentRecord};
use super::user::{User, UserId};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A transactional document store holding users, contests, participants and
/// payment records.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Opens a serializable read-then-write transaction.
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction + '_>>;

    /// Committed snapshot of every user, for reporting.
    async fn users(&self) -> Result<Vec<User>>;
}

/// One optimistic transaction against a [`LedgerStore`].
///
/// Reads observe the transaction's own staged writes and join its read-set,
/// absent keys included. `commit` fails with
/// [`LedgerError::WriteConflict`](crate::error::LedgerError::WriteConflict) if
/// anything in the read-set changed since it was read. Dropping the
/// transaction without committing discards staged writes.
#[async_trait]
pub trait LedgerTransaction: Send {
    async fn user(&mut self, id: &UserId) -> Result<Option<User>>;
    async fn contest(&mut self, id: &ContestId) -> Result<Option<Contest>>;
    async fn participant(&mut self, key: &ParticipantKey) -> Result<Option<Participant>>;
    async fn payment(&mut self, key: &PaymentKey) -> Result<Option<PaymentRecord>>;

    fn put_user(&mut self, user: User) -> Result<()>;
    fn put_contest(&mut self, contest: Contest) -> Result<()>;
    fn put_participant(&mut self, participant: Participant) -> Result<()>;
    fn put_payment(&mut self, record: PaymentRecord) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;
}

pub type LedgerStoreRef = Arc<dyn LedgerStore>;

/// Creates orders with the external payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: OrderRequest) -> Result<PaymentOrder>;

    /// Public key id the client needs to complete checkout.
    fn key_id(&self) -> &str;
}

pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
