use crate::domain::contest::{Contest, ContestId, Participant, ParticipantKey};
use crate::domain::payment::{PaymentKey, PaymentRecord};
use crate::domain::ports::{LedgerStore, LedgerTransaction};
use crate::domain::user::{User, UserId};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, IteratorMode, OptimisticTransactionDB, Options,
    Transaction,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for user documents.
pub const CF_USERS: &str = "users";
/// Column Family for contest documents.
pub const CF_CONTESTS: &str = "contests";
/// Column Family for participation records, keyed by contest then user.
pub const CF_PARTICIPANTS: &str = "participants";
/// Column Family for payment records, keyed by order id then payment id.
pub const CF_PAYMENTS: &str = "payments";

/// Encodes `(first, second)` as the big-endian length of `first`, then both
/// parts. The length prefix keeps keys unambiguous whatever bytes the ids hold.
fn composite_key(first: &str, second: &str) -> Vec<u8> {
    let len = u32::try_from(first.len()).unwrap_or(u32::MAX);
    let mut key = Vec::with_capacity(4 + first.len() + second.len());
    key.extend_from_slice(&len.to_be_bytes());
    key.extend_from_slice(first.as_bytes());
    key.extend_from_slice(second.as_bytes());
    key
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

fn decode<T: DeserializeOwned>(bytes: Option<Vec<u8>>) -> Result<Option<T>> {
    bytes
        .map(|b| serde_json::from_slice(&b))
        .transpose()
        .map_err(LedgerError::from)
}

/// A persistent ledger store backed by a RocksDB `OptimisticTransactionDB`.
///
/// Each entity type lives in its own Column Family and is stored as JSON.
/// Transactions read with `get_for_update`, so every key they read is tracked
/// and a commit fails with `Busy` if another transaction wrote one of them in
/// the meantime; that status is surfaced as `LedgerError::WriteConflict`.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<OptimisticTransactionDB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating the
    /// ledger's Column Families if they are missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_USERS, CF_CONTESTS, CF_PARTICIPANTS, CF_PAYMENTS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));
        let db = OptimisticTransactionDB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }
}

fn column<'a>(db: &'a OptimisticTransactionDB, name: &str) -> Result<&'a ColumnFamily> {
    db.cf_handle(name)
        .ok_or_else(|| LedgerError::Storage(format!("column family `{name}` not found")))
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction + '_>> {
        Ok(Box::new(RocksDBTransaction {
            db: &self.db,
            txn: self.db.transaction(),
        }))
    }

    async fn users(&self) -> Result<Vec<User>> {
        let cf = column(&self.db, CF_USERS)?;
        let mut users = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            users.push(serde_json::from_slice(&value)?);
        }
        Ok(users)
    }
}

struct RocksDBTransaction<'a> {
    db: &'a OptimisticTransactionDB,
    txn: Transaction<'a, OptimisticTransactionDB>,
}

impl RocksDBTransaction<'_> {
    fn read<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = column(self.db, cf_name)?;
        decode(self.txn.get_for_update_cf(cf, key, true)?)
    }

    fn write<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = column(self.db, cf_name)?;
        self.txn.put_cf(cf, key, encode(value)?)?;
        Ok(())
    }
}

#[async_trait]
impl<'a> LedgerTransaction for RocksDBTransaction<'a> {
    async fn user(&mut self, id: &UserId) -> Result<Option<User>> {
        self.read(CF_USERS, id.as_str().as_bytes())
    }

    async fn contest(&mut self, id: &ContestId) -> Result<Option<Contest>> {
        self.read(CF_CONTESTS, id.as_str().as_bytes())
    }

    async fn participant(&mut self, key: &ParticipantKey) -> Result<Option<Participant>> {
        self.read(
            CF_PARTICIPANTS,
            &composite_key(key.contest_id.as_str(), key.user_id.as_str()),
        )
    }

    async fn payment(&mut self, key: &PaymentKey) -> Result<Option<PaymentRecord>> {
        self.read(CF_PAYMENTS, &composite_key(&key.order_id, &key.payment_id))
    }

    fn put_user(&mut self, user: User) -> Result<()> {
        self.write(CF_USERS, user.id.as_str().as_bytes(), &user)
    }

    fn put_contest(&mut self, contest: Contest) -> Result<()> {
        self.write(CF_CONTESTS, contest.id.as_str().as_bytes(), &contest)
    }

    fn put_participant(&mut self, participant: Participant) -> Result<()> {
        let key = composite_key(
            participant.key.contest_id.as_str(),
            participant.key.user_id.as_str(),
        );
        self.write(CF_PARTICIPANTS, &key, &participant)
    }

    fn put_payment(&mut self, record: PaymentRecord) -> Result<()> {
        let key = composite_key(&record.key.order_id, &record.key.payment_id);
        self.write(CF_PAYMENTS, &key, &record)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.txn.commit()?;
        Ok(())
    }
}
