use crate::domain::contest::{Contest, ContestId, Participant, ParticipantKey};
use crate::domain::payment::{PaymentKey, PaymentRecord};
use crate::domain::ports::{LedgerStore, LedgerTransaction};
use crate::domain::user::{User, UserId};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Version observed for a key that has never been written.
const ABSENT: u64 = 0;

#[derive(Debug, Clone)]
struct Versioned<T> {
    version: u64,
    value: T,
}

#[derive(Debug, Default)]
struct Tables {
    /// Monotonic commit counter; every write stamps the entry with the next value.
    clock: u64,
    users: HashMap<UserId, Versioned<User>>,
    contests: HashMap<ContestId, Versioned<Contest>>,
    participants: HashMap<ParticipantKey, Versioned<Participant>>,
    payments: HashMap<PaymentKey, Versioned<PaymentRecord>>,
}

fn version_of<K: Eq + Hash, V>(table: &HashMap<K, Versioned<V>>, key: &K) -> u64 {
    table.get(key).map_or(ABSENT, |entry| entry.version)
}

/// A thread-safe in-memory ledger store with optimistic concurrency control.
///
/// Each entry carries a version. Transactions remember the version of every key
/// they read and, at commit, re-check those versions under the write lock
/// before applying their writes. `Clone` shares the underlying tables.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction + '_>> {
        Ok(Box::new(InMemoryTransaction {
            tables: Arc::clone(&self.tables),
            reads: ReadSet::default(),
            writes: WriteSet::default(),
        }))
    }

    async fn users(&self) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().map(|e| e.value.clone()).collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }
}

#[derive(Default)]
struct ReadSet {
    users: HashMap<UserId, u64>,
    contests: HashMap<ContestId, u64>,
    participants: HashMap<ParticipantKey, u64>,
    payments: HashMap<PaymentKey, u64>,
}

#[derive(Default)]
struct WriteSet {
    users: HashMap<UserId, User>,
    contests: HashMap<ContestId, Contest>,
    participants: HashMap<ParticipantKey, Participant>,
    payments: HashMap<PaymentKey, PaymentRecord>,
}

struct InMemoryTransaction {
    tables: Arc<RwLock<Tables>>,
    reads: ReadSet,
    writes: WriteSet,
}

/// Reads `key` from a table, preferring the transaction's own staged value and
/// recording the observed version the first time the key is seen.
fn tracked_read<K, V>(
    table: &HashMap<K, Versioned<V>>,
    staged: &HashMap<K, V>,
    seen: &mut HashMap<K, u64>,
    key: &K,
) -> Option<V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    if let Some(value) = staged.get(key) {
        return Some(value.clone());
    }
    let entry = table.get(key);
    seen.entry(key.clone())
        .or_insert_with(|| entry.map_or(ABSENT, |e| e.version));
    entry.map(|e| e.value.clone())
}

fn unchanged<K: Eq + Hash, V>(table: &HashMap<K, Versioned<V>>, seen: &HashMap<K, u64>) -> bool {
    seen.iter()
        .all(|(key, version)| version_of(table, key) == *version)
}

fn apply<K: Eq + Hash, V>(
    table: &mut HashMap<K, Versioned<V>>,
    writes: HashMap<K, V>,
    version: u64,
) {
    for (key, value) in writes {
        table.insert(key, Versioned { version, value });
    }
}

#[async_trait]
impl LedgerTransaction for InMemoryTransaction {
    async fn user(&mut self, id: &UserId) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tracked_read(
            &tables.users,
            &self.writes.users,
            &mut self.reads.users,
            id,
        ))
    }

    async fn contest(&mut self, id: &ContestId) -> Result<Option<Contest>> {
        let tables = self.tables.read().await;
        Ok(tracked_read(
            &tables.contests,
            &self.writes.contests,
            &mut self.reads.contests,
            id,
        ))
    }

    async fn participant(&mut self, key: &ParticipantKey) -> Result<Option<Participant>> {
        let tables = self.tables.read().await;
        Ok(tracked_read(
            &tables.participants,
            &self.writes.participants,
            &mut self.reads.participants,
            key,
        ))
    }

    async fn payment(&mut self, key: &PaymentKey) -> Result<Option<PaymentRecord>> {
        let tables = self.tables.read().await;
        Ok(tracked_read(
            &tables.payments,
            &self.writes.payments,
            &mut self.reads.payments,
            key,
        ))
    }

    fn put_user(&mut self, user: User) -> Result<()> {
        self.writes.users.insert(user.id.clone(), user);
        Ok(())
    }

    fn put_contest(&mut self, contest: Contest) -> Result<()> {
        self.writes.contests.insert(contest.id.clone(), contest);
        Ok(())
    }

    fn put_participant(&mut self, participant: Participant) -> Result<()> {
        self.writes
            .participants
            .insert(participant.key.clone(), participant);
        Ok(())
    }

    fn put_payment(&mut self, record: PaymentRecord) -> Result<()> {
        self.writes.payments.insert(record.key.clone(), record);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let Self {
            tables,
            reads,
            writes,
        } = *self;
        let mut tables = tables.write().await;

        let valid = unchanged(&tables.users, &reads.users)
            && unchanged(&tables.contests, &reads.contests)
            && unchanged(&tables.participants, &reads.participants)
            && unchanged(&tables.payments, &reads.payments);
        if !valid {
            return Err(LedgerError::WriteConflict);
        }

        tables.clock += 1;
        let version = tables.clock;
        apply(&mut tables.users, writes.users, version);
        apply(&mut tables.contests, writes.contests, version);
        apply(&mut tables.participants, writes.participants, version);
        apply(&mut tables.payments, writes.payments, version);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Balance;
    use rust_decimal_macros::dec;

    fn alice() -> User {
        User::new(UserId::new("alice"), "Alice").with_balance(Balance::new(dec!(100)))
    }

    async fn seed(store: &InMemoryLedgerStore, user: User) {
        let mut tx = store.begin().await.unwrap();
        tx.put_user(user).unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_commit_applies_writes() {
        let store = InMemoryLedgerStore::new();
        seed(&store, alice()).await;

        let mut tx = store.begin().await.unwrap();
        let retrieved = tx.user(&UserId::new("alice")).await.unwrap().unwrap();
        assert_eq!(retrieved, alice());
        assert!(tx.user(&UserId::new("bob")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reads_see_own_writes() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.put_user(alice()).unwrap();

        let staged = tx.user(&UserId::new("alice")).await.unwrap();
        assert_eq!(staged, Some(alice()));
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let store = InMemoryLedgerStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.put_user(alice()).unwrap();
        }
        assert!(store.users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stale_read_is_rejected_at_commit() {
        let store = InMemoryLedgerStore::new();
        seed(&store, alice()).await;
        let id = UserId::new("alice");

        let mut slow = store.begin().await.unwrap();
        let mut snapshot = slow.user(&id).await.unwrap().unwrap();

        let mut fast = store.begin().await.unwrap();
        let mut user = fast.user(&id).await.unwrap().unwrap();
        user.wallet_balance = Balance::new(dec!(40));
        fast.put_user(user).unwrap();
        fast.commit().await.unwrap();

        snapshot.wallet_balance = Balance::new(dec!(0));
        slow.put_user(snapshot).unwrap();
        assert!(matches!(
            slow.commit().await,
            Err(LedgerError::WriteConflict)
        ));

        let users = store.users().await.unwrap();
        assert_eq!(users[0].wallet_balance, Balance::new(dec!(40)));
    }

    #[tokio::test]
    async fn test_absent_key_read_conflicts_with_concurrent_insert() {
        let store = InMemoryLedgerStore::new();
        let id = UserId::new("alice");

        let mut first = store.begin().await.unwrap();
        assert!(first.user(&id).await.unwrap().is_none());

        seed(&store, alice()).await;

        first.put_user(User::new(id, "Other")).unwrap();
        assert!(matches!(
            first.commit().await,
            Err(LedgerError::WriteConflict)
        ));
    }

    #[tokio::test]
    async fn test_disjoint_transactions_both_commit() {
        let store = InMemoryLedgerStore::new();
        seed(&store, alice()).await;
        seed(&store, User::new(UserId::new("bob"), "Bob")).await;

        let mut t1 = store.begin().await.unwrap();
        let mut t2 = store.begin().await.unwrap();
        let a = t1.user(&UserId::new("alice")).await.unwrap().unwrap();
        let b = t2.user(&UserId::new("bob")).await.unwrap().unwrap();
        t1.put_user(a.with_balance(Balance::new(dec!(1)))).unwrap();
        t2.put_user(b.with_balance(Balance::new(dec!(2)))).unwrap();

        t1.commit().await.unwrap();
        t2.commit().await.unwrap();

        let users = store.users().await.unwrap();
        assert_eq!(users.len(), 2);
    }
}
