use super::coordinator::{TransactionCoordinator, UnitOfWork};
use crate::domain::contest::{ContestId, Participant, ParticipantKey};
use crate::domain::outcome::JoinOutcome;
use crate::domain::ports::LedgerTransaction;
use crate::domain::user::UserId;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument};

/// Charges a contest's entry fee against the user's wallet and registers the
/// participation, atomically.
#[derive(Clone)]
pub struct ContestEntryService {
    coordinator: TransactionCoordinator,
}

struct JoinContest {
    key: ParticipantKey,
}

#[async_trait]
impl UnitOfWork for JoinContest {
    type Output = JoinOutcome;
    const NAME: &'static str = "join_contest";

    async fn run(&self, tx: &mut dyn LedgerTransaction) -> Result<JoinOutcome> {
        let ParticipantKey {
            contest_id,
            user_id,
        } = &self.key;

        let user = tx.user(user_id).await?;
        let contest = tx.contest(contest_id).await?;
        let participant = tx.participant(&self.key).await?;

        let mut user = user.ok_or_else(|| LedgerError::not_found("user", user_id))?;
        let contest = contest.ok_or_else(|| LedgerError::not_found("contest", contest_id))?;

        if participant.is_some() {
            return Ok(JoinOutcome::already_joined());
        }

        let Some(remaining) = user.wallet_balance.checked_sub(contest.entry_fee) else {
            return Ok(JoinOutcome::insufficient_funds());
        };

        user.wallet_balance = remaining;
        tx.put_participant(Participant {
            key: self.key.clone(),
            joined_at: Utc::now(),
            name: user.name.clone(),
        })?;
        tx.put_user(user)?;
        Ok(JoinOutcome::joined())
    }
}

impl ContestEntryService {
    pub fn new(coordinator: TransactionCoordinator) -> Self {
        Self { coordinator }
    }

    /// Joins `contest_id` on behalf of `user_id`.
    ///
    /// Returns `already_joined` or `insufficient_funds` without writing
    /// anything when those apply; fails with `NotFound` if either the user or
    /// the contest does not exist.
    #[instrument(skip(self, user_id, contest_id), fields(user = %user_id, contest = %contest_id))]
    pub async fn join_contest(
        &self,
        user_id: &UserId,
        contest_id: &ContestId,
    ) -> Result<JoinOutcome> {
        let work = JoinContest {
            key: ParticipantKey::new(contest_id.clone(), user_id.clone()),
        };
        let outcome = self.coordinator.execute(&work).await?;
        info!(status = ?outcome.status, "join processed");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::coordinator::RetryPolicy;
    use crate::domain::contest::Contest;
    use crate::domain::money::Balance;
    use crate::domain::outcome::JoinStatus;
    use crate::domain::ports::LedgerStore;
    use crate::domain::user::User;
    use crate::infrastructure::in_memory::InMemoryLedgerStore;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::time::Duration;

    async fn setup(
        balance: Decimal,
        entry_fee: Decimal,
    ) -> (ContestEntryService, InMemoryLedgerStore) {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.put_user(User::new(UserId::new("alice"), "Alice").with_balance(Balance::new(balance)))
            .unwrap();
        tx.put_contest(Contest::new(ContestId::new("c1"), Balance::new(entry_fee)))
            .unwrap();
        tx.commit().await.unwrap();

        let policy = RetryPolicy::default().with_base_delay(Duration::from_micros(100));
        let coordinator = TransactionCoordinator::new(Arc::new(store.clone()), policy);
        (ContestEntryService::new(coordinator), store)
    }

    async fn snapshot(store: &InMemoryLedgerStore) -> (Balance, Option<Participant>) {
        let mut tx = store.begin().await.unwrap();
        let user = tx.user(&UserId::new("alice")).await.unwrap().unwrap();
        let participant = tx
            .participant(&ParticipantKey::new(ContestId::new("c1"), UserId::new("alice")))
            .await
            .unwrap();
        (user.wallet_balance, participant)
    }

    #[tokio::test]
    async fn test_join_deducts_fee_and_registers() {
        let (service, store) = setup(dec!(150), dec!(100)).await;

        let outcome = service
            .join_contest(&UserId::new("alice"), &ContestId::new("c1"))
            .await
            .unwrap();

        assert_eq!(outcome, JoinOutcome::joined());
        let (balance, participant) = snapshot(&store).await;
        assert_eq!(balance, Balance::new(dec!(50)));
        assert_eq!(participant.unwrap().name, "Alice");
    }

    #[tokio::test]
    async fn test_exact_balance_can_join() {
        let (service, store) = setup(dec!(100), dec!(100)).await;
        let outcome = service
            .join_contest(&UserId::new("alice"), &ContestId::new("c1"))
            .await
            .unwrap();
        assert_eq!(outcome.status, JoinStatus::Success);
        assert_eq!(snapshot(&store).await.0, Balance::ZERO);
    }

    #[tokio::test]
    async fn test_insufficient_funds_is_a_no_op() {
        let (service, store) = setup(dec!(50), dec!(100)).await;

        let outcome = service
            .join_contest(&UserId::new("alice"), &ContestId::new("c1"))
            .await
            .unwrap();

        assert_eq!(outcome, JoinOutcome::insufficient_funds());
        let (balance, participant) = snapshot(&store).await;
        assert_eq!(balance, Balance::new(dec!(50)));
        assert!(participant.is_none());
    }

    #[tokio::test]
    async fn test_second_join_is_already_joined() {
        let (service, store) = setup(dec!(300), dec!(100)).await;
        let alice = UserId::new("alice");
        let c1 = ContestId::new("c1");

        service.join_contest(&alice, &c1).await.unwrap();
        let again = service.join_contest(&alice, &c1).await.unwrap();

        assert_eq!(again, JoinOutcome::already_joined());
        assert_eq!(snapshot(&store).await.0, Balance::new(dec!(200)));
    }

    #[tokio::test]
    async fn test_missing_user_or_contest_is_not_found() {
        let (service, store) = setup(dec!(300), dec!(100)).await;

        let missing_user = service
            .join_contest(&UserId::new("ghost"), &ContestId::new("c1"))
            .await;
        assert!(matches!(
            missing_user,
            Err(LedgerError::NotFound { entity: "user", .. })
        ));

        let missing_contest = service
            .join_contest(&UserId::new("alice"), &ContestId::new("nope"))
            .await;
        assert!(matches!(
            missing_contest,
            Err(LedgerError::NotFound {
                entity: "contest",
                ..
            })
        ));

        assert_eq!(snapshot(&store).await.0, Balance::new(dec!(300)));
    }

    #[tokio::test]
    async fn test_free_contest_joins_with_empty_wallet() {
        let (service, store) = setup(dec!(0), dec!(0)).await;
        let outcome = service
            .join_contest(&UserId::new("alice"), &ContestId::new("c1"))
            .await
            .unwrap();
        assert_eq!(outcome.status, JoinStatus::Success);
        assert!(snapshot(&store).await.1.is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_joins_charge_once() {
        let (service, store) = setup(dec!(1000), dec!(100)).await;

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .join_contest(&UserId::new("alice"), &ContestId::new("c1"))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut joined = 0;
        for handle in handles {
            let outcome = handle.await.unwrap();
            match outcome.status {
                JoinStatus::Success => joined += 1,
                JoinStatus::AlreadyJoined => {}
                JoinStatus::InsufficientFunds => panic!("balance covers one entry"),
            }
        }

        assert_eq!(joined, 1);
        let (balance, participant) = snapshot(&store).await;
        assert_eq!(balance, Balance::new(dec!(900)));
        assert!(participant.is_some());
    }
}
