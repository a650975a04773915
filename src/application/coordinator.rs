use crate::domain::ports::{LedgerStoreRef, LedgerTransaction};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use std::time::Duration;
use tracing::{debug, warn};

/// A read-then-conditionally-write unit of work.
///
/// `run` may be invoked several times for one logical request, each time on a
/// fresh transaction, so it must derive every decision from what it reads
/// through `tx`.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    type Output: Send;

    /// Short name used in logs.
    const NAME: &'static str;

    async fn run(&self, tx: &mut dyn LedgerTransaction) -> Result<Self::Output>;
}

/// Bounded retry schedule for write conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Jittered exponential delays between attempts, capped at `max_delay`
    /// before jitter. Yields `max_attempts - 1` delays.
    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_attempts.saturating_sub(1) as usize)
            .with_jitter()
    }
}

/// Runs units of work against the ledger store with serializable isolation,
/// re-running them from scratch when the store reports a write conflict.
#[derive(Clone)]
pub struct TransactionCoordinator {
    store: LedgerStoreRef,
    policy: RetryPolicy,
}

impl TransactionCoordinator {
    pub fn new(store: LedgerStoreRef, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// Executes `work` until it commits, fails with a non-conflict error, or
    /// the retry budget runs out ([`LedgerError::Conflict`]).
    pub async fn execute<W: UnitOfWork>(&self, work: &W) -> Result<W::Output> {
        let attempts = self.policy.max_attempts.max(1);
        let attempt = || async { self.attempt(work).await };

        attempt
            .retry(self.policy.backoff())
            .when(|err: &LedgerError| matches!(err, LedgerError::WriteConflict))
            .notify(|_: &LedgerError, delay: Duration| {
                debug!(
                    unit = W::NAME,
                    retry_in_us = delay.as_micros() as u64,
                    "write conflict, retrying"
                );
            })
            .await
            .map_err(|err| match err {
                LedgerError::WriteConflict => {
                    warn!(
                        unit = W::NAME,
                        attempts, "giving up after repeated write conflicts"
                    );
                    LedgerError::Conflict { attempts }
                }
                other => other,
            })
    }

    async fn attempt<W: UnitOfWork>(&self, work: &W) -> Result<W::Output> {
        let mut tx = self.store.begin().await?;
        // An error here drops `tx`, discarding anything staged.
        let output = work.run(&mut *tx).await?;
        tx.commit().await?;
        Ok(output)
    }
}
