use super::coordinator::{TransactionCoordinator, UnitOfWork};
use crate::domain::contest::{Contest, ContestId};
use crate::domain::money::Balance;
use crate::domain::ports::LedgerTransaction;
use crate::domain::user::{User, UserId};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct UserFixture {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub wallet_balance: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContestFixture {
    pub id: String,
    pub entry_fee: Decimal,
}

/// Users and contests to make available before serving requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub users: Vec<UserFixture>,
    #[serde(default)]
    pub contests: Vec<ContestFixture>,
}

impl Fixtures {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionReport {
    pub users_created: usize,
    pub contests_created: usize,
}

struct Provision {
    users: Vec<User>,
    contests: Vec<Contest>,
}

#[async_trait]
impl UnitOfWork for Provision {
    type Output = ProvisionReport;
    const NAME: &'static str = "provision";

    async fn run(&self, tx: &mut dyn LedgerTransaction) -> Result<ProvisionReport> {
        let mut report = ProvisionReport::default();
        for user in &self.users {
            if tx.user(&user.id).await?.is_none() {
                tx.put_user(user.clone())?;
                report.users_created += 1;
            }
        }
        for contest in &self.contests {
            if tx.contest(&contest.id).await?.is_none() {
                tx.put_contest(contest.clone())?;
                report.contests_created += 1;
            }
        }
        Ok(report)
    }
}

/// Inserts fixture users and contests that do not exist yet. Existing records
/// are left untouched so re-seeding a persistent store never resets a wallet.
pub async fn provision(
    coordinator: &TransactionCoordinator,
    fixtures: &Fixtures,
) -> Result<ProvisionReport> {
    let users = fixtures
        .users
        .iter()
        .map(|f| -> Result<User> {
            Ok(User::new(UserId::new(&f.id), &f.name)
                .with_balance(Balance::non_negative(f.wallet_balance)?))
        })
        .collect::<Result<Vec<_>>>()?;
    let contests = fixtures
        .contests
        .iter()
        .map(|f| -> Result<Contest> {
            Ok(Contest::new(
                ContestId::new(&f.id),
                Balance::non_negative(f.entry_fee)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    let report = coordinator.execute(&Provision { users, contests }).await?;
    info!(
        users = report.users_created,
        contests = report.contests_created,
        "fixtures provisioned"
    );
    Ok(report)
}
