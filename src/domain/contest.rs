use super::money::Balance;
use super::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContestId(pub String);

impl ContestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A paid contest. Read-only to the ledger once provisioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contest {
    pub id: ContestId,
    pub entry_fee: Balance,
}

impl Contest {
    pub fn new(id: ContestId, entry_fee: Balance) -> Self {
        Self { id, entry_fee }
    }
}

/// Key of a participation record: one per (contest, user) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantKey {
    pub contest_id: ContestId,
    pub user_id: UserId,
}

impl ParticipantKey {
    pub fn new(contest_id: ContestId, user_id: UserId) -> Self {
        Self {
            contest_id,
            user_id,
        }
    }
}

impl fmt::Display for ParticipantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.contest_id, self.user_id)
    }
}

/// Proof that a user paid to enter a contest. Existence is the only state;
/// the record is never updated or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub key: ParticipantKey,
    pub joined_at: DateTime<Utc>,
    /// Denormalized from the user at join time.
    pub name: String,
}
