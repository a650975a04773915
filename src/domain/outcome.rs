use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinStatus {
    Success,
    AlreadyJoined,
    InsufficientFunds,
}

/// Result of a business operation that completed without a fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome<S> {
    pub status: S,
    pub message: String,
}

impl<S> Outcome<S> {
    pub fn new(status: S, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

pub type CreditOutcome = Outcome<CreditStatus>;
pub type JoinOutcome = Outcome<JoinStatus>;

impl CreditOutcome {
    pub fn credited() -> Self {
        Self::new(CreditStatus::Success, "Wallet updated successfully!")
    }

    pub fn already_processed() -> Self {
        Self::new(CreditStatus::Success, "Payment already processed.")
    }

    pub fn verification_failed() -> Self {
        Self::new(CreditStatus::Failed, "Payment verification failed.")
    }
}

impl JoinOutcome {
    pub fn joined() -> Self {
        Self::new(JoinStatus::Success, "Successfully joined the contest!")
    }

    pub fn already_joined() -> Self {
        Self::new(
            JoinStatus::AlreadyJoined,
            "You have already joined this contest.",
        )
    }

    pub fn insufficient_funds() -> Self {
        Self::new(
            JoinStatus::InsufficientFunds,
            "Insufficient balance. Please add money to your wallet.",
        )
    }
}
