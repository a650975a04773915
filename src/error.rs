use miette::Diagnostic;
use thiserror::Error;

/// Faults raised by the ledger.
///
/// Business outcomes (verification failed, insufficient funds, already joined)
/// are never represented here; they travel as [`crate::domain::outcome::Outcome`].
#[derive(Error, Diagnostic, Debug)]
pub enum LedgerError {
    #[error("caller is not authenticated")]
    #[diagnostic(code(ledger::unauthenticated))]
    Unauthenticated,

    #[error("{entity} `{id}` not found")]
    #[diagnostic(code(ledger::not_found))]
    NotFound { entity: &'static str, id: String },

    #[error("transaction could not commit after {attempts} attempts")]
    #[diagnostic(
        code(ledger::conflict),
        help("no partial write occurred; the request is safe to retry")
    )]
    Conflict { attempts: u32 },

    /// Raised by a store when a transaction's read-set went stale before commit.
    #[error("write conflict detected at commit")]
    #[diagnostic(code(ledger::write_conflict))]
    WriteConflict,

    #[error("payment gateway error: {0}")]
    #[diagnostic(code(ledger::gateway))]
    Gateway(String),

    #[error("invalid request: {0}")]
    #[diagnostic(code(ledger::invalid_request))]
    InvalidRequest(String),

    #[error("storage error: {0}")]
    #[diagnostic(code(ledger::storage))]
    Storage(String),

    #[error("CSV error: {0}")]
    #[diagnostic(code(ledger::csv))]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(ledger::io))]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    #[diagnostic(code(ledger::serialization))]
    Serialization(#[from] serde_json::Error),
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for LedgerError {
    fn from(err: rocksdb::Error) -> Self {
        match err.kind() {
            rocksdb::ErrorKind::Busy | rocksdb::ErrorKind::TryAgain => Self::WriteConflict,
            _ => Self::Storage(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
