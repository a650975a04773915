//! Application layer containing the ledger's business operations.
//!
//! Every balance mutation runs as a [`coordinator::UnitOfWork`] through the
//! [`coordinator::TransactionCoordinator`], which re-runs it on write conflicts.
//! [`api::LedgerApi`] is the caller-facing entry point.

pub mod api;
pub mod contest;
pub mod coordinator;
pub mod orders;
pub mod provision;
pub mod signature;
pub mod wallet;
