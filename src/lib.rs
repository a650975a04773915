//! A transactional wallet ledger: credits wallets from verified payment
//! gateway confirmations and charges contest entry fees, with every balance
//! change committed through an optimistic, retrying transaction.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod telemetry;
