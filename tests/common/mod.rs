#![allow(dead_code)]

use contest_ledger::application::signature::sign;
use std::io::Write;
use tempfile::NamedTempFile;

pub const SECRET: &str = "cli_test_secret";

pub const HEADER: &str = "type, user, contest, order, payment, signature, amount";

/// Writes a fixtures JSON file with two users and two contests.
pub fn fixtures_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "users": [
                {{"id": "alice", "name": "Alice"}},
                {{"id": "bob", "name": "Bob", "wallet_balance": "50"}}
            ],
            "contests": [
                {{"id": "c1", "entry_fee": "100"}},
                {{"id": "c2", "entry_fee": "5"}}
            ]
        }}"#
    )
    .unwrap();
    file
}

/// A `credit` row carrying a valid signature.
pub fn credit(user: &str, order: &str, payment: &str, amount: u64) -> String {
    let signature = sign(order, payment, SECRET.as_bytes());
    format!("credit, {user}, , {order}, {payment}, {signature}, {amount}")
}

pub fn order(user: &str, amount: u64) -> String {
    format!("order, {user}, , , , , {amount}")
}

pub fn join(user: &str, contest: &str) -> String {
    format!("join, {user}, {contest}, , , ,")
}

/// Writes a commands CSV with the standard header followed by `rows`.
pub fn commands_file(rows: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}
