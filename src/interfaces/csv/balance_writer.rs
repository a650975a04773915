use crate::domain::user::User;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct BalanceRow<'a> {
    user: &'a str,
    name: &'a str,
    wallet_balance: String,
}

/// Writes wallet balances as CSV: `user,name,wallet_balance`.
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_users(&mut self, users: &[User]) -> Result<()> {
        for user in users {
            self.writer.serialize(BalanceRow {
                user: user.id.as_str(),
                name: &user.name,
                wallet_balance: user.wallet_balance.to_string(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
