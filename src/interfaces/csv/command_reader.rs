use crate::application::api::AuthContext;
use crate::application::wallet::PaymentConfirmation;
use crate::domain::contest::ContestId;
use crate::domain::money::MinorUnits;
use crate::domain::user::UserId;
use crate::error::{LedgerError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Order,
    Credit,
    Join,
}

/// One raw row of the command stream. Which columns are required depends on
/// the command type.
#[derive(Debug, Deserialize)]
struct CommandRecord {
    r#type: CommandType,
    user: Option<String>,
    contest: Option<String>,
    order: Option<String>,
    payment: Option<String>,
    signature: Option<String>,
    amount: Option<u64>,
}

/// A caller request replayed from the command stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Order {
        auth: AuthContext,
        amount: MinorUnits,
    },
    Credit {
        auth: AuthContext,
        confirmation: PaymentConfirmation,
    },
    Join {
        auth: AuthContext,
        contest_id: ContestId,
    },
}

fn required(field: Option<String>, name: &str) -> Result<String> {
    field.ok_or_else(|| LedgerError::InvalidRequest(format!("missing `{name}` column")))
}

fn required_amount(amount: Option<u64>) -> Result<u64> {
    amount.ok_or_else(|| LedgerError::InvalidRequest("missing `amount` column".to_string()))
}

impl CommandRecord {
    fn into_command(self) -> Result<Command> {
        // An empty user column stands for a request without an authenticated caller.
        let auth = self
            .user
            .map(|id| AuthContext::authenticated(UserId::new(id)))
            .unwrap_or_default();

        match self.r#type {
            CommandType::Order => Ok(Command::Order {
                auth,
                amount: MinorUnits(required_amount(self.amount)?),
            }),
            CommandType::Credit => Ok(Command::Credit {
                auth,
                confirmation: PaymentConfirmation {
                    order_id: required(self.order, "order")?,
                    payment_id: required(self.payment, "payment")?,
                    signature: required(self.signature, "signature")?,
                    amount: MinorUnits(required_amount(self.amount)?),
                },
            }),
            CommandType::Join => Ok(Command::Join {
                auth,
                contest_id: ContestId::new(required(self.contest, "contest")?),
            }),
        }
    }
}

/// Reads caller commands from a CSV source.
///
/// Header: `type, user, contest, order, payment, signature, amount`. Fields are
/// trimmed and trailing columns may be omitted.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes and validates commands, one row at a time.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize::<CommandRecord>()
            .map(|result| {
                result
                    .map_err(LedgerError::from)
                    .and_then(CommandRecord::into_command)
            })
    }
}
