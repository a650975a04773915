use crate::application::coordinator::RetryPolicy;
use crate::infrastructure::gateway::DEFAULT_BASE_URL;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Replays wallet credits and contest entries through the ledger and prints
/// the resulting wallet balances.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Input commands CSV file
    pub input: PathBuf,

    /// JSON file with users and contests to provision before replaying
    #[arg(long, env = "LEDGER_FIXTURES")]
    pub fixtures: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "LEDGER_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Shared secret used to verify payment gateway signatures
    #[arg(long, env = "LEDGER_GATEWAY_KEY_SECRET", hide_env_values = true)]
    pub key_secret: String,

    /// Gateway key id. Order commands are rejected when it is not set.
    #[arg(long, env = "LEDGER_GATEWAY_KEY_ID")]
    pub key_id: Option<String>,

    /// Base URL of the payment gateway's orders API
    #[arg(long, env = "LEDGER_GATEWAY_URL", default_value = DEFAULT_BASE_URL)]
    pub gateway_url: String,

    /// Gateway request timeout, in milliseconds
    #[arg(long, env = "LEDGER_GATEWAY_TIMEOUT_MS", default_value_t = 10_000)]
    pub gateway_timeout_ms: u64,

    /// Currency of created payment orders
    #[arg(long, env = "LEDGER_CURRENCY", default_value = "INR")]
    pub currency: String,

    /// Maximum attempts per transaction before giving up on write conflicts
    #[arg(long, env = "LEDGER_MAX_ATTEMPTS", default_value_t = 5)]
    pub max_attempts: u32,

    /// Base delay between conflict retries, in milliseconds
    #[arg(long, env = "LEDGER_RETRY_BASE_DELAY_MS", default_value_t = 10)]
    pub retry_base_delay_ms: u64,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "LEDGER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_base_delay(Duration::from_millis(self.retry_base_delay_ms))
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_millis(self.gateway_timeout_ms)
    }
}
