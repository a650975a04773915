use clap::Parser;
use contest_ledger::application::api::LedgerApi;
use contest_ledger::application::coordinator::TransactionCoordinator;
use contest_ledger::application::provision::{Fixtures, provision};
use contest_ledger::application::signature::SignatureVerifier;
use contest_ledger::config::Config;
use contest_ledger::domain::ports::{LedgerStore, LedgerStoreRef};
use contest_ledger::error::Result as LedgerResult;
use contest_ledger::infrastructure::gateway::RazorpayGateway;
use contest_ledger::infrastructure::in_memory::InMemoryLedgerStore;
use contest_ledger::interfaces::csv::balance_writer::BalanceWriter;
use contest_ledger::interfaces::csv::command_reader::{Command, CommandReader};
use contest_ledger::telemetry::init_tracing;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<&Path>) -> LedgerResult<LedgerStoreRef> {
    use contest_ledger::infrastructure::rocksdb::RocksDBStore;

    let store: LedgerStoreRef = match db_path {
        Some(path) => {
            info!(path = %path.display(), "using persistent RocksDB storage");
            Arc::new(RocksDBStore::open(path)?)
        }
        None => Arc::new(InMemoryLedgerStore::new()),
    };
    Ok(store)
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<&Path>) -> LedgerResult<LedgerStoreRef> {
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not \
             enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Arc::new(InMemoryLedgerStore::new()))
}

async fn dispatch(api: &LedgerApi, command: Command) -> LedgerResult<()> {
    match command {
        Command::Order { auth, amount } => {
            let created = api.create_order(&auth, amount).await?;
            info!(
                order = %created.order.id,
                amount = %created.order.amount,
                currency = %created.order.currency,
                "order"
            );
        }
        Command::Credit { auth, confirmation } => {
            let outcome = api.verify_and_credit(&auth, &confirmation).await?;
            info!(
                order = %confirmation.order_id,
                payment = %confirmation.payment_id,
                status = ?outcome.status,
                message = %outcome.message,
                "credit"
            );
        }
        Command::Join { auth, contest_id } => {
            let outcome = api.join_contest(&auth, &contest_id).await?;
            info!(
                contest = %contest_id,
                status = ?outcome.status,
                message = %outcome.message,
                "join"
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();
    init_tracing(&config.log_level);

    let store = open_store(config.db_path.as_deref())?;
    let policy = config.retry_policy();

    if let Some(path) = &config.fixtures {
        let fixtures = Fixtures::from_path(path)?;
        let coordinator = TransactionCoordinator::new(Arc::clone(&store), policy);
        provision(&coordinator, &fixtures).await?;
    }

    let mut api = LedgerApi::new(
        Arc::clone(&store),
        SignatureVerifier::new(config.key_secret.as_bytes()),
        policy,
    );
    if let Some(key_id) = &config.key_id {
        let gateway = RazorpayGateway::new(
            &config.gateway_url,
            key_id,
            &config.key_secret,
            config.gateway_timeout(),
        )?;
        api = api.with_gateway(Arc::new(gateway), &config.currency);
    }

    // Process commands
    let file = File::open(&config.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for command in reader.commands() {
        match command {
            Ok(command) => {
                if let Err(e) = dispatch(&api, command).await {
                    error!(error = %e, "Error processing command");
                }
            }
            Err(e) => {
                error!(error = %e, "Error reading command");
            }
        }
    }

    // Output final state
    let users = store.users().await?;
    let stdout = io::stdout();
    let mut writer = BalanceWriter::new(stdout.lock());
    writer.write_users(&users)?;

    Ok(())
}
