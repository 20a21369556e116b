use clap::{Parser, Subcommand};
use coinledger::application::engine::PaymentEngine;
use coinledger::config::{DEFAULT_MAX_DENOMINATION, WalletConfig};
use coinledger::domain::ports::LedgerStoreBox;
use coinledger::infrastructure::in_memory::InMemoryLedgerStore;
use coinledger::interfaces::commands::{Command, execute, replay};
use coinledger::interfaces::csv::operation_reader::OperationReader;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "COINLEDGER_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Largest coin value the ledger accepts.
    #[arg(long, env = "COINLEDGER_MAX_DENOMINATION", default_value_t = DEFAULT_MAX_DENOMINATION)]
    max_denomination: u64,

    /// How many times a payment is recomputed after losing a version race.
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    #[command(subcommand)]
    command: WalletCommand,
}

#[derive(Subcommand)]
enum WalletCommand {
    /// Initialise the wallet with the given coins
    Init {
        #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
        coins: Vec<i64>,
    },
    /// Show the current coins
    Check,
    /// Pay an amount from the wallet
    Pay {
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Apply every operation of an `op,arg` CSV file in order
    Replay { input: PathBuf },
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coinledger=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_store(db_path: Option<PathBuf>, config: WalletConfig) -> Result<LedgerStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            use coinledger::infrastructure::rocksdb::RocksDBLedgerStore;
            let store = RocksDBLedgerStore::open(path, config).into_diagnostic()?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            tracing::warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Box::new(InMemoryLedgerStore::new(config)))
        }
        None => Ok(Box::new(InMemoryLedgerStore::new(config))),
    }
}

async fn respond(engine: &PaymentEngine, command: Command, max_retries: u32) -> Result<()> {
    let response = execute(engine, command, max_retries).await.into_diagnostic()?;
    println!("{}", response);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = WalletConfig::new(cli.max_denomination).into_diagnostic()?;
    let engine = PaymentEngine::new(open_store(cli.db_path, config)?);

    let max_retries = cli.max_retries;

    match cli.command {
        WalletCommand::Init { coins } => {
            respond(&engine, Command::Init { coins }, max_retries).await?
        }
        WalletCommand::Check => respond(&engine, Command::Check, max_retries).await?,
        WalletCommand::Pay { amount } => {
            respond(&engine, Command::Pay { amount }, max_retries).await?
        }
        WalletCommand::Replay { input } => {
            // Process operations as they are read; failed rows are reported and skipped.
            let file = File::open(input).into_diagnostic()?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            replay(&engine, OperationReader::new(file).operations(), max_retries, &mut out)
                .await
                .into_diagnostic()?;
        }
    }

    Ok(())
}
