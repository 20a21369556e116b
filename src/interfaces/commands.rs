use crate::application::engine::PaymentEngine;
use crate::error::{Result, WalletError};
use std::io::Write;
use tracing::warn;

/// A single request against the wallet, as issued from the command line or a replay file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Init { coins: Vec<i64> },
    Check,
    Pay { amount: i64 },
}

fn render_coins(coins: &[u64]) -> String {
    let joined = coins
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("My current coins are [{joined}]")
}

/// Pays `amount`, re-reading and recomputing up to `max_retries` times when
/// another writer advanced the version chain first.
pub async fn pay_with_retries(
    engine: &PaymentEngine,
    amount: i64,
    max_retries: u32,
) -> Result<Vec<u64>> {
    let mut attempt = 0;
    loop {
        match engine.pay(amount).await {
            Err(e) if e.is_retryable() && attempt < max_retries => {
                attempt += 1;
                warn!(attempt, error = %e, "payment lost a race, retrying");
            }
            result => return result,
        }
    }
}

/// Runs `command` and renders the user-facing response.
///
/// Business rejections become response text; only storage and internal failures
/// are returned as errors.
pub async fn execute(engine: &PaymentEngine, command: Command, max_retries: u32) -> Result<String> {
    match command {
        Command::Init { coins } => match engine.initialize(&coins).await {
            Ok(()) => Ok("Success".to_string()),
            Err(e @ (WalletError::InvalidInput(_) | WalletError::AlreadyInitialized)) => {
                Ok(format!("Invalid request: {e}"))
            }
            Err(e) => Err(e),
        },
        Command::Check => Ok(render_coins(&engine.latest().await?)),
        Command::Pay { amount } => match pay_with_retries(engine, amount, max_retries).await {
            Ok(left) => Ok(format!(
                "Successfully paid {amount}\n{}",
                render_coins(&left)
            )),
            Err(
                WalletError::InsufficientFunds { coins, .. } | WalletError::NotInitialized { coins },
            ) => Ok(format!(
                "You do not have sufficient coins to pay {amount}.\n{}",
                render_coins(&coins)
            )),
            Err(e @ (WalletError::InvalidInput(_) | WalletError::ConcurrentModification { .. })) => {
                Ok(format!("Invalid payment: {e}"))
            }
            Err(e) => Err(e),
        },
    }
}

/// Runs every operation in order, writing each response to `out`.
///
/// Unreadable rows and failed operations are reported on stderr and skipped.
/// Returns how many rows were skipped.
pub async fn replay<I, W>(
    engine: &PaymentEngine,
    operations: I,
    max_retries: u32,
    out: &mut W,
) -> Result<usize>
where
    I: IntoIterator<Item = Result<Command>>,
    W: Write,
{
    let mut skipped = 0;
    for op_result in operations {
        match op_result {
            Ok(command) => match execute(engine, command, max_retries).await {
                Ok(response) => writeln!(out, "{}", response)?,
                Err(e) => {
                    skipped += 1;
                    eprintln!("Error processing operation: {}", e);
                }
            },
            Err(e) => {
                skipped += 1;
                eprintln!("Error reading operation: {}", e);
            }
        }
    }
    Ok(skipped)
}
