use super::coins::CoinQueue;
use crate::config::WalletConfig;
use crate::error::{Result, WalletError};
use serde::{Deserialize, Serialize};

/// One immutable, versioned record of the full wallet state.
///
/// The snapshot with the highest version is the current wallet. `version` doubles
/// as the optimistic-concurrency token: a successor is only accepted while its
/// predecessor is still the head of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    pub version: u64,
    pub ts_millis: i64,
    /// Comma-joined coin values in queue order.
    pub content: String,
    /// Always the sum of `content`.
    pub total: u64,
}

impl WalletSnapshot {
    pub const GENESIS_VERSION: u64 = 1;

    /// The version-1 snapshot for a freshly initialised wallet.
    pub fn genesis(coins: &CoinQueue) -> Self {
        Self::at(Self::GENESIS_VERSION, coins)
    }

    /// The snapshot that follows `self` once `coins` is the new wallet content.
    pub fn successor(&self, coins: &CoinQueue) -> Self {
        Self::at(self.version + 1, coins)
    }

    fn at(version: u64, coins: &CoinQueue) -> Self {
        Self {
            version,
            ts_millis: chrono::Utc::now().timestamp_millis(),
            content: coins.encode(),
            total: coins.total(),
        }
    }

    /// Decodes the stored coin queue, checking it against the cached total.
    pub fn coins(&self) -> Result<CoinQueue> {
        let coins = CoinQueue::parse(&self.content)?;
        if coins.total() != self.total {
            return Err(WalletError::InternalError(
                format!(
                    "snapshot {} total {} does not match its coins ({})",
                    self.version,
                    self.total,
                    coins.total()
                )
                .into(),
            ));
        }
        Ok(coins)
    }

    /// Write-time checks for the first snapshot of the chain.
    pub fn check_genesis(&self, config: &WalletConfig) -> Result<()> {
        let coins = self.check_content(config)?;
        if coins.is_empty() {
            return Err(WalletError::invalid("invalid record received"));
        }
        if self.version != Self::GENESIS_VERSION {
            return Err(WalletError::invalid("invalid version"));
        }
        Ok(())
    }

    /// Write-time checks for any later snapshot. An empty wallet is allowed here.
    pub fn check_successor(&self, config: &WalletConfig) -> Result<()> {
        self.check_content(config)?;
        if self.version <= Self::GENESIS_VERSION {
            return Err(WalletError::invalid("invalid version"));
        }
        Ok(())
    }

    fn check_content(&self, config: &WalletConfig) -> Result<CoinQueue> {
        let coins = CoinQueue::parse(&self.content)?;
        if coins
            .max_coin()
            .is_some_and(|coin| coin > config.max_denomination)
        {
            return Err(WalletError::invalid("invalid record received"));
        }
        if coins.total() != self.total {
            return Err(WalletError::invalid("record total does not match content"));
        }
        Ok(coins)
    }
}
