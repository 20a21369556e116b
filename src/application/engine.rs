use crate::domain::coins::{Amount, CoinQueue};
use crate::domain::ports::LedgerStoreBox;
use crate::domain::snapshot::WalletSnapshot;
use crate::error::{Result, WalletError};
use tracing::{debug, info};

/// Externally visible wallet states. There is no way back to `Uninitialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletState {
    Uninitialized,
    Active,
}

/// The main entry point for wallet operations.
///
/// `PaymentEngine` turns a request plus the latest snapshot into the next
/// snapshot and writes it through the injected ledger store. It holds no state of
/// its own; concurrent engines over one store are kept consistent by the store's
/// conditional writes, and a lost race is returned to the caller, not retried.
pub struct PaymentEngine {
    store: LedgerStoreBox,
}

impl PaymentEngine {
    /// Creates a new `PaymentEngine` over the given ledger store.
    pub fn new(store: LedgerStoreBox) -> Self {
        Self { store }
    }

    /// Stores the version-1 snapshot holding `coins` in ascending order.
    pub async fn initialize(&self, coins: &[i64]) -> Result<()> {
        let coins = CoinQueue::from_unsorted(coins)?;
        let genesis = WalletSnapshot::genesis(&coins);
        let total = genesis.total;

        self.store.init(genesis).await?;
        info!(total, coins = coins.len(), "wallet initialised");
        Ok(())
    }

    /// The current coins in queue order, or nothing if the wallet was never initialised.
    pub async fn latest(&self) -> Result<Vec<u64>> {
        match self.store.latest().await? {
            Some(snapshot) => Ok(snapshot.coins()?.to_vec()),
            None => Ok(Vec::new()),
        }
    }

    /// The latest snapshot itself, including its version.
    pub async fn latest_snapshot(&self) -> Result<Option<WalletSnapshot>> {
        self.store.latest().await
    }

    pub async fn state(&self) -> Result<WalletState> {
        Ok(match self.store.latest().await? {
            Some(_) => WalletState::Active,
            None => WalletState::Uninitialized,
        })
    }

    /// Pays `amount` from the wallet and returns the coins left afterwards.
    ///
    /// Fails without writing when the amount is not positive, the wallet is not
    /// initialised, or the funds are insufficient; the last two carry the current
    /// coins.
    pub async fn pay(&self, amount: i64) -> Result<Vec<u64>> {
        let amount = Amount::new(amount)?;

        let latest = self
            .store
            .latest()
            .await?
            .ok_or(WalletError::NotInitialized { coins: Vec::new() })?;
        let mut coins = latest.coins()?;

        if latest.total < amount.value() {
            return Err(WalletError::InsufficientFunds {
                amount: amount.value(),
                coins: coins.to_vec(),
            });
        }

        coins.spend(amount)?;
        let next = latest.successor(&coins);
        debug!(
            version = next.version,
            amount = amount.value(),
            total = next.total,
            "paying"
        );

        self.store.insert(next).await?;
        Ok(coins.to_vec())
    }
}
