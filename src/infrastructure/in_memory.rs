use crate::config::WalletConfig;
use crate::domain::ports::LedgerStore;
use crate::domain::snapshot::WalletSnapshot;
use crate::error::{Result, WalletError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A thread-safe in-memory ledger.
///
/// Uses `Arc<RwLock<BTreeMap<u64, WalletSnapshot>>>` so clones share the same chain.
/// Each conditional write checks and inserts under a single write guard.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    config: WalletConfig,
    snapshots: Arc<RwLock<BTreeMap<u64, WalletSnapshot>>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory ledger.
    pub fn new(config: WalletConfig) -> Self {
        Self {
            config,
            snapshots: Arc::default(),
        }
    }

    /// Number of snapshots in the chain.
    pub async fn height(&self) -> usize {
        self.snapshots.read().await.len()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn init(&self, snapshot: WalletSnapshot) -> Result<()> {
        snapshot.check_genesis(&self.config)?;

        let mut snapshots = self.snapshots.write().await;
        if !snapshots.is_empty() {
            return Err(WalletError::AlreadyInitialized);
        }
        debug!(total = snapshot.total, "stored genesis snapshot");
        snapshots.insert(snapshot.version, snapshot);
        Ok(())
    }

    async fn insert(&self, snapshot: WalletSnapshot) -> Result<()> {
        snapshot.check_successor(&self.config)?;

        let mut snapshots = self.snapshots.write().await;
        let head = snapshots.keys().next_back().copied();
        if head != Some(snapshot.version - 1) {
            warn!(version = snapshot.version, ?head, "version chain moved");
            return Err(WalletError::ConcurrentModification {
                version: snapshot.version,
            });
        }
        debug!(version = snapshot.version, total = snapshot.total, "stored snapshot");
        snapshots.insert(snapshot.version, snapshot);
        Ok(())
    }

    async fn latest(&self) -> Result<Option<WalletSnapshot>> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots.values().next_back().cloned())
    }

    async fn get(&self, version: u64) -> Result<Option<WalletSnapshot>> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots.get(&version).cloned())
    }
}
