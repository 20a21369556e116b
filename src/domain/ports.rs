use super::snapshot::WalletSnapshot;
use crate::error::Result;
use async_trait::async_trait;

/// Append-only chain of wallet snapshots.
///
/// Both writes are conditional and must be atomic with their condition:
/// `init` only succeeds on an empty store, `insert` only while `version - 1` is
/// the head of the chain. A lost race is reported as
/// [`WalletError::ConcurrentModification`](crate::error::WalletError::ConcurrentModification),
/// never as a silent no-op.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Writes the version-1 snapshot.
    async fn init(&self, snapshot: WalletSnapshot) -> Result<()>;
    /// Appends a snapshot with `version > 1` on top of its predecessor.
    async fn insert(&self, snapshot: WalletSnapshot) -> Result<()>;
    /// The snapshot with the highest version, if any.
    async fn latest(&self) -> Result<Option<WalletSnapshot>>;
    /// A specific snapshot by version, if present.
    async fn get(&self, version: u64) -> Result<Option<WalletSnapshot>>;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;
