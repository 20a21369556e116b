use crate::config::WalletConfig;
use crate::domain::ports::LedgerStore;
use crate::domain::snapshot::WalletSnapshot;
use crate::error::{Result, WalletError};
use async_trait::async_trait;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, ErrorKind, IteratorMode, Options, TransactionDB,
    TransactionDBOptions,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Column Family holding the snapshot chain, keyed by big-endian version.
pub const CF_SNAPSHOTS: &str = "snapshots";

/// A persistent ledger backed by a RocksDB `TransactionDB`.
///
/// Conditional writes run inside a pessimistic transaction that locks the keys
/// the condition depends on, so the check and the put commit together.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<TransactionDB>`).
#[derive(Clone)]
pub struct RocksDBLedgerStore {
    config: WalletConfig,
    db: Arc<TransactionDB>,
}

fn key(version: u64) -> [u8; 8] {
    version.to_be_bytes()
}

fn internal(message: impl Into<String>) -> WalletError {
    WalletError::InternalError(Box::new(std::io::Error::other(message.into())))
}

/// Lock contention inside a transaction means another writer got there first.
fn txn_error(err: rocksdb::Error, version: u64) -> WalletError {
    match err.kind() {
        ErrorKind::Busy | ErrorKind::TimedOut | ErrorKind::TryAgain => {
            WalletError::ConcurrentModification { version }
        }
        _ => WalletError::Storage(err),
    }
}

impl RocksDBLedgerStore {
    /// Opens or creates a ledger at the specified path.
    ///
    /// Ensures that the "snapshots" column family exists.
    pub fn open<P: AsRef<Path>>(path: P, config: WalletConfig) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_snapshots = ColumnFamilyDescriptor::new(CF_SNAPSHOTS, Options::default());
        let db = TransactionDB::open_cf_descriptors(
            &opts,
            &TransactionDBOptions::default(),
            path,
            vec![cf_snapshots],
        )?;

        Ok(Self {
            config,
            db: Arc::new(db),
        })
    }

    fn snapshots_cf(&self) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(CF_SNAPSHOTS)
            .ok_or_else(|| internal("Snapshots column family not found"))
    }

    fn decode(bytes: &[u8]) -> Result<WalletSnapshot> {
        serde_json::from_slice(bytes).map_err(|e| {
            WalletError::InternalError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Deserialization error: {}", e),
            )))
        })
    }

    /// Puts `snapshot` only if the chain head is exactly its predecessor
    /// (or, for the genesis record, only if there is no chain yet).
    fn append(&self, snapshot: &WalletSnapshot) -> Result<()> {
        let cf = self.snapshots_cf()?;
        let version = snapshot.version;
        let value = serde_json::to_vec(snapshot).map_err(|e| {
            WalletError::InternalError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization error: {}", e),
            )))
        })?;

        let txn = self.db.transaction();
        if version == WalletSnapshot::GENESIS_VERSION {
            // The chain is gapless from 1, so an absent version 1 means an empty ledger.
            let existing = txn
                .get_for_update_cf(cf, key(version), true)
                .map_err(|e| txn_error(e, version))?;
            if existing.is_some() {
                return Err(WalletError::AlreadyInitialized);
            }
        } else {
            let predecessor = txn
                .get_for_update_cf(cf, key(version - 1), true)
                .map_err(|e| txn_error(e, version))?;
            let taken = txn
                .get_for_update_cf(cf, key(version), true)
                .map_err(|e| txn_error(e, version))?;
            if predecessor.is_none() || taken.is_some() {
                warn!(version, "version chain moved");
                return Err(WalletError::ConcurrentModification { version });
            }
        }

        txn.put_cf(cf, key(version), value)
            .map_err(|e| txn_error(e, version))?;
        txn.commit().map_err(|e| txn_error(e, version))?;

        debug!(version, total = snapshot.total, "stored snapshot");
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for RocksDBLedgerStore {
    async fn init(&self, snapshot: WalletSnapshot) -> Result<()> {
        snapshot.check_genesis(&self.config)?;
        self.append(&snapshot)
    }

    async fn insert(&self, snapshot: WalletSnapshot) -> Result<()> {
        snapshot.check_successor(&self.config)?;
        self.append(&snapshot)
    }

    async fn latest(&self) -> Result<Option<WalletSnapshot>> {
        let cf = self.snapshots_cf()?;
        let mut iter = self.db.iterator_cf(cf, IteratorMode::End);

        match iter.next() {
            Some(item) => {
                let (_key, value) = item?;
                Ok(Some(Self::decode(&value)?))
            }
            None => Ok(None),
        }
    }

    async fn get(&self, version: u64) -> Result<Option<WalletSnapshot>> {
        let cf = self.snapshots_cf()?;
        match self.db.get_cf(cf, key(version))? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::engine::PaymentEngine;
    use tempfile::tempdir;

    fn snapshot(version: u64, content: &str, total: u64) -> WalletSnapshot {
        WalletSnapshot {
            version,
            ts_millis: 0,
            content: content.to_string(),
            total,
        }
    }

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBLedgerStore::open(dir.path(), WalletConfig::default())
            .expect("Failed to open RocksDB");

        assert!(store.db.cf_handle(CF_SNAPSHOTS).is_some());
        assert!(store.latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rocksdb_chain() {
        let dir = tempdir().unwrap();
        let store = RocksDBLedgerStore::open(dir.path(), WalletConfig::default()).unwrap();

        store.init(snapshot(1, "1,2,3", 6)).await.unwrap();
        store.insert(snapshot(2, "2,3", 5)).await.unwrap();
        store.insert(snapshot(3, "", 0)).await.unwrap();

        assert_eq!(store.latest().await.unwrap().unwrap(), snapshot(3, "", 0));
        assert_eq!(store.get(2).await.unwrap().unwrap(), snapshot(2, "2,3", 5));
        assert!(store.get(4).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rocksdb_latest_orders_numerically() {
        let dir = tempdir().unwrap();
        let store = RocksDBLedgerStore::open(dir.path(), WalletConfig::default()).unwrap();

        store.init(snapshot(1, "8,8,8", 24)).await.unwrap();
        for version in 2..=300u64 {
            let prev = store.latest().await.unwrap().unwrap();
            let content = if prev.total == 24 { "8,8,7" } else { "8,8,8" };
            let total = if prev.total == 24 { 23 } else { 24 };
            store.insert(snapshot(version, content, total)).await.unwrap();
        }
        assert_eq!(store.latest().await.unwrap().unwrap().version, 300);
    }

    #[tokio::test]
    async fn test_rocksdb_conflicts() {
        let dir = tempdir().unwrap();
        let store = RocksDBLedgerStore::open(dir.path(), WalletConfig::default()).unwrap();

        let err = store.insert(snapshot(2, "2,3", 5)).await.unwrap_err();
        assert!(matches!(
            err,
            WalletError::ConcurrentModification { version: 2 }
        ));

        store.init(snapshot(1, "1,2,3", 6)).await.unwrap();
        let err = store.init(snapshot(1, "1", 1)).await.unwrap_err();
        assert!(matches!(err, WalletError::AlreadyInitialized));

        store.insert(snapshot(2, "2,3", 5)).await.unwrap();
        let err = store.insert(snapshot(2, "1,2", 3)).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(store.get(2).await.unwrap().unwrap().content, "2,3");
    }

    #[tokio::test]
    async fn test_rocksdb_persists_across_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = RocksDBLedgerStore::open(dir.path(), WalletConfig::default()).unwrap();
            store.init(snapshot(1, "1,2,3", 6)).await.unwrap();
            store.insert(snapshot(2, "2,3", 5)).await.unwrap();
        }

        let store = RocksDBLedgerStore::open(dir.path(), WalletConfig::default()).unwrap();
        assert_eq!(store.latest().await.unwrap().unwrap(), snapshot(2, "2,3", 5));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_rocksdb_concurrent_payers_keep_a_gapless_chain() {
        let dir = tempdir().unwrap();
        let store = RocksDBLedgerStore::open(dir.path(), WalletConfig::default()).unwrap();
        PaymentEngine::new(Box::new(store.clone()))
            .initialize(&[8; 32])
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..64 {
            let engine = PaymentEngine::new(Box::new(store.clone()));
            handles.push(tokio::spawn(async move { engine.pay(1).await }));
        }

        let mut paid = 0u64;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => paid += 1,
                Err(e) => assert!(e.is_retryable(), "unexpected error: {e}"),
            }
        }

        let latest = store.latest().await.unwrap().unwrap();
        assert!(paid >= 1);
        assert_eq!(latest.version, 1 + paid);
        assert_eq!(latest.total, 256 - paid);
        assert_eq!(latest.coins().unwrap().total(), latest.total);

        let mut expected_total = 256;
        for version in 1..=latest.version {
            let snapshot = store.get(version).await.unwrap().unwrap();
            assert_eq!(snapshot.total, expected_total);
            expected_total -= 1;
        }
    }
}
