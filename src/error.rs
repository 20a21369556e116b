use thiserror::Error;

/// Errors surfaced by the payment engine and the ledger stores.
///
/// Business rejections (`InsufficientFunds`, `NotInitialized`) carry the best-known
/// coin list so callers can render the wallet without a second read.
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("wallet already initialised")]
    AlreadyInitialized,
    #[error("wallet not initialised")]
    NotInitialized { coins: Vec<u64> },
    #[error("insufficient fund to pay {amount}")]
    InsufficientFunds { amount: u64, coins: Vec<u64> },
    #[error("version {version} already updated")]
    ConcurrentModification { version: u64 },
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    Storage(#[from] rocksdb::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl WalletError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    /// Only a lost race on the version chain is worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }

    /// The coin list attached to a business rejection, if any.
    pub fn coins(&self) -> Option<&[u64]> {
        match self {
            Self::NotInitialized { coins } | Self::InsufficientFunds { coins, .. } => Some(coins),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;
