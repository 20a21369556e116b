use crate::error::{Result, WalletError};

/// Largest denomination accepted by the reference coin encoding.
pub const DEFAULT_MAX_DENOMINATION: u64 = 8;

/// Static parameters shared by the ledger store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletConfig {
    /// Upper bound (inclusive) on a single coin's value.
    pub max_denomination: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            max_denomination: DEFAULT_MAX_DENOMINATION,
        }
    }
}

impl WalletConfig {
    pub fn new(max_denomination: u64) -> Result<Self> {
        if max_denomination == 0 {
            return Err(WalletError::invalid("max denomination must be positive"));
        }
        Ok(Self { max_denomination })
    }
}
