use crate::error::{Result, WalletError};
use std::collections::VecDeque;

/// A positive payment amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(u64);

impl Amount {
    pub fn new(value: i64) -> Result<Self> {
        match u64::try_from(value) {
            Ok(amount) if amount > 0 => Ok(Self(amount)),
            _ => Err(WalletError::invalid("invalid amount")),
        }
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl TryFrom<i64> for Amount {
    type Error = WalletError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

/// The wallet's coins in queue order, with a cached running total.
///
/// Queue order is the order payments consume coins in. It is ascending when the
/// wallet is initialised; afterwards it is whatever the last payment left behind,
/// and is never re-sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoinQueue {
    coins: VecDeque<u64>,
    total: u64,
}

impl CoinQueue {
    /// Builds the initial queue from caller-supplied values, sorted ascending.
    pub fn from_unsorted(values: &[i64]) -> Result<Self> {
        if values.is_empty() {
            return Err(WalletError::invalid("invalid coins"));
        }

        let mut coins = values
            .iter()
            .map(|&v| match u64::try_from(v) {
                Ok(coin) if coin > 0 => Ok(coin),
                _ => Err(WalletError::invalid("invalid coins")),
            })
            .collect::<Result<Vec<u64>>>()?;
        coins.sort_unstable();

        Self::from_ordered(coins)
    }

    /// Parses the stored `1,2,3` encoding. The empty string is an empty queue.
    ///
    /// Accepts only positive decimal integers without sign, whitespace or leading
    /// zeros, separated by single commas.
    pub fn parse(content: &str) -> Result<Self> {
        if content.is_empty() {
            return Ok(Self::default());
        }

        let coins = content
            .split(',')
            .map(parse_coin)
            .collect::<Result<Vec<u64>>>()?;

        Self::from_ordered(coins)
    }

    fn from_ordered(coins: impl IntoIterator<Item = u64>) -> Result<Self> {
        let coins: VecDeque<u64> = coins.into_iter().collect();
        let total = coins
            .iter()
            .try_fold(0u64, |acc, &c| acc.checked_add(c))
            .ok_or_else(|| WalletError::invalid("coin total overflows"))?;
        Ok(Self { coins, total })
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    /// Largest single coin, if any.
    pub fn max_coin(&self) -> Option<u64> {
        self.coins.iter().copied().max()
    }

    pub fn to_vec(&self) -> Vec<u64> {
        self.coins.iter().copied().collect()
    }

    /// Comma-joined encoding in queue order.
    pub fn encode(&self) -> String {
        self.coins
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Greedy ascending consumption.
    ///
    /// Coins are taken from the head of the queue until `amount` is covered. If the
    /// last coin taken is only partly needed, its leftover goes back to the front of
    /// the queue as-is, even when that breaks ascending order.
    pub fn spend(&mut self, amount: Amount) -> Result<()> {
        let amount = amount.value();
        if self.total < amount {
            return Err(WalletError::InsufficientFunds {
                amount,
                coins: self.to_vec(),
            });
        }

        let mut remaining = amount;
        while remaining > 0 {
            let Some(coin) = self.coins.pop_front() else {
                break;
            };
            let used = remaining.min(coin);
            remaining -= used;

            let leftover = coin - used;
            if leftover > 0 {
                self.coins.push_front(leftover);
            }
        }

        self.total -= amount;
        Ok(())
    }
}

fn parse_coin(token: &str) -> Result<u64> {
    let well_formed = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && !token.starts_with('0');
    if !well_formed {
        return Err(WalletError::invalid("invalid record received"));
    }
    token
        .parse::<u64>()
        .map_err(|_| WalletError::invalid("invalid record received"))
}
