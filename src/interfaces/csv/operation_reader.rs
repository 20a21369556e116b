use crate::error::{Result, WalletError};
use crate::interfaces::commands::Command;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Init,
    Check,
    Pay,
}

/// One row of a replay file: `op,arg`.
///
/// `arg` is a space-separated coin list for `init`, an amount for `pay`, and
/// empty for `check`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct OperationRecord {
    pub op: OperationType,
    pub arg: Option<String>,
}

impl TryFrom<OperationRecord> for Command {
    type Error = WalletError;

    fn try_from(record: OperationRecord) -> Result<Self> {
        let arg = record.arg.unwrap_or_default();
        match record.op {
            OperationType::Init => {
                let coins = arg
                    .split_whitespace()
                    .map(|c| {
                        c.parse::<i64>()
                            .map_err(|_| WalletError::invalid(format!("invalid coin {c:?}")))
                    })
                    .collect::<Result<Vec<i64>>>()?;
                Ok(Command::Init { coins })
            }
            OperationType::Check => Ok(Command::Check),
            OperationType::Pay => {
                let amount = arg
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| WalletError::invalid(format!("invalid amount {arg:?}")))?;
                Ok(Command::Pay { amount })
            }
        }
    }
}

/// Reads wallet operations from a CSV source.
///
/// Wraps `csv::Reader`, trimming whitespace and accepting rows with a missing
/// trailing `arg` column.
pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and converts each row into a [`Command`].
    pub fn operations(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize::<OperationRecord>()
            .map(|result| result.map_err(WalletError::from).and_then(Command::try_from))
    }
}
