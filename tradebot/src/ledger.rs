//! # ledger — Append-only trade log
//!
//! One line per executed trade:
//!
//! ```text
//! Action: BUY | Price: 100.00 | Balance: 9895.00 | Stocks held: 1
//! ```
//!
//! The file is opened in append mode and never truncated, so successive
//! runs keep adding to the same log.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::TradeRecord;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to open trade log {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to append to trade log: {0}")]
    Write(#[from] io::Error),
}

/// Durable destination for executed trades, written in creation order.
pub trait TradeSink: Send {
    fn record(&mut self, trade: &TradeRecord) -> Result<(), LedgerError>;
}

pub struct FileTradeLog {
    path: PathBuf,
    file: File,
}

impl FileTradeLog {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LedgerError::Open { path: path.clone(), source })?;

        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TradeSink for FileTradeLog {
    fn record(&mut self, trade: &TradeRecord) -> Result<(), LedgerError> {
        writeln!(self.file, "{}", trade.ledger_line())?;
        self.file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TradeAction;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir().join(format!("tradebot-ledger-{}.txt", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_file_log_appends_lines_across_reopen() {
        let path = scratch_path();

        {
            let mut log = FileTradeLog::open(&path).unwrap();
            assert_eq!(log.path(), path.as_path());
            log.record(&TradeRecord::new(TradeAction::Buy, 100.0, 9_895.0, 1)).unwrap();
        }
        {
            let mut log = FileTradeLog::open(&path).unwrap();
            log.record(&TradeRecord::new(TradeAction::Sell, 120.0, 10_010.0, 0)).unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(
            contents,
            "Action: BUY | Price: 100.00 | Balance: 9895.00 | Stocks held: 1\n\
             Action: SELL | Price: 120.00 | Balance: 10010.00 | Stocks held: 0\n"
        );
    }

    #[test]
    fn test_open_reports_missing_directory() {
        let path = std::env::temp_dir()
            .join(format!("tradebot-missing-{}", uuid::Uuid::new_v4()))
            .join("trade_log.txt");

        match FileTradeLog::open(&path) {
            Err(LedgerError::Open { path: reported, .. }) => assert_eq!(reported, path),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opening inside a missing directory should fail"),
        }
    }
}
