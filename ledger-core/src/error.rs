//! Error types for the ledger

use crate::types::Account;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Genesis or config file missing, unreadable or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transaction log could not be opened, appended, read or hashed
    #[error("Storage error: {context}: {source}")]
    Storage {
        /// What the store was doing
        context: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Sender cannot cover a non-reward transfer
    #[error("Insufficient funds on {account}: need {needed}, have {available}")]
    InsufficientFunds {
        /// Debited account
        account: Account,
        /// Transfer value
        needed: u64,
        /// Balance at the time of the attempt
        available: u64,
    },

    /// Value not representable in the balance range
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Log record could not be decoded during strict replay
    #[error("Malformed record at line {line}: {source}")]
    Decode {
        /// 1-based line number in the log
        line: usize,
        /// JSON decode failure
        #[source]
        source: serde_json::Error,
    },

    /// Log record decoded but could not be applied during strict replay
    #[error("Replay failed at line {line}: {source}")]
    Replay {
        /// 1-based line number in the log
        line: usize,
        /// Apply failure
        #[source]
        source: Box<Error>,
    },

    /// Record encoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Metrics registry setup failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Operation on a state whose log handle was released
    #[error("Ledger state is closed")]
    Closed,
}

impl Error {
    pub(crate) fn storage(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Storage {
            context: context.into(),
            source,
        }
    }

    /// Business-rule rejection that leaves state untouched
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::InsufficientFunds { .. } | Error::InvalidValue(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_message() {
        let err = Error::InsufficientFunds {
            account: Account::new("andrej"),
            needed: 50,
            available: 10,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds on andrej: need 50, have 10"
        );
        assert!(err.is_rejection());
    }

    #[test]
    fn test_replay_wraps_source() {
        let inner = Error::InvalidValue("overflow".to_string());
        let err = Error::Replay {
            line: 3,
            source: Box::new(inner),
        };
        assert!(err.to_string().contains("line 3"));
        assert!(!err.is_rejection());
        assert!(std::error::Error::source(&err).is_some());
    }
}
