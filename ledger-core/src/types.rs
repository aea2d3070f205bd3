//! Core types for the ledger
//!
//! Transactions are encoded as one JSON object per log line, so every
//! type here derives serde and keeps a stable field layout.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker in `Tx::data` for minting transactions
pub const REWARD: &str = "reward";

/// Account identifier (opaque, case-sensitive)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Account(String);

impl Account {
    /// Create new account
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Account {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Balance change recorded in the transaction log
///
/// Immutable once built: fields are private and only readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    from: Account,
    to: Account,
    value: u64,
    #[serde(default)]
    data: String,
}

impl Tx {
    /// Create a transaction
    pub fn new(from: Account, to: Account, value: u64, data: impl Into<String>) -> Self {
        Self {
            from,
            to,
            value,
            data: data.into(),
        }
    }

    /// Plain transfer with empty data
    pub fn transfer(from: impl Into<Account>, to: impl Into<Account>, value: u64) -> Self {
        Self::new(from.into(), to.into(), value, "")
    }

    /// Minting transaction crediting `to` without debiting `from`
    pub fn reward(from: impl Into<Account>, to: impl Into<Account>, value: u64) -> Self {
        Self::new(from.into(), to.into(), value, REWARD)
    }

    /// Sender
    pub fn from(&self) -> &Account {
        &self.from
    }

    /// Receiver
    pub fn to(&self) -> &Account {
        &self.to
    }

    /// Amount moved or minted
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Free-form data
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Whether this transaction mints value
    pub fn is_reward(&self) -> bool {
        self.data == REWARD
    }

    /// Encode as a single log record (no trailing newline)
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Decode a single log record
    pub fn decode(record: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(record)
    }
}

impl fmt::Display for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_reward() {
            write!(f, "reward {} -> {}", self.value, self.to)
        } else {
            write!(f, "{} -> {}: {}", self.from, self.to, self.value)
        }
    }
}

/// SHA-256 digest of the full transaction log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Snapshot([u8; 32]);

impl Snapshot {
    /// Wrap raw digest bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex encoding
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
