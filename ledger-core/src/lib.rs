//! DRY Ledger
//!
//! Single-writer token ledger: genesis balances plus an append-only,
//! newline-delimited JSON transaction log, fingerprinted by a SHA-256
//! snapshot of the whole log.
//!
//! # Architecture
//!
//! - **Event Sourcing**: balances are derived from genesis and the log
//! - **Single Writer**: `&mut State` is the only way to mutate
//! - **Pending Pool**: applied in memory first, flushed on `persist`
//! - **Snapshot**: full-log digest after every flushed record
//!
//! # Invariants
//!
//! - Conservation: Σ(balances) == Σ(genesis) + Σ(rewards minted)
//! - Deterministic replay: same genesis and log → same balances
//! - Append-only: records are never modified or removed

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod storage;
pub mod state;
pub mod genesis;
pub mod crypto;
pub mod error;
pub mod config;
pub mod metrics;

// Re-exports
pub use config::{Config, ReplayMode};
pub use error::{Error, Result};
pub use genesis::Genesis;
pub use state::{Balances, State};
pub use types::{Account, Snapshot, Tx};
