//! Snapshot hashing
//!
//! A snapshot is a plain SHA-256 over every byte of the transaction log.
//! It is recomputed from scratch after each appended record, so its cost
//! grows linearly with the log. Switching to an incremental hash would
//! change the observable value and is deliberately not done.

use crate::types::Snapshot;
use sha2::{Digest, Sha256};

/// Hash the full log content
pub fn snapshot_of(log_bytes: &[u8]) -> Snapshot {
    let mut hasher = Sha256::new();
    hasher.update(log_bytes);
    Snapshot::from_bytes(hasher.finalize().into())
}
