//! Ledger state machine
//!
//! Balances are derived from genesis plus the ordered transaction log.
//! `add` applies a transaction in memory and queues it; `persist` drains
//! the queue into the log, re-hashing the whole log after every record.
//!
//! # Example
//!
//! ```no_run
//! use dry_ledger::{Config, State, Tx};
//!
//! fn main() -> dry_ledger::Result<()> {
//!     let mut state = State::new_from_disk(&Config::default())?;
//!
//!     state.add(Tx::transfer("andrej", "babayaga", 30))?;
//!     let snapshot = state.persist()?;
//!     println!("{snapshot}");
//!
//!     state.close();
//!     Ok(())
//! }
//! ```

use crate::{
    config::ReplayMode,
    crypto::snapshot_of,
    genesis::Genesis,
    metrics::Metrics,
    storage::TxLog,
    types::{Account, Snapshot, Tx},
    Config, Error, Result,
};
use std::collections::{BTreeMap, VecDeque};

/// Balance per account
pub type Balances = BTreeMap<Account, u64>;

/// In-memory ledger backed by the transaction log
#[derive(Debug)]
pub struct State {
    /// Authoritative balances, including pending transactions
    balances: Balances,

    /// Applied but not yet durable, in apply order
    pending: VecDeque<Tx>,

    /// Log handle, `None` once closed
    log: Option<TxLog>,

    /// Digest of the log after the last successful flush
    snapshot: Option<Snapshot>,

    replay_mode: ReplayMode,

    metrics: Metrics,
}

impl State {
    /// Load genesis, open the log and replay it
    pub fn new_from_disk(config: &Config) -> Result<Self> {
        let genesis = Genesis::load(config.genesis_path())?;
        let log = TxLog::open(config.tx_log_path(), config.sync_on_append)?;

        tracing::info!(
            accounts = genesis.balances.len(),
            supply = genesis.total_supply(),
            "Seeding balances from genesis"
        );

        let mut state = Self {
            balances: genesis.balances,
            pending: VecDeque::new(),
            log: Some(log),
            snapshot: None,
            replay_mode: config.replay,
            metrics: Metrics::new()?,
        };
        state.replay()?;

        Ok(state)
    }

    fn replay(&mut self) -> Result<()> {
        let log = self.log_mut()?;
        let records = log.records()?;
        let size = log.len()?;
        let total = records.len();
        let mut skipped = 0usize;

        for record in records {
            let outcome = Tx::decode(&record.bytes)
                .map_err(|source| Error::Decode {
                    line: record.line,
                    source,
                })
                .and_then(|tx| {
                    apply(&mut self.balances, &tx).map_err(|source| Error::Replay {
                        line: record.line,
                        source: Box::new(source),
                    })
                });

            match (outcome, self.replay_mode) {
                (Ok(()), _) => self.metrics.txs_replayed.inc(),
                (Err(e), ReplayMode::Tolerant) => {
                    tracing::warn!(line = record.line, error = %e, "Skipping log record");
                    self.metrics.replay_skipped.inc();
                    skipped += 1;
                }
                (Err(e), ReplayMode::Strict) => return Err(e),
            }
        }

        self.metrics.log_size.set(size as i64);
        tracing::info!(
            records = total,
            skipped,
            accounts = self.balances.len(),
            mode = ?self.replay_mode,
            "Replayed transaction log"
        );

        Ok(())
    }

    /// Apply a transaction and queue it for persistence
    ///
    /// Either both happen or neither: on error the balances are untouched.
    pub fn add(&mut self, tx: Tx) -> Result<()> {
        if self.log.is_none() {
            return Err(Error::Closed);
        }

        if let Err(e) = apply(&mut self.balances, &tx) {
            if e.is_rejection() {
                self.metrics.txs_rejected.inc();
            }
            tracing::debug!(tx = %tx, error = %e, "Transaction rejected");
            return Err(e);
        }

        tracing::debug!(tx = %tx, pending = self.pending.len() + 1, "Transaction applied");
        self.metrics.txs_applied.inc();
        self.pending.push_back(tx);

        Ok(())
    }

    /// Flush pending transactions to the log
    ///
    /// Each record is appended, the full log is re-hashed, and only then is
    /// the transaction dropped from the pending pool. If the hash fails after
    /// a successful append the record stays durable, the snapshot is marked
    /// stale and the error is returned; the next successful call recomputes it.
    pub fn persist(&mut self) -> Result<Snapshot> {
        // Observed on drop, so failed flushes are timed too
        let _timer = self.metrics.persist_duration.start_timer();
        let log = self.log.as_mut().ok_or(Error::Closed)?;

        while let Some(tx) = self.pending.front() {
            let record = tx.encode()?;
            log.append(&record)?;

            // The record is durable from here on; never append it twice.
            let tx = self.pending.pop_front();
            self.metrics.txs_persisted.inc();

            match log.read_all() {
                Ok(content) => {
                    let snapshot = snapshot_of(&content);
                    self.snapshot = Some(snapshot);
                    tracing::info!(
                        record = %String::from_utf8_lossy(&record),
                        snapshot = %snapshot,
                        "Persisted transaction"
                    );
                }
                Err(e) => {
                    self.snapshot = None;
                    tracing::warn!(tx = ?tx, error = %e, "Snapshot stale after append");
                    return Err(e);
                }
            }
        }

        let snapshot = match self.snapshot {
            Some(snapshot) => snapshot,
            None => {
                let snapshot = snapshot_of(&log.read_all()?);
                self.snapshot = Some(snapshot);
                snapshot
            }
        };
        self.metrics.log_size.set(log.len()? as i64);

        Ok(snapshot)
    }

    /// Release the log handle; safe to call more than once
    pub fn close(&mut self) {
        if let Some(log) = self.log.take() {
            if !self.pending.is_empty() {
                tracing::warn!(
                    pending = self.pending.len(),
                    "Closing ledger with unpersisted transactions"
                );
            }
            log.close();
        }
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.log.is_none()
    }

    /// Current balances, including pending transactions
    pub fn balances(&self) -> &Balances {
        &self.balances
    }

    /// Balance of one account, zero if unknown
    pub fn balance_of(&self, account: &Account) -> u64 {
        balance_in(&self.balances, account)
    }

    /// Transactions not yet written to the log
    pub fn pending(&self) -> impl ExactSizeIterator<Item = &Tx> {
        self.pending.iter()
    }

    /// Snapshot after the last successful flush
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.snapshot
    }

    /// Replay policy this state was built with
    pub fn replay_mode(&self) -> ReplayMode {
        self.replay_mode
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn log_mut(&mut self) -> Result<&mut TxLog> {
        self.log.as_mut().ok_or(Error::Closed)
    }
}

impl Drop for State {
    fn drop(&mut self) {
        self.close();
    }
}

/// Validate and apply one transaction to `balances`
///
/// Rewards credit `to` unconditionally. Transfers require the sender to
/// cover the value. All checks run before any entry is written.
pub fn apply(balances: &mut Balances, tx: &Tx) -> Result<()> {
    if tx.is_reward() {
        let credited = credit(balance_in(balances, tx.to()), tx)?;
        balances.insert(tx.to().clone(), credited);
        return Ok(());
    }

    let available = balance_in(balances, tx.from());
    if tx.value() > available {
        return Err(Error::InsufficientFunds {
            account: tx.from().clone(),
            needed: tx.value(),
            available,
        });
    }

    let debited = available - tx.value();
    let receiver = if tx.to() == tx.from() {
        debited
    } else {
        balance_in(balances, tx.to())
    };
    let credited = credit(receiver, tx)?;

    balances.insert(tx.from().clone(), debited);
    balances.insert(tx.to().clone(), credited);

    Ok(())
}

fn balance_in(balances: &Balances, account: &Account) -> u64 {
    balances.get(account).copied().unwrap_or(0)
}

fn credit(balance: u64, tx: &Tx) -> Result<u64> {
    balance.checked_add(tx.value()).ok_or_else(|| {
        Error::InvalidValue(format!(
            "crediting {} to {} overflows balance {}",
            tx.value(),
            tx.to(),
            balance
        ))
    })
}
