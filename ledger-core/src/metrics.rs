//! Metrics collection for observability
//!
//! Each ledger state owns its own Prometheus registry, so several states
//! can coexist in one process (tests, tooling) without name clashes.
//!
//! # Metrics
//!
//! - `ledger_txs_applied_total` - Transactions applied via `add`
//! - `ledger_txs_rejected_total` - Transactions rejected by `add`
//! - `ledger_txs_replayed_total` - Log records applied during replay
//! - `ledger_txs_replay_skipped_total` - Log records skipped by tolerant replay
//! - `ledger_txs_persisted_total` - Records appended to the log
//! - `ledger_persist_duration_seconds` - Histogram of `persist` latencies
//! - `ledger_log_size_bytes` - Transaction log size after replay or the last flush

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Transactions applied via `add`
    pub txs_applied: IntCounter,

    /// Transactions rejected by `add`
    pub txs_rejected: IntCounter,

    /// Log records applied during replay
    pub txs_replayed: IntCounter,

    /// Log records skipped during tolerant replay
    pub replay_skipped: IntCounter,

    /// Records appended to the log
    pub txs_persisted: IntCounter,

    /// Persist duration histogram
    pub persist_duration: Histogram,

    /// Log size after the last flush
    pub log_size: IntGauge,

    registry: Registry,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let txs_applied = IntCounter::new(
            "ledger_txs_applied_total",
            "Transactions applied via add",
        )?;
        registry.register(Box::new(txs_applied.clone()))?;

        let txs_rejected = IntCounter::new(
            "ledger_txs_rejected_total",
            "Transactions rejected by add",
        )?;
        registry.register(Box::new(txs_rejected.clone()))?;

        let txs_replayed = IntCounter::new(
            "ledger_txs_replayed_total",
            "Log records applied during replay",
        )?;
        registry.register(Box::new(txs_replayed.clone()))?;

        let replay_skipped = IntCounter::new(
            "ledger_txs_replay_skipped_total",
            "Log records skipped by tolerant replay",
        )?;
        registry.register(Box::new(replay_skipped.clone()))?;

        let txs_persisted = IntCounter::new(
            "ledger_txs_persisted_total",
            "Records appended to the transaction log",
        )?;
        registry.register(Box::new(txs_persisted.clone()))?;

        let persist_duration = Histogram::with_opts(
            HistogramOpts::new(
                "ledger_persist_duration_seconds",
                "Histogram of persist latencies",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )?;
        registry.register(Box::new(persist_duration.clone()))?;

        let log_size = IntGauge::new(
            "ledger_log_size_bytes",
            "Transaction log size after the last flush",
        )?;
        registry.register(Box::new(log_size.clone()))?;

        Ok(Self {
            txs_applied,
            txs_rejected,
            txs_replayed,
            replay_skipped,
            txs_persisted,
            persist_duration,
            log_size,
            registry,
        })
    }

    /// Render in the Prometheus text exposition format
    pub fn encode(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("txs_applied", &self.txs_applied.get())
            .field("txs_rejected", &self.txs_rejected.get())
            .field("txs_replayed", &self.txs_replayed.get())
            .field("replay_skipped", &self.replay_skipped.get())
            .field("txs_persisted", &self.txs_persisted.get())
            .field("log_size", &self.log_size.get())
            .finish_non_exhaustive()
    }
}
