//! Persist cost against log size
//!
//! Every flushed record re-hashes the whole log, so per-record cost grows
//! with the number of records already on disk.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use dry_ledger::{crypto::snapshot_of, Config, State, Tx};

fn seeded_ledger(records: usize) -> (Config, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        temp_dir.path().join("genesis.json"),
        r#"{"balances":{"andrej":1000000000}}"#,
    )
    .unwrap();

    let mut config = Config::with_data_dir(temp_dir.path());
    config.sync_on_append = false;

    let mut state = State::new_from_disk(&config).unwrap();
    for _ in 0..records {
        state.add(Tx::transfer("andrej", "babayaga", 1)).unwrap();
    }
    state.persist().unwrap();

    (config, temp_dir)
}

fn bench_persist(c: &mut Criterion) {
    let mut group = c.benchmark_group("persist_one");
    for records in [100usize, 1_000, 10_000] {
        let (config, _temp) = seeded_ledger(records);
        let mut state = State::new_from_disk(&config).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(records), &records, |b, _| {
            b.iter(|| {
                state.add(Tx::transfer("andrej", "babayaga", 1)).unwrap();
                state.persist().unwrap()
            })
        });
    }
    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let record = Tx::transfer("andrej", "babayaga", 1).encode().unwrap();
    let mut group = c.benchmark_group("snapshot_of");
    for records in [100usize, 1_000, 10_000] {
        let log: Vec<u8> = (0..records)
            .flat_map(|_| record.iter().copied().chain(std::iter::once(b'\n')))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(records), &log, |b, log| {
            b.iter(|| snapshot_of(log))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_persist, bench_snapshot);
criterion_main!(benches);
