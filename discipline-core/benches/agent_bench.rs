//! Criterion benchmarks for the audit hot paths.
//!
//! Benchmarks:
//! 1. Row validation (TradeRow -> Trade) over large batches
//! 2. Rule evaluation + scoring, sequential vs rayon
//! 3. Input fingerprinting

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use discipline_core::domain::validate_rows;
use discipline_core::fingerprint::input_hash;
use discipline_core::{DisciplineAgent, Plan, Trade, TradeRow};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_rows(n: usize) -> Vec<TradeRow> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let entry = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            TradeRow {
                date: Some((base_date + chrono::Duration::days(i as i64)).to_string()),
                symbol: Some(format!("SYM{}", i % 50)),
                side: Some(if i % 2 == 0 { "LONG" } else { "SHORT" }.into()),
                entry_price: Some(format!("{entry:.2}")),
                exit_price: Some(format!("{:.2}", entry * 1.01)),
                shares: Some("100".into()),
                stop_price: (i % 4 != 0).then(|| format!("{:.2}", entry * 0.95)),
            }
        })
        .collect()
}

fn make_trades(n: usize) -> Vec<Trade> {
    validate_rows(&make_rows(n), &[]).unwrap()
}

// ── 1. Validation ────────────────────────────────────────────────────

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation");
    for n in [1_000, 10_000] {
        let rows = make_rows(n);
        group.bench_with_input(BenchmarkId::new("validate_rows", n), &rows, |b, rows| {
            b.iter(|| validate_rows(black_box(rows), &[]).unwrap())
        });
    }
    group.finish();
}

// ── 2. Evaluation ────────────────────────────────────────────────────

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let plan = Plan::new(["Risk-On"], true);
    let sequential = DisciplineAgent::new();
    let parallel = DisciplineAgent::new().with_parallelism(true);

    for n in [1_000, 100_000] {
        let trades = make_trades(n);
        group.bench_with_input(BenchmarkId::new("sequential", n), &trades, |b, trades| {
            b.iter(|| sequential.evaluate(black_box(trades), &plan, "Risk-Off"))
        });
        group.bench_with_input(BenchmarkId::new("rayon", n), &trades, |b, trades| {
            b.iter(|| parallel.evaluate(black_box(trades), &plan, "Risk-Off"))
        });
    }
    group.finish();
}

// ── 3. Fingerprint ───────────────────────────────────────────────────

fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint");
    let plan = Plan::new(["Risk-On", "Neutral"], true);
    let trades = make_trades(10_000);
    group.bench_function("input_hash_10k", |b| {
        b.iter(|| input_hash(black_box(&trades), &plan, "Risk-On"))
    });
    group.finish();
}

criterion_group!(benches, bench_validation, bench_evaluate, bench_fingerprint);
criterion_main!(benches);
