//! Pulse latency benchmarks.
//!
//! These benchmarks measure one pulse end to end, including callback dispatch.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pulsor_bench::{async_pulser, quiet_registry, sync_pulser};
use serde_json::json;

/// Benchmark sync pulses with a growing callback list.
fn bench_sync_pulse(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync_pulse");

    for callbacks in [0, 1, 10, 100] {
        let registry = quiet_registry();
        let pulser = sync_pulser(&registry, "add", callbacks);
        group.bench_with_input(BenchmarkId::from_parameter(callbacks), &pulser, |b, pulser| {
            b.iter(|| {
                pulser
                    .pulse(black_box(vec![json!(5), json!(3)]))
                    .into_ready()
                    .ok()
            })
        });
    }

    group.finish();
}

/// Benchmark async pulses with a growing callback list.
fn bench_async_pulse(c: &mut Criterion) {
    let mut group = c.benchmark_group("async_pulse");
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    for callbacks in [0, 1, 10, 100] {
        let registry = quiet_registry();
        let pulser = async_pulser(&registry, "echo", callbacks);
        group.bench_with_input(BenchmarkId::from_parameter(callbacks), &pulser, |b, pulser| {
            b.to_async(&rt)
                .iter(|| pulser.pulse(black_box(vec![json!("payload")])))
        });
    }

    group.finish();
}

/// Benchmark pulsing through a free-standing callback.
fn bench_as_callback(c: &mut Criterion) {
    let mut group = c.benchmark_group("as_callback");

    let registry = quiet_registry();
    let pulse = sync_pulser(&registry, "add", 1).as_callback();
    group.bench_function("sync", |b| {
        b.iter(|| pulse(black_box(vec![json!(1), json!(2)])).into_ready().ok())
    });

    group.finish();
}

criterion_group!(benches, bench_sync_pulse, bench_async_pulse, bench_as_callback);
criterion_main!(benches);
