//! Hub performance benchmarks
//!
//! Lookup across many versions, dependency insertion with its cycle
//! check, and transitive contact collection.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use libhub_benchmarks::{chained_hub, criterion_config, populated_hub};

/// Benchmark lookup against growing version lists
fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for version_count in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*version_count as u64));
        let hub = populated_hub(10, *version_count);

        for spec in ["1.5.0", "~1.5.0", "^1.0.0", "+1.0.0"] {
            group.bench_with_input(
                BenchmarkId::new(spec, version_count),
                &hub,
                |b, hub| {
                    b.iter(|| black_box(hub.lookup("lib-3", spec)));
                },
            );
        }
    }

    group.finish();
}

/// Benchmark adding a dependency on top of a long chain, which walks the
/// whole chain looking for a cycle
fn bench_add_dependency(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_dependency");
    group.measurement_time(std::time::Duration::from_secs(5));

    for chain_length in [10, 100, 500].iter() {
        group.throughput(Throughput::Elements(*chain_length as u64));
        let mut hub = chained_hub(*chain_length);
        hub.register("root", "1.0.0", "bench").unwrap();

        group.bench_with_input(
            BenchmarkId::new("chain", chain_length),
            &hub,
            |b, hub| {
                b.iter_batched(
                    || hub.clone(),
                    |mut hub| black_box(hub.add_dependency("root", "1.0.0", "lib-0", "^1.0.0")),
                    criterion::BatchSize::SmallInput,
                );
            },
        );

        group.bench_with_input(
            BenchmarkId::new("rejected_cycle", chain_length),
            &hub,
            |b, hub| {
                let last = format!("lib-{}", chain_length - 1);
                b.iter_batched(
                    || hub.clone(),
                    |mut hub| black_box(hub.add_dependency(&last, "1.0.0", "lib-0", "^1.0.0")),
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Benchmark contact collection with and without a level limit
fn bench_contacts(c: &mut Criterion) {
    let mut group = c.benchmark_group("contacts");

    for chain_length in [10, 100, 500].iter() {
        let hub = chained_hub(*chain_length);

        group.bench_with_input(
            BenchmarkId::new("unlimited", chain_length),
            &hub,
            |b, hub| {
                b.iter(|| black_box(hub.contacts("lib-0", "1.0.0", None)));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("level_3", chain_length),
            &hub,
            |b, hub| {
                b.iter(|| black_box(hub.contacts("lib-0", "1.0.0", Some(3))));
            },
        );
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_lookup, bench_add_dependency, bench_contacts
}
criterion_main!(benches);
