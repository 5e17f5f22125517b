//! Common utilities for benchmarks

use criterion::Criterion;
use libhub_registry::Hub;
use pprof::criterion::{Output, PProfProfiler};

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(3))
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(100)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

/// Library rows in import format: `lib-<n>` with `versions` stable
/// releases each
pub fn library_rows(libraries: usize, versions: usize) -> String {
    let mut rows = String::new();
    for lib in 0..libraries {
        for minor in 0..versions {
            rows.push_str(&format!("lib-{},1.{}.0,owner-{}\n", lib, minor, lib % 7));
        }
    }
    rows
}

/// A hub holding the libraries from [`library_rows`]
pub fn populated_hub(libraries: usize, versions: usize) -> Hub {
    let mut hub = Hub::new();
    for lib in 0..libraries {
        for minor in 0..versions {
            let name = format!("lib-{}", lib);
            let owner = format!("owner-{}", lib % 7);
            hub.register(&name, &format!("1.{}.0", minor), &owner)
                .expect("fixture rows are unique");
        }
    }
    hub
}

/// A hub where the latest `lib-<n>` depends on `lib-<n+1>` for every
/// library, forming one long chain
pub fn chained_hub(libraries: usize) -> Hub {
    let mut hub = populated_hub(libraries, 1);
    for lib in (0..libraries.saturating_sub(1)).rev() {
        let name = format!("lib-{}", lib);
        let dep = format!("lib-{}", lib + 1);
        hub.add_dependency(&name, "1.0.0", &dep, "^1.0.0")
            .expect("a chain has no cycles");
    }
    hub
}
