//! Benchmarks for model building
//!
//! Measures the sequential application generator and the FPGA transformation on the MPSoC
//! platform for growing application sizes.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use dse_models::application::catalog::sequential;
use dse_models::platform::catalog::mpsoc;
use dse_models::transform::transform;

/// (actors, hardware actors) pairs
const SIZES: &[(usize, usize)] = &[(8, 2), (32, 8), (128, 32), (512, 128)];

/// Benchmark the sequential application generator
fn bench_sequential_generator(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_generator");

    for &(actors, hw) in SIZES {
        group.throughput(Throughput::Elements(actors as u64));
        group.bench_with_input(
            BenchmarkId::new("sequential", format!("{}_{}", actors, hw)),
            &(actors, hw),
            |b, &(actors, hw)| {
                b.iter(|| black_box(sequential("Bench", black_box(actors), black_box(hw))))
            },
        );
    }

    group.finish();
}

/// Benchmark the FPGA transformation
fn bench_fpga_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("fpga_transform");

    let platform = match mpsoc() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Warning: Could not build MPSoC: {}. Skipping benchmark.", e);
            return;
        }
    };

    for &(actors, hw) in SIZES {
        let application = match sequential("Bench", actors, hw) {
            Ok(a) => a,
            Err(e) => {
                eprintln!(
                    "Warning: Could not build Bench_{}_{}: {}. Skipping benchmark.",
                    actors, hw, e
                );
                continue;
            }
        };

        group.throughput(Throughput::Elements(hw as u64));
        group.bench_with_input(
            BenchmarkId::new("mpsoc", format!("{}_{}", actors, hw)),
            &application,
            |b, application| b.iter(|| black_box(transform(black_box(&platform), application))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_sequential_generator, bench_fpga_transform);

criterion_main!(benches);
