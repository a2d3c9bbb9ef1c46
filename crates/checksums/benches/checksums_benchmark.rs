//! crates/checksums/benches/checksums_benchmark.rs
//!
//! Benchmarks for weak and strong checksum computation.
//!
//! Run with: `cargo bench -p checksums`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use checksums::strong::StrongAlgorithm;
use checksums::{RollingChecksum, weak_checksum};

const BLOCK_SIZES: [usize; 5] = [700, 2048, 8192, 32768, 131_072];

fn sample_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i.wrapping_mul(31) % 251) as u8).collect()
}

fn bench_weak_checksum(c: &mut Criterion) {
    let mut group = c.benchmark_group("weak_checksum");

    for size in BLOCK_SIZES {
        let data = sample_data(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("one_shot", size), &data, |b, data| {
            b.iter(|| black_box(weak_checksum(black_box(data))));
        });
    }

    group.finish();
}

fn bench_incremental_update(c: &mut Criterion) {
    let data = sample_data(64 * 1024);

    c.bench_function("weak_incremental_64k", |b| {
        b.iter(|| {
            let mut checksum = RollingChecksum::new();
            for piece in data.chunks(512) {
                checksum.update(piece);
            }
            black_box(checksum.value())
        });
    });
}

fn bench_strong_algorithms(c: &mut Criterion) {
    let mut group = c.benchmark_group("strong_checksum");
    let algorithms = [
        StrongAlgorithm::Md4,
        StrongAlgorithm::Md5,
        StrongAlgorithm::Sha1,
        StrongAlgorithm::Xxh64 { seed: 0 },
    ];

    for size in BLOCK_SIZES {
        let data = sample_data(size);
        group.throughput(Throughput::Bytes(size as u64));
        for algorithm in algorithms {
            group.bench_with_input(
                BenchmarkId::new(algorithm.name(), size),
                &data,
                |b, data| b.iter(|| black_box(algorithm.compute(black_box(data)))),
            );
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_weak_checksum,
    bench_incremental_update,
    bench_strong_algorithms
);
criterion_main!(benches);
