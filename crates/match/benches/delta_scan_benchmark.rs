//! crates/match/benches/delta_scan_benchmark.rs
//!
//! Table construction and chunk-aligned scanning throughput.
//!
//! Run with: `cargo bench -p matching`

use std::num::NonZeroU32;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use checksums::strong::StrongAlgorithm;
use matching::{CancellationToken, ChecksumTable, DeltaScanner, ScanConfig, collect_delta};
use signature::{BlockChecksum, ChecksumOptions, generate_block_checksums};

const FILE_SIZE: usize = 4 * 1024 * 1024;
const BLOCK_SIZES: [u32; 3] = [700, 4096, 32768];

fn sample_data(size: usize, salt: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(131).wrapping_add(salt) % 251) as u8)
        .collect()
}

fn checksums_for(data: &[u8], block: u32) -> Vec<BlockChecksum> {
    let options = ChecksumOptions::new().with_block_size(NonZeroU32::new(block).unwrap());
    generate_block_checksums(data, &options).expect("in-memory checksums")
}

fn bench_table_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_build");
    let data = sample_data(FILE_SIZE, 0);

    for block in BLOCK_SIZES {
        let checksums = checksums_for(&data, block);
        group.throughput(Throughput::Elements(checksums.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(block), &checksums, |b, sums| {
            b.iter(|| black_box(ChecksumTable::build(sums.iter().cloned())));
        });
    }

    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("delta_scan");
    group.sample_size(20);
    group.throughput(Throughput::Bytes(FILE_SIZE as u64));

    let basis = sample_data(FILE_SIZE, 0);
    let unrelated = sample_data(FILE_SIZE, 7);

    for block in BLOCK_SIZES {
        let config = ScanConfig::new(NonZeroU32::new(block).unwrap());
        let table = Arc::new(ChecksumTable::build(checksums_for(&basis, block)));
        let scanner = DeltaScanner::new(Arc::clone(&table), StrongAlgorithm::Md4, config);
        let cancel = CancellationToken::never();

        group.bench_with_input(BenchmarkId::new("identical", block), &basis, |b, local| {
            b.iter(|| black_box(scanner.collect(&local[..], &cancel)));
        });
        group.bench_with_input(BenchmarkId::new("unrelated", block), &unrelated, |b, local| {
            b.iter(|| black_box(scanner.collect(&local[..], &cancel)));
        });
    }

    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let basis = sample_data(FILE_SIZE, 0);
    let mut local = basis.clone();
    for offset in (0..local.len()).step_by(64 * 1024) {
        local[offset] ^= 0x5A;
    }

    c.bench_function("collect_delta_700", |b| {
        b.iter(|| {
            black_box(collect_delta(
                &local[..],
                StrongAlgorithm::Md4,
                checksums_for(&basis, 700),
                &CancellationToken::never(),
                ScanConfig::default(),
            ))
        });
    });
}

criterion_group!(benches, bench_table_build, bench_scan, bench_end_to_end);
criterion_main!(benches);
