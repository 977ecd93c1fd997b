use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use filemon::coordinator;
use filemon::scanner::ExclusionSet;
use filemon::storage::format::{decode, encode_to_vec};
use filemon::utils::hash::digest_file;
use std::fs;
use std::hint::black_box;
use std::path::Path;
use tempfile::{TempDir, tempdir};

/// Tree under the build directory, since scans skip `/tmp/`.
fn tree_dir() -> TempDir {
    tempfile::Builder::new()
        .prefix("fm-bench-")
        .tempdir_in(env!("CARGO_TARGET_TMPDIR"))
        .unwrap()
}

fn create_tree(dir: &Path, count: usize) {
    for i in 0..count {
        let sub = dir.join(format!("dir_{}", i % 10));
        fs::create_dir_all(&sub).unwrap();
        let content = format!("This is test file number {i} with some content to hash");
        fs::write(sub.join(format!("file_{i}.txt")), content).unwrap();
    }
}

fn benchmark_digest(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let small_file = dir.path().join("small.bin");
    let medium_file = dir.path().join("medium.bin");
    let large_file = dir.path().join("large.bin");

    fs::write(&small_file, vec![b'a'; 1024]).unwrap(); // 1KB
    fs::write(&medium_file, vec![b'b'; 1024 * 100]).unwrap(); // 100KB
    fs::write(&large_file, vec![b'c'; 1024 * 1024 * 10]).unwrap(); // 10MB

    let mut group = c.benchmark_group("digest_file");

    group.bench_function("md5_1kb", |b| b.iter(|| digest_file(black_box(&small_file))));
    group.bench_function("md5_100kb", |b| {
        b.iter(|| digest_file(black_box(&medium_file)));
    });
    group.bench_function("md5_10mb", |b| {
        b.iter(|| digest_file(black_box(&large_file)));
    });

    group.finish();
}

fn benchmark_passes(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_passes");
    let exclusions = ExclusionSet::default();

    for count in [100, 1000] {
        let dir = tree_dir();
        create_tree(dir.path(), count);
        let roots = vec![dir.path().to_path_buf()];
        let baseline = coordinator::build_baseline(&roots, &exclusions).unwrap();

        group.bench_with_input(BenchmarkId::new("build", count), &count, |b, _| {
            b.iter(|| coordinator::build_baseline(black_box(&roots), &exclusions));
        });
        group.bench_with_input(BenchmarkId::new("check", count), &count, |b, _| {
            b.iter(|| coordinator::check(black_box(&roots), &exclusions, &baseline));
        });
    }

    group.finish();
}

fn benchmark_snapshot_codec(c: &mut Criterion) {
    let dir = tree_dir();
    create_tree(dir.path(), 1000);
    let roots = vec![dir.path().to_path_buf()];
    let baseline = coordinator::build_baseline(&roots, &ExclusionSet::default()).unwrap();
    let encoded = encode_to_vec(0, baseline.records()).unwrap();

    let mut group = c.benchmark_group("snapshot_codec");
    group.bench_function("encode_1000", |b| {
        b.iter(|| encode_to_vec(0, black_box(baseline.records())));
    });
    group.bench_function("decode_1000", |b| b.iter(|| decode(black_box(&encoded))));
    group.finish();
}

criterion_group!(
    benches,
    benchmark_digest,
    benchmark_passes,
    benchmark_snapshot_codec
);
criterion_main!(benches);
