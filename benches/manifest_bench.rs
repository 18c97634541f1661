use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use paramsync::build_manifest;
use std::fs;
use tempfile::TempDir;

fn setup_dir(files: usize, size: usize) -> TempDir {
    let dir = TempDir::new().unwrap();
    let content = vec![0xA5u8; size];
    for i in 0..files {
        fs::write(dir.path().join(format!("file-{i:04}.params")), &content).unwrap();
    }
    dir
}

fn bench_build_manifest(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_manifest");

    for (files, size) in [(100, 4 * 1024), (8, 4 * 1024 * 1024)] {
        let dir = setup_dir(files, size);
        group.throughput(Throughput::Bytes((files * size) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{files}x{size}")),
            &dir,
            |b, dir| b.iter(|| build_manifest(dir.path()).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_build_manifest);
criterion_main!(benches);
