use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mcap_stream::{RequestWindow, Subscriptions, Time};
use mcap_tests::{retrieve_blocking, scan_stream};
use mcap_wire::Compression;

fn bench_retrieve_compression(c: &mut Criterion) {
    let mut group = c.benchmark_group("retrieve_compression");

    for compression in [Compression::None, Compression::Lz4, Compression::Zstd] {
        let stream = scan_stream(16, 64, compression);
        group.throughput(Throughput::Bytes(stream.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(compression.tag()), &stream, |b, stream| {
            b.iter(|| retrieve_blocking(stream, 64 * 1024, RequestWindow::all(), Subscriptions::All).unwrap());
        });
    }

    group.finish();
}

fn bench_increment_size(c: &mut Criterion) {
    let stream = scan_stream(8, 64, Compression::Lz4);
    let mut group = c.benchmark_group("retrieve_increment_size");
    group.throughput(Throughput::Bytes(stream.len() as u64));

    for size in [256usize, 4096, 64 * 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| retrieve_blocking(&stream, size, RequestWindow::all(), Subscriptions::All).unwrap());
        });
    }

    group.finish();
}

fn bench_narrow_window(c: &mut Criterion) {
    // Out-of-window payloads are skipped without decoding.
    let stream = scan_stream(16, 64, Compression::Zstd);
    let window = RequestWindow::new(Time { sec: 0, nsec: 0 }, Time { sec: 0, nsec: 100_000_000 });

    c.bench_function("retrieve_narrow_window", |b| {
        b.iter(|| retrieve_blocking(&stream, 64 * 1024, window, Subscriptions::topics(["/scan/front"])).unwrap());
    });
}

criterion_group!(
    benches,
    bench_retrieve_compression,
    bench_increment_size,
    bench_narrow_window
);
criterion_main!(benches);
