use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mcap_schema::{MessageDecoder, SchemaFormat};
use mcap_tests::{SCAN_SCHEMA, scan_payload, scan_stream};
use mcap_wire::{Compression, MAGIC_LEN, RecordReader};

fn bench_resolve(c: &mut Criterion) {
    c.bench_function("resolve_scan_schema", |b| {
        b.iter(|| MessageDecoder::resolve(SchemaFormat::Ros1, "sensor_msgs/LaserScan", SCAN_SCHEMA).unwrap());
    });
}

fn bench_decode_ros1(c: &mut Criterion) {
    let decoder = MessageDecoder::resolve(SchemaFormat::Ros1, "sensor_msgs/LaserScan", SCAN_SCHEMA).unwrap();
    let mut group = c.benchmark_group("decode_ros1_scan");

    for len in [16usize, 256, 4096] {
        let ranges = vec![1.5f32; len];
        let payload = scan_payload(7, 100, &ranges);
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &payload, |b, payload| {
            b.iter(|| decoder.decode(payload).unwrap());
        });
    }

    group.finish();
}

fn bench_tokenize(c: &mut Criterion) {
    let stream = scan_stream(1, 512, Compression::None);
    let body = &stream[MAGIC_LEN..];
    let reader = RecordReader::new();

    let mut group = c.benchmark_group("tokenize");
    group.throughput(Throughput::Bytes(body.len() as u64));
    group.bench_function("top_level_records", |b| {
        b.iter(|| {
            let mut pos = 0;
            while let Ok(Some((_, len))) = reader.read_record(&body[pos..]) {
                pos += len;
            }
            pos
        });
    });
    group.finish();
}

criterion_group!(benches, bench_resolve, bench_decode_ros1, bench_tokenize);
criterion_main!(benches);
