//! Benchmarks for marker scanning and OFMD decoding
//!
//! Measures throughput of both buffering strategies over a synthetic stream
//! with sparse OFMD records.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ofsextract_mvc::ofmd::SEI_MARKER;
use ofsextract_mvc::{DecoderConfig, OfmdDecoder, ScanStrategy, ScannerConfig, StreamScanner};
use std::io::Cursor;
use std::time::Duration;

const STREAM_SIZE: usize = 16 * 1024 * 1024;
const RECORD_SPACING: usize = 64 * 1024;

/// Pseudo-random filler with an OFMD record every `RECORD_SPACING` bytes.
fn synthetic_stream() -> Vec<u8> {
    let mut data = Vec::with_capacity(STREAM_SIZE);
    let mut state: u32 = 0x1234_5678;
    while data.len() < STREAM_SIZE {
        let start = data.len();
        data.extend_from_slice(&[0x00, 0x00, 0x01, 0x06, 0x25, 0x0E, 0x40]);
        data.extend_from_slice(b"OFMD");
        data.extend_from_slice(&[0x01, 0, 0, 0, 0, 0, 0x02, 0x18, 0, 0]);
        data.extend(std::iter::repeat(0x05).take(2 * 0x18));
        while data.len() - start < RECORD_SPACING {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            // Keep 0x01 out of the filler so no stray SEI markers appear.
            data.push((state as u8) | 0x02);
        }
    }
    data
}

fn strategy_config(strategy: ScanStrategy) -> ScannerConfig {
    ScannerConfig::default()
        .strategy(strategy)
        .max_buffer_size(64 * 1024 * 1024)
}

fn bench_find_next(c: &mut Criterion) {
    let data = synthetic_stream();
    let mut group = c.benchmark_group("find_next");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.measurement_time(Duration::from_secs(10));

    for (name, strategy) in [
        ("sliding", ScanStrategy::SlidingWindow),
        ("growth", ScanStrategy::BoundedGrowth),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &strategy, |b, &s| {
            b.iter(|| {
                let mut scanner =
                    StreamScanner::new(Cursor::new(&data[..]), strategy_config(s)).unwrap();
                let mut hits = 0usize;
                while scanner.find_next(black_box(SEI_MARKER)).unwrap().is_some() {
                    scanner.consume(SEI_MARKER.len()).unwrap();
                    hits += 1;
                }
                hits
            })
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let data = synthetic_stream();
    let mut group = c.benchmark_group("decode_all");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("sliding", |b| {
        b.iter(|| {
            OfmdDecoder::new(
                Cursor::new(&data[..]),
                ScannerConfig::default(),
                DecoderConfig::default(),
            )
            .unwrap()
            .decode_all()
            .unwrap()
            .len()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_find_next, bench_decode);
criterion_main!(benches);
