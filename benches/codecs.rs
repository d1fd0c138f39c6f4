//! Criterion benchmarks for the lossless coders and the image pipeline.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sigpress::{CodecConfig, Diagnostics, HuffmanCodec, ImageCodec, LzwCodec, Plane, Symbol};

fn quiet_config() -> CodecConfig {
    CodecConfig::builder()
        .diagnostics(Diagnostics::silent())
        .build()
        .unwrap()
}

/// Sample sequence shaped like a quiet 16-bit waveform.
fn waveform(len: usize) -> Vec<Symbol> {
    (0..len)
        .map(|i| ((i as f64 * 0.05).sin() * 120.0 + (i as f64 * 0.31).cos() * 15.0) as Symbol)
        .collect()
}

fn bench_lossless(c: &mut Criterion) {
    let config = quiet_config();
    let mut group = c.benchmark_group("lossless");
    for len in [1_000usize, 10_000, 100_000] {
        let samples = waveform(len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("huffman_encode", len), &samples, |b, samples| {
            b.iter(|| {
                let mut huffman: HuffmanCodec = HuffmanCodec::new(&config);
                black_box(huffman.encode_to_bits(samples).unwrap())
            })
        });
        group.bench_with_input(BenchmarkId::new("lzw_encode", len), &samples, |b, samples| {
            b.iter(|| {
                let mut lzw: LzwCodec = LzwCodec::new(&config);
                black_box(lzw.encode(samples).unwrap())
            })
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let codec = ImageCodec::new(quiet_config()).unwrap();
    let mut group = c.benchmark_group("pipeline");
    for size in [32usize, 128] {
        let data = (0..size * size)
            .map(|i| {
                let (row, col) = ((i / size) as i32, (i % size) as i32);
                [(row * 3 + col) % 256, (col * 5) % 256, (row * 7) % 256]
            })
            .collect();
        let image = Plane::from_vec(data, size, size).unwrap();
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("encode_decode", size), &image, |b, image| {
            b.iter(|| {
                let mut container = codec.encode(image).unwrap();
                black_box(codec.decode(&mut container).unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lossless, bench_pipeline);
criterion_main!(benches);
