//! Benchmarks for the decode and conversion pipeline.
//!
//! Run with: cargo bench
//!
//! Requires fixture files from `tests/fixtures/generate_fixtures.sh`.

use std::path::Path;

use criterion::{Criterion, criterion_group, criterion_main};
use framefeed::{FrameBuffer, NativeLogLevel, OutputFormat, VideoReader, set_native_log_level};

const SAMPLE_BENCH: &str = "tests/fixtures/sample_bench.mp4";

fn benchmark_sequential_decode(criterion: &mut Criterion) {
    set_native_log_level(NativeLogLevel::Error);

    if !Path::new(SAMPLE_BENCH).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    criterion.bench_function("decode 50 frames at native size", |bencher| {
        bencher.iter(|| {
            let mut reader = VideoReader::open(SAMPLE_BENCH).unwrap();
            for _ in 0..50 {
                let _frame = reader.next_frame(None).unwrap();
            }
        });
    });
}

fn benchmark_scaled_decode(criterion: &mut Criterion) {
    if !Path::new(SAMPLE_BENCH).exists() {
        return;
    }

    criterion.bench_function("decode 50 frames into reused 224x224 buffer", |bencher| {
        let format = OutputFormat::rgb8(224, 224).unwrap();
        bencher.iter(|| {
            let mut reader = VideoReader::open(SAMPLE_BENCH).unwrap();
            let mut buffer = FrameBuffer::for_format(&format);
            for _ in 0..50 {
                reader.next_frame_into(&format, &mut buffer).unwrap();
            }
        });
    });
}

criterion_group!(
    benches,
    benchmark_sequential_decode,
    benchmark_scaled_decode
);
criterion_main!(benches);
