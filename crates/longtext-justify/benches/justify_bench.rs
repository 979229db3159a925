//! Justification throughput - how the pure path scales with input size
//!
//! Covers the two wrapping strategies separately and the chunked path on a
//! document close to the input limit.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use longtext_justify::{chunked_justify, justify};

fn bench_narrow(c: &mut Criterion) {
    let paragraph = "The quick brown fox jumps over the lazy dog. ".repeat(200);

    c.bench_function("justify_narrow_paragraph", |b| {
        b.iter(|| justify(black_box(&paragraph), black_box(40)))
    });
}

fn bench_wide(c: &mut Criterion) {
    let paragraph = "这是一个测试文本，用于衡量宽字符换行的速度。".repeat(200);

    c.bench_function("justify_wide_paragraph", |b| {
        b.iter(|| justify(black_box(&paragraph), black_box(40)))
    });
}

fn bench_chunked(c: &mut Criterion) {
    let document = "Lorem ipsum dolor sit amet, 中文混排 consectetur.\n".repeat(9_000);

    c.bench_function("chunked_justify_large_document", |b| {
        b.iter(|| chunked_justify(black_box(&document), 60, 10_000, |_| {}))
    });
}

criterion_group!(benches, bench_narrow, bench_wide, bench_chunked);
criterion_main!(benches);
