//! 短码生成性能基准测试

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use usethislink::services::{base62, generate_short_code, is_valid_short_code};

fn bench_base62(c: &mut Criterion) {
    let mut group = c.benchmark_group("shortener/base62");

    for value in [0u64, 61, 3_844, u64::MAX] {
        group.bench_with_input(BenchmarkId::from_parameter(value), &value, |b, &v| {
            b.iter(|| base62(black_box(v)));
        });
    }

    group.finish();
}

fn bench_generate_short_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("shortener/generate_short_code");

    let short = "https://example.com";
    let long = format!("https://example.com/{}", "segment/".repeat(200));

    group.bench_function("short_url", |b| {
        b.iter(|| generate_short_code(black_box(short)));
    });

    group.bench_function("long_url", |b| {
        b.iter(|| generate_short_code(black_box(&long)));
    });

    // 碰撞时的加盐重试
    group.bench_function("salted_retries", |b| {
        b.iter(|| {
            for salt in 0..5 {
                black_box(generate_short_code(&format!("{}{}", short, salt)));
            }
        });
    });

    group.finish();
}

fn bench_is_valid_short_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("shortener/is_valid_short_code");

    group.bench_function("valid", |b| {
        b.iter(|| assert!(is_valid_short_code(black_box("aB3x9Kq1"))));
    });

    group.bench_function("invalid_chars", |b| {
        b.iter(|| assert!(!is_valid_short_code(black_box("'; DROP"))));
    });

    group.bench_function("too_long", |b| {
        b.iter(|| assert!(!is_valid_short_code(black_box("favicon.ico"))));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_base62,
    bench_generate_short_code,
    bench_is_valid_short_code
);
criterion_main!(benches);
