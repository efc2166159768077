//! 工具函数性能基准测试

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use usethislink::services::parse_user_agent;
use usethislink::utils::{hash_password, normalize_url, points_to_service, verify_password};

fn bench_normalize_url(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/normalize_url");

    group.bench_function("with_scheme", |b| {
        b.iter(|| normalize_url(black_box("https://www.rust-lang.org/learn?x=1")));
    });

    group.bench_function("without_scheme", |b| {
        b.iter(|| normalize_url(black_box("example.com/some/page")));
    });

    group.bench_function("dangerous", |b| {
        b.iter(|| assert!(normalize_url(black_box("javascript:alert(1)")).is_err()));
    });

    group.finish();
}

fn bench_points_to_service(c: &mut Criterion) {
    let raw = "https://other.example.com/path";
    let parsed = normalize_url(raw).expect("valid url");

    c.bench_function("utils/points_to_service", |b| {
        b.iter(|| points_to_service(black_box(raw), &parsed, "https://utl.ink"));
    });
}

fn bench_parse_user_agent(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/parse_user_agent");

    let desktop = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    let mobile = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    let bot = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

    group.bench_function("desktop", |b| b.iter(|| parse_user_agent(black_box(desktop))));
    group.bench_function("mobile", |b| b.iter(|| parse_user_agent(black_box(mobile))));
    group.bench_function("bot", |b| b.iter(|| parse_user_agent(black_box(bot))));

    group.finish();
}

fn bench_password(c: &mut Criterion) {
    let password = "correct_password_456";
    let hash = hash_password(password).expect("hash should succeed");

    c.bench_function("utils/verify_password", |b| {
        b.iter(|| {
            let result = verify_password(black_box(password), &hash).expect("verify should succeed");
            assert!(result);
        });
    });
}

criterion_group!(
    benches,
    bench_normalize_url,
    bench_points_to_service,
    bench_parse_user_agent,
    bench_password
);
criterion_main!(benches);
