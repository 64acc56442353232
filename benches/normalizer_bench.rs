//! Criterion benchmarks for price normalization and page parsing

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::path::PathBuf;

use pricecmp::services::normalizer::extract_price;
use pricecmp::services::rates::ExchangeRateSnapshot;
use pricecmp::sources::{aliexpress, taobao};
use pricecmp::types::Currency;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
}

fn bench_extract_price(c: &mut Criterion) {
    let rates = ExchangeRateSnapshot::fallback();
    let samples = [
        ("usd", "US $12.50", Some(Currency::Usd)),
        ("krw_noise", "약 ₩12,345원", None),
        ("unparseable", "가격 정보 없음", None),
    ];

    let mut group = c.benchmark_group("normalizer");
    for (name, raw, currency) in samples {
        group.bench_with_input(BenchmarkId::new("extract_price", name), raw, |b, raw| {
            b.iter(|| extract_price(black_box(raw), currency, &rates));
        });
    }
    group.finish();
}

fn bench_parse_pages(c: &mut Criterion) {
    let rates = ExchangeRateSnapshot::fallback();
    let ali = fixture("aliexpress_search.html");
    let tao = fixture("taobao_category.html");

    let mut group = c.benchmark_group("pages");

    group.throughput(Throughput::Bytes(ali.len() as u64));
    group.bench_function("aliexpress_search", |b| {
        b.iter(|| aliexpress::parse_search_page(black_box(&ali), &rates, 10));
    });

    group.throughput(Throughput::Bytes(tao.len() as u64));
    group.bench_function("taobao_category", |b| {
        b.iter(|| taobao::parse_category_page(black_box(&tao), &rates, 10));
    });

    group.finish();
}

criterion_group!(benches, bench_extract_price, bench_parse_pages);
criterion_main!(benches);
