//! Resman aggregation benchmarks
//!
//! - Histogram aggregation over raw access-log rows
//! - Usage summary over membership rows
//! - Counter sampler under a single poller

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use resman_common::CounterSample;
use resman_metering::{CounterSampler, HistogramAggregator, UsageSummarizer};

fn access_rows(n: usize) -> Vec<(String, String)> {
    (0..n)
        .map(|i| {
            let category = if i % 3 == 0 { "check_license" } else { "download" };
            let timestamp = format!("2024-05-31 {:02}:{:02}:00", i % 24, i % 60);
            (category.to_string(), timestamp)
        })
        .collect()
}

fn membership_rows(n: usize) -> Vec<(String, String)> {
    (0..n)
        .map(|i| {
            let payload = format!(r#"["model-{}", "model-{}"]"#, i % 50, i % 7);
            (format!("owner-{}", i % 100), payload)
        })
        .collect()
}

fn bench_histogram(c: &mut Criterion) {
    let mut group = c.benchmark_group("histogram");
    let aggregator = HistogramAggregator::new();

    for size in [1_000usize, 10_000, 100_000].iter() {
        let rows = access_rows(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("aggregate_rows", size), &rows, |b, rows| {
            b.iter(|| aggregator.aggregate_rows(black_box(rows.iter().map(|(c, t)| (c, t)))))
        });
    }

    group.finish();
}

fn bench_usage(c: &mut Criterion) {
    let mut group = c.benchmark_group("usage");
    let summarizer = UsageSummarizer::new();

    for size in [1_000usize, 10_000].iter() {
        let rows = membership_rows(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("summarize_rows", size), &rows, |b, rows| {
            b.iter(|| summarizer.summarize_rows(black_box(rows.iter().map(|(o, p)| (o, p)))))
        });
    }

    group.finish();
}

fn bench_sampler(c: &mut Criterion) {
    let sampler = CounterSampler::new();
    let mut bytes = 0u64;

    c.bench_function("sampler/sample", |b| {
        b.iter(|| {
            bytes += 1500;
            black_box(sampler.sample(CounterSample::new(bytes, bytes * 2)))
        })
    });
}

criterion_group!(benches, bench_histogram, bench_usage, bench_sampler);
criterion_main!(benches);
