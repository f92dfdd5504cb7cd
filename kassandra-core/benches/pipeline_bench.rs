//! Criterion benchmarks for the feature pipeline.
//!
//! 1. Full dataset build (join, fill, indicators, lags, target, assembly)
//! 2. Live feature row build
//! 3. Indicator batch over closes

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use kassandra_core::domain::{DailySeries, PriceBar, SentimentAggregate, TrendScore};
use kassandra_core::features::technical::compute_indicators;
use kassandra_core::features::{build_dataset, build_feature_row, FeatureConfig, SourceInputs};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 2).unwrap()
}

fn make_bars(n: usize) -> Vec<PriceBar> {
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            PriceBar {
                date: base_date() + Duration::days(i as i64),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000_000 + (i as u64 % 500_000),
            }
        })
        .collect()
}

fn make_inputs(n: usize) -> SourceInputs {
    let news: Vec<SentimentAggregate> = (0..n)
        .filter(|i| i % 3 != 0)
        .map(|i| SentimentAggregate {
            mean_sentiment: (i as f64 * 0.21).cos() * 0.5,
            volume: 5.0,
            ..SentimentAggregate::neutral(base_date() + Duration::days(i as i64))
        })
        .collect();
    let trends: Vec<TrendScore> = (0..n)
        .step_by(7)
        .map(|i| TrendScore {
            date: base_date() + Duration::days(i as i64),
            search_interest: 0.5,
        })
        .collect();
    SourceInputs {
        prices: DailySeries::new(make_bars(n)).unwrap(),
        news: DailySeries::new(news.clone()).unwrap().into(),
        reddit: DailySeries::new(news).unwrap().into(),
        trends: DailySeries::new(trends).unwrap().into(),
    }
}

fn bench_build_dataset(c: &mut Criterion) {
    let config = FeatureConfig::default();
    let mut group = c.benchmark_group("build_dataset");
    for n in [250usize, 1_000, 5_000] {
        let inputs = make_inputs(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &inputs, |b, inputs| {
            b.iter(|| build_dataset(black_box(inputs), &config).unwrap())
        });
    }
    group.finish();
}

fn bench_feature_row(c: &mut Criterion) {
    let config = FeatureConfig::default();
    let inputs = make_inputs(400);
    let as_of = inputs.prices.last_date().unwrap();
    c.bench_function("build_feature_row_400", |b| {
        b.iter(|| build_feature_row(black_box(&inputs), as_of, &config).unwrap())
    });
}

fn bench_indicators(c: &mut Criterion) {
    let config = FeatureConfig::default();
    let bars = make_bars(5_000);
    c.bench_function("indicators_5000", |b| {
        b.iter(|| compute_indicators(black_box(&bars), &config.indicators))
    });
}

criterion_group!(benches, bench_build_dataset, bench_feature_row, bench_indicators);
criterion_main!(benches);
