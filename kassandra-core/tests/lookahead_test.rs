//! Look-ahead contamination tests.
//!
//! No feature value at row t may depend on data dated after t.
//!
//! Method: build on a truncated history and on the full history, then assert
//! every row the two share is identical. Any difference means a value at t
//! was influenced by something later than t.

use chrono::{Duration, NaiveDate};
use kassandra_core::domain::{DailySeries, PriceBar, SentimentAggregate, TrendScore};
use kassandra_core::features::{build_dataset, build_feature_row, FeatureConfig, SourceInputs};
use kassandra_core::indicators::*;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

/// N bars of deterministic pseudo-random OHLCV data.
fn make_test_bars(n: usize) -> Vec<PriceBar> {
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0;
    for i in 0..n {
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
        let change = ((seed % 200) as f64 - 100.0) * 0.05;
        price = (price + change).max(10.0);
        let open = price - 0.5;
        let close = price + 0.3;
        bars.push(PriceBar {
            date: base_date() + Duration::days(i as i64),
            open,
            high: open.max(close) + 2.0,
            low: open.min(close) - 2.0,
            close,
            volume: 1000 + i as u64 * 100,
        });
    }
    bars
}

fn make_sentiment(n: usize, every: usize) -> Vec<SentimentAggregate> {
    (0..n)
        .filter(|i| i % every == 0)
        .map(|i| SentimentAggregate {
            mean_sentiment: ((i as f64) * 0.37).sin(),
            volume: (i % 7) as f64 + 1.0,
            engagement: (i * 3) as f64,
            ..SentimentAggregate::neutral(base_date() + Duration::days(i as i64))
        })
        .collect()
}

fn make_trends(n: usize) -> Vec<TrendScore> {
    (0..n)
        .filter(|i| i % 7 == 3)
        .map(|i| TrendScore {
            date: base_date() + Duration::days(i as i64),
            search_interest: (i % 10) as f64 / 10.0,
        })
        .collect()
}

fn full_inputs(n: usize) -> SourceInputs {
    SourceInputs {
        prices: DailySeries::new(make_test_bars(n)).unwrap(),
        news: DailySeries::new(make_sentiment(n, 2)).unwrap().into(),
        reddit: DailySeries::new(make_sentiment(n, 3)).unwrap().into(),
        trends: DailySeries::new(make_trends(n)).unwrap().into(),
    }
}

fn assert_no_lookahead(indicator: &dyn Indicator, full_bars: &[PriceBar], truncated_len: usize) {
    let full_result = indicator.compute(full_bars);
    let truncated_result = indicator.compute(&full_bars[..truncated_len]);
    assert_eq!(truncated_result.len(), truncated_len, "{}", indicator.name());

    for i in 0..truncated_len {
        let (t, f) = (truncated_result[i], full_result[i]);
        if t.is_nan() && f.is_nan() {
            continue;
        }
        assert!(
            (t - f).abs() < 1e-10,
            "{}: look-ahead contamination at bar {i}: truncated={t}, full={f}",
            indicator.name()
        );
    }
}

#[test]
fn no_lookahead_in_indicators() {
    let bars = make_test_bars(200);
    let indicators: Vec<Box<dyn Indicator>> = vec![
        Box::new(Sma::new(5)),
        Box::new(Sma::new(20)),
        Box::new(Sma::rolling_mean(7)),
        Box::new(RollingStd::new(14)),
        Box::new(Rsi::new(14)),
        Box::new(Rsi::with_smoothing(14, RsiSmoothing::Wilder)),
        Box::new(Macd::line(12, 26, 9)),
        Box::new(Macd::signal(12, 26, 9)),
        Box::new(DailyReturn),
        Box::new(Volatility::new(20)),
    ];
    for ind in &indicators {
        for cut in [30, 100, 150] {
            assert_no_lookahead(ind.as_ref(), &bars, cut);
        }
    }
}

#[test]
fn no_lookahead_in_dataset() {
    let config = FeatureConfig::default();
    let full = full_inputs(120);
    let full_ds = build_dataset(&full, &config).unwrap();

    for cut in [40usize, 80] {
        let cut_date = base_date() + Duration::days(cut as i64 - 1);
        let truncated = full.truncate_after(cut_date);
        let ds = build_dataset(&truncated, &config).unwrap();
        assert_eq!(ds.len(), cut - 1);

        for row in 0..ds.len() {
            assert_eq!(ds.dates[row], full_ds.dates[row]);
            assert_eq!(ds.targets[row], full_ds.targets[row]);
            assert_eq!(
                ds.features.row(row),
                full_ds.features.row(row),
                "row {row} differs when later data is present"
            );
        }
    }
}

#[test]
fn live_row_matches_training_row() {
    let config = FeatureConfig::default();
    let full = full_inputs(90);
    let ds = build_dataset(&full, &config).unwrap();

    for row in [10usize, 45, 88] {
        let as_of = ds.dates[row];
        let live = build_feature_row(&full, as_of, &config).unwrap();
        assert_eq!(live.date, as_of);
        assert_eq!(live.schema, ds.schema);
        assert_eq!(live.values.as_slice(), ds.features.row(row));
    }
}

#[test]
fn live_row_ignores_records_after_as_of() {
    let config = FeatureConfig::default();
    let full = full_inputs(60);
    let as_of = base_date() + Duration::days(30);

    let from_full = build_feature_row(&full, as_of, &config).unwrap();
    let from_truncated = build_feature_row(&full.truncate_after(as_of), as_of, &config).unwrap();
    assert_eq!(from_full, from_truncated);
}

// ── Fixed scenarios ──────────────────────────────────────────────────

fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: base_date() + Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 500,
        })
        .collect()
}

#[test]
fn four_closes_without_sentiment() {
    let inputs =
        SourceInputs::prices_only(DailySeries::new(bars_from_closes(&[100.0, 102.0, 101.0, 105.0])).unwrap());
    let ds = build_dataset(&inputs, &FeatureConfig::default()).unwrap();

    assert_eq!(ds.len(), 3);
    assert_eq!(ds.targets, vec![102.0, 101.0, 105.0]);

    for name in ds.schema.names() {
        let column = ds.features.column(&name).unwrap();
        if name.starts_with("news_") || name.starts_with("reddit_") || name.starts_with("trend_") {
            assert_eq!(column, vec![0.0; 3], "{name}");
        }
    }
    assert_eq!(ds.features.column("sma_5").unwrap(), vec![0.0; 3]);
    assert_eq!(ds.features.column("sma_20").unwrap(), vec![0.0; 3]);
    assert_eq!(ds.features.column("rsi_14").unwrap(), vec![0.0; 3]);
    assert_eq!(ds.features.column("close").unwrap(), vec![100.0, 102.0, 101.0]);
    assert!(ds.features.as_slice().iter().all(|v| v.is_finite()));
}

#[test]
fn rsi_is_100_without_down_days() {
    let closes: Vec<f64> = (0..20).map(|i| 50.0 + i as f64).collect();
    let inputs = SourceInputs::prices_only(DailySeries::new(bars_from_closes(&closes)).unwrap());
    let ds = build_dataset(&inputs, &FeatureConfig::default()).unwrap();
    let rsi = ds.features.column("rsi_14").unwrap();
    assert!(rsi[..14].iter().all(|&v| v == 0.0));
    assert!(rsi[14..].iter().all(|&v| v == 100.0));
}

#[test]
fn sentiment_reaches_features_only_through_lag() {
    let bars = bars_from_closes(&[10.0, 11.0, 12.0, 13.0, 14.0]);
    let d2 = bars[2].date;
    let mut inputs = SourceInputs::prices_only(DailySeries::new(bars).unwrap());
    inputs.news = DailySeries::new(vec![SentimentAggregate {
        mean_sentiment: 0.8,
        ..SentimentAggregate::neutral(d2)
    }])
    .unwrap()
    .into();

    let ds = build_dataset(&inputs, &FeatureConfig::default()).unwrap();
    assert!(ds.schema.index_of("news_mean_sentiment").is_none());
    assert_eq!(
        ds.features.column("news_mean_sentiment_lag_1").unwrap(),
        vec![0.0, 0.0, 0.0, 0.8]
    );
    assert_eq!(
        ds.features.column("news_mean_sentiment_lag_2").unwrap(),
        vec![0.0, 0.0, 0.0, 0.0]
    );
}

#[test]
fn weekend_sentiment_never_reaches_monday() {
    // Fri 2024-01-05, Mon 2024-01-08, Tue 2024-01-09, Wed 2024-01-10
    let dates = [5u32, 8, 9, 10].map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap());
    let bars: Vec<PriceBar> = dates
        .iter()
        .enumerate()
        .map(|(i, &date)| PriceBar {
            date,
            open: 10.0,
            high: 11.0,
            low: 9.0,
            close: 10.0 + i as f64,
            volume: 1,
        })
        .collect();
    let saturday = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
    let mut inputs = SourceInputs::prices_only(DailySeries::new(bars).unwrap());
    inputs.news = DailySeries::new(vec![SentimentAggregate {
        mean_sentiment: -0.9,
        ..SentimentAggregate::neutral(saturday)
    }])
    .unwrap()
    .into();

    let ds = build_dataset(&inputs, &FeatureConfig::default()).unwrap();
    for k in 1..=3 {
        let column = ds
            .features
            .column(&format!("news_mean_sentiment_lag_{k}"))
            .unwrap();
        assert!(column.iter().all(|&v| v == 0.0));
    }
}
