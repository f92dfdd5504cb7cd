//! Exponential Moving Average helpers.
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (period + 1).
//! Seed: EMA at the end of the first full window = SMA of that window.

/// EMA of a series that may start with a NaN warmup prefix.
///
/// The seed window begins at the first defined value, so composed indicators
/// (MACD signal line over the MACD line) can chain EMAs. A NaN after the seed
/// taints every later value.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 {
        return result;
    }
    let Some(start) = values.iter().position(|v| !v.is_nan()) else {
        return result;
    };
    if n - start < period {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);

    let mut sum = 0.0;
    for &v in &values[start..start + period] {
        if v.is_nan() {
            return result;
        }
        sum += v;
    }
    let seed_index = start + period - 1;
    let mut prev = sum / period as f64;
    result[seed_index] = prev;

    for i in (seed_index + 1)..n {
        if values[i].is_nan() {
            return result;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }

    result
}
