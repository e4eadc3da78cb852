//! Slice-level descriptive statistics used throughout the engine.
//!
//! Callers pass the non-missing values only; missing-value exclusion
//! happens at the series boundary (`stats::mean` and friends).

use crate::error::{Error, Result};

/// Arithmetic mean.
pub fn mean_of(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::InsufficientData(
            "mean requires at least one non-missing value".into(),
        ));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median; the midpoint average for even-length input.
pub fn median_of(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::InsufficientData(
            "median requires at least one non-missing value".into(),
        ));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 0 {
        Ok((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    } else {
        Ok(sorted[n / 2])
    }
}

/// Mode; ties break to the smallest tied value.
///
/// Implemented as a run-length scan over the sorted values so the tie
/// break falls out of the ascending order.
pub fn mode_of(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::InsufficientData(
            "mode requires at least one non-missing value".into(),
        ));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut best_value = sorted[0];
    let mut best_count = 0usize;
    let mut run_value = sorted[0];
    let mut run_count = 0usize;
    for &v in &sorted {
        if v == run_value {
            run_count += 1;
        } else {
            run_value = v;
            run_count = 1;
        }
        // Strict > keeps the earliest (smallest) value on ties.
        if run_count > best_count {
            best_count = run_count;
            best_value = run_value;
        }
    }
    Ok(best_value)
}

/// Welford single-pass accumulation of mean and sum of squared deviations.
pub(crate) fn welford(values: &[f64]) -> (f64, f64) {
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for (i, &x) in values.iter().enumerate() {
        let delta = x - mean;
        mean += delta / (i + 1) as f64;
        m2 += delta * (x - mean);
    }
    (mean, m2)
}

/// Sample variance (n − 1 denominator).
pub fn variance_of(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(Error::InsufficientData(
            "variance requires at least two non-missing values".into(),
        ));
    }
    let (_, m2) = welford(values);
    Ok(m2 / (values.len() - 1) as f64)
}

/// Sample standard deviation.
pub fn stddev_of(values: &[f64]) -> Result<f64> {
    Ok(variance_of(values)?.sqrt())
}
