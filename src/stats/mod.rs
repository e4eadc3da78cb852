//! Descriptive statistics with missing-aware semantics.
//!
//! Every operation excludes missing values from the computation; a gap is
//! never treated as zero. Operations that need at least one (or two)
//! non-missing points fail with `InsufficientData` instead of returning a
//! default.

pub mod descriptive;
pub(crate) mod distribution;

use crate::error::Result;
use crate::series::TimeSeries;

/// Mean of the non-missing values of a series.
///
/// # Errors
/// `InsufficientData` if the series has no non-missing value.
pub fn mean(series: &TimeSeries) -> Result<f64> {
    descriptive::mean_of(&series.valid_values())
}

/// Median of the non-missing values of a series.
///
/// # Errors
/// `InsufficientData` if the series has no non-missing value.
pub fn median(series: &TimeSeries) -> Result<f64> {
    descriptive::median_of(&series.valid_values())
}

/// Mode of the non-missing values of a series. Ties are broken by
/// returning the smallest value among the tied modes, so the result is
/// deterministic and reproducible.
///
/// # Errors
/// `InsufficientData` if the series has no non-missing value.
pub fn mode(series: &TimeSeries) -> Result<f64> {
    descriptive::mode_of(&series.valid_values())
}

/// Sample variance (n − 1 denominator) of the non-missing values,
/// accumulated with Welford's algorithm for numerical stability.
///
/// # Errors
/// `InsufficientData` if fewer than 2 non-missing values exist.
pub fn variance(series: &TimeSeries) -> Result<f64> {
    descriptive::variance_of(&series.valid_values())
}

/// Sample standard deviation of the non-missing values.
///
/// # Errors
/// `InsufficientData` if fewer than 2 non-missing values exist.
pub fn stddev(series: &TimeSeries) -> Result<f64> {
    descriptive::stddev_of(&series.valid_values())
}
