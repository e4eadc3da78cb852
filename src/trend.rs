//! Ordinary least-squares trend analysis over a time series.
//!
//! Regresses the observed values against elapsed time (days since the
//! series start) using only non-missing points. The residual series
//! (observed − fitted) is the coupling point into seasonal decomposition
//! and anomaly detection.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::na::NA;
use crate::series::{TimeSeries, VariableKind};
use crate::stats::distribution::{normal_cdf, normal_ppf};

/// Least-squares trend fitter.
#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    confidence_level: f64,
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        TrendAnalyzer {
            confidence_level: 0.95,
        }
    }
}

/// Result of a linear trend fit.
///
/// `slope` is in value units per day; the confidence interval covers the
/// slope at the analyzer's configured level under a normal-residual
/// assumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendFit {
    /// Station/series identity of the source series.
    pub source_label: String,
    /// Slope of the fitted line, value units per elapsed day.
    pub slope: f64,
    /// Intercept at the series start.
    pub intercept: f64,
    /// Standard error of the slope estimate.
    pub slope_stderr: f64,
    /// Confidence interval for the slope, `(low, high)`.
    pub confidence_interval: (f64, f64),
    /// Pearson correlation between elapsed time and value.
    pub r_value: f64,
    /// Two-sided p-value for the null hypothesis of zero slope.
    pub p_value: f64,
    /// Number of non-missing points used in the fit.
    pub n_used: usize,
}

impl TrendAnalyzer {
    /// Analyzer with a 95% confidence interval.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the confidence level for the slope interval.
    ///
    /// # Errors
    /// `InvalidConfiguration` unless `level` lies strictly in (0, 1).
    pub fn with_confidence_level(mut self, level: f64) -> Result<Self> {
        if !(level > 0.0 && level < 1.0) {
            return Err(Error::InvalidConfiguration(format!(
                "confidence level must lie in (0, 1), got {}",
                level
            )));
        }
        self.confidence_level = level;
        Ok(self)
    }

    /// Fit a straight line to the non-missing points of `series`.
    ///
    /// # Errors
    /// - `InsufficientData` with fewer than 3 non-missing points.
    /// - `DegenerateInput` when all non-missing timestamps coincide
    ///   (zero time variance).
    pub fn fit(&self, series: &TimeSeries) -> Result<TrendFit> {
        let axis = series.elapsed_days();
        let points: Vec<(f64, f64)> = axis
            .iter()
            .zip(series.values().iter())
            .filter_map(|(&t, v)| v.value().map(|&y| (t, y)))
            .collect();

        let n = points.len();
        if n < 3 {
            return Err(Error::InsufficientData(format!(
                "trend regression needs at least 3 non-missing points, got {}",
                n
            )));
        }

        let t_mean = points.iter().map(|(t, _)| t).sum::<f64>() / n as f64;
        let y_mean = points.iter().map(|(_, y)| y).sum::<f64>() / n as f64;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        let mut syy = 0.0;
        for &(t, y) in &points {
            let dt = t - t_mean;
            let dy = y - y_mean;
            sxx += dt * dt;
            sxy += dt * dy;
            syy += dy * dy;
        }

        if sxx <= f64::EPSILON {
            return Err(Error::DegenerateInput(
                "all non-missing timestamps coincide; time axis has zero variance".into(),
            ));
        }

        let slope = sxy / sxx;
        let intercept = y_mean - slope * t_mean;

        let rss: f64 = points
            .iter()
            .map(|&(t, y)| {
                let e = y - (intercept + slope * t);
                e * e
            })
            .sum();
        let slope_stderr = (rss / (n - 2) as f64 / sxx).sqrt();

        let r_value = if syy > 0.0 {
            sxy / (sxx * syy).sqrt()
        } else {
            0.0
        };

        // Two-sided test of zero slope; normal approximation to the t
        // distribution, matching the interval construction below.
        let p_value = if slope_stderr > 0.0 {
            2.0 * (1.0 - normal_cdf((slope / slope_stderr).abs()))
        } else {
            0.0
        };

        let z = normal_ppf(0.5 + self.confidence_level / 2.0);
        let confidence_interval = (slope - z * slope_stderr, slope + z * slope_stderr);

        debug!(
            "trend fit for {}: slope={:.6} stderr={:.6} over {} points",
            series.label(),
            slope,
            slope_stderr,
            n
        );

        Ok(TrendFit {
            source_label: series.label().to_string(),
            slope,
            intercept,
            slope_stderr,
            confidence_interval,
            r_value,
            p_value,
            n_used: n,
        })
    }

    /// Fit and subtract, returning the residual series in one call.
    pub fn residuals(&self, series: &TimeSeries) -> Result<TimeSeries> {
        self.fit(series)?.residuals(series)
    }
}

impl TrendFit {
    /// Value of the fitted line at `elapsed_days` since the source series
    /// start.
    pub fn predict(&self, elapsed_days: f64) -> f64 {
        self.intercept + self.slope * elapsed_days
    }

    /// Fitted values on the source series axis; defined at every
    /// timestamp, including those with missing observations.
    pub fn fitted(&self, series: &TimeSeries) -> Result<TimeSeries> {
        let values = series
            .elapsed_days()
            .into_iter()
            .map(|t| NA::Value(self.predict(t)))
            .collect();
        series.with_values(series.kind().clone(), values)
    }

    /// Residual series (observed − fitted); NA wherever the source is NA.
    pub fn residuals(&self, series: &TimeSeries) -> Result<TimeSeries> {
        let values = series
            .elapsed_days()
            .iter()
            .zip(series.values().iter())
            .map(|(&t, v)| v.map(|&y| y - self.predict(t)))
            .collect();
        series.with_values(VariableKind::Other("residual".into()), values)
    }

    /// Width of the slope confidence interval.
    pub fn confidence_width(&self) -> f64 {
        self.confidence_interval.1 - self.confidence_interval.0
    }
}
