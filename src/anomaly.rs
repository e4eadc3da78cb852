//! Baseline-relative statistical anomaly flagging.
//!
//! Consumes a residual series (typically the output of the seasonal
//! decomposer) and flags every point whose z-score against the residual
//! baseline exceeds the sensitivity threshold.

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::series::TimeSeries;
use crate::stats::descriptive::welford;

/// Default sensitivity threshold, in standard-deviation units.
pub const DEFAULT_THRESHOLD_K: f64 = 2.0;

/// One scored observation; produced one-to-one with the non-missing
/// observations of the input series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyRecord {
    /// Timestamp of the observation.
    pub timestamp: NaiveDate,
    /// Observed residual value.
    pub observed: f64,
    /// Expected value under the baseline (the residual mean).
    pub expected: f64,
    /// Deviation from the baseline in standard-deviation units.
    pub deviation_score: f64,
    /// Whether `|deviation_score|` strictly exceeds the threshold.
    pub flagged: bool,
}

/// The full scan of one series, tagged with its source identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyReport {
    /// Station/series identity of the scanned series.
    pub source_label: String,
    /// Threshold the scan was run with.
    pub threshold_k: f64,
    /// Baseline mean of the non-missing residuals.
    pub baseline_mean: f64,
    /// Baseline sample standard deviation of the non-missing residuals.
    pub baseline_stddev: f64,
    /// One record per non-missing observation, in time order.
    pub records: Vec<AnomalyRecord>,
}

impl AnomalyReport {
    /// Only the flagged records.
    pub fn flagged(&self) -> impl Iterator<Item = &AnomalyRecord> {
        self.records.iter().filter(|r| r.flagged)
    }
}

/// Threshold-based anomaly detector.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    threshold_k: f64,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        AnomalyDetector {
            threshold_k: DEFAULT_THRESHOLD_K,
        }
    }
}

impl AnomalyDetector {
    /// Detector with sensitivity `k` in standard-deviation units.
    ///
    /// # Errors
    /// `InvalidConfiguration` for a non-finite or non-positive threshold.
    pub fn new(threshold_k: f64) -> Result<Self> {
        if !threshold_k.is_finite() || threshold_k <= 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "anomaly threshold must be a positive finite number, got {}",
                threshold_k
            )));
        }
        Ok(AnomalyDetector { threshold_k })
    }

    /// Score every non-missing point of `residuals` against the series'
    /// own mean and standard deviation. A point whose score is exactly at
    /// the threshold is not flagged (strict `>` comparison).
    ///
    /// # Errors
    /// - `InsufficientData` with fewer than 2 non-missing points.
    /// - `DegenerateInput` when the residual standard deviation is
    ///   numerically zero (flat series): every nonzero residual would be
    ///   trivially flagged, so the condition is reported instead of
    ///   silently dividing by zero.
    pub fn detect(&self, residuals: &TimeSeries) -> Result<AnomalyReport> {
        let points = residuals.valid_points();
        if points.len() < 2 {
            return Err(Error::InsufficientData(format!(
                "anomaly baseline needs at least 2 non-missing residuals, got {}",
                points.len()
            )));
        }

        let values: Vec<f64> = points.iter().map(|&(_, v)| v).collect();
        let (mean, m2) = welford(&values);
        let stddev = (m2 / (values.len() - 1) as f64).sqrt();
        if stddev <= f64::EPSILON {
            return Err(Error::DegenerateInput(format!(
                "residuals of {} have zero standard deviation; z-scores are undefined",
                residuals.label()
            )));
        }

        let records: Vec<AnomalyRecord> = points
            .into_iter()
            .map(|(timestamp, observed)| {
                let deviation_score = (observed - mean) / stddev;
                AnomalyRecord {
                    timestamp,
                    observed,
                    expected: mean,
                    deviation_score,
                    flagged: deviation_score.abs() > self.threshold_k,
                }
            })
            .collect();

        debug!(
            "anomaly scan of {}: {} of {} points flagged at k={}",
            residuals.label(),
            records.iter().filter(|r| r.flagged).count(),
            records.len(),
            self.threshold_k
        );

        Ok(AnomalyReport {
            source_label: residuals.label().to_string(),
            threshold_k: self.threshold_k,
            baseline_mean: mean,
            baseline_stddev: stddev,
            records,
        })
    }
}
