//! Seasonal decomposition of a time series into trend, seasonal and
//! residual components.
//!
//! The decomposition is classical: a centered moving average (or a
//! least-squares line) estimates the trend, per-phase means of the
//! detrended series estimate the seasonal indices, and the residual is
//! whatever the combination rule leaves over. Additive mode reconstructs
//! the source exactly at every index where all three components are
//! defined.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::na::NA;
use crate::series::{TimeSeries, VariableKind};
use crate::trend::TrendAnalyzer;

/// Combination rule for the decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecompositionMode {
    /// observed = trend + seasonal + residual
    Additive,
    /// observed = trend × seasonal × residual
    Multiplicative,
}

/// How the trend component is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendMethod {
    /// Centered moving average of window `period` (weighted 2×P window
    /// for even periods). Undefined near the series edges.
    CenteredMovingAverage,
    /// Straight line from a least-squares fit, defined at every index.
    LinearFit,
}

/// Decomposition of one series into aligned trend/seasonal/residual parts.
///
/// The three component vectors are aligned index-for-index with the
/// source series; the seasonal component repeats with period `period`.
/// The result references its source by label only, never by ownership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecompositionResult {
    /// Station/series identity of the source series.
    pub source_label: String,
    /// Seasonal period the decomposition was computed with.
    pub period: usize,
    /// Combination rule used.
    pub mode: DecompositionMode,
    /// Trend component; NA where the moving average window is undefined.
    pub trend: Vec<NA<f64>>,
    /// Seasonal component, one index per phase repeating across the series.
    pub seasonal: Vec<NA<f64>>,
    /// Residual component; NA wherever the source or trend is NA.
    pub residual: Vec<NA<f64>>,
}

impl DecompositionResult {
    /// The residual component as a series on the source axis, ready to
    /// feed the anomaly detector.
    pub fn residual_series(&self, source: &TimeSeries) -> Result<TimeSeries> {
        source.with_values(VariableKind::Other("residual".into()), self.residual.clone())
    }

    /// Seasonal index for phase `0..period` (the value every observation
    /// at that phase shares).
    pub fn seasonal_index(&self, phase: usize) -> Option<NA<f64>> {
        self.seasonal.get(phase).copied()
    }
}

/// Configurable seasonal decomposer.
#[derive(Debug, Clone)]
pub struct SeasonalDecomposer {
    period: usize,
    mode: DecompositionMode,
    trend_method: TrendMethod,
}

impl SeasonalDecomposer {
    /// Create a decomposer for a caller-declared period (e.g. 12 for
    /// monthly data with a yearly cycle).
    ///
    /// # Errors
    /// `InvalidConfiguration` for periods below 2.
    pub fn new(period: usize, mode: DecompositionMode) -> Result<Self> {
        if period < 2 {
            return Err(Error::InvalidConfiguration(format!(
                "seasonal period must be at least 2, got {}",
                period
            )));
        }
        Ok(SeasonalDecomposer {
            period,
            mode,
            trend_method: TrendMethod::CenteredMovingAverage,
        })
    }

    /// Select how the trend component is estimated.
    pub fn with_trend_method(mut self, method: TrendMethod) -> Self {
        self.trend_method = method;
        self
    }

    /// Decompose `series` into trend, seasonal and residual components.
    ///
    /// # Errors
    /// - `InsufficientData` when the series is shorter than two full
    ///   cycles (`2 × period`), or an entire phase has no non-missing
    ///   detrended value.
    /// - `InvalidConfiguration` in multiplicative mode when any observed
    ///   value is zero or negative.
    pub fn decompose(&self, series: &TimeSeries) -> Result<DecompositionResult> {
        let n = series.len();
        if n < 2 * self.period {
            return Err(Error::InsufficientData(format!(
                "seasonal decomposition needs at least {} observations (two cycles of {}), got {}",
                2 * self.period,
                self.period,
                n
            )));
        }
        if self.mode == DecompositionMode::Multiplicative {
            if let Some((t, v)) = series
                .iter()
                .find(|(_, v)| v.value().is_some_and(|&v| v <= 0.0))
            {
                return Err(Error::InvalidConfiguration(format!(
                    "multiplicative decomposition requires positive values; {} at {} is {}",
                    series.label(),
                    t,
                    v
                )));
            }
        }

        let trend = match self.trend_method {
            TrendMethod::CenteredMovingAverage => self.moving_average_trend(series),
            TrendMethod::LinearFit => {
                let fit = TrendAnalyzer::new().fit(series)?;
                series
                    .elapsed_days()
                    .into_iter()
                    .map(|t| NA::Value(fit.predict(t)))
                    .collect()
            }
        };

        // Detrend, then average by phase.
        let detrended: Vec<NA<f64>> = series
            .values()
            .iter()
            .zip(trend.iter())
            .map(|(obs, tr)| match self.mode {
                DecompositionMode::Additive => *obs - *tr,
                DecompositionMode::Multiplicative => *obs / *tr,
            })
            .collect();

        let indices = self.seasonal_indices(&detrended)?;
        let seasonal: Vec<NA<f64>> = (0..n).map(|i| NA::Value(indices[i % self.period])).collect();

        let residual: Vec<NA<f64>> = series
            .values()
            .iter()
            .zip(trend.iter())
            .zip(seasonal.iter())
            .map(|((obs, tr), se)| match self.mode {
                DecompositionMode::Additive => *obs - *tr - *se,
                DecompositionMode::Multiplicative => *obs / (*tr * *se),
            })
            .collect();

        debug!(
            "decomposed {} (period {}, {:?} mode, {:?} trend)",
            series.label(),
            self.period,
            self.mode,
            self.trend_method
        );

        Ok(DecompositionResult {
            source_label: series.label().to_string(),
            period: self.period,
            mode: self.mode,
            trend,
            seasonal,
            residual,
        })
    }

    /// Centered moving average of window `period`. Even periods use the
    /// standard weighted window over `period + 1` points with half weights
    /// at the ends. Missing values inside a window are skipped; a window
    /// with no non-missing value yields NA, as do the series edges.
    fn moving_average_trend(&self, series: &TimeSeries) -> Vec<NA<f64>> {
        let values = series.values();
        let n = values.len();
        let p = self.period;
        let even = p % 2 == 0;
        let half = p / 2;

        let mut trend = vec![NA::NA; n];
        for (i, slot) in trend.iter_mut().enumerate() {
            if i < half || i + half >= n {
                continue;
            }
            let mut weighted_sum = 0.0;
            let mut weight_total = 0.0;
            for offset in 0..=(if even { p } else { p - 1 }) {
                let j = i - half + offset;
                let w = if even && (offset == 0 || offset == p) {
                    0.5
                } else {
                    1.0
                };
                if let NA::Value(v) = values[j] {
                    weighted_sum += w * v;
                    weight_total += w;
                }
            }
            if weight_total > 0.0 {
                *slot = NA::Value(weighted_sum / weight_total);
            }
        }
        trend
    }

    /// Per-phase means of the detrended series, normalized so the indices
    /// sum to zero (additive) or average to one (multiplicative).
    fn seasonal_indices(&self, detrended: &[NA<f64>]) -> Result<Vec<f64>> {
        let p = self.period;
        let mut sums = vec![0.0; p];
        let mut counts = vec![0usize; p];
        for (i, v) in detrended.iter().enumerate() {
            if let NA::Value(v) = v {
                sums[i % p] += v;
                counts[i % p] += 1;
            }
        }

        let mut indices = Vec::with_capacity(p);
        for (phase, (&sum, &count)) in sums.iter().zip(counts.iter()).enumerate() {
            if count == 0 {
                return Err(Error::InsufficientData(format!(
                    "phase {} of {} has no non-missing detrended value",
                    phase, p
                )));
            }
            indices.push(sum / count as f64);
        }

        match self.mode {
            DecompositionMode::Additive => {
                let mean = indices.iter().sum::<f64>() / p as f64;
                for idx in &mut indices {
                    *idx -= mean;
                }
            }
            DecompositionMode::Multiplicative => {
                let mean = indices.iter().sum::<f64>() / p as f64;
                if mean.abs() <= f64::EPSILON {
                    return Err(Error::DegenerateInput(
                        "seasonal indices average to zero; cannot normalize multiplicatively"
                            .into(),
                    ));
                }
                for idx in &mut indices {
                    *idx /= mean;
                }
            }
        }
        Ok(indices)
    }
}
