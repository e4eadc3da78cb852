//! Standardized Precipitation Index.
//!
//! Aggregates precipitation to monthly totals, sums them over the
//! requested timescale, fits a two-parameter gamma distribution to the
//! positive aggregated values, and maps each value's cumulative
//! probability to a standard normal quantile. The probability mass at
//! zero precipitation is carried separately, since the gamma density is
//! undefined at zero: `H(x) = q + (1 − q)·G(x)` with `q` the observed
//! zero fraction.

use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::na::NA;
use crate::resample::{resample_sum, ResamplePeriod};
use crate::series::TimeSeries;
use crate::stats::descriptive::welford;
use crate::stats::distribution::{gamma_cdf, normal_ppf};

use super::{ClimateIndexCalculator, ClimateIndexResult, ClimateInputs, IndexKind};

/// Gamma distributions fitted below this many aggregated values are
/// unreliable; the fit is refused rather than silently degraded.
pub const MIN_FIT_POINTS: usize = 20;

// Cumulative probabilities are clamped into this open interval before the
// normal quantile transform.
const PROB_FLOOR: f64 = 1e-7;

/// Fitted two-parameter gamma distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GammaParams {
    /// Shape parameter (α).
    pub shape: f64,
    /// Scale parameter (θ).
    pub scale: f64,
}

/// Strategy seam for gamma parameter estimation, so maximum likelihood
/// and method of moments can be swapped without touching callers.
pub trait GammaFit {
    /// Fit `values`, which are all strictly positive.
    fn fit(&self, values: &[f64]) -> Result<GammaParams>;
}

/// Method-of-moments estimator: `shape = mean² / var`, `scale = var / mean`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodOfMoments;

impl GammaFit for MethodOfMoments {
    fn fit(&self, values: &[f64]) -> Result<GammaParams> {
        if values.len() < 2 {
            return Err(Error::FitFailure(format!(
                "method of moments needs at least 2 positive values, got {}",
                values.len()
            )));
        }
        let (mean, m2) = welford(values);
        let variance = m2 / (values.len() - 1) as f64;
        if variance <= 0.0 {
            return Err(Error::FitFailure(
                "aggregated precipitation has zero variance; gamma fit is degenerate".into(),
            ));
        }
        finite_params(mean * mean / variance, variance / mean)
    }
}

/// Approximate maximum-likelihood estimator (Thom 1958): solves the
/// log-moment equation `A = ln(mean) − mean(ln x)` with the closed-form
/// approximation `shape ≈ (1 + √(1 + 4A/3)) / (4A)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaximumLikelihood;

impl GammaFit for MaximumLikelihood {
    fn fit(&self, values: &[f64]) -> Result<GammaParams> {
        if values.len() < 2 {
            return Err(Error::FitFailure(format!(
                "maximum likelihood needs at least 2 positive values, got {}",
                values.len()
            )));
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        // Log-space accumulation keeps the likelihood stable for small
        // precipitation totals.
        let mean_ln = values.iter().map(|&v| v.ln()).sum::<f64>() / n;
        let a = mean.ln() - mean_ln;
        if a <= 0.0 {
            return Err(Error::FitFailure(format!(
                "log-moment statistic is non-positive ({:.6}); values are too uniform for the Thom approximation",
                a
            )));
        }
        let shape = (1.0 + (1.0 + 4.0 * a / 3.0).sqrt()) / (4.0 * a);
        finite_params(shape, mean / shape)
    }
}

fn finite_params(shape: f64, scale: f64) -> Result<GammaParams> {
    if !shape.is_finite() || !scale.is_finite() || shape <= 0.0 || scale <= 0.0 {
        return Err(Error::FitFailure(format!(
            "gamma fit produced unusable parameters: shape={}, scale={}",
            shape, scale
        )));
    }
    Ok(GammaParams { shape, scale })
}

/// Which estimation strategy the calculator uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitMethod {
    /// Method of moments (default; robust on short records).
    MethodOfMoments,
    /// Thom's approximate maximum likelihood.
    MaximumLikelihood,
}

/// SPI configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpiOptions {
    /// Aggregation timescale in months (1, 3, 12, ...).
    pub timescale_months: usize,
    /// Gamma estimation strategy.
    pub fit: FitMethod,
}

/// Standardized Precipitation Index calculator.
#[derive(Debug, Clone)]
pub struct SpiCalculator {
    options: SpiOptions,
}

impl SpiCalculator {
    /// Calculator for the given timescale and fit method.
    ///
    /// # Errors
    /// `InvalidConfiguration` for a zero timescale.
    pub fn new(options: SpiOptions) -> Result<Self> {
        if options.timescale_months == 0 {
            return Err(Error::InvalidConfiguration(
                "SPI timescale must be at least one month".into(),
            ));
        }
        Ok(SpiCalculator { options })
    }

    /// Compute SPI over a precipitation series (daily or already monthly).
    ///
    /// Output rows appear at the month ending each complete aggregation
    /// window; months whose window is incomplete, gapped or missing are
    /// skipped.
    ///
    /// # Errors
    /// `FitFailure` when fewer than [`MIN_FIT_POINTS`] aggregated values
    /// exist, when all aggregated values are zero, or when parameter
    /// estimation fails.
    pub fn calculate(&self, precipitation: &TimeSeries) -> Result<Vec<ClimateIndexResult>> {
        let monthly = resample_sum(precipitation, ResamplePeriod::Monthly)?;
        let aggregated = self.rolling_window_sums(&monthly);

        let valid: Vec<f64> = aggregated.iter().filter_map(|&(_, v)| v).collect();
        if valid.len() < MIN_FIT_POINTS {
            return Err(Error::FitFailure(format!(
                "SPI fit needs at least {} aggregated values, got {}",
                MIN_FIT_POINTS,
                valid.len()
            )));
        }

        let zeros = valid.iter().filter(|&&v| v == 0.0).count();
        if zeros == valid.len() {
            return Err(Error::FitFailure(
                "all aggregated precipitation values are zero; distribution is degenerate".into(),
            ));
        }
        let zero_probability = zeros as f64 / valid.len() as f64;

        let positives: Vec<f64> = valid.iter().copied().filter(|&v| v > 0.0).collect();
        let params = match self.options.fit {
            FitMethod::MethodOfMoments => MethodOfMoments.fit(&positives)?,
            FitMethod::MaximumLikelihood => MaximumLikelihood.fit(&positives)?,
        };
        debug!(
            "SPI-{} gamma fit for {}: shape={:.4} scale={:.4} q0={:.4}",
            self.options.timescale_months,
            precipitation.label(),
            params.shape,
            params.scale,
            zero_probability
        );

        Ok(aggregated
            .into_iter()
            .filter_map(|(timestamp, value)| {
                let value = value?;
                let g = gamma_cdf(value, params.shape, params.scale);
                let h = zero_probability + (1.0 - zero_probability) * g;
                let h = h.clamp(PROB_FLOOR, 1.0 - PROB_FLOOR);
                Some(ClimateIndexResult {
                    timestamp,
                    value: normal_ppf(h),
                    kind: IndexKind::Spi,
                    source_label: precipitation.label().to_string(),
                })
            })
            .collect())
    }

    /// Sum of `timescale_months` consecutive calendar months ending at
    /// each month. `None` when the window is incomplete, contains a
    /// missing month, or spans a gap in the monthly axis.
    fn rolling_window_sums(&self, monthly: &TimeSeries) -> Vec<(NaiveDate, Option<f64>)> {
        let k = self.options.timescale_months;
        let timestamps = monthly.timestamps();
        let values = monthly.values();

        (0..monthly.len())
            .map(|end| {
                let ts = timestamps[end];
                if end + 1 < k {
                    return (ts, None);
                }
                let start = end + 1 - k;
                if !months_contiguous(&timestamps[start..=end]) {
                    return (ts, None);
                }
                let mut sum = 0.0;
                for v in &values[start..=end] {
                    match v {
                        NA::Value(v) => sum += v,
                        NA::NA => return (ts, None),
                    }
                }
                (ts, Some(sum))
            })
            .collect()
    }
}

/// Whether consecutive entries are exactly one calendar month apart.
pub(crate) fn months_contiguous(timestamps: &[NaiveDate]) -> bool {
    timestamps.windows(2).all(|pair| {
        let months = |d: NaiveDate| d.year() * 12 + d.month() as i32 - 1;
        months(pair[1]) - months(pair[0]) == 1
    })
}

impl ClimateIndexCalculator for SpiCalculator {
    fn kind(&self) -> IndexKind {
        IndexKind::Spi
    }

    fn compute(&self, inputs: &ClimateInputs<'_>) -> Result<Vec<ClimateIndexResult>> {
        match inputs.precipitation {
            Some(precipitation) => self.calculate(precipitation),
            None => Err(Error::MissingInput(
                "SPI requires a precipitation series".into(),
            )),
        }
    }
}
