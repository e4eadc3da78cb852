//! Growing Degree Days.
//!
//! Per time step `gdd = max(0, (t_max + t_min) / 2 − t_base)`, accumulated
//! over the caller's window. The base temperature varies by crop and
//! region, so it is a mandatory parameter with no default. No
//! interpolation is performed: a missing temperature bound inside the
//! window is an error, not a zero.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::na::NA;
use crate::series::TimeSeries;

use super::{ClimateIndexCalculator, ClimateIndexResult, ClimateInputs, IndexKind};

/// Accumulation window for cumulative GDD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GddWindow {
    /// Never reset: cumulative sum over the whole span.
    Daily,
    /// Reset the accumulator at each calendar month boundary.
    Monthly,
    /// Reset at meteorological season boundaries (March, June,
    /// September, December).
    Seasonal,
}

/// GDD configuration. `base_temp` is in the same units as the input
/// temperature series (°C).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GddOptions {
    /// Threshold temperature below which no growth is accumulated.
    pub base_temp: f64,
    /// Accumulation window.
    pub window: GddWindow,
}

/// Growing Degree Days calculator.
#[derive(Debug, Clone)]
pub struct GddCalculator {
    options: GddOptions,
}

impl GddCalculator {
    /// Calculator with an explicit base temperature and window.
    pub fn new(options: GddOptions) -> Self {
        GddCalculator { options }
    }

    /// Cumulative GDD from daily min/max temperature series.
    ///
    /// # Errors
    /// - `InvalidInput` if the two series are not on the same time axis.
    /// - `MissingInput` if either bound is missing for any step in the
    ///   window.
    pub fn calculate(
        &self,
        t_max: &TimeSeries,
        t_min: &TimeSeries,
    ) -> Result<Vec<ClimateIndexResult>> {
        if t_max.timestamps() != t_min.timestamps() {
            return Err(Error::InvalidInput(
                "GDD min/max series must share one time axis".into(),
            ));
        }

        let mut steps = Vec::with_capacity(t_max.len());
        for ((date, max), (_, min)) in t_max.iter().zip(t_min.iter()) {
            match (max, min) {
                (NA::Value(max), NA::Value(min)) => {
                    steps.push((date, ((max + min) / 2.0 - self.options.base_temp).max(0.0)));
                }
                _ => {
                    return Err(Error::MissingInput(format!(
                        "GDD needs both temperature bounds at {}",
                        date
                    )));
                }
            }
        }
        Ok(self.accumulate(t_max.label(), steps))
    }

    /// Cumulative GDD from a single mean-temperature series:
    /// `max(0, t − t_base)` per step.
    ///
    /// # Errors
    /// `MissingInput` if any step in the window is missing.
    pub fn calculate_single(&self, temperature: &TimeSeries) -> Result<Vec<ClimateIndexResult>> {
        let mut steps = Vec::with_capacity(temperature.len());
        for (date, value) in temperature.iter() {
            match value {
                NA::Value(t) => steps.push((date, (t - self.options.base_temp).max(0.0))),
                NA::NA => {
                    return Err(Error::MissingInput(format!(
                        "GDD needs a temperature value at {}",
                        date
                    )));
                }
            }
        }
        Ok(self.accumulate(temperature.label(), steps))
    }

    /// Running sum with window resets.
    fn accumulate(
        &self,
        label: &str,
        steps: Vec<(chrono::NaiveDate, f64)>,
    ) -> Vec<ClimateIndexResult> {
        let mut total = 0.0;
        let mut previous_bucket: Option<(i32, u32)> = None;
        steps
            .into_iter()
            .map(|(date, step)| {
                let bucket = match self.options.window {
                    GddWindow::Daily => None,
                    GddWindow::Monthly => Some((date.year(), date.month())),
                    // Meteorological seasons: DJF, MAM, JJA, SON. December
                    // belongs to the following year's winter.
                    GddWindow::Seasonal => {
                        let (season_year, season) = match date.month() {
                            12 => (date.year() + 1, 0),
                            m => (date.year(), m / 3),
                        };
                        Some((season_year, season))
                    }
                };
                if bucket.is_some() && previous_bucket != bucket {
                    total = 0.0;
                }
                previous_bucket = bucket;
                total += step;
                ClimateIndexResult {
                    timestamp: date,
                    value: total,
                    kind: IndexKind::Gdd,
                    source_label: label.to_string(),
                }
            })
            .collect()
    }
}

impl ClimateIndexCalculator for GddCalculator {
    fn kind(&self) -> IndexKind {
        IndexKind::Gdd
    }

    /// Prefers the min/max pair; falls back to a single mean-temperature
    /// series, matching the two input shapes the engine accepts.
    fn compute(&self, inputs: &ClimateInputs<'_>) -> Result<Vec<ClimateIndexResult>> {
        match (inputs.temperature_max, inputs.temperature_min) {
            (Some(max), Some(min)) => self.calculate(max, min),
            _ => match inputs.temperature {
                Some(temp) => self.calculate_single(temp),
                None => Err(Error::MissingInput(
                    "GDD requires either max/min temperature series or a mean temperature series"
                        .into(),
                )),
            },
        }
    }
}
