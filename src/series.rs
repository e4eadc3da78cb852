//! Time series data model for station-level climate observations.
//!
//! A [`TimeSeries`] holds the cleaned observations for exactly one
//! (station, variable) pair. Analysis functions take a series by reference
//! and return fresh derived values; nothing mutates a series after
//! construction, so independent series can be analyzed concurrently.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::na::NA;

/// Kind of climate variable carried by a series. Fixed per series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    /// Mean (or single daily) temperature, °C.
    Temperature,
    /// Daily minimum temperature, °C.
    TemperatureMin,
    /// Daily maximum temperature, °C.
    TemperatureMax,
    /// Precipitation depth, mm.
    Precipitation,
    /// Potential evapotranspiration, mm.
    Evapotranspiration,
    /// Any other variable, identified by name.
    Other(String),
}

/// An ordered sequence of `(timestamp, value-or-missing)` observations for
/// one station and one variable.
///
/// Invariants enforced at construction: timestamps strictly increasing
/// (which also rules out duplicates), timestamp and value vectors of equal
/// length, one [`VariableKind`] per series. Missing observations are
/// represented by [`NA::NA`], never by a coerced zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries {
    label: String,
    kind: VariableKind,
    timestamps: Vec<NaiveDate>,
    values: Vec<NA<f64>>,
}

impl TimeSeries {
    /// Create a new series, validating the ordering and length invariants.
    pub fn new(
        label: impl Into<String>,
        kind: VariableKind,
        timestamps: Vec<NaiveDate>,
        values: Vec<NA<f64>>,
    ) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(Error::LengthMismatch {
                expected: timestamps.len(),
                actual: values.len(),
            });
        }
        for pair in timestamps.windows(2) {
            if pair[1] <= pair[0] {
                return Err(Error::NonMonotonicTimestamps(format!(
                    "{} does not follow {}",
                    pair[1], pair[0]
                )));
            }
        }
        Ok(TimeSeries {
            label: label.into(),
            kind,
            timestamps,
            values,
        })
    }

    /// Create a series from `Option` values, mapping `None` to NA.
    pub fn from_options(
        label: impl Into<String>,
        kind: VariableKind,
        timestamps: Vec<NaiveDate>,
        values: Vec<Option<f64>>,
    ) -> Result<Self> {
        let values = values.into_iter().map(NA::from).collect();
        Self::new(label, kind, timestamps, values)
    }

    /// Station/series identity used to tag derived results.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The variable kind of this series.
    pub fn kind(&self) -> &VariableKind {
        &self.kind
    }

    /// Number of observations, including missing ones.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series holds no observations at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The ordered timestamp axis.
    pub fn timestamps(&self) -> &[NaiveDate] {
        &self.timestamps
    }

    /// The observation values, aligned with [`timestamps`](Self::timestamps).
    pub fn values(&self) -> &[NA<f64>] {
        &self.values
    }

    /// The observation at position `i`, if in bounds.
    pub fn get(&self, i: usize) -> Option<(NaiveDate, NA<f64>)> {
        Some((*self.timestamps.get(i)?, *self.values.get(i)?))
    }

    /// Iterate over `(timestamp, value)` pairs in time order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, NA<f64>)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// The non-missing observations, in time order.
    pub fn valid_points(&self) -> Vec<(NaiveDate, f64)> {
        self.iter()
            .filter_map(|(t, v)| v.value().map(|&v| (t, v)))
            .collect()
    }

    /// The non-missing values only, in time order.
    pub fn valid_values(&self) -> Vec<f64> {
        self.values
            .iter()
            .filter_map(|v| v.value().copied())
            .collect()
    }

    /// Number of non-missing observations.
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_value()).count()
    }

    /// Numeric time axis: whole days elapsed since the first timestamp,
    /// one entry per observation (missing or not).
    pub fn elapsed_days(&self) -> Vec<f64> {
        match self.timestamps.first() {
            Some(&start) => self
                .timestamps
                .iter()
                .map(|t| (*t - start).num_days() as f64)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Derive a new series on the same time axis and label with different
    /// values. Used for fitted/residual/component series.
    pub fn with_values(&self, kind: VariableKind, values: Vec<NA<f64>>) -> Result<Self> {
        if values.len() != self.len() {
            return Err(Error::LengthMismatch {
                expected: self.len(),
                actual: values.len(),
            });
        }
        Ok(TimeSeries {
            label: self.label.clone(),
            kind,
            timestamps: self.timestamps.clone(),
            values,
        })
    }
}

/// Push-based construction for a [`TimeSeries`].
#[derive(Debug, Clone)]
pub struct TimeSeriesBuilder {
    label: String,
    kind: VariableKind,
    timestamps: Vec<NaiveDate>,
    values: Vec<NA<f64>>,
}

impl TimeSeriesBuilder {
    /// Start a builder for the given station label and variable kind.
    pub fn new(label: impl Into<String>, kind: VariableKind) -> Self {
        TimeSeriesBuilder {
            label: label.into(),
            kind,
            timestamps: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Append an observed value.
    pub fn push(mut self, timestamp: NaiveDate, value: f64) -> Self {
        self.timestamps.push(timestamp);
        self.values.push(NA::Value(value));
        self
    }

    /// Append a missing observation.
    pub fn push_missing(mut self, timestamp: NaiveDate) -> Self {
        self.timestamps.push(timestamp);
        self.values.push(NA::NA);
        self
    }

    /// Finish, validating the series invariants.
    pub fn build(self) -> Result<TimeSeries> {
        TimeSeries::new(self.label, self.kind, self.timestamps, self.values)
    }
}
