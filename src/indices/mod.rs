//! Climate index computation: GDD, SPI and PDSI.
//!
//! Three independent sub-algorithms behind one calculator interface. Each
//! calculator pulls the series it needs from a [`ClimateInputs`] bundle
//! and fails with `MissingInput` when a required field is absent, the way
//! the rest of the engine never substitutes defaults for missing data.

pub mod gdd;
pub mod pdsi;
pub mod spi;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::series::TimeSeries;

/// Which climate index a result row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexKind {
    /// Standardized Precipitation Index (dimensionless standardized score).
    Spi,
    /// Palmer Drought Severity Index (dimensionless standardized score).
    Pdsi,
    /// Growing Degree Days (cumulative degree-units over the window).
    Gdd,
}

/// One computed index value, tagged with its source identity for
/// downstream grouping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimateIndexResult {
    /// Timestamp the value applies to.
    pub timestamp: NaiveDate,
    /// The index value.
    pub value: f64,
    /// Which index this is.
    pub kind: IndexKind,
    /// Station/series identity of the driving input series.
    pub source_label: String,
}

/// The per-station series an index calculation may draw on. All fields
/// are optional; each calculator checks for the ones it requires.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClimateInputs<'a> {
    /// Mean (or single daily) temperature.
    pub temperature: Option<&'a TimeSeries>,
    /// Daily maximum temperature.
    pub temperature_max: Option<&'a TimeSeries>,
    /// Daily minimum temperature.
    pub temperature_min: Option<&'a TimeSeries>,
    /// Precipitation depth.
    pub precipitation: Option<&'a TimeSeries>,
    /// Caller-supplied potential evapotranspiration.
    pub evapotranspiration: Option<&'a TimeSeries>,
}

/// Common interface over the three index sub-algorithms.
pub trait ClimateIndexCalculator {
    /// The index this calculator produces.
    fn kind(&self) -> IndexKind;

    /// Compute the index over the supplied inputs.
    fn compute(&self, inputs: &ClimateInputs<'_>) -> Result<Vec<ClimateIndexResult>>;
}
