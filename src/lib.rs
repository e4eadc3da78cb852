//! Statistical Analysis & Climate Index Engine
//!
//! Turns a cleaned climate time series into trend coefficients, seasonal
//! components, anomaly flags and derived climate indices (SPI, PDSI, GDD).
//!
//! # Components
//!
//! - [`series::TimeSeries`]: ordered observations with explicit missing
//!   markers, one per (station, variable) pair
//! - [`stats`]: missing-aware mean/median/mode
//! - [`trend::TrendAnalyzer`]: least-squares trend with confidence bounds
//! - [`decompose::SeasonalDecomposer`]: additive/multiplicative
//!   trend/seasonal/residual decomposition
//! - [`anomaly::AnomalyDetector`]: baseline-relative statistical flagging
//! - [`indices`]: SPI, PDSI and GDD calculators
//!
//! All operations are synchronous, deterministic, side-effect-free
//! transforms over immutable series snapshots; [`parallel`] runs batches
//! of independent series on the rayon pool. File import, cleaning,
//! visualization and persistence are external collaborators.

pub mod anomaly;
pub mod decompose;
pub mod error;
pub mod indices;
pub mod na;
pub mod parallel;
pub mod resample;
pub mod series;
pub mod stats;
pub mod trend;

// Re-export commonly used types
pub use anomaly::{AnomalyDetector, AnomalyRecord, AnomalyReport};
pub use decompose::{DecompositionMode, DecompositionResult, SeasonalDecomposer, TrendMethod};
pub use error::{Error, Result};
pub use indices::gdd::{GddCalculator, GddOptions, GddWindow};
pub use indices::pdsi::{EtMethod, PdsiCalculator, PdsiOptions, PdsiState, SoilCapacity};
pub use indices::spi::{FitMethod, GammaFit, GammaParams, SpiCalculator, SpiOptions};
pub use indices::{ClimateIndexCalculator, ClimateIndexResult, ClimateInputs, IndexKind};
pub use na::NA;
pub use parallel::{par_analyze, par_analyze_pairs};
pub use resample::{resample_mean, resample_sum, ResamplePeriod};
pub use series::{TimeSeries, TimeSeriesBuilder, VariableKind};
pub use trend::{TrendAnalyzer, TrendFit};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
