//! Parallel evaluation across independent series.
//!
//! The natural unit of parallelism is one (station, variable) pair: every
//! transform in this crate is a pure function over an immutable series, so
//! a batch of independent series can run on the rayon pool with no shared
//! mutable state. Each outcome is tagged with its series label and kept as
//! its own `Result` — one series failing never aborts the rest.

use rayon::prelude::*;

use crate::error::Result;
use crate::series::TimeSeries;

/// Apply `analyze` to every series in parallel, collecting
/// `(label, outcome)` pairs in the input order.
pub fn par_analyze<T, F>(series: &[TimeSeries], analyze: F) -> Vec<(String, Result<T>)>
where
    T: Send,
    F: Fn(&TimeSeries) -> Result<T> + Send + Sync,
{
    series
        .par_iter()
        .map(|s| (s.label().to_string(), analyze(s)))
        .collect()
}

/// Like [`par_analyze`], but over series pairs that belong together (for
/// example max/min temperature per station for GDD).
pub fn par_analyze_pairs<T, F>(
    pairs: &[(TimeSeries, TimeSeries)],
    analyze: F,
) -> Vec<(String, Result<T>)>
where
    T: Send,
    F: Fn(&TimeSeries, &TimeSeries) -> Result<T> + Send + Sync,
{
    pairs
        .par_iter()
        .map(|(a, b)| (a.label().to_string(), analyze(a, b)))
        .collect()
}
