//! Calendar resampling of a series to coarser periods.
//!
//! Groups observations by calendar month or year and aggregates each
//! bucket, excluding missing values. A bucket whose observations are all
//! missing stays in the output as NA — it is never coerced to zero.
//! Only periods actually present in the input appear in the output.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::na::NA;
use crate::series::TimeSeries;

/// Target period for resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResamplePeriod {
    /// Calendar months; output timestamps are the first of each month.
    Monthly,
    /// Calendar years; output timestamps are January 1st.
    Yearly,
}

impl ResamplePeriod {
    /// Bucket key for a date: `(year, month)` or `(year, 0)`.
    fn key(&self, date: NaiveDate) -> (i32, u32) {
        match self {
            ResamplePeriod::Monthly => (date.year(), date.month()),
            ResamplePeriod::Yearly => (date.year(), 0),
        }
    }

    /// Representative timestamp for a bucket key.
    fn timestamp(&self, key: (i32, u32)) -> NaiveDate {
        match self {
            ResamplePeriod::Monthly => NaiveDate::from_ymd_opt(key.0, key.1, 1),
            ResamplePeriod::Yearly => NaiveDate::from_ymd_opt(key.0, 1, 1),
        }
        .expect("bucket key derived from a valid date")
    }
}

/// Resample to period means (e.g. monthly mean temperature).
pub fn resample_mean(series: &TimeSeries, period: ResamplePeriod) -> Result<TimeSeries> {
    aggregate(series, period, |values| {
        values.iter().sum::<f64>() / values.len() as f64
    })
}

/// Resample to period sums (e.g. monthly precipitation totals).
pub fn resample_sum(series: &TimeSeries, period: ResamplePeriod) -> Result<TimeSeries> {
    aggregate(series, period, |values| values.iter().sum())
}

/// Resample with a custom aggregator over each bucket's non-missing
/// values. The aggregator is only invoked for non-empty buckets.
pub fn aggregate<F>(series: &TimeSeries, period: ResamplePeriod, aggregator: F) -> Result<TimeSeries>
where
    F: Fn(&[f64]) -> f64,
{
    if series.is_empty() {
        return Err(Error::InsufficientData(
            "cannot resample an empty series".into(),
        ));
    }

    // The series is already in time order, so buckets arrive contiguously.
    let mut timestamps = Vec::new();
    let mut values = Vec::new();
    let mut current_key: Option<(i32, u32)> = None;
    let mut bucket: Vec<f64> = Vec::new();

    let flush =
        |key: Option<(i32, u32)>, bucket: &mut Vec<f64>, ts: &mut Vec<NaiveDate>, vs: &mut Vec<NA<f64>>| {
            if let Some(key) = key {
                ts.push(period.timestamp(key));
                if bucket.is_empty() {
                    vs.push(NA::NA);
                } else {
                    vs.push(NA::Value(aggregator(bucket)));
                }
                bucket.clear();
            }
        };

    for (date, value) in series.iter() {
        let key = period.key(date);
        if current_key != Some(key) {
            flush(current_key, &mut bucket, &mut timestamps, &mut values);
            current_key = Some(key);
        }
        if let NA::Value(v) = value {
            bucket.push(v);
        }
    }
    flush(current_key, &mut bucket, &mut timestamps, &mut values);

    TimeSeries::new(series.label(), series.kind().clone(), timestamps, values)
}
