//! Shared helpers for building synthetic series in tests.
#![allow(dead_code)]

use chrono::NaiveDate;
use climrs::{TimeSeries, VariableKind};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily series starting at `start`, one value per day; `None` is missing.
pub fn daily_series(
    label: &str,
    kind: VariableKind,
    start: NaiveDate,
    values: Vec<Option<f64>>,
) -> TimeSeries {
    let timestamps = (0..values.len() as i64)
        .map(|i| start + chrono::Duration::days(i))
        .collect();
    TimeSeries::from_options(label, kind, timestamps, values).unwrap()
}

/// Monthly series starting at `start` (first of a month), one value per
/// consecutive calendar month.
pub fn monthly_series(
    label: &str,
    kind: VariableKind,
    start: NaiveDate,
    values: Vec<Option<f64>>,
) -> TimeSeries {
    let timestamps = (0..values.len() as u32)
        .map(|i| add_months(start, i))
        .collect();
    TimeSeries::from_options(label, kind, timestamps, values).unwrap()
}

pub fn add_months(start: NaiveDate, months: u32) -> NaiveDate {
    use chrono::Datelike;
    let total = start.month0() + months;
    let year = start.year() + (total / 12) as i32;
    let month = total % 12 + 1;
    NaiveDate::from_ymd_opt(year, month, start.day()).unwrap()
}

pub fn all_values(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().map(|&v| Some(v)).collect()
}
