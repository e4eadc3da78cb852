mod common;

use climrs::{
    ClimateIndexCalculator, ClimateInputs, Error, FitMethod, SpiCalculator, SpiOptions,
    VariableKind,
};
use common::{all_values, date, monthly_series};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn options(timescale_months: usize, fit: FitMethod) -> SpiOptions {
    SpiOptions {
        timescale_months,
        fit,
    }
}

/// Ten years of seeded monthly precipitation, gamma-ish and strictly
/// positive with a wet-season swing.
fn synthetic_precip(seed: u64) -> climrs::TimeSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let values: Vec<f64> = (0..120)
        .map(|i| {
            let seasonal = 60.0 + 30.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin();
            seasonal * rng.random_range(0.3..1.7)
        })
        .collect();
    monthly_series(
        "st/precip",
        VariableKind::Precipitation,
        date(2010, 1, 1),
        all_values(&values),
    )
}

#[test]
fn test_zero_timescale_rejected() {
    assert!(matches!(
        SpiCalculator::new(options(0, FitMethod::MethodOfMoments)),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn test_spi_is_roughly_standard_normal() {
    let precip = synthetic_precip(7);
    let calc = SpiCalculator::new(options(1, FitMethod::MethodOfMoments)).unwrap();
    let results = calc.calculate(&precip).unwrap();

    assert_eq!(results.len(), 120);
    let n = results.len() as f64;
    let mean: f64 = results.iter().map(|r| r.value).sum::<f64>() / n;
    let var: f64 = results.iter().map(|r| (r.value - mean).powi(2)).sum::<f64>() / (n - 1.0);
    // Fitting the record to itself puts the sample near N(0, 1)
    assert!(mean.abs() < 0.3, "mean = {}", mean);
    assert!(var.sqrt() > 0.5 && var.sqrt() < 1.5, "stddev = {}", var.sqrt());
    assert!(results.iter().all(|r| r.value.is_finite()));
}

#[test]
fn test_extremes_map_to_extreme_scores() {
    let precip = synthetic_precip(11);
    let calc = SpiCalculator::new(options(1, FitMethod::MethodOfMoments)).unwrap();
    let results = calc.calculate(&precip).unwrap();

    let wettest = precip
        .values()
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .unwrap()
        .0;
    let driest = precip
        .values()
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .unwrap()
        .0;
    let max_score = results.iter().map(|r| r.value).fold(f64::MIN, f64::max);
    let min_score = results.iter().map(|r| r.value).fold(f64::MAX, f64::min);
    assert_eq!(results[wettest].value, max_score);
    assert_eq!(results[driest].value, min_score);
    assert!(results[wettest].value > 0.0);
    assert!(results[driest].value < 0.0);
}

#[test]
fn test_timescale_skips_incomplete_windows() {
    let precip = synthetic_precip(3);
    let calc = SpiCalculator::new(options(3, FitMethod::MethodOfMoments)).unwrap();
    let results = calc.calculate(&precip).unwrap();
    // The first complete 3-month window ends at the third month
    assert_eq!(results.len(), 118);
    assert_eq!(results[0].timestamp, date(2010, 3, 1));
}

#[test]
fn test_zero_months_share_the_floor_probability() {
    // A third of months are fully dry; dry months all get the same score,
    // below every wet month
    let mut rng = StdRng::seed_from_u64(19);
    let values: Vec<f64> = (0..90)
        .map(|i| {
            if i % 3 == 0 {
                0.0
            } else {
                rng.random_range(20.0..100.0)
            }
        })
        .collect();
    let precip = monthly_series(
        "p",
        VariableKind::Precipitation,
        date(2012, 1, 1),
        all_values(&values),
    );
    let calc = SpiCalculator::new(options(1, FitMethod::MethodOfMoments)).unwrap();
    let results = calc.calculate(&precip).unwrap();

    let dry: Vec<f64> = results
        .iter()
        .zip(values.iter())
        .filter(|(_, &p)| p == 0.0)
        .map(|(r, _)| r.value)
        .collect();
    let wet_min = results
        .iter()
        .zip(values.iter())
        .filter(|(_, &p)| p > 0.0)
        .map(|(r, _)| r.value)
        .fold(f64::MAX, f64::min);
    assert!(dry.iter().all(|&v| v == dry[0]));
    assert!(dry[0] < wet_min);
    assert!(dry[0] < 0.0);
}

#[test]
fn test_short_record_is_fit_failure() {
    let precip = monthly_series(
        "p",
        VariableKind::Precipitation,
        date(2020, 1, 1),
        all_values(&[50.0; 12]),
    );
    let calc = SpiCalculator::new(options(1, FitMethod::MethodOfMoments)).unwrap();
    assert!(matches!(
        calc.calculate(&precip),
        Err(Error::FitFailure(_))
    ));
}

#[test]
fn test_all_zero_record_is_fit_failure() {
    let precip = monthly_series(
        "p",
        VariableKind::Precipitation,
        date(2015, 1, 1),
        all_values(&[0.0; 36]),
    );
    let calc = SpiCalculator::new(options(1, FitMethod::MethodOfMoments)).unwrap();
    assert!(matches!(
        calc.calculate(&precip),
        Err(Error::FitFailure(_))
    ));
}

#[test]
fn test_maximum_likelihood_agrees_with_moments() {
    let precip = synthetic_precip(23);
    let mom = SpiCalculator::new(options(1, FitMethod::MethodOfMoments))
        .unwrap()
        .calculate(&precip)
        .unwrap();
    let mle = SpiCalculator::new(options(1, FitMethod::MaximumLikelihood))
        .unwrap()
        .calculate(&precip)
        .unwrap();
    assert_eq!(mom.len(), mle.len());
    // The estimators differ, but not by much on a well-behaved record
    for (a, b) in mom.iter().zip(mle.iter()) {
        assert_eq!(a.timestamp, b.timestamp);
        assert!((a.value - b.value).abs() < 0.5);
    }
    // Both rank the record identically at the extremes
    let max_mom = mom.iter().map(|r| r.value).fold(f64::MIN, f64::max);
    let max_mle = mle.iter().map(|r| r.value).fold(f64::MIN, f64::max);
    assert!(max_mom > 0.0 && max_mle > 0.0);
}

#[test]
fn test_missing_months_excluded_from_windows() {
    let mut values = all_values(&[50.0; 60]);
    // Perturb so the fit is not degenerate, then knock out one month
    for (i, v) in values.iter_mut().enumerate() {
        *v = Some(40.0 + 5.0 * ((i % 7) as f64));
    }
    values[30] = None;
    let precip = monthly_series("p", VariableKind::Precipitation, date(2015, 1, 1), values);
    let calc = SpiCalculator::new(options(3, FitMethod::MethodOfMoments)).unwrap();
    let results = calc.calculate(&precip).unwrap();
    // Windows touching the missing month drop out: 58 complete windows
    // minus the three containing index 30
    assert_eq!(results.len(), 55);
    assert!(results.iter().all(|r| r.timestamp != date(2017, 7, 1)));
}

#[test]
fn test_calculator_interface_requires_precipitation() {
    let calc = SpiCalculator::new(options(1, FitMethod::MethodOfMoments)).unwrap();
    let empty = ClimateInputs::default();
    assert!(matches!(
        calc.compute(&empty),
        Err(Error::MissingInput(_))
    ));

    let precip = synthetic_precip(1);
    let inputs = ClimateInputs {
        precipitation: Some(&precip),
        ..Default::default()
    };
    assert_eq!(calc.compute(&inputs).unwrap().len(), 120);
}
