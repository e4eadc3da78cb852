mod common;

use climrs::{Error, TrendAnalyzer, VariableKind};
use common::{daily_series, date};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn linear_series(n: usize, slope: f64, intercept: f64, noise: f64, seed: u64) -> climrs::TimeSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let values = (0..n)
        .map(|t| {
            let e = if noise > 0.0 {
                rng.random_range(-noise..noise)
            } else {
                0.0
            };
            Some(slope * t as f64 + intercept + e)
        })
        .collect();
    daily_series("s", VariableKind::Temperature, date(2020, 1, 1), values)
}

#[test]
fn test_perfect_line_recovers_coefficients() {
    let series = linear_series(30, 2.0, 1.0, 0.0, 0);
    let fit = TrendAnalyzer::new().fit(&series).unwrap();
    assert!((fit.slope - 2.0).abs() < 1e-9);
    assert!((fit.intercept - 1.0).abs() < 1e-9);
    assert!((fit.r_value - 1.0).abs() < 1e-9);
    assert_eq!(fit.n_used, 30);
    // No noise: the slope interval collapses to zero width
    assert!(fit.confidence_width() < 1e-9);
    assert!(fit.p_value < 1e-6);
}

#[test]
fn test_confidence_interval_shrinks_with_noise() {
    let noisy = linear_series(100, 2.0, 1.0, 5.0, 42);
    let quiet = linear_series(100, 2.0, 1.0, 0.05, 42);
    let fit_noisy = TrendAnalyzer::new().fit(&noisy).unwrap();
    let fit_quiet = TrendAnalyzer::new().fit(&quiet).unwrap();
    assert!(fit_quiet.confidence_width() < fit_noisy.confidence_width());
    // The interval should still cover the true slope
    assert!(fit_noisy.confidence_interval.0 <= 2.0 && 2.0 <= fit_noisy.confidence_interval.1);
}

#[test]
fn test_missing_points_excluded_from_fit() {
    let series = daily_series(
        "s",
        VariableKind::Temperature,
        date(2020, 1, 1),
        vec![Some(1.0), None, Some(5.0), None, Some(9.0)],
    );
    // Non-missing points lie exactly on y = 2t + 1
    let fit = TrendAnalyzer::new().fit(&series).unwrap();
    assert!((fit.slope - 2.0).abs() < 1e-9);
    assert!((fit.intercept - 1.0).abs() < 1e-9);
    assert_eq!(fit.n_used, 3);
}

#[test]
fn test_too_few_points_is_insufficient_data() {
    let series = daily_series(
        "s",
        VariableKind::Temperature,
        date(2020, 1, 1),
        vec![Some(1.0), Some(2.0), None],
    );
    assert!(matches!(
        TrendAnalyzer::new().fit(&series),
        Err(Error::InsufficientData(_))
    ));
}

#[test]
fn test_residuals_align_with_source() {
    let series = daily_series(
        "s",
        VariableKind::Temperature,
        date(2020, 1, 1),
        vec![Some(1.0), Some(3.0), None, Some(7.0), Some(9.0)],
    );
    let analyzer = TrendAnalyzer::new();
    let fit = analyzer.fit(&series).unwrap();
    let residuals = fit.residuals(&series).unwrap();

    assert_eq!(residuals.len(), series.len());
    assert_eq!(residuals.timestamps(), series.timestamps());
    // NA where the source is NA
    assert!(residuals.values()[2].is_na());
    // Points on the exact line leave zero residual
    for v in residuals.valid_values() {
        assert!(v.abs() < 1e-9);
    }
}

#[test]
fn test_fitted_defined_at_missing_points() {
    let series = daily_series(
        "s",
        VariableKind::Temperature,
        date(2020, 1, 1),
        vec![Some(1.0), None, Some(5.0), Some(7.0)],
    );
    let fit = TrendAnalyzer::new().fit(&series).unwrap();
    let fitted = fit.fitted(&series).unwrap();
    // The fitted line interpolates the gap
    assert!((fitted.values()[1].value_or(f64::NAN) - 3.0).abs() < 1e-9);
}

#[test]
fn test_invalid_confidence_level_rejected() {
    assert!(TrendAnalyzer::new().with_confidence_level(1.0).is_err());
    assert!(TrendAnalyzer::new().with_confidence_level(0.0).is_err());
    assert!(TrendAnalyzer::new().with_confidence_level(0.99).is_ok());
}
