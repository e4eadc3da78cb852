mod common;

use climrs::{
    ClimateIndexCalculator, ClimateInputs, Error, GddCalculator, GddOptions, GddWindow, IndexKind,
    VariableKind,
};
use common::{all_values, daily_series, date};

fn week_of(label: &str, kind: VariableKind, value: f64) -> climrs::TimeSeries {
    daily_series(label, kind, date(2023, 6, 1), all_values(&[value; 7]))
}

#[test]
fn test_week_of_constant_temperatures() {
    // T_max = 20, T_min = 10, base = 10: gdd = 5 per day, 35 for the week
    let t_max = week_of("st/tmax", VariableKind::TemperatureMax, 20.0);
    let t_min = week_of("st/tmin", VariableKind::TemperatureMin, 10.0);
    let calc = GddCalculator::new(GddOptions {
        base_temp: 10.0,
        window: GddWindow::Daily,
    });

    let results = calc.calculate(&t_max, &t_min).unwrap();
    assert_eq!(results.len(), 7);
    assert_eq!(results[0].value, 5.0);
    assert_eq!(results[6].value, 35.0);
    assert_eq!(results[0].kind, IndexKind::Gdd);
    assert_eq!(results[0].source_label, "st/tmax");
}

#[test]
fn test_cold_days_contribute_zero_not_negative() {
    let t_max = week_of("tmax", VariableKind::TemperatureMax, 8.0);
    let t_min = week_of("tmin", VariableKind::TemperatureMin, 0.0);
    let calc = GddCalculator::new(GddOptions {
        base_temp: 10.0,
        window: GddWindow::Daily,
    });
    let results = calc.calculate(&t_max, &t_min).unwrap();
    // (8+0)/2 − 10 < 0 clamps to zero; cumulative stays flat
    assert!(results.iter().all(|r| r.value == 0.0));
}

#[test]
fn test_missing_bound_is_missing_input() {
    let t_max = daily_series(
        "tmax",
        VariableKind::TemperatureMax,
        date(2023, 6, 1),
        vec![Some(20.0), None, Some(20.0)],
    );
    let t_min = daily_series(
        "tmin",
        VariableKind::TemperatureMin,
        date(2023, 6, 1),
        all_values(&[10.0; 3]),
    );
    let calc = GddCalculator::new(GddOptions {
        base_temp: 10.0,
        window: GddWindow::Daily,
    });
    assert!(matches!(
        calc.calculate(&t_max, &t_min),
        Err(Error::MissingInput(_))
    ));
}

#[test]
fn test_mismatched_axes_rejected() {
    let t_max = week_of("tmax", VariableKind::TemperatureMax, 20.0);
    let t_min = daily_series(
        "tmin",
        VariableKind::TemperatureMin,
        date(2023, 6, 2), // shifted by one day
        all_values(&[10.0; 7]),
    );
    let calc = GddCalculator::new(GddOptions {
        base_temp: 10.0,
        window: GddWindow::Daily,
    });
    assert!(calc.calculate(&t_max, &t_min).is_err());
}

#[test]
fn test_monthly_window_resets_accumulator() {
    // Three days at the end of June, three at the start of July, 5 gdd each
    let t_max = daily_series(
        "tmax",
        VariableKind::TemperatureMax,
        date(2023, 6, 28),
        all_values(&[20.0; 6]),
    );
    let t_min = daily_series(
        "tmin",
        VariableKind::TemperatureMin,
        date(2023, 6, 28),
        all_values(&[10.0; 6]),
    );
    let calc = GddCalculator::new(GddOptions {
        base_temp: 10.0,
        window: GddWindow::Monthly,
    });
    let results = calc.calculate(&t_max, &t_min).unwrap();
    assert_eq!(results[2].value, 15.0); // June 30th
    assert_eq!(results[3].value, 5.0); // July 1st restarts
    assert_eq!(results[5].value, 15.0);
}

#[test]
fn test_seasonal_window_resets_in_december() {
    // Nov 29 – Dec 2: December starts the next winter season
    let t_max = daily_series(
        "tmax",
        VariableKind::TemperatureMax,
        date(2023, 11, 29),
        all_values(&[22.0; 4]),
    );
    let t_min = daily_series(
        "tmin",
        VariableKind::TemperatureMin,
        date(2023, 11, 29),
        all_values(&[10.0; 4]),
    );
    let calc = GddCalculator::new(GddOptions {
        base_temp: 10.0,
        window: GddWindow::Seasonal,
    });
    let results = calc.calculate(&t_max, &t_min).unwrap();
    assert_eq!(results[1].value, 12.0); // Nov 30, autumn total
    assert_eq!(results[2].value, 6.0); // Dec 1 restarts winter
    assert_eq!(results[3].value, 12.0);
}

#[test]
fn test_single_mean_temperature_series() {
    // max(0, T − base) per day on a single series
    let temp = daily_series(
        "st/temp",
        VariableKind::Temperature,
        date(2023, 6, 1),
        all_values(&[12.0, 9.0, 15.0]),
    );
    let calc = GddCalculator::new(GddOptions {
        base_temp: 10.0,
        window: GddWindow::Daily,
    });
    let results = calc.calculate_single(&temp).unwrap();
    assert_eq!(results[0].value, 2.0);
    assert_eq!(results[1].value, 2.0); // 9 °C adds nothing
    assert_eq!(results[2].value, 7.0);
}

#[test]
fn test_calculator_interface_prefers_bounds_pair() {
    let t_max = week_of("tmax", VariableKind::TemperatureMax, 20.0);
    let t_min = week_of("tmin", VariableKind::TemperatureMin, 10.0);
    let calc = GddCalculator::new(GddOptions {
        base_temp: 10.0,
        window: GddWindow::Daily,
    });

    let inputs = ClimateInputs {
        temperature_max: Some(&t_max),
        temperature_min: Some(&t_min),
        ..Default::default()
    };
    assert_eq!(calc.compute(&inputs).unwrap()[6].value, 35.0);

    // No temperature at all: MissingInput
    let empty = ClimateInputs::default();
    assert!(matches!(
        calc.compute(&empty),
        Err(Error::MissingInput(_))
    ));
}
