use climrs::NA;

#[test]
fn test_na_creation() {
    let value: NA<f64> = NA::Value(42.0);
    let na: NA<f64> = NA::NA;

    assert!(!value.is_na());
    assert!(value.is_value());
    assert_eq!(value.value(), Some(&42.0));

    assert!(na.is_na());
    assert!(!na.is_value());
    assert_eq!(na.value(), None);
}

#[test]
fn test_na_operations() {
    let a = NA::Value(10.0);
    let b = NA::Value(5.0);
    let na = NA::<f64>::NA;

    assert_eq!(a + b, NA::Value(15.0));
    assert_eq!(a - b, NA::Value(5.0));
    assert_eq!(a * b, NA::Value(50.0));
    assert_eq!(a / b, NA::Value(2.0));

    // NA propagates through arithmetic
    assert_eq!(a + na, NA::NA);
    assert_eq!(na * b, NA::NA);
    assert_eq!(na / na, NA::NA);

    // Division by zero yields NA, not infinity
    assert_eq!(a / NA::Value(0.0), NA::NA);
}

#[test]
fn test_na_never_coerces_to_zero() {
    let na = NA::<f64>::NA;
    assert_ne!(na, NA::Value(0.0));
    assert_eq!(na.value_or(99.0), 99.0);
}

#[test]
fn test_na_option_interop() {
    let from_some: NA<f64> = Some(1.5).into();
    let from_none: NA<f64> = None.into();
    assert_eq!(from_some, NA::Value(1.5));
    assert!(from_none.is_na());

    let back: Option<f64> = NA::Value(2.5).into();
    assert_eq!(back, Some(2.5));
    let back_none: Option<f64> = NA::<f64>::NA.into();
    assert_eq!(back_none, None);
}

#[test]
fn test_na_ordering() {
    // NA sorts below every observed value
    assert!(NA::<f64>::NA < NA::Value(f64::MIN));
    assert!(NA::Value(1.0) < NA::Value(2.0));
    assert!(NA::Value(2.0) > NA::NA);
}

#[test]
fn test_na_map() {
    assert_eq!(NA::Value(2.0).map(|v| v * 3.0), NA::Value(6.0));
    assert_eq!(NA::<f64>::NA.map(|v| v * 3.0), NA::NA);
}

#[test]
fn test_na_serializes_as_option() {
    let json = serde_json::to_string(&NA::Value(1.5)).unwrap();
    assert_eq!(json, "1.5");
    let json = serde_json::to_string(&NA::<f64>::NA).unwrap();
    assert_eq!(json, "null");

    let round: NA<f64> = serde_json::from_str("null").unwrap();
    assert!(round.is_na());
    let round: NA<f64> = serde_json::from_str("3.25").unwrap();
    assert_eq!(round, NA::Value(3.25));
}
