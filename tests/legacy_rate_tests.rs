use product_pricing::{Numeric, calculate_legacy_rate};

#[test]
fn legacy_rate_matches_published_values() {
    let rate = calculate_legacy_rate(500.0, 105.0, 100.0).unwrap();
    assert_eq!(rate.as_str(), "57.50");

    assert_eq!(calculate_legacy_rate(612.5, 240.0, 85.0).unwrap().as_str(), "161.01");
    assert_eq!(calculate_legacy_rate(750.0, 330.0, 62.0).unwrap().as_str(), "271.08");
    assert_eq!(calculate_legacy_rate(800.0, 330.0, 62.0).unwrap().as_str(), "289.16");
}

#[test]
fn ratio_does_not_change_the_result() {
    let a = calculate_legacy_rate(750.0, 105.0, 100.0).unwrap();
    let b = calculate_legacy_rate(750.0, 105.0, 7.0).unwrap();
    assert_eq!(a.as_str(), "86.25");
    assert_eq!(a, b);
}

#[test]
fn string_inputs_are_coerced_strictly() {
    let rate = calculate_legacy_rate("750", " 330 ", "62").unwrap();
    assert_eq!(rate.as_str(), "271.08");
    assert_eq!(rate.value(), 271.08);

    let rate = calculate_legacy_rate("750 per kg", "330", "62").unwrap();
    assert_eq!(rate.as_str(), "NaN");
    assert!(rate.value().is_nan());
}

#[test]
fn falsy_inputs_produce_no_rate() {
    assert_eq!(calculate_legacy_rate(0.0, 330.0, 62.0), None);
    assert_eq!(calculate_legacy_rate(750.0, "", 62.0), None);
    assert_eq!(calculate_legacy_rate(750.0, 330.0, Numeric::Null), None);
    assert_eq!(calculate_legacy_rate(f64::NAN, 330.0, 62.0), None);
}

#[test]
fn text_zero_is_truthy() {
    // "0" is a non-empty string, so the rate is computed and comes out zero.
    let rate = calculate_legacy_rate("0", 330.0, 62.0).unwrap();
    assert_eq!(rate.as_str(), "0.00");
}

#[test]
fn legacy_rate_serializes_as_text() {
    let rate = calculate_legacy_rate(500.0, 105.0, 100.0).unwrap();
    assert_eq!(serde_json::to_string(&rate).unwrap(), "\"57.50\"");
}
