use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A numeric catalog value as it arrives from JSON.
///
/// Catalogs and rate tables are produced from spreadsheet exports, so the same
/// field may hold a JSON number, a numeric string, or `null`. The value is kept
/// as-is and coerced at the point of use with one of two conversions:
///
/// * [`Numeric::to_number`] is a strict conversion: surrounding whitespace is
///   ignored, an empty string or `null` is `0`, anything that is not a complete
///   number is NaN.
/// * [`Numeric::parse_float`] reads the longest numeric prefix (`"12kg"` is
///   `12`); an empty string, `null` or text without a numeric prefix is NaN.
///
/// Neither conversion fails: malformed input becomes NaN and propagates through
/// the arithmetic that consumes it. Values of any other JSON type (booleans,
/// arrays, objects) are kept in [`Numeric::Other`] and coerce to NaN, so one
/// mistyped field never stops a catalog from loading.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
    #[default]
    Null,
    Other(Value),
}

impl Numeric {
    pub fn to_number(&self) -> f64 {
        match self {
            Numeric::Number(value) => *value,
            Numeric::Text(text) => strict_number(text),
            Numeric::Null => 0.0,
            Numeric::Other(_) => f64::NAN,
        }
    }

    pub fn parse_float(&self) -> f64 {
        match self {
            Numeric::Number(value) => *value,
            Numeric::Text(text) => leading_number(text),
            Numeric::Null | Numeric::Other(_) => f64::NAN,
        }
    }

    /// False for `0`, NaN, the empty string, `null` and `false`. Any other
    /// string is truthy, including `"0"`, as are arrays and objects.
    pub fn is_truthy(&self) -> bool {
        match self {
            Numeric::Number(value) => *value != 0.0 && !value.is_nan(),
            Numeric::Text(text) => !text.is_empty(),
            Numeric::Null => false,
            Numeric::Other(value) => value.as_bool().unwrap_or(true),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Numeric::Null)
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::Number(value)
    }
}

impl From<i32> for Numeric {
    fn from(value: i32) -> Self {
        Numeric::Number(f64::from(value))
    }
}

impl From<&str> for Numeric {
    fn from(value: &str) -> Self {
        Numeric::Text(value.to_string())
    }
}

impl From<String> for Numeric {
    fn from(value: String) -> Self {
        Numeric::Text(value)
    }
}

impl From<Value> for Numeric {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(number) => match number.as_f64() {
                Some(value) => Numeric::Number(value),
                None => Numeric::Other(Value::Number(number)),
            },
            Value::String(text) => Numeric::Text(text),
            Value::Null => Numeric::Null,
            other => Numeric::Other(other),
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Number(value) => write!(f, "{value}"),
            Numeric::Text(text) => f.write_str(text),
            Numeric::Null => Ok(()),
            Numeric::Other(value) => write!(f, "{value}"),
        }
    }
}

fn strict_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        // from_str_radix tolerates a sign after the prefix; "0x+1A" is not a number.
        if hex.starts_with(['+', '-']) {
            return f64::NAN;
        }
        return u64::from_str_radix(hex, 16)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN);
    }
    // str::parse also accepts "inf" and "nan", which are not numbers here.
    let decimal_only = trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !decimal_only {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn leading_number(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    let negative = bytes.first() == Some(&b'-');
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            mantissa_digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return f64::NAN;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// Rounds to the nearest integer with ties toward positive infinity
/// (`124.5 -> 125`, `-2.5 -> -2`). NaN and infinities pass through.
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Formats with exactly two fractional digits. A value that sits exactly
/// halfway between two cents rounds away from zero.
pub fn to_fixed_2dp(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    // Only odd multiples of 1/8 land exactly on a half cent.
    let eighths = value * 8.0;
    if eighths.fract() == 0.0 && eighths.abs() % 2.0 == 1.0 {
        let cents = (value.abs() * 100.0).round();
        return format!("{:.2}", value.signum() * cents / 100.0);
    }
    format!("{value:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_float_reads_numeric_prefix() {
        assert_eq!(Numeric::from("12kg").parse_float(), 12.0);
        assert_eq!(Numeric::from("  3.5 ").parse_float(), 3.5);
        assert_eq!(Numeric::from(".25").parse_float(), 0.25);
        assert_eq!(Numeric::from("1e3x").parse_float(), 1000.0);
        assert_eq!(Numeric::from("7e").parse_float(), 7.0);
        assert_eq!(Numeric::from("-Infinity").parse_float(), f64::NEG_INFINITY);
        assert!(Numeric::from("kg12").parse_float().is_nan());
        assert!(Numeric::from("").parse_float().is_nan());
        assert!(Numeric::Null.parse_float().is_nan());
    }

    #[test]
    fn to_number_requires_whole_string() {
        assert_eq!(Numeric::from(" 42 ").to_number(), 42.0);
        assert_eq!(Numeric::from("").to_number(), 0.0);
        assert_eq!(Numeric::Null.to_number(), 0.0);
        assert_eq!(Numeric::from("0x1A").to_number(), 26.0);
        assert!(Numeric::from("12kg").to_number().is_nan());
        assert!(Numeric::from("inf").to_number().is_nan());
        assert!(Numeric::from("nan").to_number().is_nan());
        assert!(Numeric::from("0x+1A").to_number().is_nan());
        assert!(Numeric::from("0x-1A").to_number().is_nan());
        assert!(Numeric::from("0x").to_number().is_nan());
    }

    #[test]
    fn truthiness_follows_loose_rules() {
        assert!(!Numeric::from(0.0).is_truthy());
        assert!(!Numeric::from(f64::NAN).is_truthy());
        assert!(!Numeric::from("").is_truthy());
        assert!(!Numeric::Null.is_truthy());
        assert!(Numeric::from("0").is_truthy());
        assert!(Numeric::from(-1.0).is_truthy());
    }

    #[test]
    fn numeric_deserializes_from_numbers_strings_and_null() {
        let values: Vec<Numeric> = serde_json::from_str(r#"[5, 2.5, "7", null]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Numeric::Number(5.0),
                Numeric::Number(2.5),
                Numeric::Text("7".into()),
                Numeric::Null
            ]
        );
    }

    #[test]
    fn other_json_types_coerce_to_nan() {
        let values: Vec<Numeric> = serde_json::from_str(r#"[true, false, [1], {"a": 1}]"#).unwrap();
        assert_eq!(values[0], Numeric::Other(Value::Bool(true)));
        for value in &values {
            assert!(value.to_number().is_nan());
            assert!(value.parse_float().is_nan());
        }
        assert!(values[0].is_truthy());
        assert!(!values[1].is_truthy());
        assert!(values[2].is_truthy());
        assert_eq!(values[0].to_string(), "true");
    }

    #[test]
    fn round_half_up_pins_boundaries() {
        assert_eq!(round_half_up(124.5), 125.0);
        assert_eq!(round_half_up(124.49), 124.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(0.49999999999999994), 0.0);
        assert!(round_half_up(f64::NAN).is_nan());
        assert_eq!(round_half_up(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn to_fixed_rounds_exact_ties_away_from_zero() {
        assert_eq!(to_fixed_2dp(1.125), "1.13");
        assert_eq!(to_fixed_2dp(2.375), "2.38");
        assert_eq!(to_fixed_2dp(-0.125), "-0.13");
        assert_eq!(to_fixed_2dp(57.50273822562979), "57.50");
        assert_eq!(to_fixed_2dp(3.0), "3.00");
        assert_eq!(to_fixed_2dp(f64::NAN), "NaN");
    }
}
