use serde::Serializer;

// Largest magnitude at which every integer is exactly representable as f64.
const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

/// Emit whole numbers as JSON integers (`200`, not `200.0`). Sums that
/// overflowed to infinity saturate at `f64::MAX` so they never become `null`.
pub fn serialize_whole<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    let value = if value.is_nan() {
        0.0
    } else {
        value.clamp(f64::MIN, f64::MAX)
    };

    if value.fract() == 0.0 && value.abs() <= MAX_EXACT {
        serializer.serialize_i64(value as i64)
    } else {
        serializer.serialize_f64(value)
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    #[derive(Serialize)]
    struct Wrapper(#[serde(serialize_with = "super::serialize_whole")] f64);

    #[test]
    fn integral_values_drop_fraction() {
        assert_eq!(serde_json::to_string(&Wrapper(200.0)).unwrap(), "200");
        assert_eq!(serde_json::to_string(&Wrapper(0.0)).unwrap(), "0");
    }

    #[test]
    fn non_finite_values_stay_numeric() {
        let inf = serde_json::to_value(Wrapper(f64::INFINITY)).unwrap();
        assert_eq!(inf.as_f64(), Some(f64::MAX));

        let neg = serde_json::to_value(Wrapper(f64::NEG_INFINITY)).unwrap();
        assert_eq!(neg.as_f64(), Some(f64::MIN));

        assert_eq!(serde_json::to_string(&Wrapper(f64::NAN)).unwrap(), "0");
    }

    #[test]
    fn fractional_values_keep_fraction() {
        assert_eq!(serde_json::to_string(&Wrapper(10.5)).unwrap(), "10.5");
    }
}
