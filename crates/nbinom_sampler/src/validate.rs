//! Strict parameter validation for construction and the top-level function.
//!
//! `r` is checked before `p`, so the first violated contract is reported.
//! The per-call path of an unbound generator does not use this module; it
//! returns NaN for out-of-domain input instead of failing.

use nbinom_core::PrngError;
use serde_json::Value;

/// Validates negative binomial parameters.
///
/// - `r` must be a positive finite number: NaN is a `TypeKind` failure,
///   `r <= 0` or `r = +inf` a `RangeKind` failure.
/// - `p` must lie strictly inside `(0, 1)`: NaN is a `TypeKind` failure,
///   anything else outside the interval a `RangeKind` failure.
///
/// # Examples
///
/// ```rust
/// use nbinom_sampler::validate;
/// use nbinom_core::ErrorKind;
///
/// assert!(validate(10.0, 0.5).is_ok());
/// assert_eq!(validate(-1.0, 0.5).unwrap_err().kind(), ErrorKind::Range);
/// assert_eq!(validate(10.0, f64::NAN).unwrap_err().kind(), ErrorKind::Type);
/// ```
pub fn validate(r: f64, p: f64) -> Result<(), PrngError> {
    if r.is_nan() {
        return Err(PrngError::type_kind(format!(
            "invalid argument. First argument must be a positive number. Value: `{}`.",
            r
        )));
    }
    if r <= 0.0 || r.is_infinite() {
        return Err(PrngError::range_kind(format!(
            "invalid argument. First argument must be a positive finite number. Value: `{}`.",
            r
        )));
    }
    if p.is_nan() {
        return Err(PrngError::type_kind(format!(
            "invalid argument. Second argument must be a number and not NaN. Value: `{}`.",
            p
        )));
    }
    if p <= 0.0 || p >= 1.0 {
        return Err(PrngError::range_kind(format!(
            "invalid argument. Second argument must be on the interval `(0,1)`. Value: `{}`.",
            p
        )));
    }
    Ok(())
}

/// Validates untyped parameters, returning them as numbers.
///
/// Non-numeric values are `TypeKind` failures; numeric values go through
/// [`validate`].
pub fn validate_value(r: &Value, p: &Value) -> Result<(f64, f64), PrngError> {
    let r = r.as_f64().ok_or_else(|| {
        PrngError::type_kind(format!(
            "invalid argument. First argument must be a positive number. Value: `{}`.",
            r
        ))
    })?;
    let p = p.as_f64().ok_or_else(|| {
        PrngError::type_kind(format!(
            "invalid argument. Second argument must be a number and not NaN. Value: `{}`.",
            p
        ))
    })?;
    validate(r, p)?;
    Ok((r, p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbinom_core::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_valid_parameters() {
        assert!(validate(1.0, 0.5).is_ok());
        assert!(validate(0.001, 1e-9).is_ok());
        assert!(validate(1e6, 0.999_999).is_ok());
    }

    #[test]
    fn test_invalid_r() {
        assert_eq!(validate(f64::NAN, 0.5).unwrap_err().kind(), ErrorKind::Type);
        assert_eq!(validate(0.0, 0.5).unwrap_err().kind(), ErrorKind::Range);
        assert_eq!(validate(-3.0, 0.5).unwrap_err().kind(), ErrorKind::Range);
        assert_eq!(validate(f64::INFINITY, 0.5).unwrap_err().kind(), ErrorKind::Range);
        assert_eq!(validate(f64::NEG_INFINITY, 0.5).unwrap_err().kind(), ErrorKind::Range);
    }

    #[test]
    fn test_invalid_p() {
        assert_eq!(validate(1.0, f64::NAN).unwrap_err().kind(), ErrorKind::Type);
        for p in [0.0, 1.0, -0.1, 1.1, f64::INFINITY] {
            assert_eq!(validate(1.0, p).unwrap_err().kind(), ErrorKind::Range, "p = {}", p);
        }
    }

    #[test]
    fn test_r_checked_before_p() {
        let err = validate(-1.0, f64::NAN).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        assert!(err.message().contains("First argument"));
    }

    #[test]
    fn test_validate_value() {
        assert_eq!(validate_value(&json!(10), &json!(0.5)).unwrap(), (10.0, 0.5));
        assert_eq!(
            validate_value(&json!("10"), &json!(0.5)).unwrap_err().kind(),
            ErrorKind::Type
        );
        assert_eq!(
            validate_value(&json!(10), &json!(null)).unwrap_err().kind(),
            ErrorKind::Type
        );
        assert_eq!(
            validate_value(&json!(10), &json!(2)).unwrap_err().kind(),
            ErrorKind::Range
        );
    }
}
