//! Lenient extraction of typed parameters from a `serde_json::Value` object.
//!
//! Each `param_*` helper takes a JSON value, a key name, and a default. If the
//! key is missing or has the wrong type, the default is returned. Domain
//! checks that can fail (e.g. a cell size of zero) go through
//! [`require_positive`] afterwards.

use crate::error::EngineError;
use serde_json::Value;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
///
/// Accepts both JSON numbers (including integers) and converts them to f64.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing,
/// negative, fractional, or another type.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// Extracts a `u32` from `params[name]`, returning `default` if missing or out of range.
pub fn param_u32(params: &Value, name: &str, default: u32) -> u32 {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}

/// Extracts a `String` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Returns `value` if it is finite and strictly positive.
///
/// Otherwise returns `EngineError::InvalidParameter` naming the parameter.
pub fn require_positive(name: &str, value: f64) -> Result<f64, EngineError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EngineError::InvalidParameter {
            name: name.to_owned(),
            reason: format!("must be a positive finite number, got {value}"),
        })
    }
}

/// Returns `value` if it lies in `[min, max]`.
///
/// Otherwise (including NaN) returns `EngineError::InvalidParameter` naming
/// the parameter and the accepted range.
pub fn require_range(name: &str, value: f64, min: f64, max: f64) -> Result<f64, EngineError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(EngineError::InvalidParameter {
            name: name.to_owned(),
            reason: format!("must be in [{min}, {max}], got {value}"),
        })
    }
}
