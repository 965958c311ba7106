//! Scalar coercion of raw JSON values into [`TypedValue`]s.
//!
//! Two entry points: [`coerce_as`] converts under a declared [`TypeTag`], and
//! [`infer`] classifies a value when no schema applies. Neither touches
//! diagnostics; policy (lenient defaults versus strict failure) lives in
//! [`crate::convert`].

use serde_json::{Map, Number, Value};

use crate::schema::TypeTag;
use crate::value::TypedValue;

/// A raw value that does not fit the declared type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Mismatch {
    /// Declared type.
    pub expected: TypeTag,
    /// Short description of what was found instead.
    pub found: &'static str,
}

/// Result of default inference on a raw value.
#[derive(Debug, PartialEq)]
pub enum Inferred<'a> {
    /// A scalar mapped directly onto a typed value.
    Scalar(TypedValue),
    /// An integer outside the `int32` range, stored as `float64`.
    Widened(TypedValue),
    /// A nested record to be walked recursively.
    Record(&'a Map<String, Value>),
    /// A shape the store cannot hold; the field is dropped.
    Unsupported(&'static str),
}

/// Describe the shape of a raw value for diagnostics.
#[must_use]
pub fn raw_kind(raw: &Value) -> &'static str {
    match raw {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if is_integral(number) => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Convert `raw` to the scalar type named by `tag`.
///
/// # Errors
///
/// Returns a [`Mismatch`] when the value has the wrong shape or does not fit
/// the target range (for example a negative number for `uint`).
///
/// # Examples
///
/// ```rust
/// use prefixdb::coerce::coerce_as;
/// use prefixdb::schema::TypeTag;
/// use prefixdb::TypedValue;
/// use serde_json::json;
///
/// assert_eq!(coerce_as(&json!(64512), TypeTag::UInt32), Ok(TypedValue::UInt32(64512)));
/// assert!(coerce_as(&json!(-1), TypeTag::UInt32).is_err());
/// ```
pub fn coerce_as(raw: &Value, tag: TypeTag) -> Result<TypedValue, Mismatch> {
    let mismatch = || Mismatch {
        expected: tag,
        found: found_for(raw, tag),
    };
    match (tag, raw) {
        (TypeTag::String, Value::String(text)) => Ok(TypedValue::String(text.clone())),
        (TypeTag::Bool, Value::Bool(flag)) => Ok(TypedValue::Bool(*flag)),
        (TypeTag::Float64, Value::Number(number)) => {
            number.as_f64().map(TypedValue::Float64).ok_or_else(mismatch)
        }
        (TypeTag::Int32, Value::Number(number)) => integral(number)
            .and_then(|value| i32::try_from(value).ok())
            .map(TypedValue::Int32)
            .ok_or_else(mismatch),
        (TypeTag::UInt32, Value::Number(number)) => integral(number)
            .and_then(|value| u32::try_from(value).ok())
            .map(TypedValue::UInt32)
            .ok_or_else(mismatch),
        _ => Err(mismatch()),
    }
}

/// Classify `raw` using the default inference table.
///
/// | raw | result |
/// |---|---|
/// | string | `String` |
/// | boolean | `Bool` |
/// | integer within `i32` | `Int32` |
/// | other integer | `Float64` (widened) |
/// | non-integral number | `Float64` |
/// | object | nested record |
/// | array, null | unsupported |
#[must_use]
pub fn infer(raw: &Value) -> Inferred<'_> {
    match raw {
        Value::String(text) => Inferred::Scalar(TypedValue::String(text.clone())),
        Value::Bool(flag) => Inferred::Scalar(TypedValue::Bool(*flag)),
        Value::Number(number) => infer_number(number),
        Value::Object(map) => Inferred::Record(map),
        Value::Array(_) => Inferred::Unsupported("array"),
        Value::Null => Inferred::Unsupported("null"),
    }
}

fn infer_number(number: &Number) -> Inferred<'static> {
    if number.is_i64() || number.is_u64() {
        if let Some(value) = number.as_i64().and_then(|v| i32::try_from(v).ok()) {
            return Inferred::Scalar(TypedValue::Int32(value));
        }
        return Inferred::Widened(TypedValue::Float64(as_f64_lossy(number)));
    }
    Inferred::Scalar(TypedValue::Float64(as_f64_lossy(number)))
}

fn as_f64_lossy(number: &Number) -> f64 {
    number.as_f64().unwrap_or_default()
}

fn is_integral(number: &Number) -> bool {
    number.is_i64() || number.is_u64() || number.as_f64().is_some_and(|f| f.fract() == 0.0)
}

/// Widen a JSON number to `i64` when it denotes a whole value.
///
/// Floats such as `5.0` count as integral; anything outside the `i64` range
/// does not.
#[expect(
    clippy::cast_possible_truncation,
    reason = "the float is checked to be whole and inside the i64 range first"
)]
fn integral(number: &Number) -> Option<i64> {
    if let Some(value) = number.as_i64() {
        return Some(value);
    }
    if number.is_u64() {
        return None;
    }
    let float = number.as_f64()?;
    let in_range = float >= -9_223_372_036_854_775_808.0 && float < 9_223_372_036_854_775_808.0;
    (float.fract() == 0.0 && in_range).then_some(float as i64)
}

fn found_for(raw: &Value, tag: TypeTag) -> &'static str {
    match (tag, raw) {
        (TypeTag::UInt32, Value::Number(number)) if number.as_f64().is_some_and(|f| f < 0.0) => {
            "negative number"
        }
        (TypeTag::Int32 | TypeTag::UInt32, Value::Number(number)) if is_integral(number) => {
            "out-of-range integer"
        }
        _ => raw_kind(raw),
    }
}
