//! Exact and structural comparison of runtime values.

use std::cell::BorrowError;

use thiserror::Error;

use crate::runtime::{Value, ValueInner};

/// Deepest object nesting an equivalence check will follow.
pub const MAX_DEPTH: usize = 32;

#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error("Comparison exceeded the maximum depth of {MAX_DEPTH}")]
    TooDeep,
    #[error("Object fields are being modified: {0}")]
    Borrowed(#[from] BorrowError),
}

/// Same kind and same value. Objects are equal when they are the same
/// instance or share a type and have pairwise equal fields.
pub fn exactly_equal(expected: &Value, actual: &Value) -> Result<bool, ComparisonError> {
    exact(expected, actual, 0)
}

fn exact(expected: &Value, actual: &Value, depth: usize) -> Result<bool, ComparisonError> {
    if depth > MAX_DEPTH {
        return Err(ComparisonError::TooDeep);
    }

    let equal = match (&**expected, &**actual) {
        (ValueInner::Bool(a), ValueInner::Bool(b)) => a == b,
        (ValueInner::Byte(a), ValueInner::Byte(b)) => a == b,
        (ValueInner::Char(a), ValueInner::Char(b)) => a == b,
        (ValueInner::Short(a), ValueInner::Short(b)) => a == b,
        (ValueInner::Int(a), ValueInner::Int(b)) => a == b,
        (ValueInner::UInt(a), ValueInner::UInt(b)) => a == b,
        (ValueInner::Long(a), ValueInner::Long(b)) => a == b,
        (ValueInner::Float(a), ValueInner::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
        (ValueInner::Double(a), ValueInner::Double(b)) => a == b || (a.is_nan() && b.is_nan()),
        (ValueInner::String(a), ValueInner::String(b)) => a == b,
        (ValueInner::Type(a), ValueInner::Type(b)) => a == b,
        (ValueInner::Object(a), ValueInner::Object(b)) => {
            if expected.ptr_eq(actual) {
                return Ok(true);
            }
            if a.ty() != b.ty() {
                return Ok(false);
            }

            let expected_fields = a.fields()?;
            let actual_fields = b.fields()?;
            if expected_fields.len() != actual_fields.len() {
                return Ok(false);
            }

            for ((name, expected), (other_name, actual)) in
                expected_fields.iter().zip(actual_fields.iter())
            {
                if name != other_name || !exact(expected, actual, depth + 1)? {
                    return Ok(false);
                }
            }
            true
        }
        _ => false,
    };

    Ok(equal)
}

/// Numeric view used to compare across widths.
enum Number {
    Integer(i128),
    Real(f64),
}

fn number(value: &Value) -> Option<Number> {
    let number = match &**value {
        ValueInner::Byte(n) => Number::Integer(i128::from(*n)),
        ValueInner::Short(n) => Number::Integer(i128::from(*n)),
        ValueInner::Int(n) => Number::Integer(i128::from(*n)),
        ValueInner::UInt(n) => Number::Integer(i128::from(*n)),
        ValueInner::Long(n) => Number::Integer(i128::from(*n)),
        ValueInner::Float(n) => Number::Real(f64::from(*n)),
        ValueInner::Double(n) => Number::Real(*n),
        _ => return None,
    };
    Some(number)
}

fn numbers_equal(a: Number, b: Number) -> bool {
    match (a, b) {
        (Number::Integer(a), Number::Integer(b)) => a == b,
        (Number::Real(a), Number::Real(b)) => a == b || (a.is_nan() && b.is_nan()),
        (Number::Integer(i), Number::Real(r)) | (Number::Real(r), Number::Integer(i)) => {
            r.fract() == 0.0 && r.is_finite() && r as i128 == i
        }
    }
}

/// Structural comparison. Numbers compare by value across widths; for
/// objects, every field of `expected` must be present in `actual` with an
/// equivalent value, and types are ignored.
pub fn equivalent(expected: &Value, actual: &Value) -> Result<bool, ComparisonError> {
    equiv(expected, actual, 0)
}

fn equiv(expected: &Value, actual: &Value, depth: usize) -> Result<bool, ComparisonError> {
    if depth > MAX_DEPTH {
        return Err(ComparisonError::TooDeep);
    }

    if let (Some(a), Some(b)) = (number(expected), number(actual)) {
        return Ok(numbers_equal(a, b));
    }

    let equal = match (&**expected, &**actual) {
        (ValueInner::Bool(a), ValueInner::Bool(b)) => a == b,
        (ValueInner::Char(a), ValueInner::Char(b)) => a == b,
        (ValueInner::String(a), ValueInner::String(b)) => a == b,
        (ValueInner::Type(a), ValueInner::Type(b)) => a == b,
        (ValueInner::Object(a), ValueInner::Object(b)) => {
            if expected.ptr_eq(actual) {
                return Ok(true);
            }

            let expected_fields = a.fields()?;
            for (name, expected) in expected_fields.iter() {
                let Some(actual) = b.get(name) else {
                    return Ok(false);
                };
                if !equiv(expected, &actual, depth + 1)? {
                    return Ok(false);
                }
            }
            true
        }
        _ => false,
    };

    Ok(equal)
}
