//! Assertion primitives used by every check.
//!
//! Each primitive returns an [`AssertionFailure`] instead of panicking, so a
//! check body is a plain function that chains assertions with `?`.

use std::fmt::Display;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AssertionFailure {
    message: String,
}

impl AssertionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type AssertResult = Result<(), AssertionFailure>;

/// Fail with `message` unless `condition` holds.
pub fn ensure(condition: bool, message: impl Into<String>) -> AssertResult {
    if condition {
        Ok(())
    } else {
        Err(AssertionFailure::new(message))
    }
}

fn with_detail(message: Option<&str>, detail: String) -> String {
    match message {
        Some(message) => format!("{message} ({detail})"),
        None => detail,
    }
}

/// Strict equality. The failure message always cites both operands.
pub fn assert_equals<T>(actual: &T, expected: &T, message: Option<&str>) -> AssertResult
where
    T: PartialEq + Display + ?Sized,
{
    if actual == expected {
        return Ok(());
    }
    Err(AssertionFailure::new(with_detail(
        message,
        format!("expected {expected}, got {actual}"),
    )))
}

/// Recursively sort object keys so structural comparison ignores key order.
pub fn canonicalize_value(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize_value).collect()),
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut result = Map::with_capacity(entries.len());
            for (key, value) in entries {
                result.insert(key, canonicalize_value(value));
            }
            Value::Object(result)
        }
        other => other,
    }
}

/// Structural equality over the canonical JSON form of both sides.
pub fn assert_deep_equals<T>(actual: &T, expected: &T, message: Option<&str>) -> AssertResult
where
    T: Serialize + ?Sized,
{
    let to_canonical = |value: &T| {
        serde_json::to_value(value)
            .map(canonicalize_value)
            .map_err(|err| AssertionFailure::new(format!("value is not comparable: {err}")))
    };
    let actual = to_canonical(actual)?;
    let expected = to_canonical(expected)?;
    if actual == expected {
        return Ok(());
    }
    let message = message.unwrap_or("Deep equality failed");
    Err(AssertionFailure::new(format!(
        "{message}: Expected {expected}, got {actual}"
    )))
}

pub fn assert_greater_than<T>(actual: T, expected: T, message: Option<&str>) -> AssertResult
where
    T: PartialOrd + Display,
{
    if actual > expected {
        return Ok(());
    }
    Err(AssertionFailure::new(message.map_or_else(
        || format!("Expected {actual} > {expected}"),
        str::to_string,
    )))
}

pub fn assert_less_than<T>(actual: T, expected: T, message: Option<&str>) -> AssertResult
where
    T: PartialOrd + Display,
{
    if actual < expected {
        return Ok(());
    }
    Err(AssertionFailure::new(message.map_or_else(
        || format!("Expected {actual} < {expected}"),
        str::to_string,
    )))
}

/// Inclusive on both ends. NaN is never in range.
pub fn assert_in_range<T>(actual: T, min: T, max: T, message: Option<&str>) -> AssertResult
where
    T: PartialOrd + Display,
{
    if actual >= min && actual <= max {
        return Ok(());
    }
    Err(AssertionFailure::new(message.map_or_else(
        || format!("Expected {actual} to be in range [{min}, {max}]"),
        str::to_string,
    )))
}
