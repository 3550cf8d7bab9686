//! Payload validation
//!
//! Request bodies are decoded field by field so that every failing field is
//! reported, not just the first one serde trips over.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Lowest accepted price
pub const PRICE_MIN: i64 = 0;

/// Highest accepted price
pub const PRICE_MAX: i64 = 10;

/// A single failing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All field failures for one payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-failure shorthand
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Names of the failing fields, in report order
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    /// `Ok(value)` if nothing failed
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed")?;
        for (i, e) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}: {}", sep, e.field, e.message)?;
        }
        Ok(())
    }
}

/// A request payload decoded and validated from a JSON object
pub trait FromPayload: Sized {
    fn from_payload(body: Map<String, Value>) -> Result<Self, ValidationErrors>;
}

/// Decode a field that must be present and non-null
pub(crate) fn required<T: DeserializeOwned>(
    body: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<T> {
    required_with(body, field, errors, decode_json)
}

/// Decode a field that may be missing or null
pub(crate) fn optional<T: DeserializeOwned>(
    body: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<T> {
    optional_with(body, field, errors, decode_json)
}

pub(crate) fn required_with<T>(
    body: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
    decode: fn(&Value) -> Result<T, String>,
) -> Option<T> {
    match body.get(field) {
        None => {
            errors.add(field, "field required");
            None
        }
        Some(Value::Null) => {
            errors.add(field, "must not be null");
            None
        }
        Some(value) => collect(decode(value), field, errors),
    }
}

pub(crate) fn optional_with<T>(
    body: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
    decode: fn(&Value) -> Result<T, String>,
) -> Option<T> {
    match body.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => collect(decode(value), field, errors),
    }
}

fn collect<T>(result: Result<T, String>, field: &str, errors: &mut ValidationErrors) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(message) => {
            errors.add(field, message);
            None
        }
    }
}

fn decode_json<T: DeserializeOwned>(value: &Value) -> Result<T, String> {
    serde_json::from_value(value.clone()).map_err(|e| e.to_string())
}

/// Integers, or floats with no fractional part (`5.0`)
pub(crate) fn decode_price(value: &Value) -> Result<i64, String> {
    if let Some(price) = value.as_i64() {
        return Ok(price);
    }
    match value.as_f64() {
        Some(price) if price.fract() != 0.0 => Err(format!("must be a whole number, got {}", price)),
        Some(price) if price.abs() < i64::MAX as f64 => Ok(price as i64),
        Some(price) => Err(format!("must be an integer in range, got {}", price)),
        None => Err(format!("must be an integer, got {}", value)),
    }
}

pub(crate) fn check_price(price: i64, errors: &mut ValidationErrors) {
    if !(PRICE_MIN..=PRICE_MAX).contains(&price) {
        errors.add(
            "price",
            format!(
                "must be between {} and {} inclusive, got {}",
                PRICE_MIN, PRICE_MAX, price
            ),
        );
    }
}

pub(crate) fn check_name(name: &str, errors: &mut ValidationErrors) {
    if name.is_empty() {
        errors.add("name", "must not be empty");
    }
}
