//! Numeric schema validation.
//!
//! This module provides [`NumberSchema`] for validating numbers, with
//! optional coercion of the strings that query strings, forms, headers,
//! cookies and path parameters always deliver.

use serde_json::{Number, Value};
use std::ops::RangeInclusive;
use stillwater::Validation;

use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;

use super::traits::SchemaLike;
use super::value_type_name;

/// A constraint applied to numeric values.
#[derive(Clone)]
enum NumberConstraint {
    Int { message: Option<String> },
    Min { value: f64, message: Option<String> },
    Max { value: f64, message: Option<String> },
    Positive { message: Option<String> },
    NonNegative { message: Option<String> },
    Negative { message: Option<String> },
}

/// A schema for validating numbers.
///
/// Without [`coerce`](NumberSchema::coerce) only JSON numbers are accepted.
/// With it, strings, booleans and null are converted first, so a query
/// parameter `page=5` parses to the number `5`.
///
/// # Example
///
/// ```rust
/// use reqguard::{Schema, JsonPath};
/// use serde_json::json;
///
/// let schema = Schema::number().coerce().int().min(1.0);
///
/// let page = schema.validate(&json!("5"), &JsonPath::root()).into_result().unwrap();
/// assert_eq!(serde_json::Value::Number(page), json!(5));
///
/// let errors = schema.validate(&json!("five"), &JsonPath::root()).into_result().unwrap_err();
/// assert_eq!(errors.first().message, "Expected number, received NaN");
/// ```
#[derive(Clone)]
pub struct NumberSchema {
    coerce: bool,
    constraints: Vec<NumberConstraint>,
    type_error_message: Option<String>,
}

impl NumberSchema {
    /// Creates a new number schema with no constraints.
    pub fn new() -> Self {
        Self {
            coerce: false,
            constraints: Vec::new(),
            type_error_message: None,
        }
    }

    /// Converts non-number input before validating.
    ///
    /// Strings are trimmed and read with the same grammar as JavaScript's
    /// `Number()`: decimal and exponent forms, `0x`/`0o`/`0b` integer
    /// literals, and `Infinity`. The empty string is 0. Booleans become 1 or
    /// 0, and null becomes 0.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Requires an integral value.
    pub fn int(mut self) -> Self {
        self.constraints.push(NumberConstraint::Int { message: None });
        self
    }

    /// Adds a minimum value constraint (inclusive).
    pub fn min(mut self, value: f64) -> Self {
        self.constraints.push(NumberConstraint::Min {
            value,
            message: None,
        });
        self
    }

    /// Adds a maximum value constraint (inclusive).
    pub fn max(mut self, value: f64) -> Self {
        self.constraints.push(NumberConstraint::Max {
            value,
            message: None,
        });
        self
    }

    /// Adds both minimum and maximum value constraints (inclusive range).
    pub fn range(self, range: RangeInclusive<f64>) -> Self {
        self.min(*range.start()).max(*range.end())
    }

    /// Requires a value greater than 0.
    pub fn positive(mut self) -> Self {
        self.constraints
            .push(NumberConstraint::Positive { message: None });
        self
    }

    /// Requires a value greater than or equal to 0.
    pub fn non_negative(mut self) -> Self {
        self.constraints
            .push(NumberConstraint::NonNegative { message: None });
        self
    }

    /// Requires a value less than 0.
    pub fn negative(mut self) -> Self {
        self.constraints
            .push(NumberConstraint::Negative { message: None });
        self
    }

    /// Sets a custom error message for the most recent constraint.
    ///
    /// If no constraints have been added yet, this sets the type error message.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        if let Some(last) = self.constraints.last_mut() {
            match last {
                NumberConstraint::Int { message: m }
                | NumberConstraint::Min { message: m, .. }
                | NumberConstraint::Max { message: m, .. }
                | NumberConstraint::Positive { message: m }
                | NumberConstraint::NonNegative { message: m }
                | NumberConstraint::Negative { message: m } => *m = Some(message.into()),
            }
        } else {
            self.type_error_message = Some(message.into());
        }
        self
    }

    /// Validates a value against this schema.
    ///
    /// Integral results are returned as JSON integers.
    pub fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Number, SchemaErrors> {
        let n = match self.read(value) {
            Ok(n) => n,
            Err(got) => {
                let message = self
                    .type_error_message
                    .clone()
                    .unwrap_or_else(|| format!("Expected number, received {}", got));
                return Validation::Failure(SchemaErrors::single(
                    SchemaError::new(path.clone(), message)
                        .with_code("invalid_type")
                        .with_got(got)
                        .with_expected("number"),
                ));
            }
        };

        let number = match to_json_number(n) {
            Some(number) => number,
            None => {
                return Validation::Failure(SchemaErrors::single(
                    SchemaError::new(path.clone(), "Number must be finite")
                        .with_code("not_finite")
                        .with_got(n.to_string())
                        .with_expected("finite number"),
                ));
            }
        };

        let errors: Vec<SchemaError> = self
            .constraints
            .iter()
            .filter_map(|c| check_constraint(c, n, path))
            .collect();

        if errors.is_empty() {
            Validation::Success(number)
        } else {
            Validation::Failure(SchemaErrors::from_vec(errors))
        }
    }

    /// Reads the numeric value, or the "received" type name on mismatch.
    fn read(&self, value: &Value) -> Result<f64, &'static str> {
        if let Some(n) = value.as_f64() {
            return Ok(n);
        }
        if !self.coerce {
            return Err(value_type_name(value));
        }
        let n = match value {
            Value::String(s) => parse_numeric_string(s),
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Null => 0.0,
            _ => f64::NAN,
        };
        if n.is_nan() {
            Err("NaN")
        } else {
            Ok(n)
        }
    }
}

impl Default for NumberSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLike for NumberSchema {
    type Output = Number;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Number, SchemaErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate(value, path).map(Value::Number)
    }

    fn type_name(&self) -> &'static str {
        "number"
    }
}

/// Reads a string the way JavaScript's `Number()` does, returning NaN for
/// anything outside that grammar.
fn parse_numeric_string(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix_digits(&trimmed[2..], radix);
    }

    let unsigned = trimmed.trim_start_matches(['+', '-']);
    if unsigned == "Infinity" && trimmed.len() - unsigned.len() <= 1 {
        return if trimmed.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    // Rust also accepts "inf", "infinity" and "nan" in any case; JavaScript does not.
    let decimal = trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if decimal {
        trimmed.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// Unsigned integer digits in `radix`. Values beyond `u64` keep folding
/// into the float, as JavaScript does.
fn parse_radix_digits(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN)
}

/// Converts to a JSON number, preferring an integer representation.
fn to_json_number(n: f64) -> Option<Number> {
    if !n.is_finite() {
        return None;
    }
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        return Some(Number::from(n as i64));
    }
    Number::from_f64(n)
}

fn check_constraint(constraint: &NumberConstraint, n: f64, path: &JsonPath) -> Option<SchemaError> {
    let (failed, code, default_message, message) = match constraint {
        NumberConstraint::Int { message } => (
            n.fract() != 0.0,
            "invalid_type",
            "Expected integer, received float".to_string(),
            message,
        ),
        NumberConstraint::Min { value, message } => (
            n < *value,
            "too_small",
            format!("Number must be greater than or equal to {}", value),
            message,
        ),
        NumberConstraint::Max { value, message } => (
            n > *value,
            "too_big",
            format!("Number must be less than or equal to {}", value),
            message,
        ),
        NumberConstraint::Positive { message } => (
            n <= 0.0,
            "too_small",
            "Number must be greater than 0".to_string(),
            message,
        ),
        NumberConstraint::NonNegative { message } => (
            n < 0.0,
            "too_small",
            "Number must be greater than or equal to 0".to_string(),
            message,
        ),
        NumberConstraint::Negative { message } => (
            n >= 0.0,
            "too_big",
            "Number must be less than 0".to_string(),
            message,
        ),
    };

    failed.then(|| {
        SchemaError::new(path.clone(), message.clone().unwrap_or(default_message))
            .with_code(code)
            .with_got(n.to_string())
    })
}
