//! String schema validation.
//!
//! This module provides [`StringSchema`] for validating string values with
//! length, pattern and format constraints.

use regex::Regex;
use serde_json::Value;
use stillwater::Validation;
use uuid::{Uuid, Variant};

use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;

use super::traits::SchemaLike;
use super::value_type_name;

/// Length of the `8-4-4-4-12` text form.
const HYPHENATED_LEN: usize = 36;

/// A constraint applied to string values.
#[derive(Clone)]
enum StringConstraint {
    MinLength {
        min: usize,
        message: Option<String>,
    },
    MaxLength {
        max: usize,
        message: Option<String>,
    },
    Pattern {
        regex: Regex,
        message: Option<String>,
    },
    Uuid {
        message: Option<String>,
    },
}

/// A schema for validating string values.
///
/// `StringSchema` validates that values are strings and optionally applies
/// constraints. All constraint violations are accumulated rather than
/// short-circuiting on the first failure.
///
/// # Example
///
/// ```rust
/// use reqguard::{Schema, JsonPath};
/// use serde_json::json;
///
/// let schema = Schema::string().min_len(3).max_len(20);
///
/// let result = schema.validate(&json!("AB"), &JsonPath::root());
/// assert!(result.is_failure());
///
/// let result = schema.validate(&json!(12), &JsonPath::root());
/// let errors = result.into_result().unwrap_err();
/// assert_eq!(errors.first().message, "Expected string, received number");
/// ```
#[derive(Clone)]
pub struct StringSchema {
    constraints: Vec<StringConstraint>,
    type_error_message: Option<String>,
}

impl StringSchema {
    /// Creates a new string schema with no constraints.
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            type_error_message: None,
        }
    }

    /// Adds a minimum length constraint, counted in characters.
    pub fn min_len(mut self, min: usize) -> Self {
        self.constraints
            .push(StringConstraint::MinLength { min, message: None });
        self
    }

    /// Adds a maximum length constraint, counted in characters.
    pub fn max_len(mut self, max: usize) -> Self {
        self.constraints
            .push(StringConstraint::MaxLength { max, message: None });
        self
    }

    /// Adds a regex pattern constraint.
    ///
    /// Returns an error if the regex pattern is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reqguard::{Schema, JsonPath};
    /// use serde_json::json;
    ///
    /// let schema = Schema::string().pattern(r"^\d+$").unwrap();
    ///
    /// assert!(schema.validate(&json!("12345"), &JsonPath::root()).is_success());
    /// assert!(schema.validate(&json!("abc"), &JsonPath::root()).is_failure());
    /// ```
    pub fn pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        self.constraints.push(StringConstraint::Pattern {
            regex,
            message: None,
        });
        Ok(self)
    }

    /// Requires the string to be a hyphenated version 4 UUID.
    ///
    /// The nil UUID, other versions, and non-RFC 4122 variants are rejected.
    pub fn uuid(mut self) -> Self {
        self.constraints
            .push(StringConstraint::Uuid { message: None });
        self
    }

    /// Sets a custom error message for the most recent constraint.
    ///
    /// If no constraints have been added yet, this sets the type error message
    /// (used when the value is not a string).
    pub fn error(mut self, message: impl Into<String>) -> Self {
        if let Some(last) = self.constraints.last_mut() {
            match last {
                StringConstraint::MinLength { message: m, .. }
                | StringConstraint::MaxLength { message: m, .. }
                | StringConstraint::Pattern { message: m, .. }
                | StringConstraint::Uuid { message: m } => *m = Some(message.into()),
            }
        } else {
            self.type_error_message = Some(message.into());
        }
        self
    }

    /// Validates a value against this schema.
    pub fn validate(&self, value: &Value, path: &JsonPath) -> Validation<String, SchemaErrors> {
        let s = match value.as_str() {
            Some(s) => s,
            None => {
                let got = value_type_name(value);
                let message = self
                    .type_error_message
                    .clone()
                    .unwrap_or_else(|| format!("Expected string, received {}", got));
                return Validation::Failure(SchemaErrors::single(
                    SchemaError::new(path.clone(), message)
                        .with_code("invalid_type")
                        .with_got(got)
                        .with_expected("string"),
                ));
            }
        };

        let errors: Vec<SchemaError> = self
            .constraints
            .iter()
            .filter_map(|c| check_constraint(c, s, path))
            .collect();

        if errors.is_empty() {
            Validation::Success(s.to_string())
        } else {
            Validation::Failure(SchemaErrors::from_vec(errors))
        }
    }
}

impl Default for StringSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLike for StringSchema {
    type Output = String;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<String, SchemaErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate(value, path).map(Value::String)
    }

    fn type_name(&self) -> &'static str {
        "string"
    }
}

/// Checks a single constraint and returns an error if it fails.
fn check_constraint(
    constraint: &StringConstraint,
    value: &str,
    path: &JsonPath,
) -> Option<SchemaError> {
    match constraint {
        StringConstraint::MinLength { min, message } => {
            let len = value.chars().count();
            (len < *min).then(|| {
                let msg = message.clone().unwrap_or_else(|| {
                    format!("String must contain at least {} character(s)", min)
                });
                SchemaError::new(path.clone(), msg)
                    .with_code("too_small")
                    .with_expected(format!("at least {} characters", min))
                    .with_got(format!("{} characters", len))
            })
        }
        StringConstraint::MaxLength { max, message } => {
            let len = value.chars().count();
            (len > *max).then(|| {
                let msg = message.clone().unwrap_or_else(|| {
                    format!("String must contain at most {} character(s)", max)
                });
                SchemaError::new(path.clone(), msg)
                    .with_code("too_big")
                    .with_expected(format!("at most {} characters", max))
                    .with_got(format!("{} characters", len))
            })
        }
        StringConstraint::Pattern { regex, message } => (!regex.is_match(value)).then(|| {
            let msg = message.clone().unwrap_or_else(|| "Invalid".to_string());
            SchemaError::new(path.clone(), msg)
                .with_code("invalid_string")
                .with_expected(format!("string matching '{}'", regex.as_str()))
                .with_got(value.to_string())
        }),
        StringConstraint::Uuid { message } => (!is_uuid(value)).then(|| {
            let msg = message.clone().unwrap_or_else(|| "Invalid UUID".to_string());
            SchemaError::new(path.clone(), msg)
                .with_code("invalid_format")
                .with_expected("uuid")
                .with_got(value.to_string())
        }),
    }
}

/// A hyphenated, RFC 4122 variant, version 4 UUID.
fn is_uuid(value: &str) -> bool {
    value.len() == HYPHENATED_LEN
        && Uuid::try_parse(value).is_ok_and(|uuid| {
            uuid.get_version_num() == 4 && uuid.get_variant() == Variant::RFC4122
        })
}
