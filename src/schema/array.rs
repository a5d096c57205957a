//! Array schema validation.
//!
//! This module provides [`ArraySchema`] for validating arrays with an item
//! schema and length constraints. Repeated query and form keys arrive as
//! arrays of strings, so this is the schema that accepts `?tag=a&tag=b`.

use serde_json::Value;
use stillwater::Validation;

use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;

use super::traits::SchemaLike;
use super::value_type_name;

/// A constraint applied to the array as a whole.
#[derive(Clone)]
enum ArrayConstraint {
    MinLength { min: usize, message: Option<String> },
    MaxLength { max: usize, message: Option<String> },
}

/// A schema for validating arrays.
///
/// Every element is validated against the item schema, and element issues
/// carry their index in the path (`tag[1]`). Length issues and element
/// issues accumulate together.
///
/// # Example
///
/// ```rust
/// use reqguard::{Schema, JsonPath};
/// use serde_json::json;
///
/// let schema = Schema::array(Schema::number().coerce()).max_len(3);
///
/// let ids = schema.validate(&json!(["1", "2"]), &JsonPath::root()).into_result().unwrap();
/// assert_eq!(ids, vec![json!(1), json!(2)]);
///
/// let errors = schema
///     .validate(&json!(["1", "x"]), &JsonPath::from_field("ids"))
///     .into_result()
///     .unwrap_err();
/// assert_eq!(errors.first().path.to_string(), "ids[1]");
/// ```
pub struct ArraySchema<S> {
    item_schema: S,
    coerce: bool,
    constraints: Vec<ArrayConstraint>,
    type_error_message: Option<String>,
}

impl<S: SchemaLike> ArraySchema<S> {
    /// Creates an array schema whose elements must match `item_schema`.
    pub fn new(item_schema: S) -> Self {
        Self {
            item_schema,
            coerce: false,
            constraints: Vec::new(),
            type_error_message: None,
        }
    }

    /// Treats a single non-array value as a one-element array.
    ///
    /// A query key given once arrives as a string and given twice as an
    /// array; with coercion both validate the same way.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Requires at least `min` elements.
    pub fn min_len(mut self, min: usize) -> Self {
        self.constraints
            .push(ArrayConstraint::MinLength { min, message: None });
        self
    }

    /// Requires at most `max` elements.
    pub fn max_len(mut self, max: usize) -> Self {
        self.constraints
            .push(ArrayConstraint::MaxLength { max, message: None });
        self
    }

    /// Requires at least one element.
    pub fn non_empty(self) -> Self {
        self.min_len(1)
    }

    /// Sets a custom error message for the most recent constraint.
    ///
    /// If no constraints have been added yet, this sets the type error message.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        match self.constraints.last_mut() {
            Some(ArrayConstraint::MinLength { message: m, .. })
            | Some(ArrayConstraint::MaxLength { message: m, .. }) => *m = Some(message.into()),
            None => self.type_error_message = Some(message.into()),
        }
        self
    }

    /// Validates a value against this schema.
    pub fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Vec<Value>, SchemaErrors> {
        let single;
        let items = match value {
            Value::Array(items) => items.as_slice(),
            other if self.coerce => {
                single = [other.clone()];
                &single[..]
            }
            other => {
                let message = self.type_error_message.clone().unwrap_or_else(|| {
                    format!("Expected array, received {}", value_type_name(other))
                });
                return Validation::Failure(SchemaErrors::single(
                    SchemaError::new(path.clone(), message)
                        .with_code("invalid_type")
                        .with_got(value_type_name(other))
                        .with_expected("array"),
                ));
            }
        };

        let mut errors: Vec<SchemaError> = self
            .constraints
            .iter()
            .filter_map(|c| check_constraint(c, items.len(), path))
            .collect();

        let mut validated = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let item_path = path.push_index(index);
            match self.item_schema.validate_to_value(item, &item_path) {
                Validation::Success(v) => validated.push(v),
                Validation::Failure(e) => errors.extend(e.into_vec()),
            }
        }

        if errors.is_empty() {
            Validation::Success(validated)
        } else {
            Validation::Failure(SchemaErrors::from_vec(errors))
        }
    }
}

impl<S: SchemaLike> SchemaLike for ArraySchema<S> {
    type Output = Vec<Value>;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Self::Output, SchemaErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate(value, path).map(Value::Array)
    }

    fn type_name(&self) -> &'static str {
        "array"
    }
}

fn check_constraint(constraint: &ArrayConstraint, len: usize, path: &JsonPath) -> Option<SchemaError> {
    match constraint {
        ArrayConstraint::MinLength { min, message } => (len < *min).then(|| {
            let msg = message
                .clone()
                .unwrap_or_else(|| format!("Array must contain at least {} element(s)", min));
            SchemaError::new(path.clone(), msg)
                .with_code("too_small")
                .with_expected(format!("at least {} items", min))
                .with_got(format!("{} items", len))
        }),
        ArrayConstraint::MaxLength { max, message } => (len > *max).then(|| {
            let msg = message
                .clone()
                .unwrap_or_else(|| format!("Array must contain at most {} element(s)", max));
            SchemaError::new(path.clone(), msg)
                .with_code("too_big")
                .with_expected(format!("at most {} items", max))
                .with_got(format!("{} items", len))
        }),
    }
}
