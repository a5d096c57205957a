//! Object schema validation.
//!
//! This module provides [`ObjectSchema`] for validating JSON objects with
//! typed fields, optional fields, default values, and unknown key handling.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use stillwater::Validation;

use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;

use super::traits::SchemaLike;
use super::value_type_name;

/// Definition of a field within an object schema.
struct FieldDef {
    schema: Box<dyn SchemaLike<Output = Value>>,
    required: bool,
    default: Option<Value>,
}

/// How to handle properties not defined in the schema.
enum AdditionalProperties {
    /// Drop unknown properties from the output (default behavior).
    Strip,
    /// Keep unknown properties unchanged.
    Allow,
    /// Reject unknown properties.
    Deny,
    /// Validate unknown properties against a schema.
    Validate(Box<dyn SchemaLike<Output = Value>>),
}

/// A schema for validating JSON objects.
///
/// `ObjectSchema` validates that values are objects and checks each declared
/// field. All field validation errors are accumulated, in declaration order.
/// Keys the schema does not declare are dropped from the output unless
/// [`additional_properties`](ObjectSchema::additional_properties) says
/// otherwise.
///
/// # Example
///
/// ```rust
/// use reqguard::{Schema, JsonPath};
/// use serde_json::json;
///
/// let schema = Schema::object()
///     .field("key1", Schema::string())
///     .field("key2", Schema::number().coerce());
///
/// let result = schema.validate(&json!({
///     "key1": "1",
///     "key2": "2",
///     "key3": "3"
/// }), &JsonPath::root());
/// let obj = result.into_result().unwrap();
/// assert_eq!(serde_json::Value::Object(obj), json!({"key1": "1", "key2": 2}));
/// ```
pub struct ObjectSchema {
    fields: IndexMap<String, FieldDef>,
    additional_properties: AdditionalProperties,
    type_error_message: Option<String>,
}

impl ObjectSchema {
    /// Creates a new object schema with no fields.
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
            additional_properties: AdditionalProperties::Strip,
            type_error_message: None,
        }
    }

    /// Adds a required field to the schema.
    ///
    /// A missing field is reported as `Expected <type>, received undefined`.
    pub fn field<S>(mut self, name: impl Into<String>, schema: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.fields.insert(
            name.into(),
            FieldDef {
                schema: Box::new(SchemaWrapper(schema)),
                required: true,
                default: None,
            },
        );
        self
    }

    /// Adds an optional field to the schema.
    ///
    /// The field may be absent. If present, its value must pass validation.
    pub fn optional<S>(mut self, name: impl Into<String>, schema: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.fields.insert(
            name.into(),
            FieldDef {
                schema: Box::new(SchemaWrapper(schema)),
                required: false,
                default: None,
            },
        );
        self
    }

    /// Adds an optional field with a default value.
    ///
    /// If the field is absent, the default value is used as-is.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reqguard::{Schema, JsonPath};
    /// use serde_json::json;
    ///
    /// let schema = Schema::object()
    ///     .default("page", Schema::number().coerce(), json!(1));
    ///
    /// let result = schema.validate(&json!({}), &JsonPath::root());
    /// assert_eq!(result.into_result().unwrap().get("page"), Some(&json!(1)));
    /// ```
    pub fn default<S>(mut self, name: impl Into<String>, schema: S, default: Value) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.fields.insert(
            name.into(),
            FieldDef {
                schema: Box::new(SchemaWrapper(schema)),
                required: false,
                default: Some(default),
            },
        );
        self
    }

    /// Configures how unknown properties are handled.
    ///
    /// - `true`: keep them in the output unchanged
    /// - `false`: reject them
    /// - a schema: validate them against it
    ///
    /// Without a call, unknown properties are stripped.
    pub fn additional_properties<S>(mut self, setting: S) -> Self
    where
        S: Into<AdditionalPropertiesSetting>,
    {
        self.additional_properties = setting.into().0;
        self
    }

    /// Sets a custom error message for type errors.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }

    /// Validates a value against this schema.
    pub fn validate(
        &self,
        value: &Value,
        path: &JsonPath,
    ) -> Validation<Map<String, Value>, SchemaErrors> {
        let obj = match value.as_object() {
            Some(o) => o,
            None => {
                let got = value_type_name(value);
                let message = self
                    .type_error_message
                    .clone()
                    .unwrap_or_else(|| format!("Invalid input: expected object, received {}", got));
                return Validation::Failure(SchemaErrors::single(
                    SchemaError::new(path.clone(), message)
                        .with_code("invalid_type")
                        .with_got(got)
                        .with_expected("object"),
                ));
            }
        };

        let mut errors = Vec::new();
        let mut validated = Map::new();

        for (name, field_def) in &self.fields {
            let field_path = path.push_field(name);

            match obj.get(name) {
                Some(field_value) => {
                    match field_def.schema.validate_to_value(field_value, &field_path) {
                        Validation::Success(v) => {
                            validated.insert(name.clone(), v);
                        }
                        Validation::Failure(e) => errors.extend(e),
                    }
                }
                None if field_def.required => {
                    let expected = field_def.schema.type_name();
                    errors.push(
                        SchemaError::new(
                            field_path,
                            format!("Expected {}, received undefined", expected),
                        )
                        .with_code("required")
                        .with_got("undefined")
                        .with_expected(expected),
                    );
                }
                None => {
                    if let Some(default) = &field_def.default {
                        validated.insert(name.clone(), default.clone());
                    }
                }
            }
        }

        for (key, value) in obj {
            if self.fields.contains_key(key) {
                continue;
            }
            match &self.additional_properties {
                AdditionalProperties::Strip => {}
                AdditionalProperties::Allow => {
                    validated.insert(key.clone(), value.clone());
                }
                AdditionalProperties::Deny => {
                    errors.push(
                        SchemaError::new(path.clone(), format!("Unrecognized key: \"{}\"", key))
                            .with_code("unrecognized_keys")
                            .with_got(key.clone()),
                    );
                }
                AdditionalProperties::Validate(schema) => {
                    match schema.validate_to_value(value, &path.push_field(key)) {
                        Validation::Success(v) => {
                            validated.insert(key.clone(), v);
                        }
                        Validation::Failure(e) => errors.extend(e),
                    }
                }
            }
        }

        if errors.is_empty() {
            Validation::Success(validated)
        } else {
            Validation::Failure(SchemaErrors::from_vec(errors))
        }
    }
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLike for ObjectSchema {
    type Output = Map<String, Value>;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Self::Output, SchemaErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate(value, path).map(Value::Object)
    }

    fn type_name(&self) -> &'static str {
        "object"
    }

    fn field_names(&self) -> Option<Vec<String>> {
        Some(self.fields.keys().cloned().collect())
    }
}

/// A wrapper to adapt any `SchemaLike` to produce `Value` output.
///
/// Field schemas are stored as `Box<dyn SchemaLike<Output = Value>>` but the
/// actual schemas have different output types.
struct SchemaWrapper<S>(S);

impl<S: SchemaLike> SchemaLike for SchemaWrapper<S> {
    type Output = Value;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.0.validate_to_value(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.0.validate_to_value(value, path)
    }

    fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    fn field_names(&self) -> Option<Vec<String>> {
        self.0.field_names()
    }
}

/// A type that can be converted into an unknown-property setting.
///
/// - `bool`: `true` keeps unknown properties, `false` rejects them
/// - Any schema type: validates unknown properties against the schema
pub struct AdditionalPropertiesSetting(AdditionalProperties);

impl From<bool> for AdditionalPropertiesSetting {
    fn from(allow: bool) -> Self {
        if allow {
            AdditionalPropertiesSetting(AdditionalProperties::Allow)
        } else {
            AdditionalPropertiesSetting(AdditionalProperties::Deny)
        }
    }
}

impl<S: SchemaLike + 'static> From<S> for AdditionalPropertiesSetting {
    fn from(schema: S) -> Self {
        AdditionalPropertiesSetting(AdditionalProperties::Validate(Box::new(SchemaWrapper(
            schema,
        ))))
    }
}
