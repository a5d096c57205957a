//! Schema definitions for validation.
//!
//! The request validator only depends on the [`AsyncSchema`] capability.
//! This module defines it, and bundles a small set of concrete schemas
//! (string, number, array, object) whose messages follow the conventions clients
//! of zod-style validators expect.
//!
//! # Example
//!
//! ```rust
//! use reqguard::{Schema, JsonPath};
//! use serde_json::json;
//!
//! let schema = Schema::string().min_len(1).max_len(100);
//!
//! let result = schema.validate(&json!("hello"), &JsonPath::root());
//! assert!(result.is_success());
//! ```

mod array;
mod numeric;
mod object;
mod refine;
mod string;
mod traits;

use serde_json::Value;

pub use array::ArraySchema;
pub use numeric::NumberSchema;
pub use object::{AdditionalPropertiesSetting, ObjectSchema};
pub use refine::{AsyncCheck, AsyncRefined};
pub use string::StringSchema;
pub use traits::{AsyncSchema, ParseResult, SchemaLike};

/// Entry point for creating validation schemas.
///
/// # Example
///
/// ```rust
/// use reqguard::Schema;
///
/// let headers = Schema::object()
///     .field("X-Request-Id", Schema::string().uuid())
///     .field("x-request-user", Schema::number().coerce());
/// ```
pub struct Schema;

impl Schema {
    /// Creates a new string schema.
    pub fn string() -> StringSchema {
        StringSchema::new()
    }

    /// Creates a new number schema.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reqguard::{Schema, JsonPath};
    /// use serde_json::json;
    ///
    /// let schema = Schema::number().coerce();
    ///
    /// let result = schema.validate(&json!("2"), &JsonPath::root());
    /// assert_eq!(serde_json::Value::Number(result.into_result().unwrap()), json!(2));
    /// ```
    pub fn number() -> NumberSchema {
        NumberSchema::new()
    }

    /// Creates a new array schema whose elements match `items`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reqguard::Schema;
    ///
    /// let query = Schema::object()
    ///     .field("tag", Schema::array(Schema::string().min_len(1)).coerce().max_len(5));
    /// ```
    pub fn array<S: SchemaLike>(items: S) -> ArraySchema<S> {
        ArraySchema::new(items)
    }

    /// Creates a new object schema.
    ///
    /// Object schemas declare a fixed set of field names, which is what lets
    /// the header location match them case-insensitively.
    pub fn object() -> ObjectSchema {
        ObjectSchema::new()
    }
}

/// Returns the type name used in "received ..." messages.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
