//! Traits for schema polymorphism.
//!
//! [`SchemaLike`] is the synchronous trait the bundled schemas implement.
//! [`AsyncSchema`] is the capability the request validator depends on: one
//! asynchronous attempt-parse operation plus an optional declared shape. Every
//! `SchemaLike` is an `AsyncSchema`, and third-party schema libraries can
//! implement `AsyncSchema` directly.

use futures_util::future::{self, BoxFuture, FutureExt};
use serde_json::Value;
use stillwater::Validation;

use crate::error::{BoxError, SchemaErrors};
use crate::path::JsonPath;

use super::refine::AsyncRefined;

/// Outcome of an attempt-parse.
///
/// `Ok` carries the validation result; `Err` is reserved for schemas that
/// failed for reasons unrelated to the input (a refinement's lookup errored).
pub type ParseResult = Result<Validation<Value, SchemaErrors>, BoxError>;

/// A trait for schema types that can validate JSON values.
///
/// `SchemaLike` enables schema polymorphism, allowing different schema types
/// to be composed together for validating nested structures. Any type that
/// implements this trait can be used as a field schema in an `ObjectSchema`.
///
/// # Example
///
/// ```rust
/// use reqguard::Schema;
///
/// let object = Schema::object()
///     .field("name", Schema::string().min_len(1))
///     .field("age", Schema::number().int().positive());
/// ```
pub trait SchemaLike: Send + Sync {
    /// The output type produced by successful validation.
    type Output;

    /// Validates a value against this schema.
    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Self::Output, SchemaErrors>;

    /// Validates a value and returns the result as a `serde_json::Value`.
    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors>;

    /// The type name used in "Expected <type>, received ..." messages.
    fn type_name(&self) -> &'static str;

    /// Field names this schema declares, in declaration order.
    ///
    /// Only object schemas declare fields.
    fn field_names(&self) -> Option<Vec<String>> {
        None
    }

    /// Wraps this schema so asynchronous checks can be attached.
    fn into_async(self) -> AsyncRefined<Self>
    where
        Self: Sized,
    {
        AsyncRefined::new(self)
    }
}

/// The attempt-parse capability the request validator is written against.
///
/// Implementations must be free of side effects when they report a failure,
/// and must be safe to call concurrently from many requests.
///
/// # Example
///
/// ```rust
/// use futures_util::future::{BoxFuture, FutureExt};
/// use reqguard::{AsyncSchema, ParseResult};
/// use serde_json::Value;
/// use stillwater::Validation;
///
/// /// Accepts anything.
/// struct AnyValue;
///
/// impl AsyncSchema for AnyValue {
///     fn safe_parse(&self, input: Value) -> BoxFuture<'_, ParseResult> {
///         async move { Ok(Validation::Success(input)) }.boxed()
///     }
/// }
/// ```
pub trait AsyncSchema: Send + Sync {
    /// Attempts to parse `input`, resolving to the parsed value or its issues.
    fn safe_parse(&self, input: Value) -> BoxFuture<'_, ParseResult>;

    /// Field names this schema declares, if it has a fixed object shape.
    ///
    /// The header location uses this to match incoming, lower-cased header
    /// names against the declared spelling.
    fn shape(&self) -> Option<Vec<String>> {
        None
    }
}

impl<S: SchemaLike> AsyncSchema for S {
    fn safe_parse(&self, input: Value) -> BoxFuture<'_, ParseResult> {
        let outcome = self.validate_to_value(&input, &JsonPath::root());
        future::ready(Ok(outcome)).boxed()
    }

    fn shape(&self) -> Option<Vec<String>> {
        self.field_names()
    }
}
