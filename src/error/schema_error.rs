//! Field-level validation issues.
//!
//! This module provides [`SchemaError`] for a single issue and
//! [`SchemaErrors`] for the ordered, non-empty set of issues a schema reports.

use std::fmt::{self, Display};

use stillwater::prelude::*;

use crate::path::JsonPath;

/// Leading text some schema libraries put in front of every message.
const INVALID_INPUT_PREFIX: &str = "Invalid input: ";

/// A single field-level validation failure.
///
/// `SchemaError` captures:
/// - **path**: Where in the location's value the failure occurred
/// - **message**: Human-readable description of the failure
/// - **got**: The actual value that failed validation (optional)
/// - **expected**: What was expected instead (optional)
/// - **code**: Machine-readable error code for programmatic handling
///
/// # Example
///
/// ```rust
/// use reqguard::{JsonPath, SchemaError};
///
/// let error = SchemaError::new(JsonPath::from_field("key1"), "Expected string, received number")
///     .with_code("invalid_type")
///     .with_expected("string")
///     .with_got("number");
///
/// assert_eq!(error.to_string(), "Expected string, received number at \"key1\"");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    /// The path to the value that failed validation.
    pub path: JsonPath,
    /// Human-readable error message.
    pub message: String,
    /// The actual value that was received (formatted as string).
    pub got: Option<String>,
    /// Description of what was expected.
    pub expected: Option<String>,
    /// Machine-readable error code (e.g., `invalid_type`).
    pub code: String,
}

impl SchemaError {
    /// Creates a new schema error with the given path and message.
    ///
    /// The error code defaults to "validation_error".
    pub fn new(path: JsonPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            got: None,
            expected: None,
            code: "validation_error".to_string(),
        }
    }

    /// Sets the error code and returns self for chaining.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Sets the "got" (actual value) field and returns self for chaining.
    pub fn with_got(mut self, got: impl Into<String>) -> Self {
        self.got = Some(got.into());
        self
    }

    /// Sets the "expected" field and returns self for chaining.
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Rewrites this issue for reporting under a request location.
    ///
    /// A single leading `"Invalid input: "` is removed from the message and
    /// the result is trimmed. The location becomes the first path segment.
    pub fn scoped_to(self, location: &str) -> Self {
        let message = strip_invalid_input(&self.message);
        Self {
            path: self.path.prepend_field(location),
            message,
            ..self
        }
    }
}

/// Removes one leading `"Invalid input: "` and trims the remainder.
pub(crate) fn strip_invalid_input(message: &str) -> String {
    message
        .strip_prefix(INVALID_INPUT_PREFIX)
        .unwrap_or(message)
        .trim()
        .to_string()
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} at \"{}\"", self.message, self.path)
        }
    }
}

impl std::error::Error for SchemaError {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<SchemaError>();
    assert_sync::<SchemaError>();
};

/// A non-empty, ordered collection of validation issues.
///
/// `SchemaErrors` wraps a `NonEmptyVec<SchemaError>` so a failure always
/// carries at least one issue. Collections from independent locations are
/// joined with [`Semigroup::combine`], which keeps their order.
///
/// ```rust
/// use reqguard::{JsonPath, SchemaError, SchemaErrors};
/// use stillwater::prelude::*;
///
/// let query = SchemaErrors::single(SchemaError::new(JsonPath::from_field("page"), "Required"));
/// let json = SchemaErrors::single(SchemaError::new(JsonPath::from_field("name"), "Required"));
///
/// assert_eq!(query.combine(json).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaErrors(NonEmptyVec<SchemaError>);

impl SchemaErrors {
    /// Creates a `SchemaErrors` containing a single error.
    pub fn single(error: SchemaError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Creates a `SchemaErrors` from a `NonEmptyVec` of errors.
    pub fn from_non_empty(errors: NonEmptyVec<SchemaError>) -> Self {
        Self(errors)
    }

    /// Creates a `SchemaErrors` from a `Vec`, or `None` if it is empty.
    pub fn try_from_vec(errors: Vec<SchemaError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self::from_vec(errors))
        }
    }

    /// Creates a `SchemaErrors` from a `Vec<SchemaError>`.
    ///
    /// # Panics
    ///
    /// Panics if the provided vec is empty. Callers only use this after
    /// checking that at least one issue was collected.
    pub fn from_vec(errors: Vec<SchemaError>) -> Self {
        Self(NonEmptyVec::from_vec(errors).expect("SchemaErrors requires at least one error"))
    }

    /// Returns the number of errors in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &SchemaError> {
        self.0.iter()
    }

    /// Returns all errors at the specified path.
    pub fn at_path(&self, path: &JsonPath) -> Vec<&SchemaError> {
        self.0.iter().filter(|e| &e.path == path).collect()
    }

    /// Returns all errors with the specified error code.
    pub fn with_code(&self, code: &str) -> Vec<&SchemaError> {
        self.0.iter().filter(|e| e.code == code).collect()
    }

    /// Returns the first error in the collection.
    pub fn first(&self) -> &SchemaError {
        self.0.head()
    }

    /// Converts this collection into a `Vec<SchemaError>`.
    pub fn into_vec(self) -> Vec<SchemaError> {
        self.0.into_vec()
    }

    /// Scopes every issue to a request location, keeping their order.
    ///
    /// See [`SchemaError::scoped_to`].
    pub fn scoped_to(self, location: &str) -> Self {
        let scoped = self
            .0
            .into_vec()
            .into_iter()
            .map(|error| error.scoped_to(location))
            .collect();
        Self::from_vec(scoped)
    }
}

impl Semigroup for SchemaErrors {
    fn combine(self, other: Self) -> Self {
        SchemaErrors(self.0.combine(other.0))
    }
}

/// Renders every issue, joined by `"; "`.
impl Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

impl IntoIterator for SchemaErrors {
    type Item = SchemaError;
    type IntoIter = std::vec::IntoIter<SchemaError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a SchemaErrors {
    type Item = &'a SchemaError;
    type IntoIter = Box<dyn Iterator<Item = &'a SchemaError> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<SchemaErrors>();
    assert_sync::<SchemaErrors>();
};
