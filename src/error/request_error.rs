//! Errors raised while building a request validator or validating a request.

use crate::location::Location;

use super::SchemaErrors;

/// Boxed error produced by a schema that failed for reasons other than
/// invalid input.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A malformed schema map, detected when a validator is built.
///
/// These are programmer errors: route registration should abort.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The declarative schema map was not a JSON object.
    #[error("schemas should be an object")]
    NotAnObject,

    /// An entry did not name a usable schema.
    #[error("Schema for \"{0}\" is not a valid schema")]
    InvalidSchema(String),

    /// The same location was declared more than once.
    #[error("location \"{0}\" is declared more than once")]
    DuplicateLocation(String),
}

/// The aggregated, client-facing failure for one request.
///
/// Always carries status 400 and a single message of the form
/// `Validation error: <issue>[; <issue>...]`, where each issue renders as
/// `<message> at "<location.path>"`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    issues: SchemaErrors,
    message: String,
}

impl ValidationError {
    /// The HTTP status every validation failure maps to.
    pub const STATUS_CODE: u16 = 400;

    /// Builds the aggregated error from already-scoped issues.
    pub fn new(issues: SchemaErrors) -> Self {
        let message = format!("Validation error: {}", issues);
        Self { issues, message }
    }

    /// Returns the HTTP status code (always 400).
    pub fn status_code(&self) -> u16 {
        Self::STATUS_CODE
    }

    /// Returns the rendered message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the individual issues, in location-then-field order.
    pub fn issues(&self) -> &SchemaErrors {
        &self.issues
    }
}

/// Why a request did not proceed to its handler.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// One or more locations failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// A schema failed for a reason other than invalid input.
    #[error("schema for \"{location}\" failed: {source}")]
    Schema {
        /// The location whose schema failed.
        location: Location,
        /// The schema's own error, untouched.
        source: BoxError,
    },
}

impl RequestError {
    /// Returns the validation failure, if that is what this is.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            RequestError::Invalid(error) => Some(error),
            RequestError::Schema { .. } => None,
        }
    }
}
