//! Error types for validation failures.
//!
//! Schemas report [`SchemaError`]s collected in [`SchemaErrors`]. The request
//! validator folds those into one [`ValidationError`] per request, and reports
//! malformed schema maps as [`ConfigError`] when it is built.

mod request_error;
mod schema_error;

pub use request_error::{BoxError, ConfigError, RequestError, ValidationError};
pub use schema_error::{SchemaError, SchemaErrors};
