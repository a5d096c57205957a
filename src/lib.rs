//! # Reqguard
//!
//! Schema-driven validation of HTTP request data that reports ALL issues
//! from ALL request locations in one response.
//!
//! ## Overview
//!
//! A route declares which parts of the request it cares about (query string,
//! JSON body, form body, headers, path parameters, cookies) and a schema for
//! each. Every declared location is validated independently and concurrently.
//! If any fail, the client receives one 400 response whose message lists
//! every issue, each tagged with the location and field it came from. If all
//! pass, the handler receives the parsed values.
//!
//! Error accumulation uses stillwater's `Validation` type, so schemas never
//! stop at the first problem either.
//!
//! ## Core Types
//!
//! - [`RequestValidator`]: the per-route validator, built from a location to schema map
//! - [`AsyncSchema`]: the schema capability the validator depends on
//! - [`Schema`]: entry point for the bundled string, number, array and object schemas
//! - [`ValidationError`]: the aggregated 400 failure
//! - [`Validated`]: the parsed values handed to the handler
//!
//! ## Example
//!
//! ```rust
//! use reqguard::{RawLocations, RequestValidator, Schema};
//! use serde_json::json;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let validator = RequestValidator::builder()
//!     .location("query", Schema::object().field("page", Schema::number().coerce()))
//!     .location("header", Schema::object().field("X-Request-Id", Schema::string().uuid()))
//!     .build()
//!     .unwrap();
//!
//! let raw = RawLocations::new()
//!     .with("query", json!({"page": "2", "sort": "asc"}))
//!     .with("header", json!({"x-request-id": "9c1f4bde-4a8e-4e4b-9d52-2a4c2f1c8b10"}));
//!
//! let validated = validator.validate(&raw).await.unwrap();
//! assert_eq!(validated.query(), Some(&json!({"page": 2})));
//! assert_eq!(
//!     validated.header(),
//!     Some(&json!({"x-request-id": "9c1f4bde-4a8e-4e4b-9d52-2a4c2f1c8b10"}))
//! );
//! # });
//! ```
//!
//! With the default `axum` feature, [`middleware::validate_request`] runs a
//! validator in front of any axum handler.

pub mod error;
pub mod header;
pub mod location;
pub mod path;
pub mod registry;
pub mod schema;
pub mod validator;

#[cfg(feature = "axum")]
pub mod extract;
#[cfg(feature = "axum")]
pub mod middleware;

pub use error::{BoxError, ConfigError, RequestError, SchemaError, SchemaErrors, ValidationError};
pub use location::Location;
pub use path::{JsonPath, PathSegment};
pub use registry::{RegistryError, SchemaRegistry};
pub use schema::{
    ArraySchema, AsyncCheck, AsyncRefined, AsyncSchema, NumberSchema, ObjectSchema, ParseResult,
    Schema, SchemaLike, StringSchema,
};
pub use validator::{RawLocations, RequestValidator, RequestValidatorBuilder, Validated};

/// Type alias for validation results using SchemaErrors
pub type ValidationResult<T> = stillwater::Validation<T, SchemaErrors>;
