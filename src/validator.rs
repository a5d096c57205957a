//! The request validator.
//!
//! A [`RequestValidator`] is built once per route from a mapping of location
//! name to schema. For each request it validates every declared location
//! independently and concurrently, then either hands back the parsed values
//! ([`Validated`]) or one [`ValidationError`] describing every issue from
//! every failing location.
//!
//! # Example
//!
//! ```rust
//! use reqguard::{RawLocations, RequestValidator, Schema};
//! use serde_json::json;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let validator = RequestValidator::builder()
//!     .location("json", Schema::object()
//!         .field("key1", Schema::string())
//!         .field("key2", Schema::string()))
//!     .build()
//!     .unwrap();
//!
//! let raw = RawLocations::new().with("json", json!({"key1": 1, "key2": 2, "key3": 3}));
//! let error = validator.validate(&raw).await.unwrap_err();
//!
//! assert_eq!(
//!     error.to_string(),
//!     "Validation error: Expected string, received number at \"json.key1\"; \
//!      Expected string, received number at \"json.key2\""
//! );
//! # });
//! ```

use std::sync::Arc;

use futures_util::future::join_all;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use stillwater::prelude::*;
use stillwater::Validation;

use crate::error::{ConfigError, RequestError, SchemaErrors, ValidationError};
use crate::header;
use crate::location::Location;
use crate::registry::SchemaRegistry;
use crate::schema::AsyncSchema;

/// Default upper bound on buffered request bodies (2 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

type SchemaMap = IndexMap<Location, Arc<dyn AsyncSchema>>;

/// Validates the declared locations of a request.
///
/// Cloning is cheap; clones share the schema map, which is never modified
/// after construction.
#[derive(Clone)]
pub struct RequestValidator {
    schemas: Arc<SchemaMap>,
    body_limit: usize,
}

impl RequestValidator {
    /// Starts building a validator.
    pub fn builder() -> RequestValidatorBuilder {
        RequestValidatorBuilder::default()
    }

    /// Builds a validator from a declarative route description.
    ///
    /// `config` must be a JSON object mapping location names to the names of
    /// schemas in `registry`. Every entry is checked before the validator is
    /// returned.
    ///
    /// # Errors
    ///
    /// - `ConfigError::NotAnObject` if `config` is not an object
    /// - `ConfigError::InvalidSchema` naming the first entry that is not a
    ///   string or names no registered schema
    ///
    /// # Example
    ///
    /// ```rust
    /// use reqguard::{ConfigError, RequestValidator, Schema, SchemaRegistry};
    /// use serde_json::json;
    ///
    /// let registry = SchemaRegistry::new();
    /// registry.register("Pagination", Schema::object()
    ///     .field("page", Schema::number().coerce())
    /// ).unwrap();
    ///
    /// let validator = RequestValidator::from_config(&json!({"query": "Pagination"}), &registry);
    /// assert!(validator.is_ok());
    ///
    /// let error = RequestValidator::from_config(&json!({"json": {"key": 1}}), &registry).err();
    /// assert_eq!(error, Some(ConfigError::InvalidSchema("json".to_string())));
    /// ```
    pub fn from_config(config: &Value, registry: &SchemaRegistry) -> Result<Self, ConfigError> {
        let entries = config.as_object().ok_or(ConfigError::NotAnObject)?;

        let mut builder = Self::builder();
        for (location, schema_name) in entries {
            let schema = schema_name
                .as_str()
                .and_then(|name| registry.get(name))
                .ok_or_else(|| ConfigError::InvalidSchema(location.clone()))?;
            builder = builder.shared_location(location.as_str(), schema);
        }
        builder.build()
    }

    /// Returns the declared locations, in declaration order.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.schemas.keys()
    }

    /// Returns true if `location` is declared.
    pub fn declares(&self, location: &Location) -> bool {
        self.schemas.contains_key(location)
    }

    /// Returns the maximum number of body bytes buffered for body locations.
    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    /// Validates every declared location of one request.
    ///
    /// All locations are evaluated even when some fail, so the error lists
    /// every issue. A declared location missing from `raw` is validated as
    /// an empty object.
    ///
    /// # Errors
    ///
    /// - `RequestError::Invalid` when any location fails validation
    /// - `RequestError::Schema` when a schema fails for another reason; the
    ///   first such location in declaration order is reported
    pub async fn validate(&self, raw: &RawLocations) -> Result<Validated, RequestError> {
        let checks = self.schemas.iter().map(|(location, schema)| {
            let input = raw
                .get(location)
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new()));
            check_location(location, schema.as_ref(), input)
        });
        let outcomes = join_all(checks).await;

        let mut validated = Validated::default();
        let mut failures: Option<SchemaErrors> = None;
        for (location, outcome) in self.schemas.keys().zip(outcomes) {
            match outcome? {
                Validation::Success(value) => validated.insert(location.clone(), value),
                Validation::Failure(errors) => {
                    failures = Some(match failures {
                        Some(collected) => collected.combine(errors),
                        None => errors,
                    });
                }
            }
        }

        match failures {
            Some(issues) => {
                tracing::debug!(issues = issues.len(), "request failed validation");
                Err(ValidationError::new(issues).into())
            }
            None => Ok(validated),
        }
    }
}

/// Validates one location: header remap, attempt-parse, issue scoping.
async fn check_location(
    location: &Location,
    schema: &dyn AsyncSchema,
    raw: Value,
) -> Result<Validation<Value, SchemaErrors>, RequestError> {
    let input = match (location.is_header(), schema.shape()) {
        (true, Some(declared)) => header::restore_declared_case(raw, &declared),
        _ => raw,
    };

    let outcome = schema.safe_parse(input).await.map_err(|source| {
        tracing::error!(%location, error = %source, "schema failed while parsing");
        RequestError::Schema {
            location: location.clone(),
            source,
        }
    })?;

    Ok(match outcome {
        Validation::Success(value) if location.is_header() => {
            Validation::Success(header::lowercase_keys(value))
        }
        Validation::Success(value) => Validation::Success(value),
        Validation::Failure(errors) => Validation::Failure(errors.scoped_to(location.as_str())),
    })
}

/// Builder for [`RequestValidator`].
///
/// Errors are reported by [`build`](RequestValidatorBuilder::build), so the
/// whole map is checked before a validator exists.
pub struct RequestValidatorBuilder {
    entries: Vec<(Location, Arc<dyn AsyncSchema>)>,
    body_limit: usize,
}

impl Default for RequestValidatorBuilder {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl RequestValidatorBuilder {
    /// Declares a location and its schema.
    pub fn location<S>(self, location: impl Into<Location>, schema: S) -> Self
    where
        S: AsyncSchema + 'static,
    {
        self.shared_location(location, Arc::new(schema))
    }

    /// Declares a location with an already shared schema.
    pub fn shared_location(
        mut self,
        location: impl Into<Location>,
        schema: Arc<dyn AsyncSchema>,
    ) -> Self {
        self.entries.push((location.into(), schema));
        self
    }

    /// Sets the maximum number of body bytes buffered for `json` and `form`.
    pub fn body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// Builds the validator.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DuplicateLocation` if a location was declared
    /// more than once.
    pub fn build(self) -> Result<RequestValidator, ConfigError> {
        let mut schemas = SchemaMap::with_capacity(self.entries.len());
        for (location, schema) in self.entries {
            if schemas.contains_key(&location) {
                return Err(ConfigError::DuplicateLocation(location.to_string()));
            }
            schemas.insert(location, schema);
        }

        tracing::debug!(locations = schemas.len(), "built request validator");
        Ok(RequestValidator {
            schemas: Arc::new(schemas),
            body_limit: self.body_limit,
        })
    }
}

/// Raw, already-extracted values for each location of one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLocations {
    values: IndexMap<Location, Value>,
}

impl RawLocations {
    /// Creates an empty set of raw values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the raw value of a location and returns self for chaining.
    pub fn with(mut self, location: impl Into<Location>, value: Value) -> Self {
        self.insert(location, value);
        self
    }

    /// Sets the raw value of a location.
    pub fn insert(&mut self, location: impl Into<Location>, value: Value) {
        self.values.insert(location.into(), value);
    }

    /// Returns the raw value of a location.
    pub fn get(&self, location: &Location) -> Option<&Value> {
        self.values.get(location)
    }
}

/// The parsed values of every declared location, by location name.
///
/// These are the schema outputs (coerced, with unknown keys stripped), not
/// the raw request data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validated {
    values: IndexMap<Location, Value>,
}

impl Validated {
    fn insert(&mut self, location: Location, value: Value) {
        self.values.insert(location, value);
    }

    /// Returns the parsed value of a location.
    pub fn get(&self, location: impl Into<Location>) -> Option<&Value> {
        self.values.get(&location.into())
    }

    /// Returns the parsed query string.
    pub fn query(&self) -> Option<&Value> {
        self.values.get(&Location::Query)
    }

    /// Returns the parsed JSON body.
    pub fn json(&self) -> Option<&Value> {
        self.values.get(&Location::Json)
    }

    /// Returns the parsed form body.
    pub fn form(&self) -> Option<&Value> {
        self.values.get(&Location::Form)
    }

    /// Returns the parsed headers, keyed by lower-case name.
    pub fn header(&self) -> Option<&Value> {
        self.values.get(&Location::Header)
    }

    /// Returns the parsed path parameters.
    pub fn param(&self) -> Option<&Value> {
        self.values.get(&Location::Param)
    }

    /// Returns the parsed cookies.
    pub fn cookie(&self) -> Option<&Value> {
        self.values.get(&Location::Cookie)
    }

    /// Deserializes a location's parsed value into a caller type.
    ///
    /// An undeclared location deserializes from `null`.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error if the value does not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(
        &self,
        location: impl Into<Location>,
    ) -> Result<T, serde_json::Error> {
        let value = self.get(location).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value)
    }

    /// Iterates over locations and their parsed values.
    pub fn iter(&self) -> impl Iterator<Item = (&Location, &Value)> {
        self.values.iter()
    }

    /// Returns the number of validated locations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no location was declared.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
