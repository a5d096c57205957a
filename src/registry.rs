//! Named schema storage for declarative validator construction.
//!
//! This module provides the [`SchemaRegistry`] type. Routes described as
//! data (`{"query": "Pagination", "json": "CreateUser"}`) resolve their
//! schema names here when the validator is built.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::schema::AsyncSchema;

/// Type alias for the schema storage map.
type SchemaMap = Arc<RwLock<HashMap<String, Arc<dyn AsyncSchema>>>>;

/// A thread-safe registry for storing and retrieving named schemas.
///
/// Clones share the same storage.
///
/// # Example
///
/// ```rust
/// use reqguard::{Schema, SchemaRegistry};
///
/// let registry = SchemaRegistry::new();
/// registry.register("Pagination", Schema::object()
///     .field("page", Schema::number().coerce())
/// ).unwrap();
///
/// assert!(registry.get("Pagination").is_some());
/// assert!(registry.register("Pagination", Schema::object()).is_err());
/// ```
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    schemas: SchemaMap,
}

impl SchemaRegistry {
    /// Creates a new empty schema registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema with the given name.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateName` if the name is already registered.
    pub fn register<S>(&self, name: impl Into<String>, schema: S) -> Result<(), RegistryError>
    where
        S: AsyncSchema + 'static,
    {
        self.register_shared(name, Arc::new(schema))
    }

    /// Registers an already shared schema with the given name.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateName` if the name is already registered.
    pub fn register_shared(
        &self,
        name: impl Into<String>,
        schema: Arc<dyn AsyncSchema>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        let mut schemas = self.schemas.write();

        if schemas.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        schemas.insert(name, schema);
        Ok(())
    }

    /// Retrieves a schema by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn AsyncSchema>> {
        self.schemas.read().get(name).cloned()
    }

    /// Returns true if a schema with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.read().contains_key(name)
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.schemas.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    /// Returns true if no schemas are registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Attempted to register a schema with a name that already exists.
    #[error("schema '{0}' already registered")]
    DuplicateName(String),
}
