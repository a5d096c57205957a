//! Asynchronous refinements on top of synchronous schemas.
//!
//! Some checks need I/O, such as a uniqueness lookup. [`AsyncRefined`] runs
//! the synchronous schema first and only then runs its asynchronous checks,
//! concurrently, accumulating every issue they report.

use std::future::Future;

use futures_util::future::{join_all, BoxFuture, FutureExt};
use serde_json::Value;
use stillwater::Validation;

use crate::error::{BoxError, SchemaError, SchemaErrors};
use crate::path::JsonPath;

use super::traits::{AsyncSchema, ParseResult, SchemaLike};

/// A check that runs after the synchronous schema has accepted a value.
///
/// `value` is the schema's parsed output (after coercion).
pub trait AsyncCheck: Send + Sync {
    /// Checks a parsed value, resolving to its issues or a fault.
    fn check<'a>(
        &'a self,
        value: &'a Value,
        path: &'a JsonPath,
    ) -> BoxFuture<'a, Result<Validation<(), SchemaErrors>, BoxError>>;
}

/// A synchronous schema with asynchronous checks attached.
///
/// # Example
///
/// ```rust
/// use reqguard::{Schema, SchemaLike};
///
/// let username = Schema::string()
///     .min_len(3)
///     .into_async()
///     .refine(|value| async move { value != "admin" }, "Username is taken");
/// ```
pub struct AsyncRefined<S> {
    inner: S,
    checks: Vec<Box<dyn AsyncCheck>>,
}

impl<S: SchemaLike> AsyncRefined<S> {
    /// Wraps a synchronous schema with no checks.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            checks: Vec::new(),
        }
    }

    /// Adds a check.
    pub fn check<C>(mut self, check: C) -> Self
    where
        C: AsyncCheck + 'static,
    {
        self.checks.push(Box::new(check));
        self
    }

    /// Adds a check from an async predicate over the parsed value.
    ///
    /// A `false` result reports `message` with code `custom`.
    pub fn refine<F, Fut>(self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.check(PredicateCheck {
            predicate,
            message: message.into(),
        })
    }

    async fn parse(&self, input: Value) -> ParseResult {
        let path = JsonPath::root();
        let value = match self.inner.validate_to_value(&input, &path) {
            Validation::Success(value) => value,
            Validation::Failure(errors) => return Ok(Validation::Failure(errors)),
        };

        let results = join_all(self.checks.iter().map(|c| c.check(&value, &path))).await;

        let mut issues = Vec::new();
        for result in results {
            if let Validation::Failure(errors) = result? {
                issues.extend(errors);
            }
        }

        Ok(match SchemaErrors::try_from_vec(issues) {
            Some(errors) => Validation::Failure(errors),
            None => Validation::Success(value),
        })
    }
}

impl<S: SchemaLike> AsyncSchema for AsyncRefined<S> {
    fn safe_parse(&self, input: Value) -> BoxFuture<'_, ParseResult> {
        self.parse(input).boxed()
    }

    fn shape(&self) -> Option<Vec<String>> {
        self.inner.field_names()
    }
}

struct PredicateCheck<F> {
    predicate: F,
    message: String,
}

impl<F, Fut> AsyncCheck for PredicateCheck<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send + 'static,
{
    fn check<'a>(
        &'a self,
        value: &'a Value,
        path: &'a JsonPath,
    ) -> BoxFuture<'a, Result<Validation<(), SchemaErrors>, BoxError>> {
        let pending = (self.predicate)(value.clone());
        async move {
            if pending.await {
                Ok(Validation::Success(()))
            } else {
                Ok(Validation::Failure(SchemaErrors::single(
                    SchemaError::new(path.clone(), self.message.clone()).with_code("custom"),
                )))
            }
        }
        .boxed()
    }
}
