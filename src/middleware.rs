//! axum middleware running a [`RequestValidator`] in front of a handler.
//!
//! # Example
//!
//! ```rust
//! use axum::{middleware, routing::post, Json, Router};
//! use reqguard::{middleware::validate_request, RequestValidator, Schema, Validated};
//! use serde_json::Value;
//!
//! async fn create(validated: Validated) -> Json<Value> {
//!     Json(validated.json().cloned().unwrap_or_default())
//! }
//!
//! let validator = RequestValidator::builder()
//!     .location("json", Schema::object().field("name", Schema::string().min_len(1)))
//!     .build()
//!     .unwrap();
//!
//! let app: Router = Router::new()
//!     .route("/users", post(create))
//!     .layer(middleware::from_fn_with_state(validator, validate_request));
//! ```

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::{RequestError, ValidationError};
use crate::extract::{extract_locations, ExtractError};
use crate::validator::{RequestValidator, Validated};

/// Validates the request and either forwards it or responds with the error.
///
/// On success the [`Validated`] values are stored in the request extensions
/// and the buffered body is restored before `next` runs.
pub async fn validate_request(
    State(validator): State<RequestValidator>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let (raw, body) = match extract_locations(&validator, &mut parts, body).await {
        Ok(extracted) => extracted,
        Err(err) => return err.into_response(),
    };

    match validator.validate(&raw).await {
        Ok(validated) => {
            parts.extensions.insert(validated);
            next.run(Request::from_parts(parts, body)).await
        }
        Err(err) => err.into_response(),
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.message().to_string()).into_response()
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        match self {
            RequestError::Invalid(err) => err.into_response(),
            RequestError::Schema { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

impl<S> FromRequestParts<S> for Validated
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Validated>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "request was not validated",
        ))
    }
}
