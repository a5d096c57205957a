//! Raw location extraction from an axum request.
//!
//! Only the locations a validator declares are materialized. Body locations
//! buffer the body once; the buffered bytes are handed back as a fresh
//! [`Body`] so the downstream handler can still read it.

use axum::body::{Body, Bytes};
use axum::extract::{FromRequest, FromRequestParts, Multipart, RawPathParams, Request};
use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::Cookie;
use serde_json::{json, Map, Value};
use url::form_urlencoded;

use crate::error::BoxError;
use crate::location::Location;
use crate::validator::{RawLocations, RequestValidator};

/// Errors raised while reading raw request data.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The JSON body could not be parsed.
    #[error("Malformed JSON in request body")]
    MalformedJson(#[source] serde_json::Error),

    /// The body could not be read, or exceeded the configured limit.
    #[error("Failed to read request body")]
    Body(#[source] axum::Error),

    /// A `multipart/form-data` body could not be parsed.
    #[error("Malformed multipart body")]
    MalformedMultipart(#[source] BoxError),
}

/// Reads the raw value of every location `validator` declares.
///
/// Returns the raw values together with the body to forward downstream.
/// When no body location is declared the original body is returned
/// untouched.
///
/// # Errors
///
/// - `ExtractError::Body` if the body cannot be buffered within the limit
/// - `ExtractError::MalformedJson` if a JSON body does not parse
/// - `ExtractError::MalformedMultipart` if a multipart form body does not parse
pub async fn extract_locations(
    validator: &RequestValidator,
    parts: &mut Parts,
    body: Body,
) -> Result<(RawLocations, Body), ExtractError> {
    let needs_body = validator.locations().any(Location::is_body);
    let (bytes, body) = if needs_body {
        let bytes = axum::body::to_bytes(body, validator.body_limit())
            .await
            .map_err(ExtractError::Body)?;
        (bytes.clone(), Body::from(bytes))
    } else {
        (Bytes::new(), body)
    };

    let content_type = mime_essence(&parts.headers);
    let locations: Vec<Location> = validator.locations().cloned().collect();

    let mut raw = RawLocations::new();
    for location in locations {
        let value = match &location {
            Location::Query => urlencoded_to_value(parts.uri.query().unwrap_or_default().as_bytes()),
            Location::Json if is_json(&content_type) => json_body(&bytes)?,
            Location::Form if is_form(&content_type) => urlencoded_to_value(&bytes),
            Location::Form if is_multipart(&content_type) => {
                multipart_to_value(parts, bytes.clone()).await?
            }
            Location::Header => headers_to_value(&parts.headers),
            Location::Param => path_params(parts).await,
            Location::Cookie => cookies_to_value(&parts.headers),
            Location::Json | Location::Form | Location::Other(_) => empty(),
        };
        raw.insert(location, value);
    }

    Ok((raw, body))
}

fn empty() -> Value {
    Value::Object(Map::new())
}

/// Returns the lower-cased media type without parameters.
fn mime_essence(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

fn is_json(mime: &str) -> bool {
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

fn is_form(mime: &str) -> bool {
    mime == "application/x-www-form-urlencoded"
}

fn is_multipart(mime: &str) -> bool {
    mime == "multipart/form-data"
}

fn json_body(bytes: &[u8]) -> Result<Value, ExtractError> {
    serde_json::from_slice(bytes).map_err(|err| {
        tracing::debug!(error = %err, "malformed JSON body");
        ExtractError::MalformedJson(err)
    })
}

/// Adds a form field. A repeated key becomes an array of its values in
/// arrival order.
fn append_field(fields: &mut Map<String, Value>, key: &str, value: Value) {
    match fields.get_mut(key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            fields.insert(key.to_string(), value);
        }
    }
}

/// Decodes `application/x-www-form-urlencoded` data.
fn urlencoded_to_value(input: &[u8]) -> Value {
    let mut fields = Map::new();
    for (key, value) in form_urlencoded::parse(input) {
        append_field(&mut fields, &key, Value::String(value.into_owned()));
    }
    Value::Object(fields)
}

/// Decodes a `multipart/form-data` body that has already been buffered.
///
/// Text parts become strings. File parts become
/// `{"name": <file name>, "type": <content type or null>, "size": <bytes>}`.
/// Repeated names become arrays, as in urlencoded forms. The request's
/// extensions are carried over so an axum `DefaultBodyLimit` still applies.
async fn multipart_to_value(parts: &Parts, bytes: Bytes) -> Result<Value, ExtractError> {
    let mut request = Request::new(Body::from(bytes));
    *request.headers_mut() = parts.headers.clone();
    *request.extensions_mut() = parts.extensions.clone();

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(malformed_multipart)?;

    let mut fields = Map::new();
    while let Some(field) = multipart.next_field().await.map_err(malformed_multipart)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let file_name = field.file_name().map(str::to_owned);
        let value = match file_name {
            Some(file_name) => {
                let mime = field.content_type().map(str::to_owned);
                let data = field.bytes().await.map_err(malformed_multipart)?;
                json!({"name": file_name, "type": mime, "size": data.len()})
            }
            None => Value::String(field.text().await.map_err(malformed_multipart)?),
        };
        append_field(&mut fields, &name, value);
    }
    Ok(Value::Object(fields))
}

fn malformed_multipart(err: impl Into<BoxError>) -> ExtractError {
    let err = err.into();
    tracing::debug!(error = %err, "malformed multipart body");
    ExtractError::MalformedMultipart(err)
}

fn headers_to_value(headers: &HeaderMap) -> Value {
    let fields = headers
        .keys()
        .map(|name| {
            let joined = headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            (name.as_str().to_string(), Value::String(joined))
        })
        .collect();
    Value::Object(fields)
}

async fn path_params(parts: &mut Parts) -> Value {
    match RawPathParams::from_request_parts(parts, &()).await {
        Ok(params) => Value::Object(
            params
                .iter()
                .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
                .collect(),
        ),
        Err(_) => empty(),
    }
}

/// Parses every `Cookie` header, percent-decoding names and values.
///
/// The first occurrence of a name wins. Pairs without `=`, with an empty
/// name, or that do not decode to UTF-8 are skipped.
fn cookies_to_value(headers: &HeaderMap) -> Value {
    let mut fields = Map::new();
    for header in headers.get_all(COOKIE) {
        let header = String::from_utf8_lossy(header.as_bytes()).into_owned();
        for cookie in Cookie::split_parse_encoded(header).filter_map(Result::ok) {
            if fields.contains_key(cookie.name()) {
                continue;
            }
            let value = cookie.value().trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            fields.insert(cookie.name().to_string(), Value::String(value.to_string()));
        }
    }
    Value::Object(fields)
}
