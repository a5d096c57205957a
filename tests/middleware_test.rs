//! End-to-end tests for the axum middleware.

#![cfg(feature = "axum")]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::future::{BoxFuture, FutureExt};
use http_body_util::BodyExt;
use reqguard::middleware::validate_request;
use reqguard::{AsyncSchema, ParseResult, RequestValidator, Schema, Validated};
use serde_json::{json, Map, Value};
use tower::ServiceExt;

/// Echoes every validated location back as JSON.
async fn echo(validated: Validated) -> Json<Value> {
    let body: Map<String, Value> = validated
        .iter()
        .map(|(location, value)| (location.to_string(), value.clone()))
        .collect();
    Json(Value::Object(body))
}

fn app(path: &str, validator: RequestValidator) -> Router {
    Router::new()
        .route(path, get(echo).post(echo))
        .layer(from_fn_with_state(validator, validate_request))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_str(&body).unwrap())
}

fn json_body_validator() -> RequestValidator {
    RequestValidator::builder()
        .location(
            "json",
            Schema::object()
                .field("key1", Schema::string())
                .field("key2", Schema::number().coerce()),
        )
        .build()
        .unwrap()
}

fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_json_success() {
    let (status, body) = send_json(
        app("/", json_body_validator()),
        post_json(r#"{"key1": "1", "key2": "2", "key3": "3"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"json": {"key1": "1", "key2": 2}}));
}

#[tokio::test]
async fn test_json_failure_is_400_text() {
    let validator = RequestValidator::builder()
        .location(
            "json",
            Schema::object()
                .field("key1", Schema::string())
                .field("key2", Schema::string()),
        )
        .build()
        .unwrap();

    let response = app("/", validator)
        .oneshot(post_json(r#"{"key1": 1, "key2": 2, "key3": 3}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(
        String::from_utf8(bytes.to_vec()).unwrap(),
        "Validation error: Expected string, received number at \"json.key1\"; \
         Expected string, received number at \"json.key2\""
    );
}

#[tokio::test]
async fn test_malformed_json() {
    let (status, body) = send(app("/", json_body_validator()), post_json("{\"key1\":")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Malformed JSON in request body");
}

#[tokio::test]
async fn test_json_with_other_content_type_validates_empty_object() {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(r#"{"key1": "1", "key2": "2"}"#))
        .unwrap();

    let (status, body) = send(app("/", json_body_validator()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        "Validation error: Expected string, received undefined at \"json.key1\"; \
         Expected number, received undefined at \"json.key2\""
    );
}

#[tokio::test]
async fn test_form_success_and_failure() {
    let validator = RequestValidator::builder()
        .location(
            "form",
            Schema::object()
                .field("key1", Schema::string())
                .field("key2", Schema::number().coerce()),
        )
        .build()
        .unwrap();

    let form = |body: &'static str| {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    };

    let (status, body) = send_json(app("/", validator.clone()), form("key1=value1&key2=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"form": {"key1": "value1", "key2": 2}}));

    let (status, body) = send(app("/", validator), form("key1=value1&key2=value2")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        "Validation error: Expected number, received NaN at \"form.key2\""
    );
}

#[tokio::test]
async fn test_query_success_and_failure() {
    let validator = RequestValidator::builder()
        .location(
            "query",
            Schema::object()
                .field("page", Schema::number().coerce())
                .additional_properties(true),
        )
        .build()
        .unwrap();

    let request = Request::builder()
        .uri("/?page=5&sort=asc&sort=desc")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(app("/", validator.clone()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"query": {"page": 5, "sort": ["asc", "desc"]}}));

    let request = Request::builder().uri("/?page=abc").body(Body::empty()).unwrap();
    let (status, body) = send(app("/", validator), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        "Validation error: Expected number, received NaN at \"query.page\""
    );
}

#[tokio::test]
async fn test_repeated_query_keys() {
    let validator = RequestValidator::builder()
        .location(
            "query",
            Schema::object().field("tag", Schema::array(Schema::string().min_len(2)).max_len(3)),
        )
        .build()
        .unwrap();

    let request = Request::builder()
        .uri("/?tag=red&tag=blue")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(app("/", validator.clone()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"query": {"tag": ["red", "blue"]}}));

    let request = Request::builder()
        .uri("/?tag=red&tag=b&tag=green&tag=x")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app("/", validator), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        "Validation error: Array must contain at most 3 element(s) at \"query.tag\"; \
         String must contain at least 2 character(s) at \"query.tag[1]\"; \
         String must contain at least 2 character(s) at \"query.tag[3]\""
    );
}

#[tokio::test]
async fn test_param_success_and_failure() {
    let validator = RequestValidator::builder()
        .location("param", Schema::object().field("id", Schema::number().coerce()))
        .build()
        .unwrap();

    let request = Request::builder().uri("/1").body(Body::empty()).unwrap();
    let (status, body) = send_json(app("/{id}", validator.clone()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"param": {"id": 1}}));

    let request = Request::builder().uri("/abc").body(Body::empty()).unwrap();
    let (status, body) = send(app("/{id}", validator), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Validation error: Expected number, received NaN at \"param.id\"");
}

#[tokio::test]
async fn test_header_success_and_failure() {
    let validator = RequestValidator::builder()
        .location(
            "header",
            Schema::object()
                .field("X-Request-Id", Schema::string().uuid())
                .field("x-request-user", Schema::number().coerce()),
        )
        .build()
        .unwrap();

    let request = Request::builder()
        .uri("/")
        .header("X-Request-Id", "9c1f4bde-4a8e-4e4b-9d52-2a4c2f1c8b10")
        .header("X-Request-User", "7")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(app("/", validator.clone()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"header": {
            "x-request-id": "9c1f4bde-4a8e-4e4b-9d52-2a4c2f1c8b10",
            "x-request-user": 7
        }})
    );

    let request = Request::builder()
        .uri("/")
        .header("x-request-id", "invalid")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app("/", validator), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        "Validation error: Invalid UUID at \"header.X-Request-Id\"; \
         Expected number, received undefined at \"header.x-request-user\""
    );
}

#[tokio::test]
async fn test_cookie_success_and_failure() {
    let validator = RequestValidator::builder()
        .location(
            "cookie",
            Schema::object()
                .field("key1", Schema::string())
                .field("key2", Schema::number().coerce()),
        )
        .build()
        .unwrap();

    let request = Request::builder()
        .uri("/")
        .header(header::COOKIE, "key1=value1; key2=2")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(app("/", validator.clone()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"cookie": {"key1": "value1", "key2": 2}}));

    let request = Request::builder()
        .uri("/")
        .header(header::COOKIE, "key1=value1; key2=value2")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app("/", validator), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        "Validation error: Expected number, received NaN at \"cookie.key2\""
    );
}

#[tokio::test]
async fn test_cookie_values_are_percent_decoded() {
    let validator = RequestValidator::builder()
        .location(
            "cookie",
            Schema::object().field("name", Schema::string().max_len(8)),
        )
        .build()
        .unwrap();

    let request = Request::builder()
        .uri("/")
        .header(header::COOKIE, "name=J%C3%BCrgen%20M")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(app("/", validator), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"cookie": {"name": "Jürgen M"}}));
}

fn multipart(body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XyZ")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_multipart_form_success_and_failure() {
    let validator = RequestValidator::builder()
        .location(
            "form",
            Schema::object()
                .field("key1", Schema::string())
                .field("key2", Schema::number().coerce()),
        )
        .build()
        .unwrap();

    let (status, body) = send_json(
        app("/", validator.clone()),
        multipart(
            "--XyZ\r\n\
             Content-Disposition: form-data; name=\"key1\"\r\n\r\n\
             value1\r\n\
             --XyZ\r\n\
             Content-Disposition: form-data; name=\"key2\"\r\n\r\n\
             2\r\n\
             --XyZ--\r\n",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"form": {"key1": "value1", "key2": 2}}));

    let (status, body) = send(
        app("/", validator.clone()),
        multipart(
            "--XyZ\r\n\
             Content-Disposition: form-data; name=\"key1\"\r\n\r\n\
             value1\r\n\
             --XyZ\r\n\
             Content-Disposition: form-data; name=\"key2\"\r\n\r\n\
             value2\r\n\
             --XyZ--\r\n",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Validation error: Expected number, received NaN at \"form.key2\"");

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "multipart/form-data")
        .body(Body::from("key1=value1"))
        .unwrap();
    let (status, body) = send(app("/", validator), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Malformed multipart body");
}

#[tokio::test]
async fn test_multiple_locations_fail_together() {
    let validator = RequestValidator::builder()
        .location("query", Schema::object().field("page", Schema::number().coerce()))
        .location("json", Schema::object().field("name", Schema::string()))
        .build()
        .unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/?page=x")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name": 1}"#))
        .unwrap();

    let (status, body) = send(app("/", validator), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        "Validation error: Expected number, received NaN at \"query.page\"; \
         Expected string, received number at \"json.name\""
    );
}

#[tokio::test]
async fn test_handler_can_still_read_raw_body() {
    async fn raw(validated: Validated, body: String) -> String {
        format!("{}|{}", validated.json().unwrap(), body)
    }

    let app = Router::new()
        .route("/", post(raw))
        .layer(from_fn_with_state(json_body_validator(), validate_request));

    let (status, body) = send(app, post_json(r#"{"key1":"a","key2":"3","key3":true}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"{"key1":"a","key2":3}|{"key1":"a","key2":"3","key3":true}"#
    );
}

#[tokio::test]
async fn test_body_over_limit() {
    let validator = RequestValidator::builder()
        .location("json", Schema::object())
        .body_limit(8)
        .build()
        .unwrap();

    let (status, body) = send(app("/", validator), post_json(r#"{"key": "a long value"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Failed to read request body");
}

/// A schema whose backing service is down.
struct Unavailable;

impl AsyncSchema for Unavailable {
    fn safe_parse(&self, _input: Value) -> BoxFuture<'_, ParseResult> {
        async { Err("lookup service unavailable".into()) }.boxed()
    }
}

#[tokio::test]
async fn test_schema_fault_is_500() {
    let validator = RequestValidator::builder()
        .location("query", Unavailable)
        .build()
        .unwrap();

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(app("/", validator), request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Server Error");
}

#[tokio::test]
async fn test_validated_extractor_without_middleware() {
    let app = Router::new().route("/", get(echo));

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "request was not validated");
}
