//! Integration tests for SchemaError, SchemaErrors and the request-level errors.

use reqguard::{
    ConfigError, JsonPath, Location, RequestError, SchemaError, SchemaErrors, ValidationError,
    ValidationResult,
};
use stillwater::prelude::*;
use stillwater::Validation;

fn issue(path: JsonPath, message: &str) -> SchemaErrors {
    SchemaErrors::single(SchemaError::new(path, message))
}

#[test]
fn test_schema_error_full_context() {
    let error = SchemaError::new(JsonPath::root().push_field("page"), "Expected number, received NaN")
        .with_code("invalid_type")
        .with_got("NaN")
        .with_expected("number");

    assert_eq!(error.path.to_string(), "page");
    assert_eq!(error.message, "Expected number, received NaN");
    assert_eq!(error.code, "invalid_type");
    assert_eq!(error.got, Some("NaN".to_string()));
    assert_eq!(error.expected, Some("number".to_string()));
}

#[test]
fn test_schema_errors_never_empty() {
    let errors = SchemaErrors::single(SchemaError::new(JsonPath::root(), "test error"));

    assert!(!errors.is_empty());
    assert_eq!(errors.len(), 1);
    assert!(SchemaErrors::try_from_vec(Vec::new()).is_none());
}

#[test]
fn test_errors_combine_in_order() {
    let combined = issue(JsonPath::from_field("key1"), "first")
        .combine(issue(JsonPath::from_field("key2"), "second"))
        .combine(issue(JsonPath::from_field("key3"), "third"));

    let messages: Vec<&str> = combined.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["first", "second", "third"]);
}

#[test]
fn test_validation_and_accumulates_errors() {
    let v1: ValidationResult<i32> = Validation::Failure(issue(JsonPath::from_field("a"), "error a"));
    let v2: ValidationResult<i32> = Validation::Failure(issue(JsonPath::from_field("b"), "error b"));

    match v1.and(v2) {
        Validation::Failure(errors) => assert_eq!(errors.len(), 2),
        Validation::Success(_) => panic!("Expected failure"),
    }
}

#[test]
fn test_scoping_strips_invalid_input_prefix_once() {
    let error = SchemaError::new(
        JsonPath::root(),
        "Invalid input: Invalid input: expected object, received string",
    )
    .scoped_to("json");

    assert_eq!(error.message, "Invalid input: expected object, received string");
    assert_eq!(error.path.to_string(), "json");
}

#[test]
fn test_scoping_trims_message() {
    let error = SchemaError::new(JsonPath::from_field("name"), "Invalid input:   Required  ")
        .scoped_to("form");

    assert_eq!(error.message, "Required");
    assert_eq!(error.to_string(), "Required at \"form.name\"");
}

#[test]
fn test_scoping_leaves_other_messages_alone() {
    let error = SchemaError::new(JsonPath::from_field("id"), "Invalid UUID").scoped_to("param");
    assert_eq!(error.message, "Invalid UUID");
    assert_eq!(error.path.to_string(), "param.id");
}

#[test]
fn test_query_errors_by_path_and_code() {
    let page = JsonPath::from_field("page").prepend_field("query");
    let errors = SchemaErrors::single(
        SchemaError::new(page.clone(), "Expected number, received NaN").with_code("invalid_type"),
    )
    .combine(SchemaErrors::single(
        SchemaError::new(JsonPath::from_field("q").prepend_field("query"), "Required")
            .with_code("required"),
    ));

    assert_eq!(errors.at_path(&page).len(), 1);
    assert_eq!(errors.with_code("required").len(), 1);
    assert_eq!(errors.with_code("nonexistent").len(), 0);
}

#[test]
fn test_schema_errors_display_joins_with_semicolons() {
    let errors = issue(JsonPath::from_field("key1").prepend_field("json"), "A")
        .combine(issue(JsonPath::from_field("key2").prepend_field("json"), "B"));

    assert_eq!(errors.to_string(), "A at \"json.key1\"; B at \"json.key2\"");
}

#[test]
fn test_validation_error_renders_all_issues() {
    let errors = issue(JsonPath::from_field("key1").prepend_field("json"), "Expected string, received number")
        .combine(issue(JsonPath::from_field("key2").prepend_field("json"), "Expected string, received number"));

    let error = ValidationError::new(errors);
    assert_eq!(error.status_code(), 400);
    assert_eq!(ValidationError::STATUS_CODE, 400);
    assert_eq!(
        error.message(),
        "Validation error: Expected string, received number at \"json.key1\"; \
         Expected string, received number at \"json.key2\""
    );
    assert_eq!(error.to_string(), error.message());
    assert_eq!(error.issues().len(), 2);
}

#[test]
fn test_request_error_variants() {
    let invalid: RequestError = ValidationError::new(issue(JsonPath::from_field("query"), "Required")).into();
    assert!(invalid.as_validation().is_some());
    assert_eq!(invalid.to_string(), "Validation error: Required at \"query\"");

    let fault = RequestError::Schema {
        location: Location::Json,
        source: "lookup timed out".into(),
    };
    assert!(fault.as_validation().is_none());
    assert_eq!(fault.to_string(), "schema for \"json\" failed: lookup timed out");
}

#[test]
fn test_config_error_messages() {
    assert_eq!(ConfigError::NotAnObject.to_string(), "schemas should be an object");
    assert_eq!(
        ConfigError::InvalidSchema("query".to_string()).to_string(),
        "Schema for \"query\" is not a valid schema"
    );
    assert_eq!(
        ConfigError::DuplicateLocation("json".to_string()).to_string(),
        "location \"json\" is declared more than once"
    );
}
