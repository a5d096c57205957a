//! Integration tests for object schema validation.

use reqguard::{AsyncSchema, JsonPath, Schema};
use serde_json::{json, Value};

/// Helper to validate and return the parsed object as a Value
fn parse(schema: &reqguard::ObjectSchema, value: Value) -> Value {
    Value::Object(schema.validate(&value, &JsonPath::root()).into_result().unwrap())
}

/// Helper to collect rendered issues of a failed validation
fn issues(schema: &reqguard::ObjectSchema, value: Value) -> Vec<String> {
    schema
        .validate(&value, &JsonPath::root())
        .into_result()
        .unwrap_err()
        .iter()
        .map(|e| e.to_string())
        .collect()
}

#[test]
fn test_unknown_keys_are_stripped() {
    let schema = Schema::object()
        .field("key1", Schema::string())
        .field("key2", Schema::string());

    assert_eq!(
        parse(&schema, json!({"key1": "value1", "key2": "value2", "key3": "value3"})),
        json!({"key1": "value1", "key2": "value2"})
    );
}

#[test]
fn test_field_errors_accumulate_in_declaration_order() {
    let schema = Schema::object()
        .field("key1", Schema::string())
        .field("key2", Schema::string());

    assert_eq!(
        issues(&schema, json!({"key2": 2, "key1": 1})),
        vec![
            "Expected string, received number at \"key1\"",
            "Expected string, received number at \"key2\"",
        ]
    );
}

#[test]
fn test_missing_required_field() {
    let schema = Schema::object()
        .field("name", Schema::string())
        .field("page", Schema::number());

    let errors = schema
        .validate(&json!({}), &JsonPath::root())
        .into_result()
        .unwrap_err();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors.with_code("required").len(), 2);
    assert_eq!(errors.first().message, "Expected string, received undefined");
}

#[test]
fn test_optional_and_default_fields() {
    let schema = Schema::object()
        .optional("q", Schema::string())
        .default("page", Schema::number().coerce(), json!(1));

    assert_eq!(parse(&schema, json!({})), json!({"page": 1}));
    assert_eq!(parse(&schema, json!({"q": "rust", "page": "3"})), json!({"q": "rust", "page": 3}));
}

#[test]
fn test_non_object_input() {
    let schema = Schema::object().field("key", Schema::string());
    assert_eq!(
        issues(&schema, json!("text")),
        vec!["Invalid input: expected object, received string"]
    );
}

#[test]
fn test_additional_properties_settings() {
    let allow = Schema::object().field("a", Schema::string()).additional_properties(true);
    assert_eq!(parse(&allow, json!({"a": "1", "b": 2})), json!({"a": "1", "b": 2}));

    let deny = Schema::object().field("a", Schema::string()).additional_properties(false);
    assert_eq!(issues(&deny, json!({"a": "1", "b": 2})), vec!["Unrecognized key: \"b\""]);

    let typed = Schema::object().additional_properties(Schema::number().coerce());
    assert_eq!(parse(&typed, json!({"x": "1"})), json!({"x": 1}));
    assert_eq!(
        issues(&typed, json!({"x": "no"})),
        vec!["Expected number, received NaN at \"x\""]
    );
}

#[test]
fn test_nested_objects_report_full_paths() {
    let schema = Schema::object().field(
        "user",
        Schema::object().field("age", Schema::number().int()),
    );

    assert_eq!(
        issues(&schema, json!({"user": {"age": 1.5}})),
        vec!["Expected integer, received float at \"user.age\""]
    );
}

#[test]
fn test_object_declares_its_shape() {
    let schema = Schema::object()
        .field("X-Request-Id", Schema::string())
        .optional("x-request-user", Schema::number());

    assert_eq!(
        schema.shape(),
        Some(vec!["X-Request-Id".to_string(), "x-request-user".to_string()])
    );
    assert_eq!(Schema::string().shape(), None);
}
