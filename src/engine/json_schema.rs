//! JSON Schema engine
//!
//! Validates request data against JSON Schema documents using the
//! `jsonschema` crate. Before validation the input is prepared according to
//! the [`EngineOptions`]:
//!
//! - `convert` (default `true`): string values are coerced to the declared
//!   `integer`, `number` or `boolean` type, and a lone string is wrapped in
//!   an array where an `array` is declared. Headers, path params and query
//!   values always arrive as strings, so this is what makes `?page=2` match
//!   `{"type": "integer"}`.
//! - `use_defaults` (default `true`): missing declared properties receive
//!   their schema `default`.
//! - `strip_unknown` (default `false`): undeclared keys are dropped from the
//!   returned value.
//! - `allow_unknown` (default `false`): when `false`, object schemas that
//!   declare `properties` but say nothing about `additionalProperties`
//!   reject undeclared keys.
//! - `abort_early` (default `true`): report only the first violation.
//!
//! Coercion and defaults follow `properties` and `items`; keywords such as
//! `$ref`, `allOf` or `oneOf` are validated but not walked for coercion.

use serde_json::{Map, Number, Value};

use crate::core::engine::{SchemaEngine, SchemaError};
use crate::core::options::EngineOptions;

/// Separator between violations when `abort_early` is off
const VIOLATION_SEPARATOR: &str = ". ";

/// Engine options with defaults applied
#[derive(Debug, Clone, Copy)]
struct Resolved {
    allow_unknown: bool,
    strip_unknown: bool,
    abort_early: bool,
    convert: bool,
    use_defaults: bool,
}

impl From<&EngineOptions> for Resolved {
    fn from(options: &EngineOptions) -> Self {
        Self {
            allow_unknown: options.allow_unknown.unwrap_or(false),
            strip_unknown: options.strip_unknown.unwrap_or(false),
            abort_early: options.abort_early.unwrap_or(true),
            convert: options.convert.unwrap_or(true),
            use_defaults: options.use_defaults.unwrap_or(true),
        }
    }
}

/// [`SchemaEngine`] backed by the `jsonschema` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaEngine;

impl JsonSchemaEngine {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaEngine for JsonSchemaEngine {
    fn check(
        &self,
        data: &Value,
        schema: &Value,
        options: &EngineOptions,
    ) -> Result<Value, SchemaError> {
        let resolved = Resolved::from(options);

        let mut schema = schema.clone();
        if !resolved.allow_unknown {
            close_objects(&mut schema);
        }

        let validator = jsonschema::validator_for(&schema)
            .map_err(|e| SchemaError::new(format!("invalid schema: {}", e)))?;

        let mut value = data.clone();
        prepare(&mut value, &schema, &resolved);

        let messages: Vec<String> = {
            let mut errors = validator.iter_errors(&value).map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{}: {}", path, e)
                }
            });

            if resolved.abort_early {
                errors.next().into_iter().collect()
            } else {
                errors.collect()
            }
        };

        if messages.is_empty() {
            Ok(value)
        } else {
            Err(SchemaError::new(messages.join(VIOLATION_SEPARATOR)))
        }
    }
}

/// Reject undeclared keys on object schemas that leave them unspecified
fn close_objects(schema: &mut Value) {
    let Value::Object(map) = schema else {
        return;
    };

    if map.contains_key("properties")
        && !map.contains_key("additionalProperties")
        && !map.contains_key("patternProperties")
    {
        map.insert("additionalProperties".to_string(), Value::Bool(false));
    }

    if let Some(Value::Object(properties)) = map.get_mut("properties") {
        for subschema in properties.values_mut() {
            close_objects(subschema);
        }
    }

    if let Some(items) = map.get_mut("items") {
        close_objects(items);
    }
}

/// Apply coercion, defaults and stripping to `value` in place
fn prepare(value: &mut Value, schema: &Value, options: &Resolved) {
    if options.convert {
        coerce(value, schema);
    }

    match value {
        Value::Object(object) => {
            let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
                return;
            };

            for (key, subschema) in properties {
                match object.get_mut(key) {
                    Some(child) => prepare(child, subschema, options),
                    None if options.use_defaults => {
                        if let Some(default) = subschema.get("default") {
                            object.insert(key.clone(), default.clone());
                        }
                    }
                    None => {}
                }
            }

            if options.strip_unknown {
                strip_undeclared(object, properties);
            }
        }
        Value::Array(items) => {
            if let Some(item_schema) = schema.get("items").filter(|s| s.is_object()) {
                for item in items.iter_mut() {
                    prepare(item, item_schema, options);
                }
            }
        }
        _ => {}
    }
}

fn strip_undeclared(object: &mut Map<String, Value>, properties: &Map<String, Value>) {
    object.retain(|key, _| properties.contains_key(key));
}

/// Types listed by a schema's `type` keyword
fn declared_types(schema: &Value) -> Vec<&str> {
    match schema.get("type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Convert a string to the type its schema declares
///
/// A string is left alone when the schema accepts strings or when no
/// declared type can represent it.
fn coerce(value: &mut Value, schema: &Value) {
    let types = declared_types(schema);
    if types.is_empty() || types.contains(&"string") {
        return;
    }

    let Value::String(raw) = &*value else {
        return;
    };

    let converted = types.iter().find_map(|t| match *t {
        "integer" => raw.trim().parse::<i64>().ok().map(Value::from),
        "number" => parse_number(raw.trim()),
        "boolean" => match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        "array" => Some(Value::Array(vec![Value::String(raw.clone())])),
        _ => None,
    });

    if let Some(converted) = converted {
        *value = converted;
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    if let Ok(int) = raw.parse::<i64>() {
        return Some(Value::from(int));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(data: Value, schema: Value, options: EngineOptions) -> Result<Value, SchemaError> {
        JsonSchemaEngine::new().check(&data, &schema, &options)
    }

    #[test]
    fn test_coerces_and_applies_defaults() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": { "type": "number" },
                "b": { "type": "number", "default": 2 }
            }
        });

        let value = check(json!({ "a": "1" }), schema, EngineOptions::default()).unwrap();
        assert_eq!(value, json!({ "a": 1, "b": 2 }));
    }

    #[test]
    fn test_convert_disabled_rejects_strings() {
        let schema = json!({
            "type": "object",
            "properties": { "page": { "type": "integer" } }
        });

        let result = check(
            json!({ "page": "2" }),
            schema,
            EngineOptions::new().convert(false),
        );
        let err = result.unwrap_err();
        assert!(err.message.starts_with("/page: "));
    }

    #[test]
    fn test_boolean_and_array_coercion() {
        let schema = json!({
            "type": "object",
            "properties": {
                "active": { "type": "boolean" },
                "tags": { "type": "array", "items": { "type": "integer" } }
            }
        });

        let value = check(
            json!({ "active": "TRUE", "tags": "3" }),
            schema,
            EngineOptions::default(),
        )
        .unwrap();
        assert_eq!(value, json!({ "active": true, "tags": [3] }));
    }

    #[test]
    fn test_unparseable_string_is_reported() {
        let schema = json!({
            "type": "object",
            "properties": { "age": { "type": "integer" } }
        });

        let err = check(json!({ "age": "old" }), schema, EngineOptions::default()).unwrap_err();
        assert!(err.message.contains("old"));
    }

    #[test]
    fn test_unknown_keys_rejected_by_default() {
        let schema = json!({
            "type": "object",
            "properties": { "name": { "type": "string" } }
        });

        let err = check(
            json!({ "name": "x", "extra": 1 }),
            schema.clone(),
            EngineOptions::default(),
        )
        .unwrap_err();
        assert!(err.message.contains("extra"));

        assert!(
            check(
                json!({ "name": "x", "extra": 1 }),
                schema,
                EngineOptions::new().allow_unknown(true),
            )
            .is_ok()
        );
    }

    #[test]
    fn test_explicit_additional_properties_is_respected() {
        let schema = json!({
            "type": "object",
            "properties": { "name": { "type": "string" } },
            "additionalProperties": { "type": "integer" }
        });

        assert!(check(json!({ "name": "x", "n": 1 }), schema, EngineOptions::default()).is_ok());
    }

    #[test]
    fn test_strip_unknown_removes_undeclared_keys() {
        let schema = json!({
            "type": "object",
            "properties": { "name": { "type": "string" } }
        });

        let value = check(
            json!({ "name": "x", "extra": 1 }),
            schema,
            EngineOptions::new().strip_unknown(true),
        )
        .unwrap();
        assert_eq!(value, json!({ "name": "x" }));
    }

    #[test]
    fn test_abort_early_reports_one_violation() {
        let schema = json!({
            "type": "object",
            "required": ["a", "b"],
            "properties": { "a": {}, "b": {} }
        });

        let first = check(json!({}), schema.clone(), EngineOptions::default()).unwrap_err();
        assert!(!first.message.contains(VIOLATION_SEPARATOR));

        let all = check(json!({}), schema, EngineOptions::new().abort_early(false)).unwrap_err();
        assert!(all.message.contains("\"a\""));
        assert!(all.message.contains("\"b\""));
        assert!(all.message.contains(VIOLATION_SEPARATOR));
    }

    #[test]
    fn test_nested_objects_are_prepared() {
        let schema = json!({
            "type": "object",
            "properties": {
                "page": {
                    "type": "object",
                    "properties": {
                        "size": { "type": "integer", "default": 20 },
                        "number": { "type": "integer" }
                    }
                }
            }
        });

        let value = check(
            json!({ "page": { "number": "3" } }),
            schema,
            EngineOptions::default(),
        )
        .unwrap();
        assert_eq!(value, json!({ "page": { "number": 3, "size": 20 } }));
    }

    #[test]
    fn test_invalid_schema_is_an_error() {
        let err = check(json!({}), json!({ "type": 12 }), EngineOptions::default()).unwrap_err();
        assert!(err.message.starts_with("invalid schema"));
    }
}
