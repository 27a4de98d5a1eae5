//! Schema checks for parsed generator output.
//!
//! Understands the JSON Schema subset produced by [`SchemaGenerator`](super::SchemaGenerator):
//! `type` (a name or a list of names), `nullable`, `minimum`/`maximum`,
//! `minItems`, `items`, `properties`, `required` and `additionalProperties: false`.
//! Undeclared properties are accepted unless the schema forbids them.
//!
//! Every violation is collected with the path of the offending field
//! (`sentiment.score`, `pages[2]`), so one correction prompt can list them all.

use crate::structured::error::{ValidationError, ValidationResult};
use serde_json::{Map, Value};

/// Checks values against a borrowed schema.
#[derive(Debug, Clone, Copy)]
pub struct OutputValidator<'s> {
    schema: &'s Value,
}

impl<'s> OutputValidator<'s> {
    pub fn new(schema: &'s Value) -> Self {
        Self { schema }
    }

    pub fn validate(&self, data: Value) -> ValidationResult {
        let mut walk = Walk::default();
        walk.value(&data, self.schema, "");
        if walk.errors.is_empty() {
            ValidationResult::success(data)
        } else {
            ValidationResult::failure(walk.errors)
        }
    }

    /// The value back on success, otherwise all violations combined into one error.
    pub fn validate_or_fail(&self, data: Value) -> Result<Value, ValidationError> {
        self.validate(data).into_result()
    }
}

#[derive(Default)]
struct Walk {
    errors: Vec<ValidationError>,
}

impl Walk {
    fn fail(&mut self, path: &str, message: impl Into<String>) {
        self.errors
            .push(ValidationError::schema_violation(path, message));
    }

    fn value(&mut self, data: &Value, schema: &Value, path: &str) {
        let types: Vec<&str> = match schema.get("type") {
            Some(Value::String(t)) => vec![t.as_str()],
            Some(Value::Array(ts)) => ts.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };

        if data.is_null()
            && (types.contains(&"null") || schema.get("nullable") == Some(&Value::Bool(true)))
        {
            return;
        }
        if !types.is_empty() && !types.iter().any(|t| is_type(data, t)) {
            self.fail(
                path,
                format!("Expected type '{}', got '{}'", types.join(" or "), json_type(data)),
            );
            return;
        }

        match data {
            Value::Number(n) => {
                if let Some(n) = n.as_f64() {
                    self.bounds(n, schema, path);
                }
            }
            Value::Array(items) => self.array(items, schema, path),
            Value::Object(fields) => self.object(fields, schema, path),
            _ => {}
        }
    }

    fn bounds(&mut self, n: f64, schema: &Value, path: &str) {
        if let Some(min) = schema.get("minimum").and_then(Value::as_f64) {
            if n < min {
                self.fail(path, format!("Value below minimum ({})", min));
            }
        }
        if let Some(max) = schema.get("maximum").and_then(Value::as_f64) {
            if n > max {
                self.fail(path, format!("Value above maximum ({})", max));
            }
        }
    }

    fn array(&mut self, items: &[Value], schema: &Value, path: &str) {
        match schema.get("minItems").and_then(Value::as_u64) {
            Some(1) if items.is_empty() => self.fail(path, "List cannot be empty"),
            Some(min) if (items.len() as u64) < min => {
                self.fail(path, format!("List needs at least {} items", min))
            }
            _ => {}
        }
        if let Some(item_schema) = schema.get("items") {
            for (i, item) in items.iter().enumerate() {
                self.value(item, item_schema, &format!("{}[{}]", path, i));
            }
        }
    }

    fn object(&mut self, fields: &Map<String, Value>, schema: &Value, path: &str) {
        let required = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|r| r.iter().filter_map(Value::as_str).collect::<Vec<_>>())
            .unwrap_or_default();
        for name in required {
            if !fields.contains_key(name) {
                self.fail(&field_path(path, name), "Missing required field");
            }
        }

        let properties = schema.get("properties").and_then(Value::as_object);
        if let Some(properties) = properties {
            for (name, field_schema) in properties {
                if let Some(field) = fields.get(name) {
                    self.value(field, field_schema, &field_path(path, name));
                }
            }
        }

        if schema.get("additionalProperties") == Some(&Value::Bool(false)) {
            for name in fields.keys() {
                if !properties.is_some_and(|p| p.contains_key(name)) {
                    self.fail(&field_path(path, name), "Unexpected field");
                }
            }
        }
    }
}

fn is_type(data: &Value, name: &str) -> bool {
    match name {
        "string" => data.is_string(),
        "integer" => data.is_i64() || data.is_u64(),
        "number" => data.is_number(),
        "boolean" => data.is_boolean(),
        "array" => data.is_array(),
        "object" => data.is_object(),
        "null" => data.is_null(),
        _ => true,
    }
}

fn json_type(data: &Value) -> &'static str {
    match data {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn field_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}
