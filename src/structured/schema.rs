//! Schema construction utilities.

use serde_json::json;

/// Builder for object schemas understood by [`OutputValidator`](super::OutputValidator).
#[derive(Debug, Clone, Default)]
pub struct SchemaGenerator {
    title: Option<String>,
    description: Option<String>,
    properties: Vec<(String, serde_json::Value)>,
    required: Vec<String>,
    additional_properties: Option<bool>,
}

impl SchemaGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn add_property(mut self, name: impl Into<String>, schema: serde_json::Value) -> Self {
        self.properties.push((name.into(), schema));
        self
    }

    /// Add a property and mark it required.
    pub fn add_required(mut self, name: impl Into<String>, schema: serde_json::Value) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.push((name, schema));
        self
    }

    /// `false` makes undeclared properties a violation. Left unset they are accepted.
    pub fn set_additional_properties(mut self, additional: bool) -> Self {
        self.additional_properties = Some(additional);
        self
    }

    pub fn build(self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("type".into(), json!("object"));

        let mut properties = serde_json::Map::new();
        for (name, schema) in self.properties {
            properties.insert(name, schema);
        }
        map.insert("properties".into(), properties.into());

        if !self.required.is_empty() {
            map.insert("required".into(), self.required.into());
        }

        if let Some(additional) = self.additional_properties {
            map.insert("additionalProperties".into(), json!(additional));
        }

        if let Some(title) = self.title {
            map.insert("title".into(), title.into());
        }
        if let Some(desc) = self.description {
            map.insert("description".into(), desc.into());
        }

        map.into()
    }
}

pub fn string_schema() -> serde_json::Value {
    json!({"type": "string"})
}

pub fn nullable_string_schema() -> serde_json::Value {
    json!({"type": "string", "nullable": true})
}

pub fn string_list_schema() -> serde_json::Value {
    json!({"type": "array", "items": {"type": "string"}})
}

pub fn non_empty_string_list_schema() -> serde_json::Value {
    json!({"type": "array", "items": {"type": "string"}, "minItems": 1})
}

pub fn bounded_integer_schema(minimum: i64, maximum: i64) -> serde_json::Value {
    json!({"type": "integer", "minimum": minimum, "maximum": maximum})
}
