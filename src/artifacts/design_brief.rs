use super::{decode_structured, encode_structured, parse_structured, ArtifactKind, CacheArtifact};
use crate::cache::CacheKind;
use crate::structured::schema::{nullable_string_schema, string_list_schema, string_schema};
use crate::structured::{SchemaGenerator, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

/// Website design brief extracted from a transcript.
///
/// List fields are required but may be empty when the transcript does not
/// mention them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignBrief {
    pub project_name: String,
    pub business: String,
    pub site_goal: String,
    pub target_audience: Vec<String>,
    pub pages: Vec<String>,
    pub style_keywords: Vec<String>,
    pub colors: Vec<String>,
    pub must_have: Vec<String>,
    pub avoid: Vec<String>,
    #[serde(default)]
    pub content_notes: Option<String>,
}

pub const DESIGN_BRIEF_SCHEMA_DESCRIPTION: &str = r#"
{
  "project_name": "string - project name",
  "business": "string - business domain or type",
  "site_goal": "string - primary goal of the site",
  "target_audience": ["string", "string", ...] - target audience segments,
  "pages": ["string", "string", ...] - list of required pages,
  "style_keywords": ["string", "string", ...] - style keywords for design direction,
  "colors": ["string", "string", ...] - preferred or reference colors,
  "must_have": ["string", "string", ...] - must-have features or sections,
  "avoid": ["string", "string", ...] - things to avoid in design,
  "content_notes": "string or null - additional content notes"
}
"#;

fn design_brief_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        SchemaGenerator::new()
            .title("DesignBrief")
            .add_required("project_name", string_schema())
            .add_required("business", string_schema())
            .add_required("site_goal", string_schema())
            .add_required("target_audience", string_list_schema())
            .add_required("pages", string_list_schema())
            .add_required("style_keywords", string_list_schema())
            .add_required("colors", string_list_schema())
            .add_required("must_have", string_list_schema())
            .add_required("avoid", string_list_schema())
            .add_property("content_notes", nullable_string_schema())
            .build()
    })
}

impl CacheArtifact for DesignBrief {
    const KIND: CacheKind = CacheKind::DesignBrief;

    fn encode(&self) -> crate::Result<Vec<u8>> {
        encode_structured(self)
    }

    fn decode(bytes: &[u8]) -> Result<Self, ValidationError> {
        decode_structured(bytes, design_brief_schema())
    }
}

impl ArtifactKind for DesignBrief {
    fn schema_description() -> &'static str {
        DESIGN_BRIEF_SCHEMA_DESCRIPTION
    }

    fn system_prompt() -> String {
        format!(
            "You are an expert design strategist.\n\
             Extract a design brief from the provided transcript.\n\n\
             You MUST respond with ONLY valid JSON, no additional text or explanations.\n\
             Use the following schema:\n\n\
             {}\n\n\
             Important:\n\
             - Provide clear, concise strings\n\
             - All list fields must be arrays (can be empty if not mentioned)\n\
             - content_notes should be null if not mentioned\n\
             - Output ONLY the JSON object, nothing else",
            DESIGN_BRIEF_SCHEMA_DESCRIPTION
        )
    }

    fn user_prompt(input: &str) -> String {
        format!(
            "Extract a design brief from this transcript:\n\n{}\n\n\
             Respond with ONLY valid JSON following the schema provided.",
            input
        )
    }

    fn parse(raw: &str) -> Result<Self, ValidationError> {
        parse_structured(raw, design_brief_schema())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn brief_json() -> Value {
        json!({
            "project_name": "Bakery site",
            "business": "Bakery",
            "site_goal": "Online orders",
            "target_audience": ["locals"],
            "pages": ["Home", "Menu", "Contact"],
            "style_keywords": ["warm"],
            "colors": [],
            "must_have": ["order form"],
            "avoid": []
        })
    }

    #[test]
    fn test_empty_lists_allowed() {
        let brief = DesignBrief::parse(&brief_json().to_string()).unwrap();
        assert!(brief.colors.is_empty());
        assert!(brief.content_notes.is_none());
        assert_eq!(brief.pages.len(), 3);
    }

    #[test]
    fn test_list_fields_required() {
        let mut data = brief_json();
        data.as_object_mut().unwrap().remove("avoid");
        let err = DesignBrief::parse(&data.to_string()).unwrap_err();
        assert_eq!(err.to_string(), "avoid: Missing required field");
    }

    #[test]
    fn test_list_must_be_array() {
        let mut data = brief_json();
        data["pages"] = json!("Home");
        let err = DesignBrief::parse(&data.to_string()).unwrap_err();
        assert_eq!(err.to_string(), "pages: Expected type 'array', got 'string'");
    }

    #[test]
    fn test_extra_fields_ignored() {
        let mut data = brief_json();
        data["mood_board"] = json!("none");
        assert!(DesignBrief::parse(&data.to_string()).is_ok());
    }

    #[test]
    fn test_correction_prompt_restates_schema() {
        let err = ValidationError::schema_violation("avoid", "Missing required field");
        let prompt = DesignBrief::correction_prompt("transcript", &err);
        assert!(prompt.contains("Error: avoid: Missing required field"));
        assert!(prompt.contains(DESIGN_BRIEF_SCHEMA_DESCRIPTION));
    }
}
