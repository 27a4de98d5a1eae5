//! Client conversation report.

use super::{decode_structured, encode_structured, parse_structured, ArtifactKind, CacheArtifact};
use crate::cache::CacheKind;
use crate::structured::schema::{
    bounded_integer_schema, non_empty_string_list_schema, nullable_string_schema, string_list_schema,
    string_schema,
};
use crate::structured::{SchemaGenerator, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

/// Overall sentiment of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentiment {
    /// positive / neutral / negative
    pub label: String,
    /// 1 to 5
    pub score: u8,
}

/// Structured report extracted from a client dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportData {
    pub client_name: String,
    pub topic: String,
    pub main_request: String,
    pub sentiment: Sentiment,
    pub summary: String,
    /// Never empty.
    pub key_points: Vec<String>,
    /// Never empty.
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub desired_timeline: Option<String>,
    #[serde(default)]
    pub budget_range: Option<String>,
    /// Features that must be in the final product.
    #[serde(default)]
    pub core_requirements: Vec<String>,
}

pub const REPORT_SCHEMA_DESCRIPTION: &str = r#"
{
  "client_name": "string - name of the client",
  "topic": "string - main topic of conversation",
  "main_request": "string - primary request or need",
  "sentiment": {
    "label": "string - sentiment label (positive/neutral/negative)",
    "score": "integer 1-5 - sentiment score"
  },
  "summary": "string - brief summary of the dialogue",
  "key_points": ["string", "string", ...] - list of key points,
  "next_steps": ["string", "string", ...] - recommended action items,
  "desired_timeline": "string or null - desired deadline/timeline if mentioned (e.g., '2 months', 'before inventory')",
  "budget_range": "string or null - budget or cost expectations if mentioned (e.g., 'limited budget', 'cloud pricing')",
  "core_requirements": ["string", "string", ...] - list of core features/requirements that MUST be in final product (can be empty list if none mentioned)
}
"#;

pub(crate) fn report_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let sentiment = SchemaGenerator::new()
            .add_required("label", string_schema())
            .add_required("score", bounded_integer_schema(1, 5))
            .build();

        SchemaGenerator::new()
            .title("ReportData")
            .add_required("client_name", string_schema())
            .add_required("topic", string_schema())
            .add_required("main_request", string_schema())
            .add_required("sentiment", sentiment)
            .add_required("summary", string_schema())
            .add_required("key_points", non_empty_string_list_schema())
            .add_required("next_steps", non_empty_string_list_schema())
            .add_property("desired_timeline", nullable_string_schema())
            .add_property("budget_range", nullable_string_schema())
            .add_property("core_requirements", string_list_schema())
            .build()
    })
}

impl CacheArtifact for ReportData {
    const KIND: CacheKind = CacheKind::Report;

    fn encode(&self) -> crate::Result<Vec<u8>> {
        encode_structured(self)
    }

    fn decode(bytes: &[u8]) -> Result<Self, ValidationError> {
        decode_structured(bytes, report_schema())
    }
}

impl ArtifactKind for ReportData {
    fn schema_description() -> &'static str {
        REPORT_SCHEMA_DESCRIPTION
    }

    fn system_prompt() -> String {
        format!(
            "You are an expert analyst for client conversations.\n\
             Analyze the provided dialogue transcript and extract structured information.\n\n\
             You MUST respond with ONLY valid JSON, no additional text or explanations.\n\
             Use the following schema:\n\
             {}\n\
             Important:\n\
             - Extract the client's name from the dialogue\n\
             - Identify the main topic and primary request\n\
             - Analyze sentiment (positive/neutral/negative) and rate it 1-5\n\
             - Provide a concise summary\n\
             - List 3-7 key points discussed\n\
             - Suggest 2-5 concrete next steps\n\
             - Extract desired timeline/deadline if mentioned (or null if not)\n\
             - Extract budget/cost expectations if mentioned (or null if not)\n\
             - List core requirements - specific features/capabilities that MUST be in the final product\n\
             - Output ONLY the JSON object, nothing else",
            REPORT_SCHEMA_DESCRIPTION
        )
    }

    fn user_prompt(input: &str) -> String {
        format!(
            "Analyze this client dialogue transcript:\n\n{}\n\n\
             Respond with ONLY valid JSON following the schema provided.",
            input
        )
    }

    fn parse(raw: &str) -> Result<Self, ValidationError> {
        parse_structured(raw, report_schema())
    }
}
