//! Artifact kinds produced by the pipeline.
//!
//! Each kind is a descriptor the generic [`Orchestrator`](crate::pipeline::Orchestrator)
//! is parameterized over: which cache namespace it lives in, how it is
//! persisted, which prompts produce it and how raw generator text is validated
//! into it.
//!
//! | Kind | Cache file | Validated by |
//! |------|------------|--------------|
//! | [`ReportData`] | `{fp}.json` | report schema |
//! | [`DesignBrief`] | `design_brief_{fp}.json` | design brief schema |
//! | [`ImagePrompt`] | `image_prompt_{fp}.txt` | single line, 1..=900 chars |
//! | [`GeneratedImage`] | `design_{fp}.png` | non-empty bytes only |

mod design_brief;
mod image;
mod report;

pub use design_brief::{DesignBrief, DESIGN_BRIEF_SCHEMA_DESCRIPTION};
pub use image::{GeneratedImage, ImagePrompt, IMAGE_PROMPT_MAX_CHARS};
pub use report::{ReportData, Sentiment, REPORT_SCHEMA_DESCRIPTION};

use crate::cache::CacheKind;
use crate::structured::{parse_json_payload, OutputValidator, ValidationError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Anything the cache store can persist and re-validate on load.
pub trait CacheArtifact: Sized + Clone + Send + Sync + 'static {
    /// Cache namespace (file prefix and extension).
    const KIND: CacheKind;

    /// Bytes written to the cache file.
    fn encode(&self) -> crate::Result<Vec<u8>>;

    /// Rebuild and validate an artifact from cache bytes. An error means the
    /// entry is unusable and must be treated as a miss.
    fn decode(bytes: &[u8]) -> Result<Self, ValidationError>;
}

/// An artifact produced by a text generation call and validated locally.
pub trait ArtifactKind: CacheArtifact {
    /// Schema text embedded in the system and correction prompts.
    fn schema_description() -> &'static str;

    /// Fixed system prompt for the initial generation call.
    fn system_prompt() -> String;

    /// User prompt carrying the raw input.
    fn user_prompt(input: &str) -> String;

    /// Validate raw generator output into the artifact.
    fn parse(raw: &str) -> Result<Self, ValidationError>;

    /// Self-contained correction message for a failed attempt. `input` is the
    /// same raw input the initial user prompt was built from.
    fn correction_prompt(_input: &str, error: &ValidationError) -> String {
        json_correction_prompt(error, Self::schema_description())
    }
}

/// Correction message used by the JSON artifact kinds.
pub fn json_correction_prompt(error: &ValidationError, schema_description: &str) -> String {
    format!(
        "The previous response was not valid JSON or didn't match the required schema.\n\
         Error: {}\n\n\
         Please provide ONLY valid JSON following this exact schema:\n{}\n\n\
         No explanations, no markdown formatting, just pure JSON.",
        error, schema_description
    )
}

/// Parse raw generator text, check it against `schema` and deserialize it.
pub(crate) fn parse_structured<T: DeserializeOwned>(
    raw: &str,
    schema: &Value,
) -> Result<T, ValidationError> {
    let value = parse_json_payload(raw)?;
    from_validated_value(value, schema)
}

/// Decode cached JSON bytes with the same checks as fresh output.
pub(crate) fn decode_structured<T: DeserializeOwned>(
    bytes: &[u8],
    schema: &Value,
) -> Result<T, ValidationError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ValidationError::malformed(format!("Invalid JSON: {}", e)))?;
    from_validated_value(value, schema)
}

pub(crate) fn encode_structured<T: Serialize>(artifact: &T) -> crate::Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(artifact)?)
}

fn from_validated_value<T: DeserializeOwned>(
    value: Value,
    schema: &Value,
) -> Result<T, ValidationError> {
    let value = OutputValidator::new(schema).validate_or_fail(value)?;
    serde_json::from_value(value).map_err(|e| ValidationError::without_path(e.to_string()))
}
