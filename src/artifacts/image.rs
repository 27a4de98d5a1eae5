//! Image prompt and generated image artifacts.

use super::{ArtifactKind, CacheArtifact};
use crate::cache::CacheKind;
use crate::structured::ValidationError;
use bytes::Bytes;
use std::fmt;

pub const IMAGE_PROMPT_MAX_CHARS: usize = 900;

const IMAGE_PROMPT_REQUIREMENTS: &str =
    "A single line of plain text describing the image, at most 900 characters, no explanations.";

/// Single-line text prompt for the image model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImagePrompt(String);

impl ImagePrompt {
    /// Collapse whitespace and check the length constraints.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let prompt = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if prompt.is_empty() {
            return Err(ValidationError::without_path("Empty prompt"));
        }
        let len = prompt.chars().count();
        if len > IMAGE_PROMPT_MAX_CHARS {
            return Err(ValidationError::without_path(format!(
                "Prompt exceeds {} characters ({} characters)",
                IMAGE_PROMPT_MAX_CHARS, len
            )));
        }
        Ok(Self(prompt))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ImagePrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ImagePrompt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl CacheArtifact for ImagePrompt {
    const KIND: CacheKind = CacheKind::ImagePrompt;

    fn encode(&self) -> crate::Result<Vec<u8>> {
        Ok(self.0.as_bytes().to_vec())
    }

    fn decode(bytes: &[u8]) -> Result<Self, ValidationError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ValidationError::malformed(format!("Invalid UTF-8: {}", e)))?;
        Self::new(text)
    }
}

impl ArtifactKind for ImagePrompt {
    fn schema_description() -> &'static str {
        IMAGE_PROMPT_REQUIREMENTS
    }

    fn system_prompt() -> String {
        "You are an expert visual prompt writer. \
         Return a single-line image prompt with no explanations. \
         Maximum length: 900 characters."
            .to_string()
    }

    /// The input is the design brief as canonical JSON.
    fn user_prompt(input: &str) -> String {
        input.to_string()
    }

    fn parse(raw: &str) -> Result<Self, ValidationError> {
        Self::new(raw)
    }

    /// Restates the brief so the retry describes the same design.
    fn correction_prompt(input: &str, error: &ValidationError) -> String {
        format!(
            "The previous response did not meet the image prompt requirements.\n\
             Error: {}\n\n\
             Write the image prompt for this design brief:\n{}\n\n\
             Please provide ONLY the image prompt:\n{}",
            error, input, IMAGE_PROMPT_REQUIREMENTS
        )
    }
}

/// Raw image bytes as returned by the image model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage(Bytes);

impl GeneratedImage {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn bytes(&self) -> &Bytes {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl CacheArtifact for GeneratedImage {
    const KIND: CacheKind = CacheKind::Image;

    fn encode(&self) -> crate::Result<Vec<u8>> {
        Ok(self.0.to_vec())
    }

    // Image bytes cannot be checked beyond presence.
    fn decode(bytes: &[u8]) -> Result<Self, ValidationError> {
        if bytes.is_empty() {
            return Err(ValidationError::malformed("Empty image file"));
        }
        Ok(Self(Bytes::copy_from_slice(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_whitespace_collapsed() {
        let prompt = ImagePrompt::parse("  A warm bakery\n homepage,\t soft light \n").unwrap();
        assert_eq!(prompt.as_str(), "A warm bakery homepage, soft light");
    }

    #[test]
    fn test_prompt_length_limits() {
        assert_eq!(
            ImagePrompt::parse(" \n ").unwrap_err().to_string(),
            "Empty prompt"
        );
        assert!(ImagePrompt::parse(&"a".repeat(IMAGE_PROMPT_MAX_CHARS)).is_ok());
        let err = ImagePrompt::parse(&"a".repeat(IMAGE_PROMPT_MAX_CHARS + 1)).unwrap_err();
        assert!(err.to_string().starts_with("Prompt exceeds 900 characters"));
    }

    #[test]
    fn test_cached_prompt_normalised_on_load() {
        let prompt = ImagePrompt::decode(b"line one\nline two\n").unwrap();
        assert_eq!(prompt.as_str(), "line one line two");
        assert!(ImagePrompt::decode(b"   ").is_err());
    }

    #[test]
    fn test_prompt_correction_is_not_json() {
        let err = ValidationError::without_path("Empty prompt");
        let text = ImagePrompt::correction_prompt(r#"{"project_name":"Bakery site"}"#, &err);
        assert!(text.contains("Error: Empty prompt"));
        assert!(text.contains(r#"{"project_name":"Bakery site"}"#));
        assert!(!text.contains("valid JSON"));
    }

    #[test]
    fn test_image_decode_rejects_empty() {
        assert!(GeneratedImage::decode(&[]).is_err());
        let image = GeneratedImage::decode(&[0x89, b'P', b'N', b'G']).unwrap();
        assert_eq!(image.len(), 4);
        assert_eq!(image.encode().unwrap(), vec![0x89, b'P', b'N', b'G']);
    }
}
