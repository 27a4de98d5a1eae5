//! Cache key generation.

use crate::hashing::Fingerprint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminator for artifacts sharing one cache directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKind {
    Report,
    DesignBrief,
    ImagePrompt,
    Image,
}

impl CacheKind {
    pub const ALL: [CacheKind; 4] = [
        CacheKind::Report,
        CacheKind::DesignBrief,
        CacheKind::ImagePrompt,
        CacheKind::Image,
    ];

    /// File name prefix placed before the fingerprint.
    pub fn prefix(&self) -> &'static str {
        match self {
            CacheKind::Report => "",
            CacheKind::DesignBrief => "design_brief_",
            CacheKind::ImagePrompt => "image_prompt_",
            CacheKind::Image => "design_",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            CacheKind::Report | CacheKind::DesignBrief => "json",
            CacheKind::ImagePrompt => "txt",
            CacheKind::Image => "png",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKind::Report => "report",
            CacheKind::DesignBrief => "design_brief",
            CacheKind::ImagePrompt => "image_prompt",
            CacheKind::Image => "image",
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fingerprint qualified by the artifact kind it addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub kind: CacheKind,
    pub fingerprint: Fingerprint,
}

impl CacheKey {
    pub fn new(kind: CacheKind, fingerprint: Fingerprint) -> Self {
        Self { kind, fingerprint }
    }

    /// `{prefix}{fingerprint}.{ext}`
    pub fn file_name(&self) -> String {
        format!(
            "{}{}.{}",
            self.kind.prefix(),
            self.fingerprint,
            self.kind.extension()
        )
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}
