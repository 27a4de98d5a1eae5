//! Minimal prelude for application code.
//!
//! Goal: reduce import noise without hiding important concepts.

pub use crate::artifacts::{ArtifactKind, CacheArtifact, DesignBrief, GeneratedImage, ImagePrompt, ReportData, Sentiment};
pub use crate::cache::{CacheStore, FileCache, MemoryCache};
pub use crate::config::Settings;
pub use crate::facade::{extract_design_brief, extract_report, generate_image, make_image_prompt};
pub use crate::pipeline::{ImageOptions, Orchestrator, ProduceOptions};
pub use crate::telemetry::{PipelineEvent, PipelineObserver, TracingObserver};
pub use crate::transport::{HttpTransport, ImageGenerator, TextGenerator};
pub use crate::{Error, ErrorCategory, Result};
