//! # ai-report-rust
//!
//! 对话记录结构化抽取库：内容寻址缓存 + 基于模式校验的纠错重试流水线。
//!
//! Turns free-form conversation transcripts into structured, schema-validated
//! data by calling a generative text model, and persists the results in a
//! content-addressed cache so identical inputs are never generated twice.
//!
//! ## Overview
//!
//! Every artifact this crate produces goes through the same pipeline:
//!
//! 1. A [`Fingerprint`] is derived from the input (SHA-256 over the transcript
//!    text, or over canonical JSON for structured inputs).
//! 2. The [`cache::CacheStore`] is asked for a previously validated artifact.
//!    Corrupted or stale entries are discarded and treated as a miss.
//! 3. On a miss the [`pipeline::Orchestrator`] calls the generator, validates
//!    the output against the artifact's schema, and on failure sends a
//!    self-contained correction prompt carrying the validation error, up to a
//!    bounded number of corrections.
//! 4. A validated artifact is written back atomically and returned.
//!
//! Transport failures (network, rate limit, timeout, API errors) are never
//! retried here; they surface immediately as [`ErrorCategory::Transport`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_report_rust::facade::extract_report;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> ai_report_rust::Result<()> {
//!     let report = extract_report(
//!         "Client: we need a 3-page site within 2 months.",
//!         "gpt-4o-mini",
//!         0.0,
//!         "sk-...",
//!         Path::new("cache/ai_outputs"),
//!         true,
//!     )
//!     .await?;
//!     println!("{}", report.client_name);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`hashing`] | Content fingerprints and canonical JSON |
//! | [`cache`] | Cache keys, backends and the validating cache store |
//! | [`structured`] | Payload parsing and schema validation |
//! | [`artifacts`] | Report, design brief, image prompt and image artifact kinds |
//! | [`transport`] | Generation invoker boundary and the HTTP implementation |
//! | [`pipeline`] | Cache-aware generate/validate/correct orchestration |
//! | [`telemetry`] | Observer interface threaded through the pipeline |
//! | [`config`] | Environment-driven settings |
//! | [`facade`] | Caller-facing one-shot operations |

pub mod artifacts;
pub mod cache;
pub mod config;
pub mod error_code;
pub mod facade;
pub mod hashing;
pub mod pipeline;
pub mod structured;
pub mod telemetry;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use artifacts::{DesignBrief, GeneratedImage, ImagePrompt, ReportData, Sentiment};
pub use cache::{CacheKind, CacheStore};
pub use config::Settings;
pub use hashing::Fingerprint;
pub use pipeline::{Orchestrator, OrchestratorBuilder, ProduceOptions};
pub use telemetry::{PipelineEvent, PipelineObserver};
pub use types::message::{Message, MessageRole};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorCategory, ErrorContext};
