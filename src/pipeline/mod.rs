//! 流水线模块：缓存优先、校验失败时带错误信息纠正重试的产物生成流程。
//!
//! # Retry Orchestrator
//!
//! One generic [`Orchestrator`] drives every artifact kind:
//!
//! 1. With caching enabled, look the fingerprint up in the
//!    [`CacheStore`](crate::cache::CacheStore); a hit returns immediately.
//! 2. Otherwise send the kind's system prompt and the user prompt carrying
//!    the input.
//! 3. Validate the raw output. A valid artifact is persisted (when caching)
//!    and returned.
//! 4. An invalid one triggers a correction call: a single self-contained
//!    message with the validation error and the restated schema. This repeats
//!    until the output validates or `max_corrections` corrections were spent
//!    (default 2, so at most 3 calls), after which the last validation error
//!    is returned.
//! 5. A transport failure ends the call at once, whatever the attempt.
//!
//! Each attempt is classified as an [`AttemptOutcome`], so the branching is
//! an exhaustive match rather than error-type inspection.
//!
//! Images take a reduced path through [`Orchestrator::produce_image`]: one
//! call, no correction loop, non-empty results cached.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ai_report_rust::pipeline::{Orchestrator, ProduceOptions};
//! use ai_report_rust::transport::HttpTransport;
//! use ai_report_rust::ReportData;
//! use std::sync::Arc;
//!
//! # async fn run() -> ai_report_rust::Result<()> {
//! let transport = Arc::new(HttpTransport::new("https://api.openai.com/v1", "sk-...")?);
//! let orchestrator = Orchestrator::builder()
//!     .text_generator(transport)
//!     .cache_dir("cache/ai_outputs")
//!     .build()?;
//!
//! let report: ReportData = orchestrator
//!     .produce("Client wants a 3-page site", &ProduceOptions::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod attempt;
mod orchestrator;

pub use attempt::{AttemptContext, AttemptOutcome};
pub use orchestrator::{
    GenerationSettings, ImageOptions, Orchestrator, OrchestratorBuilder, ProduceOptions,
    DEFAULT_IMAGE_MODEL, DEFAULT_IMAGE_SIZE, DEFAULT_MAX_CORRECTIONS, DEFAULT_MODEL,
};
