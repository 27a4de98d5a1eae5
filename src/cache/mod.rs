//! 内容寻址缓存模块：按指纹与产物类型持久化已校验的产物。
//!
//! # Artifact Cache Module
//!
//! Every validated artifact is stored under a key made of its input
//! [`Fingerprint`](crate::hashing::Fingerprint) and its [`CacheKind`], so an
//! identical input never triggers a second generation call.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheStore`] | Typed load with validation-on-load, atomic store, statistics |
//! | [`CacheBackend`] | Trait for raw byte storage |
//! | [`FileCache`] | One file per entry, atomic temp-file-and-rename writes |
//! | [`MemoryCache`] | In-process backend for tests |
//! | [`CacheKey`] / [`CacheKind`] | Fingerprint plus artifact discriminator |
//!
//! ## On-disk layout
//!
//! | Kind | File name |
//! |------|-----------|
//! | report | `{fingerprint}.json` |
//! | design brief | `design_brief_{fingerprint}.json` |
//! | image prompt | `image_prompt_{fingerprint}.txt` |
//! | image | `design_{fingerprint}.png` (assets directory) |
//!
//! Structured kinds are pretty-printed UTF-8 JSON; an operator can inspect or
//! clear the cache with ordinary file tools. Entries are never evicted.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ai_report_rust::cache::CacheStore;
//! use ai_report_rust::hashing::fingerprint_text;
//! use ai_report_rust::telemetry::default_observer;
//! use ai_report_rust::ReportData;
//!
//! # async fn run() -> Result<(), ai_report_rust::cache::CacheError> {
//! let store = CacheStore::on_disk("cache/ai_outputs", "assets", default_observer());
//! let fp = fingerprint_text("Client wants a 3-page site");
//! if let Some(report) = store.load::<ReportData>(&fp).await? {
//!     println!("cached report for {}", report.client_name);
//! }
//! # Ok(())
//! # }
//! ```

mod backend;
mod key;
mod manager;

pub use backend::{CacheBackend, FileCache, MemoryCache};
pub use key::{CacheKey, CacheKind};
pub use manager::{CacheStats, CacheStore};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// The cache could not be used. Callers in the pipeline treat this as a soft
/// failure.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to {operation} {}: {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache task failed: {0}")]
    Task(String),

    #[error("failed to encode artifact: {0}")]
    Encode(String),
}

impl CacheError {
    pub fn io(operation: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        CacheError::Io {
            operation,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
