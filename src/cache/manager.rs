//! Validating cache store.

use super::backend::{CacheBackend, FileCache};
use super::key::{CacheKey, CacheKind};
use super::CacheError;
use crate::artifacts::CacheArtifact;
use crate::hashing::Fingerprint;
use crate::telemetry::{default_observer, PipelineEvent, PipelineObserver};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries that existed but failed validation.
    pub discarded: u64,
    pub writes: u64,
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses + self.discarded;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    discarded: AtomicU64,
    writes: AtomicU64,
    errors: AtomicU64,
}

impl AtomicStats {
    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Typed, validating front of a [`CacheBackend`].
///
/// `load` never returns an entry that fails the artifact's own checks; such
/// entries are reported and treated as a miss. Backend I/O failures surface
/// as [`CacheError`] after being reported to the observer.
#[derive(Clone)]
pub struct CacheStore {
    backend: Arc<dyn CacheBackend>,
    observer: Arc<dyn PipelineObserver>,
    stats: Arc<AtomicStats>,
}

impl CacheStore {
    pub fn new(backend: Arc<dyn CacheBackend>, observer: Arc<dyn PipelineObserver>) -> Self {
        Self {
            backend,
            observer,
            stats: Arc::new(AtomicStats::default()),
        }
    }

    /// File-backed store rooted at `cache_dir`, with images kept in `assets_dir`.
    pub fn on_disk(
        cache_dir: impl Into<PathBuf>,
        assets_dir: impl Into<PathBuf>,
        observer: Arc<dyn PipelineObserver>,
    ) -> Self {
        let backend = FileCache::new(cache_dir).with_kind_dir(CacheKind::Image, assets_dir);
        Self::new(Arc::new(backend), observer)
    }

    pub fn key_for<A: CacheArtifact>(fingerprint: &Fingerprint) -> CacheKey {
        CacheKey::new(A::KIND, fingerprint.clone())
    }

    /// Whether an entry is present. Its validity is not checked.
    pub async fn exists<A: CacheArtifact>(&self, fingerprint: &Fingerprint) -> Result<bool, CacheError> {
        self.backend.exists(&Self::key_for::<A>(fingerprint)).await
    }

    /// Read and validate the entry for `fingerprint`.
    pub async fn load<A: CacheArtifact>(&self, fingerprint: &Fingerprint) -> Result<Option<A>, CacheError> {
        let key = Self::key_for::<A>(fingerprint);
        let bytes = match self.backend.get(&key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                self.observer.on_event(&PipelineEvent::CacheMiss {
                    kind: A::KIND,
                    fingerprint: fingerprint.clone(),
                });
                return Ok(None);
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                self.observer.on_event(&PipelineEvent::CacheReadFailed {
                    kind: A::KIND,
                    fingerprint: fingerprint.clone(),
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        match A::decode(&bytes) {
            Ok(artifact) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                self.observer.on_event(&PipelineEvent::CacheHit {
                    kind: A::KIND,
                    fingerprint: fingerprint.clone(),
                });
                Ok(Some(artifact))
            }
            Err(reason) => {
                self.stats.discarded.fetch_add(1, Ordering::Relaxed);
                self.observer.on_event(&PipelineEvent::CacheDiscarded {
                    kind: A::KIND,
                    fingerprint: fingerprint.clone(),
                    reason: reason.to_string(),
                });
                Ok(None)
            }
        }
    }

    /// Persist `artifact` under `fingerprint`, replacing any previous entry atomically.
    pub async fn store<A: CacheArtifact>(&self, fingerprint: &Fingerprint, artifact: &A) -> Result<(), CacheError> {
        let key = Self::key_for::<A>(fingerprint);
        let result = match artifact.encode() {
            Ok(bytes) => self.backend.put(&key, &bytes).await.map(|_| bytes.len()),
            Err(e) => Err(CacheError::Encode(e.to_string())),
        };

        match result {
            Ok(bytes) => {
                self.stats.writes.fetch_add(1, Ordering::Relaxed);
                self.observer.on_event(&PipelineEvent::CacheWritten {
                    kind: A::KIND,
                    fingerprint: fingerprint.clone(),
                    bytes,
                });
                Ok(())
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                self.observer.on_event(&PipelineEvent::CacheWriteFailed {
                    kind: A::KIND,
                    fingerprint: fingerprint.clone(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::on_disk("cache/ai_outputs", "assets", default_observer())
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("backend", &self.backend.name())
            .field("stats", &self.stats())
            .finish()
    }
}
