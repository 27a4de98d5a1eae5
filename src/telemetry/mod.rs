//! 观测模块：在流水线各组件间显式传递的事件观察者接口。
//!
//! # Pipeline Observer Module
//!
//! Components never reach for a global logger. The [`Orchestrator`], the
//! [`CacheStore`] and the [`SchemaValidator`] each receive an
//! `Arc<dyn PipelineObserver>` when they are built and report what they do as
//! typed [`PipelineEvent`]s.
//!
//! Observers are infallible: `on_event` returns nothing, so a broken log sink
//! can never fail a pipeline run.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`PipelineObserver`] | Trait for event destinations |
//! | [`TracingObserver`] | Default observer, forwards to `tracing` |
//! | [`NoopObserver`] | Discards everything |
//! | [`InMemoryObserver`] | Records events for inspection in tests |
//! | [`CompositeObserver`] | Fans events out to several observers |
//!
//! [`Orchestrator`]: crate::pipeline::Orchestrator
//! [`CacheStore`]: crate::cache::CacheStore
//! [`SchemaValidator`]: crate::structured::SchemaValidator

use crate::cache::CacheKind;
use crate::hashing::Fingerprint;
use crate::structured::ValidationError;
use crate::transport::TransportError;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info, warn};

/// Something that happened inside the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// A validated artifact was served from the cache.
    CacheHit {
        kind: CacheKind,
        fingerprint: Fingerprint,
    },
    CacheMiss {
        kind: CacheKind,
        fingerprint: Fingerprint,
    },
    /// A cache entry existed but failed validation and was ignored.
    CacheDiscarded {
        kind: CacheKind,
        fingerprint: Fingerprint,
        reason: String,
    },
    /// The cache could not be read; treated as a miss.
    CacheReadFailed {
        kind: CacheKind,
        fingerprint: Fingerprint,
        error: String,
    },
    CacheWritten {
        kind: CacheKind,
        fingerprint: Fingerprint,
        bytes: usize,
    },
    /// The artifact could not be persisted; it is still returned to the caller.
    CacheWriteFailed {
        kind: CacheKind,
        fingerprint: Fingerprint,
        error: String,
    },
    GenerationStarted {
        kind: CacheKind,
        attempt: u32,
        max_attempts: u32,
        correction: bool,
    },
    GenerationCompleted {
        kind: CacheKind,
        attempt: u32,
        elapsed: Duration,
        response_len: usize,
    },
    ValidationFailed {
        kind: CacheKind,
        attempt: u32,
        error: ValidationError,
    },
    TransportFailed {
        kind: CacheKind,
        attempt: u32,
        error: TransportError,
    },
    CorrectionsExhausted {
        kind: CacheKind,
        attempts: u32,
        error: ValidationError,
    },
    /// A freshly generated artifact passed validation.
    ArtifactProduced {
        kind: CacheKind,
        attempts: u32,
    },
}

impl PipelineEvent {
    pub fn kind(&self) -> CacheKind {
        match self {
            PipelineEvent::CacheHit { kind, .. }
            | PipelineEvent::CacheMiss { kind, .. }
            | PipelineEvent::CacheDiscarded { kind, .. }
            | PipelineEvent::CacheReadFailed { kind, .. }
            | PipelineEvent::CacheWritten { kind, .. }
            | PipelineEvent::CacheWriteFailed { kind, .. }
            | PipelineEvent::GenerationStarted { kind, .. }
            | PipelineEvent::GenerationCompleted { kind, .. }
            | PipelineEvent::ValidationFailed { kind, .. }
            | PipelineEvent::TransportFailed { kind, .. }
            | PipelineEvent::CorrectionsExhausted { kind, .. }
            | PipelineEvent::ArtifactProduced { kind, .. } => *kind,
        }
    }

    /// Short event name, used in logs and test assertions.
    pub fn name(&self) -> &'static str {
        match self {
            PipelineEvent::CacheHit { .. } => "cache_hit",
            PipelineEvent::CacheMiss { .. } => "cache_miss",
            PipelineEvent::CacheDiscarded { .. } => "cache_discarded",
            PipelineEvent::CacheReadFailed { .. } => "cache_read_failed",
            PipelineEvent::CacheWritten { .. } => "cache_written",
            PipelineEvent::CacheWriteFailed { .. } => "cache_write_failed",
            PipelineEvent::GenerationStarted { .. } => "generation_started",
            PipelineEvent::GenerationCompleted { .. } => "generation_completed",
            PipelineEvent::ValidationFailed { .. } => "validation_failed",
            PipelineEvent::TransportFailed { .. } => "transport_failed",
            PipelineEvent::CorrectionsExhausted { .. } => "corrections_exhausted",
            PipelineEvent::ArtifactProduced { .. } => "artifact_produced",
        }
    }
}

/// Destination for pipeline events.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::CacheHit { kind, fingerprint } => {
                info!(kind = %kind, fingerprint = %fingerprint.short(), "Loaded from cache");
            }
            PipelineEvent::CacheMiss { kind, fingerprint } => {
                info!(kind = %kind, fingerprint = %fingerprint.short(), "Cache miss");
            }
            PipelineEvent::CacheDiscarded {
                kind,
                fingerprint,
                reason,
            } => {
                warn!(kind = %kind, fingerprint = %fingerprint.short(), %reason, "Discarding invalid cache entry");
            }
            PipelineEvent::CacheReadFailed {
                kind,
                fingerprint,
                error,
            } => {
                warn!(kind = %kind, fingerprint = %fingerprint.short(), %error, "Cache unavailable, regenerating");
            }
            PipelineEvent::CacheWritten {
                kind,
                fingerprint,
                bytes,
            } => {
                info!(kind = %kind, fingerprint = %fingerprint.short(), bytes, "Saved to cache");
            }
            PipelineEvent::CacheWriteFailed {
                kind,
                fingerprint,
                error,
            } => {
                error!(kind = %kind, fingerprint = %fingerprint.short(), %error, "Failed to save cache");
            }
            PipelineEvent::GenerationStarted {
                kind,
                attempt,
                max_attempts,
                correction,
            } => {
                info!(kind = %kind, attempt, max_attempts, correction, "Generation attempt {}/{}", attempt, max_attempts);
            }
            PipelineEvent::GenerationCompleted {
                kind,
                attempt,
                elapsed,
                response_len,
            } => {
                info!(
                    kind = %kind,
                    attempt,
                    elapsed_ms = elapsed.as_millis() as u64,
                    response_len,
                    "Generation completed in {:.2}s",
                    elapsed.as_secs_f64()
                );
            }
            PipelineEvent::ValidationFailed {
                kind,
                attempt,
                error,
            } => {
                warn!(kind = %kind, attempt, %error, "Validation failed");
            }
            PipelineEvent::TransportFailed {
                kind,
                attempt,
                error,
            } => {
                error!(kind = %kind, attempt, code = error.code.code(), category = error.code.category(), %error, "Generation unavailable");
            }
            PipelineEvent::CorrectionsExhausted {
                kind,
                attempts,
                error,
            } => {
                error!(kind = %kind, attempts, %error, "Failed to get valid output after {} attempts", attempts);
            }
            PipelineEvent::ArtifactProduced { kind, attempts } => {
                info!(kind = %kind, attempts, "Successfully parsed and validated output");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_event(&self, _event: &PipelineEvent) {}
}

/// Records events in memory.
#[derive(Debug, Default)]
pub struct InMemoryObserver {
    events: Mutex<Vec<PipelineEvent>>,
}

impl InMemoryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.lock().clone()
    }

    /// Names of the recorded events, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.lock().iter().map(|e| e.name()).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.lock().iter().filter(|e| e.name() == name).count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PipelineEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PipelineObserver for InMemoryObserver {
    fn on_event(&self, event: &PipelineEvent) {
        self.lock().push(event.clone());
    }
}

/// Sends each event to every registered observer.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observers.push(observer);
        self
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_event(&self, event: &PipelineEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

/// Default observer used when none is supplied.
pub fn default_observer() -> Arc<dyn PipelineObserver> {
    Arc::new(TracingObserver)
}
