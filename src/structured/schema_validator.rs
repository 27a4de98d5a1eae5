use crate::artifacts::ArtifactKind;
use crate::structured::ValidationError;
use crate::telemetry::{default_observer, PipelineEvent, PipelineObserver};
use std::sync::Arc;

/// Validates raw generator output into an artifact kind and reports failures.
#[derive(Clone)]
pub struct SchemaValidator {
    observer: Arc<dyn PipelineObserver>,
}

impl SchemaValidator {
    pub fn new(observer: Arc<dyn PipelineObserver>) -> Self {
        Self { observer }
    }

    /// Parse and check `raw` against `K`'s schema.
    ///
    /// `attempt` is only used to label the reported event.
    pub fn validate<K: ArtifactKind>(&self, raw: &str, attempt: u32) -> Result<K, ValidationError> {
        K::parse(raw).map_err(|error| {
            self.observer.on_event(&PipelineEvent::ValidationFailed {
                kind: K::KIND,
                attempt,
                error: error.clone(),
            });
            error
        })
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new(default_observer())
    }
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator").finish_non_exhaustive()
    }
}
