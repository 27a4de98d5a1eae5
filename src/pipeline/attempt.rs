//! Per-call attempt bookkeeping.

use crate::hashing::Fingerprint;
use crate::structured::ValidationError;
use crate::transport::TransportError;

/// Result of one generation-plus-validation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome<T> {
    Valid(T),
    /// The generator answered but the output was rejected; may be corrected.
    SchemaInvalid(ValidationError),
    /// The generator did not answer; never retried.
    TransportFailure(TransportError),
}

/// Ephemeral state of one orchestration call. Never persisted.
#[derive(Debug, Clone)]
pub struct AttemptContext {
    pub fingerprint: Fingerprint,
    /// 1-based index of the current attempt.
    pub attempt: u32,
    /// Initial call plus the correction budget.
    pub max_attempts: u32,
    pub last_error: Option<ValidationError>,
}

impl AttemptContext {
    pub fn new(fingerprint: Fingerprint, max_corrections: u32) -> Self {
        Self {
            fingerprint,
            attempt: 1,
            max_attempts: max_corrections.saturating_add(1),
            last_error: None,
        }
    }

    pub fn is_correction(&self) -> bool {
        self.attempt > 1
    }

    pub fn corrections_used(&self) -> u32 {
        self.attempt - 1
    }

    /// Whether another corrective attempt fits in the budget.
    pub fn can_correct(&self) -> bool {
        self.attempt < self.max_attempts
    }

    /// Record a rejected attempt and move to the next one.
    pub fn advance(&mut self, error: ValidationError) {
        self.last_error = Some(error);
        self.attempt += 1;
    }
}
