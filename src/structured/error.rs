//! Error types for structured output validation.

use std::fmt;

/// What kind of check rejected the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// The text could not be parsed as structured data at all.
    MalformedPayload,
    /// The data parsed but violates a field constraint.
    SchemaViolation,
}

/// Validation error with location information.
///
/// The `Display` form is embedded verbatim in correction prompts, so it names
/// the field and the constraint that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    /// Error message describing what went wrong
    pub message: String,
    /// Path to the offending field (e.g., "sentiment.score", "key_points[0]")
    pub path: Option<String>,
}

impl ValidationError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: ValidationErrorKind::MalformedPayload,
            message: message.into(),
            path: None,
        }
    }

    pub fn schema_violation(path: impl Into<String>, message: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            kind: ValidationErrorKind::SchemaViolation,
            message: message.into(),
            path: if path.is_empty() { None } else { Some(path) },
        }
    }

    /// Schema violation that applies to the whole payload.
    pub fn without_path(message: impl Into<String>) -> Self {
        Self {
            kind: ValidationErrorKind::SchemaViolation,
            message: message.into(),
            path: None,
        }
    }

    /// Collapse several violations into one error whose message lists them all.
    ///
    /// Returns `None` for an empty list.
    pub fn combine(errors: Vec<ValidationError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.into_iter().next(),
            _ => {
                let kind = if errors
                    .iter()
                    .any(|e| e.kind == ValidationErrorKind::MalformedPayload)
                {
                    ValidationErrorKind::MalformedPayload
                } else {
                    ValidationErrorKind::SchemaViolation
                };
                let message = errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                Some(Self {
                    kind,
                    message,
                    path: None,
                })
            }
        }
    }

    pub fn is_malformed(&self) -> bool {
        self.kind == ValidationErrorKind::MalformedPayload
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of checking one value: the value itself, or every violation found.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid(serde_json::Value),
    Invalid(Vec<ValidationError>),
}

impl ValidationResult {
    pub fn success(data: serde_json::Value) -> Self {
        Self::Valid(data)
    }

    pub fn failure(errors: Vec<ValidationError>) -> Self {
        Self::Invalid(errors)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn error_messages(&self) -> Vec<String> {
        match self {
            Self::Valid(_) => Vec::new(),
            Self::Invalid(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Merge all violations into one error.
    pub fn into_result(self) -> Result<serde_json::Value, ValidationError> {
        match self {
            Self::Valid(data) => Ok(data),
            Self::Invalid(errors) => Err(ValidationError::combine(errors)
                .unwrap_or_else(|| ValidationError::without_path("Validation failed"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_and_without_path() {
        let err = ValidationError::schema_violation("key_points", "List cannot be empty");
        assert_eq!(err.to_string(), "key_points: List cannot be empty");

        let err = ValidationError::malformed("expected value at line 1 column 1");
        assert_eq!(err.to_string(), "expected value at line 1 column 1");
        assert!(err.is_malformed());
    }

    #[test]
    fn test_empty_path_is_dropped() {
        let err = ValidationError::schema_violation("", "Expected type 'object', got 'array'");
        assert!(err.path.is_none());
    }

    #[test]
    fn test_combine_joins_messages() {
        let combined = ValidationError::combine(vec![
            ValidationError::schema_violation("topic", "Missing required field"),
            ValidationError::schema_violation("sentiment.score", "Value above maximum (5)"),
        ])
        .unwrap();
        assert_eq!(
            combined.to_string(),
            "topic: Missing required field; sentiment.score: Value above maximum (5)"
        );
        assert_eq!(combined.kind, ValidationErrorKind::SchemaViolation);
        assert!(ValidationError::combine(Vec::new()).is_none());
    }

    #[test]
    fn test_into_result() {
        let ok = ValidationResult::success(serde_json::json!({"a": 1}));
        assert_eq!(ok.into_result().unwrap()["a"], 1);

        let failed = ValidationResult::failure(vec![ValidationError::without_path("nope")]);
        assert!(!failed.is_valid());
        assert_eq!(failed.into_result().unwrap_err().message, "nope");

        let empty = ValidationResult::failure(Vec::new());
        assert_eq!(empty.into_result().unwrap_err().message, "Validation failed");
    }
}
