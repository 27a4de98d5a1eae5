use crate::cache::CacheError;
use crate::structured::ValidationError;
use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "OPENAI_API_KEY")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "settings", "orchestrator")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Failure category of an [`Error`].
///
/// Transport and validation failures are kept apart so callers can tell a
/// network or quota problem from a generator that kept producing bad output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The generation invoker failed (connectivity, rate limit, timeout, API error).
    Transport,
    /// Generator output stayed schema-invalid after the correction budget.
    Validation,
    /// The cache could not be read or written.
    Cache,
    /// Missing or malformed settings.
    Configuration,
    /// Local I/O or serialization failure outside the cache.
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Transport => "transport",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Cache => "cache",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for the report pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Generation unavailable: {0}")]
    Generation(#[from] TransportError),

    #[error("Output failed validation after {attempts} attempt(s): {last_error}")]
    CorrectionsExhausted {
        attempts: u32,
        last_error: ValidationError,
    },

    #[error("Cache unavailable: {0}")]
    Cache(#[from] CacheError),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Generation(_) => ErrorCategory::Transport,
            Error::CorrectionsExhausted { .. } => ErrorCategory::Validation,
            Error::Cache(_) => ErrorCategory::Cache,
            Error::Configuration { .. } => ErrorCategory::Configuration,
            Error::Io(_) | Error::Serialization(_) => ErrorCategory::Internal,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.category() == ErrorCategory::Transport
    }

    pub fn is_validation(&self) -> bool {
        self.category() == ErrorCategory::Validation
    }

    /// Message suitable for showing to an end user as-is.
    pub fn user_message(&self) -> String {
        match self {
            Error::Generation(e) => e.user_message(),
            Error::CorrectionsExhausted {
                attempts,
                last_error,
            } => format!(
                "The model did not return valid data after {} attempt(s). Last error: {}",
                attempts, last_error
            ),
            other => other.to_string(),
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_code::TransportErrorCode;

    #[test]
    fn test_configuration_error_display_includes_context() {
        let err = Error::configuration_with_context(
            "not a number",
            ErrorContext::new()
                .with_field_path("AI_TEMPERATURE")
                .with_source("settings"),
        );
        let text = err.to_string();
        assert!(text.contains("not a number"));
        assert!(text.contains("field: AI_TEMPERATURE"));
        assert!(text.contains("source: settings"));
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_transport_and_validation_categories_differ() {
        let transport: Error =
            TransportError::new(TransportErrorCode::RateLimited, "slow down").into();
        let validation = Error::CorrectionsExhausted {
            attempts: 3,
            last_error: ValidationError::schema_violation("summary", "Missing required field"),
        };

        assert!(transport.is_transport());
        assert!(!transport.is_validation());
        assert!(validation.is_validation());
        assert_ne!(transport.category(), validation.category());
    }

    #[test]
    fn test_user_message_for_rate_limit() {
        let err: Error = TransportError::new(TransportErrorCode::RateLimited, "429").into();
        assert!(err.user_message().starts_with("Rate limit exceeded"));
    }
}
