//! Transport error codes for the generation invoker.
//!
//! Every failure the generator can surface is classified into one of these
//! codes. The orchestrator treats all of them as a single "generation
//! unavailable" category and never retries them; the code only decides which
//! message the user sees.
//!
//! ## Error Code Categories
//!
//! | Prefix | Category   | Description                         |
//! |--------|------------|-------------------------------------|
//! | E1xxx  | client     | Request-side errors                 |
//! | E2xxx  | rate       | Rate limit and quota errors         |
//! | E3xxx  | server     | Provider-side errors                |
//! | E5xxx  | network    | Connectivity and malformed payloads |
//! | E9xxx  | unknown    | Catch-all / unclassified            |
//!
//! ## Example
//!
//! ```rust
//! use ai_report_rust::error_code::TransportErrorCode;
//!
//! let code = TransportErrorCode::from_http_status(429);
//! assert_eq!(code.code(), "E2001");
//! assert_eq!(code.category(), "rate");
//! ```

use std::fmt;

/// Classified transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorCode {
    /// E1001: Malformed request or invalid parameters
    InvalidRequest,
    /// E1002: Invalid, expired, or missing API key
    Authentication,
    /// E1003: Valid credentials but insufficient permissions
    PermissionDenied,
    /// E1004: Requested model or endpoint does not exist
    NotFound,
    /// E1005: Input exceeds the context window or payload limit
    RequestTooLarge,
    /// E2001: Request rate limit exceeded
    RateLimited,
    /// E2002: Account usage quota or billing limit reached
    QuotaExhausted,
    /// E3001: Internal server error on provider side
    ServerError,
    /// E3002: Provider temporarily overloaded
    Overloaded,
    /// E3003: Request timed out before a response arrived
    Timeout,
    /// E5001: Could not reach the API at all
    Connection,
    /// E5002: The API answered but the response body was unusable
    MalformedResponse,
    /// E9999: Error could not be classified
    Unknown,
}

impl TransportErrorCode {
    /// Returns the canonical code string (e.g., `"E1001"`).
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "E1001",
            Self::Authentication => "E1002",
            Self::PermissionDenied => "E1003",
            Self::NotFound => "E1004",
            Self::RequestTooLarge => "E1005",
            Self::RateLimited => "E2001",
            Self::QuotaExhausted => "E2002",
            Self::ServerError => "E3001",
            Self::Overloaded => "E3002",
            Self::Timeout => "E3003",
            Self::Connection => "E5001",
            Self::MalformedResponse => "E5002",
            Self::Unknown => "E9999",
        }
    }

    /// Returns the category: `"client"`, `"rate"`, `"server"`, `"network"`, or `"unknown"`.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidRequest
            | Self::Authentication
            | Self::PermissionDenied
            | Self::NotFound
            | Self::RequestTooLarge => "client",
            Self::RateLimited | Self::QuotaExhausted => "rate",
            Self::ServerError | Self::Overloaded | Self::Timeout => "server",
            Self::Connection | Self::MalformedResponse => "network",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable guidance for the failure, suitable for direct display.
    pub fn user_hint(&self) -> &'static str {
        match self {
            Self::Connection => {
                "Network error: Unable to connect to the generation API. Check your internet connection."
            }
            Self::RateLimited => {
                "Rate limit exceeded. Please try again later or check your API plan."
            }
            Self::QuotaExhausted => "Usage quota exhausted. Check your API plan and billing.",
            Self::Timeout => "Request timed out. Please try again.",
            Self::Authentication => "Authentication failed. Check your API key.",
            Self::PermissionDenied => "The API key is not allowed to use this model.",
            Self::NotFound => "The requested model or endpoint does not exist.",
            Self::RequestTooLarge => "The transcript is too large for the selected model.",
            Self::ServerError | Self::Overloaded => {
                "The generation service is having trouble. Please try again."
            }
            Self::MalformedResponse => "The generation API returned an unusable response.",
            Self::InvalidRequest | Self::Unknown => "Generation API error.",
        }
    }

    /// Maps a provider error code/type string to the corresponding code.
    ///
    /// Supports both standard names (e.g., `"invalid_request"`) and provider-specific
    /// aliases such as `"invalid_api_key"`, `"context_length_exceeded"`, `"insufficient_quota"`.
    pub fn from_provider_code(provider_code: &str) -> Option<Self> {
        let code = match provider_code {
            "invalid_request" | "invalid_request_error" => Self::InvalidRequest,
            "authentication" | "invalid_api_key" | "authentication_error" => Self::Authentication,
            "permission_denied" | "permission_error" => Self::PermissionDenied,
            "not_found" | "model_not_found" => Self::NotFound,
            "request_too_large" | "context_length_exceeded" => Self::RequestTooLarge,
            "rate_limited" | "rate_limit_exceeded" | "rate_limit_error" => Self::RateLimited,
            "quota_exhausted" | "insufficient_quota" => Self::QuotaExhausted,
            "server_error" => Self::ServerError,
            "overloaded" | "overloaded_error" => Self::Overloaded,
            "timeout" => Self::Timeout,
            _ => return None,
        };
        Some(code)
    }

    /// Maps an HTTP status code to the most likely code.
    ///
    /// Status codes without a mapping return `TransportErrorCode::Unknown`.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 | 422 => Self::InvalidRequest,
            401 => Self::Authentication,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            408 => Self::Timeout,
            413 => Self::RequestTooLarge,
            429 => Self::RateLimited, // Could also be QuotaExhausted; the body decides
            500 | 502 => Self::ServerError,
            503 | 529 => Self::Overloaded,
            504 => Self::Timeout,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for TransportErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
