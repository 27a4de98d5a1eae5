//! 传输模块：生成调用边界（文本与图像生成器）。
//!
//! # Generation Invoker Boundary
//!
//! The pipeline talks to models only through [`TextGenerator`] and
//! [`ImageGenerator`]. Every failure is a [`TransportError`] classified by a
//! [`TransportErrorCode`]; the orchestrator surfaces these immediately and
//! never retries them.
//!
//! [`HttpTransport`] implements both traits against an OpenAI-compatible API.

pub mod http;

pub use http::HttpTransport;

pub use crate::error_code::TransportErrorCode;
use crate::types::Message;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// One chat completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub messages: Vec<Message>,
    pub model: String,
    pub temperature: f32,
}

impl GenerationRequest {
    /// System prompt plus user prompt, as sent on the first attempt.
    pub fn prompt(
        system: impl Into<String>,
        user: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            messages: vec![Message::system(system), Message::user(user)],
            model: model.into(),
            temperature,
        }
    }

    /// A single self-contained user message.
    pub fn single(content: impl Into<String>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            messages: vec![Message::user(content)],
            model: model.into(),
            temperature,
        }
    }

    /// Content of the last user message.
    pub fn user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == crate::types::MessageRole::User)
            .map(|m| m.content.as_str())
    }
}

/// One image generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub model: String,
    /// e.g. `1024x1024`
    pub size: String,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Return the raw text of the first completion choice.
    async fn complete(&self, request: &GenerationRequest) -> Result<String, TransportError>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Return the decoded image bytes.
    async fn generate_image(&self, request: &ImageRequest) -> Result<Bytes, TransportError>;
}

/// A generation call that did not produce a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{code}] {message}")]
pub struct TransportError {
    pub code: TransportErrorCode,
    pub message: String,
    /// HTTP status, when the API answered.
    pub status: Option<u16>,
    /// Server-suggested wait, from a `Retry-After` header.
    pub retry_after_ms: Option<u64>,
}

impl TransportError {
    pub fn new(code: TransportErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            retry_after_ms: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_retry_after_ms(mut self, ms: u64) -> Self {
        self.retry_after_ms = Some(ms);
        self
    }

    /// Actionable message for the end user, followed by the provider detail.
    pub fn user_message(&self) -> String {
        let hint = self.code.user_hint();
        if self.message.is_empty() {
            hint.to_string()
        } else {
            format!("{} ({})", hint, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_request_shape() {
        let req = GenerationRequest::prompt("sys", "user text", "gpt-4o-mini", 0.0);
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0], Message::system("sys"));
        assert_eq!(req.user_content(), Some("user text"));

        let req = GenerationRequest::single("fix it", "gpt-4o-mini", 0.0);
        assert_eq!(req.messages, vec![Message::user("fix it")]);
    }

    #[test]
    fn test_user_message_leads_with_hint() {
        let err = TransportError::new(TransportErrorCode::Timeout, "after 60s").with_status(504);
        assert_eq!(err.user_message(), "Request timed out. Please try again. (after 60s)");
        assert_eq!(err.to_string(), "[E3003] after 60s");
        assert_eq!(err.status, Some(504));
    }
}
