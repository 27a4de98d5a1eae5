use super::{GenerationRequest, ImageGenerator, ImageRequest, TextGenerator, TransportError};
use crate::error_code::TransportErrorCode;
use async_trait::async_trait;
use base64::Engine as _;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::Proxy;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// OpenAI-compatible HTTP client for chat completions and image generation.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    /// Build a transport with the default timeout and no proxy.
    ///
    /// Environment overrides are read by [`Settings`](crate::config::Settings),
    /// which rejects malformed values; pass its fields to [`Self::with_options`].
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_options(base_url, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS), None)
    }

    pub fn with_options(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
        proxy_url: Option<&str>,
    ) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy_url) = proxy_url.filter(|p| !p.is_empty()) {
            if let Ok(proxy) = Proxy::all(proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder.build().map_err(|e| {
            TransportError::new(TransportErrorCode::InvalidRequest, format!("failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        let start = Instant::now();

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let retry_after_ms = retry_after_ms(resp.headers());
            let body = resp.text().await.unwrap_or_default();
            let provider_code = error_code_from_body(&body);
            let code = provider_code
                .as_deref()
                .and_then(TransportErrorCode::from_provider_code)
                .unwrap_or_else(|| TransportErrorCode::from_http_status(status));

            info!(
                http_status = status,
                code = code.code(),
                path,
                duration_ms = start.elapsed().as_millis() as u64,
                "generation request failed"
            );

            let mut err = TransportError::new(code, error_message_from_body(&body, status)).with_status(status);
            if let Some(ms) = retry_after_ms {
                err = err.with_retry_after_ms(ms);
            }
            return Err(err);
        }

        debug!(
            http_status = status,
            path,
            duration_ms = start.elapsed().as_millis() as u64,
            "generation request succeeded"
        );

        resp.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                classify_reqwest_error(e)
            } else {
                TransportError::new(
                    TransportErrorCode::MalformedResponse,
                    format!("response body is not JSON: {}", e),
                )
                .with_status(status)
            }
        })
    }
}

#[async_trait]
impl TextGenerator for HttpTransport {
    async fn complete(&self, request: &GenerationRequest) -> Result<String, TransportError> {
        let body = json!({
            "model": request.model,
            "messages": request.messages,
            "temperature": request.temperature,
        });
        let resp = self.post_json("/chat/completions", &body).await?;

        resp.pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                TransportError::new(
                    TransportErrorCode::MalformedResponse,
                    "response contains no message content",
                )
            })
    }
}

#[async_trait]
impl ImageGenerator for HttpTransport {
    async fn generate_image(&self, request: &ImageRequest) -> Result<Bytes, TransportError> {
        let body = json!({
            "model": request.model,
            "prompt": request.prompt,
            "size": request.size,
            "n": 1,
            "response_format": "b64_json",
        });
        let resp = self.post_json("/images/generations", &body).await?;

        let encoded = resp
            .pointer("/data/0/b64_json")
            .and_then(|d| d.as_str())
            .ok_or_else(|| {
                TransportError::new(TransportErrorCode::MalformedResponse, "response contains no image data")
            })?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| {
                TransportError::new(
                    TransportErrorCode::MalformedResponse,
                    format!("image data is not valid base64: {}", e),
                )
            })?;
        Ok(Bytes::from(bytes))
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> TransportError {
    let code = if e.is_timeout() {
        TransportErrorCode::Timeout
    } else if e.is_connect() {
        TransportErrorCode::Connection
    } else if e.is_decode() {
        TransportErrorCode::MalformedResponse
    } else if e.is_builder() {
        TransportErrorCode::InvalidRequest
    } else {
        TransportErrorCode::Unknown
    };
    let err = TransportError::new(code, e.to_string());
    match e.status() {
        Some(status) => err.with_status(status.as_u16()),
        None => err,
    }
}

/// Only the `Retry-After: <seconds>` form is understood.
fn retry_after_ms(headers: &HeaderMap) -> Option<u64> {
    let raw = headers.get("retry-after")?.to_str().ok()?;
    let secs: u64 = raw.trim().parse().ok()?;
    Some(secs.saturating_mul(1000))
}

/// `error.code`, falling back to `error.type`, from an OpenAI-style error body.
fn error_code_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    error
        .get("code")
        .and_then(|c| c.as_str())
        .filter(|c| TransportErrorCode::from_provider_code(c).is_some())
        .or_else(|| error.get("type").and_then(|t| t.as_str()))
        .map(|s| s.to_string())
}

fn error_message_from_body(body: &str, status: u16) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("HTTP {}", status)
            } else {
                format!("HTTP {}: {}", status, trimmed.chars().take(200).collect::<String>())
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_prefers_known_code() {
        let body = r#"{"error": {"message": "quota", "type": "insufficient_quota", "code": "insufficient_quota"}}"#;
        assert_eq!(error_code_from_body(body).as_deref(), Some("insufficient_quota"));

        let body = r#"{"error": {"message": "slow down", "type": "requests", "code": "rate_limit_exceeded"}}"#;
        assert_eq!(error_code_from_body(body).as_deref(), Some("rate_limit_exceeded"));

        let body = r#"{"error": {"message": "bad", "type": "invalid_request_error", "code": null}}"#;
        assert_eq!(error_code_from_body(body).as_deref(), Some("invalid_request_error"));

        assert_eq!(error_code_from_body("<html>"), None);
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(
            error_message_from_body(r#"{"error": {"message": "Invalid key"}}"#, 401),
            "Invalid key"
        );
        assert_eq!(error_message_from_body("", 502), "HTTP 502");
        assert_eq!(error_message_from_body("Bad gateway", 502), "HTTP 502: Bad gateway");
    }

    #[test]
    fn test_retry_after_seconds_only() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", "7".parse().unwrap());
        assert_eq!(retry_after_ms(&headers), Some(7000));
        headers.insert("retry-after", "Wed, 21 Oct 2015 07:28:00 GMT".parse().unwrap());
        assert_eq!(retry_after_ms(&headers), None);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let transport =
            HttpTransport::with_options("http://localhost:1/v1/", "sk-test", Duration::from_secs(1), None).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:1/v1");
    }
}
