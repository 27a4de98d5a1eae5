//! Environment-driven settings.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `OPENAI_API_KEY` | required |
//! | `OPENAI_BASE_URL` | `https://api.openai.com/v1` |
//! | `OPENAI_MODEL` | `gpt-4o-mini` |
//! | `AI_TEMPERATURE` | `0` |
//! | `OPENAI_IMAGE_MODEL` | `gpt-image-1` |
//! | `OPENAI_IMAGE_SIZE` | `1024x1024` |
//! | `CACHE_DIR` | `cache/ai_outputs` |
//! | `ASSETS_DIR` | `assets` |
//! | `LOG_LEVEL` | `info` |
//! | `AI_MAX_CORRECTIONS` | `2` |
//! | `AI_HTTP_TIMEOUT_SECS` | `60` |
//! | `AI_PROXY_URL` | unset |
//!
//! Empty values count as unset. Loading a `.env` file is left to the binary.

use crate::error::{Error, ErrorContext};
use crate::pipeline::{
    GenerationSettings, ImageOptions, ProduceOptions, DEFAULT_IMAGE_MODEL, DEFAULT_IMAGE_SIZE,
    DEFAULT_MAX_CORRECTIONS, DEFAULT_MODEL,
};
use crate::transport::http::DEFAULT_TIMEOUT_SECS;
use crate::Result;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub image_model: String,
    pub image_size: String,
    pub cache_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub log_level: String,
    pub max_corrections: u32,
    pub http_timeout: Duration,
    pub proxy_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            image_size: DEFAULT_IMAGE_SIZE.to_string(),
            cache_dir: PathBuf::from("cache/ai_outputs"),
            assets_dir: PathBuf::from("assets"),
            log_level: "info".to_string(),
            max_corrections: DEFAULT_MAX_CORRECTIONS,
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            proxy_url: None,
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Ok(Self {
            api_key: get("OPENAI_API_KEY"),
            base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            model: get("OPENAI_MODEL").unwrap_or(defaults.model),
            temperature: parse_var("AI_TEMPERATURE", get("AI_TEMPERATURE"), defaults.temperature)?,
            image_model: get("OPENAI_IMAGE_MODEL").unwrap_or(defaults.image_model),
            image_size: get("OPENAI_IMAGE_SIZE").unwrap_or(defaults.image_size),
            cache_dir: get("CACHE_DIR").map(PathBuf::from).unwrap_or(defaults.cache_dir),
            assets_dir: get("ASSETS_DIR").map(PathBuf::from).unwrap_or(defaults.assets_dir),
            log_level: get("LOG_LEVEL")
                .map(|l| l.to_lowercase())
                .unwrap_or(defaults.log_level),
            max_corrections: parse_var(
                "AI_MAX_CORRECTIONS",
                get("AI_MAX_CORRECTIONS"),
                defaults.max_corrections,
            )?,
            http_timeout: Duration::from_secs(parse_var(
                "AI_HTTP_TIMEOUT_SECS",
                get("AI_HTTP_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?),
            proxy_url: get("AI_PROXY_URL"),
        })
    }

    /// Check the settings needed to call the API.
    ///
    /// Returns the API key on success. A key without the usual `sk-` prefix is
    /// accepted with a warning.
    pub fn validate(&self) -> Result<&str> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            Error::configuration_with_context(
                "OPENAI_API_KEY is not set. Add it to your environment or .env file",
                ErrorContext::new()
                    .with_field_path("OPENAI_API_KEY")
                    .with_source("settings"),
            )
        })?;
        if !key.starts_with("sk-") {
            warn!("OPENAI_API_KEY does not start with 'sk-', it may be invalid");
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::configuration_with_context(
                "temperature must be between 0 and 2",
                ErrorContext::new()
                    .with_field_path("AI_TEMPERATURE")
                    .with_details(self.temperature.to_string())
                    .with_source("settings"),
            ));
        }
        Ok(key)
    }

    pub fn produce_options(&self) -> ProduceOptions {
        ProduceOptions {
            use_cache: true,
            max_corrections: self.max_corrections,
            settings: GenerationSettings {
                model: self.model.clone(),
                temperature: self.temperature,
                correction_temperature: 0.0,
            },
        }
    }

    /// Options for the design brief and image prompt steps, which always run
    /// at temperature 0 whatever `AI_TEMPERATURE` says.
    pub fn design_options(&self) -> ProduceOptions {
        self.produce_options().with_temperature(0.0)
    }

    pub fn image_options(&self) -> ImageOptions {
        ImageOptions {
            use_cache: true,
            model: self.image_model.clone(),
            size: self.image_size.clone(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|_| {
            Error::configuration_with_context(
                format!("invalid value for {}", name),
                ErrorContext::new()
                    .with_field_path(name)
                    .with_details(format!("got '{}'", raw))
                    .with_source("settings"),
            )
        }),
    }
}
