//! Caller-facing one-shot operations.
//!
//! Each function builds an [`Orchestrator`] over the OpenAI-compatible
//! [`HttpTransport`] and a file cache, runs one artifact through it and
//! returns the validated result. Errors carry a display-ready
//! [`Error::user_message`](crate::Error::user_message).
//!
//! The API key and directories are arguments. The base URL, HTTP timeout and
//! proxy come from [`Settings::from_env`] (`OPENAI_BASE_URL`,
//! `AI_HTTP_TIMEOUT_SECS`, `AI_PROXY_URL`), so a malformed value is a
//! configuration error here just as it is for the binary.

pub mod prelude;

use crate::artifacts::{DesignBrief, GeneratedImage, ImagePrompt, ReportData};
use crate::cache::{CacheKey, CacheKind};
use crate::config::Settings;
use crate::hashing::fingerprint_text;
use crate::pipeline::{ImageOptions, Orchestrator, ProduceOptions};
use crate::transport::HttpTransport;
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn orchestrator(api_key: &str, cache_dir: &Path, assets_dir: &Path) -> Result<Orchestrator> {
    let settings = Settings::from_env()?;
    let transport = Arc::new(HttpTransport::with_options(
        settings.base_url,
        api_key,
        settings.http_timeout,
        settings.proxy_url.as_deref(),
    )?);
    Orchestrator::builder()
        .text_generator(transport.clone())
        .image_generator(transport)
        .cache_dir(cache_dir)
        .assets_dir(assets_dir)
        .build()
}

/// Build an orchestrator from loaded [`Settings`].
pub fn orchestrator_from_settings(settings: &Settings) -> Result<Orchestrator> {
    let api_key = settings.validate()?;
    let transport = Arc::new(HttpTransport::with_options(
        settings.base_url.clone(),
        api_key,
        settings.http_timeout,
        settings.proxy_url.as_deref(),
    )?);
    Orchestrator::builder()
        .text_generator(transport.clone())
        .image_generator(transport)
        .cache_dir(&settings.cache_dir)
        .assets_dir(&settings.assets_dir)
        .build()
}

/// Extract a client report from a dialogue transcript.
pub async fn extract_report(
    text: &str,
    model: &str,
    temperature: f32,
    api_key: &str,
    cache_dir: &Path,
    use_cache: bool,
) -> Result<ReportData> {
    let options = ProduceOptions::new()
        .with_model(model)
        .with_temperature(temperature)
        .with_cache(use_cache);
    orchestrator(api_key, cache_dir, cache_dir)?
        .produce(text, &options)
        .await
}

/// Extract a website design brief from a transcript. Always runs at temperature 0.
pub async fn extract_design_brief(
    text: &str,
    model: &str,
    api_key: &str,
    cache_dir: &Path,
    use_cache: bool,
) -> Result<DesignBrief> {
    let options = ProduceOptions::new().with_model(model).with_cache(use_cache);
    orchestrator(api_key, cache_dir, cache_dir)?
        .produce(text, &options)
        .await
}

/// Turn a design brief into a single-line image prompt of at most 900 characters.
pub async fn make_image_prompt(
    brief: &DesignBrief,
    model: &str,
    api_key: &str,
    cache_dir: &Path,
    use_cache: bool,
) -> Result<String> {
    let options = ProduceOptions::new().with_model(model).with_cache(use_cache);
    let prompt: ImagePrompt = orchestrator(api_key, cache_dir, cache_dir)?
        .produce_from(brief, &options)
        .await?;
    Ok(prompt.into_string())
}

/// Generate an image for `prompt` and return where it is stored.
///
/// The image is cached in `assets_dir` as `design_{fingerprint}.png`; an
/// existing file for the same prompt is reused.
pub async fn generate_image(
    prompt: &str,
    model: &str,
    size: &str,
    api_key: &str,
    assets_dir: &Path,
) -> Result<PathBuf> {
    let prompt = ImagePrompt::new(prompt).map_err(|e| {
        crate::Error::configuration_with_context(
            "invalid image prompt",
            crate::ErrorContext::new()
                .with_details(e.to_string())
                .with_source("generate_image"),
        )
    })?;
    let options = ImageOptions {
        use_cache: true,
        model: model.to_string(),
        size: size.to_string(),
    };
    let _image: GeneratedImage = orchestrator(api_key, assets_dir, assets_dir)?
        .produce_image(&prompt, &options)
        .await?;
    Ok(image_path(assets_dir, prompt.as_str()))
}

/// Path of the cached image for `prompt` under `assets_dir`.
pub fn image_path(assets_dir: &Path, prompt: &str) -> PathBuf {
    let key = CacheKey::new(CacheKind::Image, fingerprint_text(prompt));
    assets_dir.join(key.file_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_path_layout() {
        let path = image_path(Path::new("assets"), "a cosy bakery");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("design_"));
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), "design_".len() + 64 + ".png".len());
        assert_eq!(path.parent().unwrap(), Path::new("assets"));
    }
}
