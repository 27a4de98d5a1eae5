use super::attempt::{AttemptContext, AttemptOutcome};
use crate::artifacts::{ArtifactKind, GeneratedImage, ImagePrompt};
use crate::cache::{CacheBackend, CacheKind, CacheStore, FileCache};
use crate::error::{Error, ErrorContext};
use crate::error_code::TransportErrorCode;
use crate::hashing::{fingerprint_text, to_canonical_json, Fingerprint};
use crate::structured::SchemaValidator;
use crate::telemetry::{default_observer, PipelineEvent, PipelineObserver};
use crate::transport::{GenerationRequest, ImageGenerator, ImageRequest, TextGenerator, TransportError};
use crate::Result;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info_span, Instrument};
use uuid::Uuid;

pub const DEFAULT_MAX_CORRECTIONS: u32 = 2;
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_IMAGE_MODEL: &str = "gpt-image-1";
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

/// Model parameters for text generation calls.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    /// Temperature of correction calls.
    pub correction_temperature: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            correction_temperature: 0.0,
        }
    }
}

/// Per-call options for [`Orchestrator::produce`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProduceOptions {
    pub use_cache: bool,
    pub max_corrections: u32,
    pub settings: GenerationSettings,
}

impl Default for ProduceOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            max_corrections: DEFAULT_MAX_CORRECTIONS,
            settings: GenerationSettings::default(),
        }
    }
}

impl ProduceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.settings.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.settings.temperature = temperature;
        self
    }

    pub fn with_correction_temperature(mut self, temperature: f32) -> Self {
        self.settings.correction_temperature = temperature;
        self
    }

    pub fn with_max_corrections(mut self, max_corrections: u32) -> Self {
        self.max_corrections = max_corrections;
        self
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }
}

/// Options for [`Orchestrator::produce_image`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOptions {
    pub use_cache: bool,
    pub model: String,
    pub size: String,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            model: DEFAULT_IMAGE_MODEL.to_string(),
            size: DEFAULT_IMAGE_SIZE.to_string(),
        }
    }
}

/// Cache-aware generate, validate and correct loop.
///
/// ```text
/// CacheCheck ─hit──────────────────────────────────────► Done
///     │miss
///     ▼
/// Generate ─► Validate ─valid─► Persist ───────────────► Done
///                 │invalid
///                 ▼
///           budget left? ─yes─► Correct ─► Validate ...
///                 │no
///                 ▼
///              Failed
/// ```
///
/// Transport failures abort at whatever attempt they occur.
pub struct Orchestrator {
    text: Arc<dyn TextGenerator>,
    images: Option<Arc<dyn ImageGenerator>>,
    cache: CacheStore,
    validator: SchemaValidator,
    observer: Arc<dyn PipelineObserver>,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Produce an artifact from raw text input, keyed by the text's fingerprint.
    pub async fn produce<K: ArtifactKind>(&self, input: &str, options: &ProduceOptions) -> Result<K> {
        let fingerprint = fingerprint_text(input);
        self.produce_keyed::<K>(&fingerprint, input, options).await
    }

    /// Produce an artifact from structured input.
    ///
    /// The input is serialized to canonical JSON, which is both hashed for the
    /// cache key and sent as the user input.
    pub async fn produce_from<K: ArtifactKind, S: Serialize>(&self, source: &S, options: &ProduceOptions) -> Result<K> {
        let value = serde_json::to_value(source)?;
        let canonical = to_canonical_json(&value);
        let fingerprint = fingerprint_text(&canonical);
        self.produce_keyed::<K>(&fingerprint, &canonical, options).await
    }

    /// Produce an artifact under an explicit fingerprint.
    pub async fn produce_keyed<K: ArtifactKind>(
        &self,
        fingerprint: &Fingerprint,
        input: &str,
        options: &ProduceOptions,
    ) -> Result<K> {
        let span = info_span!(
            "produce",
            run_id = %Uuid::new_v4(),
            kind = %K::KIND,
            fingerprint = %fingerprint.short()
        );
        self.run::<K>(fingerprint, input, options).instrument(span).await
    }

    async fn run<K: ArtifactKind>(&self, fingerprint: &Fingerprint, input: &str, options: &ProduceOptions) -> Result<K> {
        if options.use_cache {
            // Read failures are reported by the store and fall through to generation.
            if let Ok(Some(hit)) = self.cache.load::<K>(fingerprint).await {
                return Ok(hit);
            }
        }

        let settings = &options.settings;
        let mut ctx = AttemptContext::new(fingerprint.clone(), options.max_corrections);
        let mut request = GenerationRequest::prompt(
            K::system_prompt(),
            K::user_prompt(input),
            settings.model.clone(),
            settings.temperature,
        );

        loop {
            match self.attempt::<K>(&request, &ctx).await {
                AttemptOutcome::Valid(artifact) => {
                    self.observer.on_event(&PipelineEvent::ArtifactProduced {
                        kind: K::KIND,
                        attempts: ctx.attempt,
                    });
                    if options.use_cache {
                        // A failed write is reported by the store and never fails the call.
                        let _ = self.cache.store(fingerprint, &artifact).await;
                    }
                    return Ok(artifact);
                }
                AttemptOutcome::TransportFailure(error) => {
                    self.observer.on_event(&PipelineEvent::TransportFailed {
                        kind: K::KIND,
                        attempt: ctx.attempt,
                        error: error.clone(),
                    });
                    return Err(Error::Generation(error));
                }
                AttemptOutcome::SchemaInvalid(error) => {
                    if !ctx.can_correct() {
                        self.observer.on_event(&PipelineEvent::CorrectionsExhausted {
                            kind: K::KIND,
                            attempts: ctx.attempt,
                            error: error.clone(),
                        });
                        return Err(Error::CorrectionsExhausted {
                            attempts: ctx.attempt,
                            last_error: error,
                        });
                    }
                    request = GenerationRequest::single(
                        K::correction_prompt(input, &error),
                        settings.model.clone(),
                        settings.correction_temperature,
                    );
                    ctx.advance(error);
                }
            }
        }
    }

    async fn attempt<K: ArtifactKind>(&self, request: &GenerationRequest, ctx: &AttemptContext) -> AttemptOutcome<K> {
        self.observer.on_event(&PipelineEvent::GenerationStarted {
            kind: K::KIND,
            attempt: ctx.attempt,
            max_attempts: ctx.max_attempts,
            correction: ctx.is_correction(),
        });

        let start = Instant::now();
        let raw = match self.text.complete(request).await {
            Ok(raw) => raw,
            Err(e) => return AttemptOutcome::TransportFailure(e),
        };
        self.observer.on_event(&PipelineEvent::GenerationCompleted {
            kind: K::KIND,
            attempt: ctx.attempt,
            elapsed: start.elapsed(),
            response_len: raw.len(),
        });

        match self.validator.validate::<K>(&raw, ctx.attempt) {
            Ok(artifact) => AttemptOutcome::Valid(artifact),
            Err(e) => AttemptOutcome::SchemaInvalid(e),
        }
    }

    /// Produce image bytes for a prompt.
    ///
    /// A single generation call with no correction loop; the result is cached
    /// whenever it is non-empty.
    pub async fn produce_image(&self, prompt: &ImagePrompt, options: &ImageOptions) -> Result<GeneratedImage> {
        let images = self.images.as_ref().ok_or_else(|| {
            Error::configuration_with_context(
                "no image generator configured",
                ErrorContext::new().with_source("orchestrator"),
            )
        })?;

        let fingerprint = fingerprint_text(prompt.as_str());
        let span = info_span!(
            "produce",
            run_id = %Uuid::new_v4(),
            kind = %CacheKind::Image,
            fingerprint = %fingerprint.short()
        );

        async move {
            if options.use_cache {
                if let Ok(Some(hit)) = self.cache.load::<GeneratedImage>(&fingerprint).await {
                    return Ok(hit);
                }
            }

            self.observer.on_event(&PipelineEvent::GenerationStarted {
                kind: CacheKind::Image,
                attempt: 1,
                max_attempts: 1,
                correction: false,
            });
            let request = ImageRequest {
                prompt: prompt.as_str().to_string(),
                model: options.model.clone(),
                size: options.size.clone(),
            };
            let start = Instant::now();
            let bytes = images.generate_image(&request).await.and_then(|bytes| {
                if bytes.is_empty() {
                    Err(TransportError::new(
                        TransportErrorCode::MalformedResponse,
                        "image payload is empty",
                    ))
                } else {
                    Ok(bytes)
                }
            });
            let bytes = match bytes {
                Ok(bytes) => bytes,
                Err(error) => {
                    self.observer.on_event(&PipelineEvent::TransportFailed {
                        kind: CacheKind::Image,
                        attempt: 1,
                        error: error.clone(),
                    });
                    return Err(Error::Generation(error));
                }
            };
            self.observer.on_event(&PipelineEvent::GenerationCompleted {
                kind: CacheKind::Image,
                attempt: 1,
                elapsed: start.elapsed(),
                response_len: bytes.len(),
            });

            let image = GeneratedImage::new(bytes);
            self.observer.on_event(&PipelineEvent::ArtifactProduced {
                kind: CacheKind::Image,
                attempts: 1,
            });
            if options.use_cache {
                let _ = self.cache.store(&fingerprint, &image).await;
            }
            Ok(image)
        }
        .instrument(span)
        .await
    }
}

/// Builder for [`Orchestrator`].
///
/// The same observer is handed to the cache store and the validator.
pub struct OrchestratorBuilder {
    text: Option<Arc<dyn TextGenerator>>,
    images: Option<Arc<dyn ImageGenerator>>,
    backend: Option<Arc<dyn CacheBackend>>,
    cache_dir: PathBuf,
    assets_dir: PathBuf,
    observer: Arc<dyn PipelineObserver>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            text: None,
            images: None,
            backend: None,
            cache_dir: PathBuf::from("cache/ai_outputs"),
            assets_dir: PathBuf::from("assets"),
            observer: default_observer(),
        }
    }

    pub fn text_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.text = Some(generator);
        self
    }

    pub fn image_generator(mut self, generator: Arc<dyn ImageGenerator>) -> Self {
        self.images = Some(generator);
        self
    }

    /// Directory for structured and prompt artifacts.
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Directory for generated images.
    pub fn assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = dir.into();
        self
    }

    /// Use a custom backend instead of files under `cache_dir`/`assets_dir`.
    pub fn cache_backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Inject an observer. Default forwards to `tracing`.
    pub fn observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn build(self) -> Result<Orchestrator> {
        let text = self.text.ok_or_else(|| {
            Error::configuration_with_context(
                "a text generator is required",
                ErrorContext::new().with_source("orchestrator_builder"),
            )
        })?;

        let backend = match self.backend {
            Some(backend) => backend,
            None => Arc::new(
                FileCache::new(self.cache_dir).with_kind_dir(CacheKind::Image, self.assets_dir),
            ),
        };

        Ok(Orchestrator {
            text,
            images: self.images,
            cache: CacheStore::new(backend, self.observer.clone()),
            validator: SchemaValidator::new(self.observer.clone()),
            observer: self.observer,
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
