// Panorama pipeline - prompt preparation, segment generation and stitching

use super::prompt::{build_full_prompt, is_english};
use super::requester::SegmentRequester;
use super::size::select_size;
use super::types::{DataUri, PanoramaRequest, PanoramaResult};
use crate::collaborators::{
    AssetFetcher, Censor, HttpAssetFetcher, ImageGenerator, LlmTranslator, OpenAiImageGenerator,
    Translator, WordListCensor,
};
use crate::config::{ConfigError, PanoramaConfig, is_known_model};
use crate::error::{PanoramaGenerationFailed, PipelineError};
use openai::OpenAiClient;
use std::sync::Arc;
use stitcher::{EncodedImage, StitchError, StitchStrategy, Stitcher};

/// External services wired into a pipeline
#[derive(Clone)]
pub struct Collaborators {
    pub translator: Arc<dyn Translator>,
    pub censor: Arc<dyn Censor>,
    pub generator: Arc<dyn ImageGenerator>,
    pub fetcher: Arc<dyn AssetFetcher>,
}

/// Turns a free-text prompt and a requested size into a stitched panorama
pub struct PanoramaPipeline {
    translator: Arc<dyn Translator>,
    censor: Arc<dyn Censor>,
    requester: SegmentRequester,
    stitcher: Stitcher,
    config: PanoramaConfig,
}

impl PanoramaPipeline {
    pub fn new(config: PanoramaConfig, collaborators: Collaborators) -> Self {
        let stitcher = Stitcher::new(config.stitch.strategy);
        Self {
            translator: collaborators.translator,
            censor: collaborators.censor,
            requester: SegmentRequester::new(collaborators.generator, collaborators.fetcher),
            stitcher,
            config,
        }
    }

    /// Build a pipeline talking to the configured OpenAI-compatible endpoint
    pub fn from_config(config: &PanoramaConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.api.timeout())
            .build()
            .map_err(|e| ConfigError::Http(e.to_string()))?;

        let base_url = config.api.resolved_base_url();
        let mut client = OpenAiClient::new(&base_url).with_http_client(http.clone());
        match config.api.api_key() {
            Some(key) => client = client.with_api_key(key),
            None => tracing::warn!(
                "{} is not set, requests to {} are unauthenticated",
                config.api.api_key_env,
                base_url
            ),
        }

        let collaborators = Collaborators {
            translator: Arc::new(LlmTranslator::new(
                client.clone(),
                &config.models.translation,
                &config.models.translation_instructions,
            )),
            censor: Arc::new(WordListCensor::new().with_words(&config.censorship.extra_words)),
            generator: Arc::new(OpenAiImageGenerator::new(client)),
            fetcher: Arc::new(HttpAssetFetcher::new(http)),
        };

        Ok(Self::new(config.clone(), collaborators))
    }

    /// Swap the stitcher, e.g. to plug in a different aligner
    pub fn with_stitcher(mut self, stitcher: Stitcher) -> Self {
        self.stitcher = stitcher;
        self
    }

    pub fn config(&self) -> &PanoramaConfig {
        &self.config
    }

    /// Generate a panorama and return it as a PNG data URI
    pub async fn generate_panorama(
        &self,
        prompt: &str,
        width: u32,
        height: u32,
        model: Option<&str>,
    ) -> Result<DataUri, PanoramaGenerationFailed> {
        let mut request = PanoramaRequest::new(prompt, width, height);
        request.model = model.map(str::to_string);
        self.generate(&request).await.map(|result| result.data_uri)
    }

    /// Run the full pipeline.
    ///
    /// Internal failures are logged; callers only see a fixed-message error
    /// carrying the failure category.
    pub async fn generate(
        &self,
        request: &PanoramaRequest,
    ) -> Result<PanoramaResult, PanoramaGenerationFailed> {
        self.run(request).await.map_err(|e| {
            tracing::error!("Panorama generation failed ({}): {}", e.kind().as_str(), e);
            PanoramaGenerationFailed::from(&e)
        })
    }

    async fn run(&self, request: &PanoramaRequest) -> Result<PanoramaResult, PipelineError> {
        let subject = request.prompt.trim();
        if subject.is_empty() {
            return Err(PipelineError::InvalidInput("prompt is empty".into()));
        }
        if request.width == 0 || request.height == 0 {
            return Err(PipelineError::InvalidInput(format!(
                "requested size {}x{} has a zero dimension",
                request.width, request.height
            )));
        }

        let english = if is_english(subject) {
            subject.to_string()
        } else {
            tracing::debug!("Prompt is not plain English, translating");
            self.translator
                .translate(subject)
                .await
                .map_err(|e| PipelineError::TranslationFailure(e.to_string()))?
        };

        let sanitized = self.censor.filter(&english);
        let full_prompt = build_full_prompt(&self.config.prompt, &sanitized);
        let size = select_size(request.width, request.height);

        let model = request
            .model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .unwrap_or(self.config.models.image.as_str());
        if !is_known_model(model) {
            tracing::warn!("Model '{}' is not a known image model, passing it through", model);
        }

        let strategy = self.stitcher.strategy();
        let count = strategy
            .required_segments()
            .unwrap_or(self.config.stitch.segment_count());
        let style_seed = request.seed.or(self.config.stitch.style_seed);

        tracing::info!("Generating panorama: {}", full_prompt);

        let segments = self
            .requester
            .request_segments(&full_prompt, count, size, model, style_seed)
            .await?;

        let target_width = match strategy {
            StitchStrategy::CropFill => {
                (size.width() as f32 * self.config.stitch.crop_fill_width_factor).floor() as u32
            }
            _ => size.width(),
        };

        let composer = self.stitcher.clone();
        let (image, width, height) = tokio::task::spawn_blocking(move || {
            let composition = composer.compose(&segments, target_width)?;
            let (width, height) = composition.canvas.dimensions();
            let encoded = EncodedImage::encode_png(&composition.canvas)?;
            Ok::<_, StitchError>((encoded, width, height))
        })
        .await
        .map_err(|e| PipelineError::StitchFailure(format!("stitch task aborted: {}", e)))??;

        tracing::info!("Panorama ready: {}x{} ({} bytes)", width, height, image.len());

        Ok(PanoramaResult {
            data_uri: DataUri::png(image.as_bytes()),
            image,
            width,
            height,
            prompt: full_prompt,
        })
    }
}
