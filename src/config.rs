//! Configuration file support for the panorama renderer

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use stitcher::StitchStrategy;

/// Image models the web front-end offered. The API decides what it accepts.
pub const KNOWN_IMAGE_MODELS: &[&str] = &[
    "dall-e-3", "fluxdev", "fluxpro", "flux", "sd35", "sd3", "comic", "sdxlpro", "sdxl", "sd2",
    "智谱", "通义", "星火",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PanoramaConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub models: ModelConfig,
    #[serde(default)]
    pub stitch: StitchConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub censorship: CensorshipConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API base URL, overridden by `OPENAI_API_URL`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout for API calls and asset downloads
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Image model used when a request names none
    #[serde(default = "default_image_model")]
    pub image: String,

    /// Chat model used for prompt translation
    #[serde(default = "default_translation_model")]
    pub translation: String,

    #[serde(default = "default_translation_instructions")]
    pub translation_instructions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StitchConfig {
    #[serde(default)]
    pub strategy: StitchStrategy,

    /// Segment count for strategies that accept any number
    #[serde(default = "default_segments")]
    pub segments: usize,

    /// Crop-fill canvas width as a multiple of the generated segment width
    /// (the selected size), not of the requested width
    #[serde(default = "default_crop_fill_width_factor")]
    pub crop_fill_width_factor: f32,

    /// Seed for segment 0; segment i uses `style_seed + i`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Phrases placed before the user prompt
    #[serde(default = "default_prompt_prefix")]
    pub prefix: Vec<String>,

    /// Phrases placed after the user prompt
    #[serde(default = "default_prompt_suffix")]
    pub suffix: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CensorshipConfig {
    /// Words removed in addition to the built-in list
    #[serde(default)]
    pub extra_words: Vec<String>,
}

// Defaults

fn default_base_url() -> String {
    openai::DEFAULT_BASE_URL.to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_image_model() -> String {
    "comic".to_string()
}

fn default_translation_model() -> String {
    "comic-c".to_string()
}

fn default_translation_instructions() -> String {
    "You are a translator. Translate the following text to English.".to_string()
}

fn default_segments() -> usize {
    2
}

fn default_crop_fill_width_factor() -> f32 {
    1.5
}

fn default_prompt_prefix() -> Vec<String> {
    vec!["HDRI panoramic view of TOK".to_string()]
}

fn default_prompt_suffix() -> Vec<String> {
    vec!["highly detailed".to_string(), "intricate details".to_string()]
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            image: default_image_model(),
            translation: default_translation_model(),
            translation_instructions: default_translation_instructions(),
        }
    }
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            strategy: StitchStrategy::default(),
            segments: default_segments(),
            crop_fill_width_factor: default_crop_fill_width_factor(),
            style_seed: None,
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            prefix: default_prompt_prefix(),
            suffix: default_prompt_suffix(),
        }
    }
}

impl ApiConfig {
    /// Environment variable that overrides `base_url`
    pub const BASE_URL_ENV: &'static str = "OPENAI_API_URL";

    /// Base URL after applying the environment override
    pub fn resolved_base_url(&self) -> String {
        std::env::var(Self::BASE_URL_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| self.base_url.clone())
    }

    /// API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl StitchConfig {
    /// Segments to request for the configured strategy
    pub fn segment_count(&self) -> usize {
        self.strategy.required_segments().unwrap_or(self.segments)
    }
}

impl PanoramaConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: PanoramaConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path.as_ref(), contents)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.as_ref().display(), e)))
    }

    /// Default location: `<config dir>/panorama/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("panorama").join("config.toml"))
    }

    /// Load an explicit file, else the default location if present, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path().filter(|path| path.is_file()) {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stitch.segment_count() == 0 {
            return Err(ConfigError::Invalid("stitch.segments must be at least 1".into()));
        }
        if let StitchStrategy::OverlapBlend { overlap_percent } = self.stitch.strategy {
            if !(0.0..1.0).contains(&overlap_percent) {
                return Err(ConfigError::Invalid(format!(
                    "stitch.strategy.overlap_percent must be in [0, 1), got {}",
                    overlap_percent
                )));
            }
        }
        let factor = self.stitch.crop_fill_width_factor;
        if factor.is_nan() || factor <= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "stitch.crop_fill_width_factor must be greater than 1, got {}",
                factor
            )));
        }
        if self.models.image.trim().is_empty() {
            return Err(ConfigError::Invalid("models.image must not be empty".into()));
        }
        Ok(())
    }
}

pub fn is_known_model(model: &str) -> bool {
    KNOWN_IMAGE_MODELS.contains(&model)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("HTTP client error: {0}")]
    Http(String),
}
