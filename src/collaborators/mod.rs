// External services the pipeline depends on

mod censorship;
pub(crate) mod fetcher;
mod generator;
mod translator;

pub use censorship::WordListCensor;
pub use fetcher::HttpAssetFetcher;
pub use generator::OpenAiImageGenerator;
pub use translator::LlmTranslator;

use crate::engine::SizeDescriptor;
use async_trait::async_trait;

/// Maps arbitrary text to English
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String, CollaboratorError>;
}

/// Removes unwanted words from a prompt. Never fails.
pub trait Censor: Send + Sync {
    fn filter(&self, text: &str) -> String;
}

/// Turns a prompt into a reference to a generated image
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<AssetReference, CollaboratorError>;
}

/// Downloads a generated asset
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, CollaboratorError>;
}

/// One image generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub size: SizeDescriptor,
    pub seed: Option<u64>,
    pub model: String,
}

/// Where a generated image can be obtained
#[derive(Debug, Clone, PartialEq)]
pub enum AssetReference {
    /// Fetched with an HTTP GET
    Url(String),
    /// Returned inline by the API
    Inline(Vec<u8>),
}

#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Response missing {0}")]
    MissingField(&'static str),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<openai::ClientError> for CollaboratorError {
    fn from(err: openai::ClientError) -> Self {
        match err {
            openai::ClientError::Network(msg) => CollaboratorError::Network(msg),
            openai::ClientError::Status { status, url, body } => {
                tracing::debug!("{} answered {}: {}", url, status, body);
                CollaboratorError::Status { status, url }
            }
            openai::ClientError::Parse(msg) => CollaboratorError::InvalidResponse(msg),
        }
    }
}
