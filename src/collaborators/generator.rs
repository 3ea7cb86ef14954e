// Image generation through the images API

use super::{AssetReference, CollaboratorError, GenerationRequest, ImageGenerator};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use openai::{ImageData, ImageGenerationRequest, OpenAiClient};

/// Requests one image per call from `POST /images/generations`
pub struct OpenAiImageGenerator {
    client: OpenAiClient,
}

impl OpenAiImageGenerator {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<AssetReference, CollaboratorError> {
        let api_request = ImageGenerationRequest {
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            n: 1,
            size: request.size.as_str().to_string(),
            seed: request.seed,
        };

        let response = self.client.generate_images(&api_request).await?;
        let image = response
            .data
            .into_iter()
            .next()
            .ok_or(CollaboratorError::MissingField("data[0]"))?;

        asset_reference(image)
    }
}

/// Prefer the URL; fall back to an inline base64 payload
fn asset_reference(image: ImageData) -> Result<AssetReference, CollaboratorError> {
    if let Some(url) = image.url.filter(|url| !url.trim().is_empty()) {
        return Ok(AssetReference::Url(url));
    }

    match image.b64_json.filter(|b64| !b64.trim().is_empty()) {
        Some(b64) => BASE64
            .decode(b64.trim())
            .map(AssetReference::Inline)
            .map_err(|e| CollaboratorError::InvalidResponse(format!("bad b64_json: {}", e))),
        None => Err(CollaboratorError::MissingField("data[0].url")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(url: Option<&str>, b64: Option<&str>) -> ImageData {
        ImageData {
            url: url.map(str::to_string),
            b64_json: b64.map(str::to_string),
            revised_prompt: None,
        }
    }

    #[test]
    fn test_url_preferred() {
        let reference = asset_reference(data(Some("https://cdn/a.png"), Some("AAAA"))).unwrap();
        assert_eq!(reference, AssetReference::Url("https://cdn/a.png".into()));
    }

    #[test]
    fn test_inline_payload_decoded() {
        let reference = asset_reference(data(None, Some("iVBORw=="))).unwrap();
        assert_eq!(reference, AssetReference::Inline(vec![0x89, 0x50, 0x4e, 0x47]));
    }

    #[test]
    fn test_missing_reference_is_error() {
        assert!(matches!(
            asset_reference(data(Some("  "), None)),
            Err(CollaboratorError::MissingField(_))
        ));
        assert!(matches!(
            asset_reference(data(None, Some("not base64!"))),
            Err(CollaboratorError::InvalidResponse(_))
        ));
    }
}
