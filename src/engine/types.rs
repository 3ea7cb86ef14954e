// Request and result types for the panorama pipeline

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::fmt;
use stitcher::EncodedImage;

/// A panorama request as the front-end submits it
#[derive(Debug, Clone, PartialEq)]
pub struct PanoramaRequest {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    /// Image model; the configured default when absent
    pub model: Option<String>,
    /// Style seed for segment 0; the configured seed when absent
    pub seed: Option<u64>,
}

impl PanoramaRequest {
    pub fn new(prompt: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            prompt: prompt.into(),
            width,
            height,
            model: None,
            seed: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Final stitched panorama
#[derive(Debug, Clone)]
pub struct PanoramaResult {
    /// Lossless RGBA PNG
    pub image: EncodedImage,
    pub width: u32,
    pub height: u32,
    pub data_uri: DataUri,
    /// Full prompt sent to the image model
    pub prompt: String,
}

/// `data:<media type>;base64,<payload>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri(String);

impl DataUri {
    pub const PNG_MEDIA_TYPE: &'static str = "image/png";

    pub fn png(bytes: &[u8]) -> Self {
        Self(format!(
            "data:{};base64,{}",
            Self::PNG_MEDIA_TYPE,
            BASE64.encode(bytes)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn media_type(&self) -> &str {
        self.0
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(';'))
            .map(|(media_type, _)| media_type)
            .unwrap_or_default()
    }

    pub fn payload(&self) -> &str {
        self.0
            .split_once(";base64,")
            .map(|(_, payload)| payload)
            .unwrap_or_default()
    }

    /// Decode the payload back into bytes
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(self.payload())
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
