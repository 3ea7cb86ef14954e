// Error types for stitcher

use thiserror::Error;

/// Result type for stitcher operations
pub type Result<T> = std::result::Result<T, StitchError>;

/// Errors that can occur while composing a panorama
#[derive(Error, Debug)]
pub enum StitchError {
    /// Degenerate input: empty segment list, wrong segment count for a
    /// strategy, zero or mismatched dimensions
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Decode, composite or encode failure
    #[error("Stitch failure: {0}")]
    StitchFailure(String),
}

impl StitchError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        StitchError::InvalidInput(msg.into())
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        StitchError::StitchFailure(msg.into())
    }
}

impl From<image::ImageError> for StitchError {
    fn from(err: image::ImageError) -> Self {
        StitchError::StitchFailure(err.to_string())
    }
}
