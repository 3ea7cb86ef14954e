// Error taxonomy for the panorama pipeline

use stitcher::StitchError;

/// Category of a pipeline failure, safe to show to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    InvalidInput,
    TranslationFailure,
    GenerationFailure,
    StitchFailure,
}

impl FailureKind {
    pub fn as_str(&self) -> &str {
        match self {
            FailureKind::InvalidInput => "invalid_input",
            FailureKind::TranslationFailure => "translation_failure",
            FailureKind::GenerationFailure => "generation_failure",
            FailureKind::StitchFailure => "stitch_failure",
        }
    }
}

/// Internal pipeline error, carries detail for logs
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Translation failed: {0}")]
    TranslationFailure(String),

    #[error("Generation failed: {0}")]
    GenerationFailure(String),

    #[error("Stitching failed: {0}")]
    StitchFailure(String),
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::InvalidInput(_) => FailureKind::InvalidInput,
            PipelineError::TranslationFailure(_) => FailureKind::TranslationFailure,
            PipelineError::GenerationFailure(_) => FailureKind::GenerationFailure,
            PipelineError::StitchFailure(_) => FailureKind::StitchFailure,
        }
    }
}

impl From<StitchError> for PipelineError {
    fn from(err: StitchError) -> Self {
        match err {
            StitchError::InvalidInput(msg) => PipelineError::InvalidInput(msg),
            StitchError::StitchFailure(msg) => PipelineError::StitchFailure(msg),
        }
    }
}

/// The only error the pipeline hands to its callers.
///
/// The message is fixed; the underlying cause is logged, not exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Image generation failed, please try again later")]
pub struct PanoramaGenerationFailed {
    kind: FailureKind,
}

impl PanoramaGenerationFailed {
    pub fn new(kind: FailureKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }
}

impl From<&PipelineError> for PanoramaGenerationFailed {
    fn from(err: &PipelineError) -> Self {
        Self::new(err.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stitch_errors_keep_their_category() {
        let invalid: PipelineError = StitchError::invalid("no segments").into();
        assert_eq!(invalid.kind(), FailureKind::InvalidInput);

        let failure: PipelineError = StitchError::failure("bad png").into();
        assert_eq!(failure.kind(), FailureKind::StitchFailure);
    }

    #[test]
    fn test_user_facing_error_hides_detail() {
        let internal = PipelineError::GenerationFailure("HTTP 404 at https://secret/asset".into());
        let public = PanoramaGenerationFailed::from(&internal);

        assert_eq!(public.kind(), FailureKind::GenerationFailure);
        assert!(!public.to_string().contains("secret"));
        assert!(!public.to_string().contains("404"));
    }
}
