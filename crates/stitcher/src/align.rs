// Alignment step for overlap blending

use image::RgbaImage;

/// Decides how far an incoming segment is pulled back over the composite.
///
/// `window` is the overlap search region, already clamped to both widths.
/// The returned offset is the number of shared columns and must not exceed
/// `window`.
pub trait Aligner: Send + Sync {
    fn name(&self) -> &str;

    fn offset(&self, composite: &RgbaImage, next: &RgbaImage, window: u32) -> u32;
}

/// Placeholder alignment: always half of the overlap window.
///
/// No image content is inspected. Swap in a real matcher through
/// [`crate::Stitcher::with_aligner`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedOffsetAligner;

impl Aligner for FixedOffsetAligner {
    fn name(&self) -> &str {
        "fixed-offset"
    }

    fn offset(&self, _composite: &RgbaImage, _next: &RgbaImage, window: u32) -> u32 {
        window / 2
    }
}
