// stitcher - Panorama composition library
// Combines independently generated image tiles into one wide RGBA image

mod align;
mod blend;
mod color;
mod concat;
mod crop_fill;
mod mask;
mod plan;

pub mod error;

pub use align::{Aligner, FixedOffsetAligner};
pub use color::{match_colors, ChannelStats};
pub use error::{Result, StitchError};
pub use mask::GradientMask;
pub use plan::{BlendBand, CropRect, Placement, StitchPlan};

use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;
use std::sync::Arc;

/// Overlap fraction used when none is configured
pub const DEFAULT_OVERLAP_PERCENT: f32 = 0.25;

/// An encoded raster image (PNG, JPEG, WebP, ...).
///
/// The bytes are shared and never mutated; every transformation decodes
/// into a fresh pixel buffer and encodes a new `EncodedImage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Arc<[u8]>,
}

impl EncodedImage {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Arc::from(bytes.into()),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode into an RGBA pixel buffer
    pub fn decode(&self) -> Result<RgbaImage> {
        if self.bytes.is_empty() {
            return Err(StitchError::invalid("image has no data"));
        }

        let decoded = image::load_from_memory(&self.bytes)?.to_rgba8();
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(StitchError::invalid(format!(
                "image has zero dimension ({}x{})",
                decoded.width(),
                decoded.height()
            )));
        }

        Ok(decoded)
    }

    /// Encode an RGBA buffer as PNG
    pub fn encode_png(image: &RgbaImage) -> Result<Self> {
        let mut buffer = Vec::new();
        image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
        Ok(Self::new(buffer))
    }
}

/// One generated tile and its position in the panorama
#[derive(Debug, Clone)]
pub struct Segment {
    /// Ordinal position, 0 is leftmost
    pub index: usize,

    /// Encoded image data
    pub image: EncodedImage,

    /// Seed the generator was asked to use
    pub seed: Option<u64>,
}

impl Segment {
    pub fn new(index: usize, image: EncodedImage) -> Self {
        Self {
            index,
            image,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

/// How segments are laid out on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StitchStrategy {
    /// Main image plus a centered strip of a fill image, exactly two segments
    CropFill,

    /// Equal-size segments side by side, hard seams
    Concatenate,

    /// Color-matched segments blended across an aligned overlap band
    OverlapBlend {
        #[serde(default = "default_overlap_percent")]
        overlap_percent: f32,
    },
}

fn default_overlap_percent() -> f32 {
    DEFAULT_OVERLAP_PERCENT
}

impl StitchStrategy {
    pub fn as_str(&self) -> &str {
        match self {
            StitchStrategy::CropFill => "crop-fill",
            StitchStrategy::Concatenate => "concatenate",
            StitchStrategy::OverlapBlend { .. } => "overlap-blend",
        }
    }

    /// Number of segments the strategy requires, if it is fixed
    pub fn required_segments(&self) -> Option<usize> {
        match self {
            StitchStrategy::CropFill => Some(2),
            _ => None,
        }
    }
}

impl Default for StitchStrategy {
    fn default() -> Self {
        StitchStrategy::OverlapBlend {
            overlap_percent: DEFAULT_OVERLAP_PERCENT,
        }
    }
}

impl fmt::Display for StitchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StitchStrategy {
    type Err = StitchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "crop-fill" | "crop_fill" | "cropfill" => Ok(StitchStrategy::CropFill),
            "concatenate" | "concat" => Ok(StitchStrategy::Concatenate),
            "overlap-blend" | "overlap_blend" | "blend" => Ok(StitchStrategy::default()),
            other => Err(StitchError::invalid(format!(
                "unknown stitch strategy '{}'",
                other
            ))),
        }
    }
}

/// Canvas produced by a strategy, with the layout that produced it
#[derive(Debug, Clone)]
pub struct Composition {
    pub canvas: RgbaImage,
    pub plan: StitchPlan,
}

/// Composes segments with the configured strategy
#[derive(Clone)]
pub struct Stitcher {
    strategy: StitchStrategy,
    aligner: Arc<dyn Aligner>,
}

impl Stitcher {
    /// Create a stitcher using the fixed-offset alignment stub
    pub fn new(strategy: StitchStrategy) -> Self {
        Self {
            strategy,
            aligner: Arc::new(FixedOffsetAligner),
        }
    }

    /// Replace the alignment step used by the overlap-blend strategy
    pub fn with_aligner(mut self, aligner: impl Aligner + 'static) -> Self {
        self.aligner = Arc::new(aligner);
        self
    }

    pub fn strategy(&self) -> StitchStrategy {
        self.strategy
    }

    /// Stitch segments and encode the result as PNG
    pub fn stitch(&self, segments: &[Segment], target_width: u32) -> Result<EncodedImage> {
        let composition = self.compose(segments, target_width)?;
        EncodedImage::encode_png(&composition.canvas)
    }

    /// Stitch segments into an RGBA canvas without encoding
    pub fn compose(&self, segments: &[Segment], target_width: u32) -> Result<Composition> {
        if segments.is_empty() {
            return Err(StitchError::invalid("no segments to stitch"));
        }

        let mut ordered: Vec<&Segment> = segments.iter().collect();
        ordered.sort_by_key(|segment| segment.index);
        if ordered.windows(2).any(|pair| pair[0].index == pair[1].index) {
            return Err(StitchError::invalid("duplicate segment index"));
        }
        // ordinals must run 0..N-1 so placement indices name the segments they place
        if let Some((position, segment)) = ordered
            .iter()
            .enumerate()
            .find(|(position, segment)| segment.index != *position)
        {
            return Err(StitchError::invalid(format!(
                "segment indices must run 0..{}, found {} at position {}",
                ordered.len(),
                segment.index,
                position
            )));
        }

        let images = ordered
            .iter()
            .map(|segment| segment.image.decode())
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "Composing {} segment(s) with {} strategy, target width {}",
            images.len(),
            self.strategy,
            target_width
        );

        let composition = match self.strategy {
            StitchStrategy::CropFill => crop_fill::compose(&images, target_width)?,
            StitchStrategy::Concatenate => concat::compose(&images)?,
            StitchStrategy::OverlapBlend { overlap_percent } => blend::compose(
                &images,
                target_width,
                overlap_percent,
                self.aligner.as_ref(),
            )?,
        };

        composition.plan.validate()?;
        Ok(composition)
    }
}

impl fmt::Debug for Stitcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stitcher")
            .field("strategy", &self.strategy)
            .field("aligner", &self.aligner.name())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use image::Rgba;

    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(rgba))
    }

    pub fn segment(index: usize, image: &RgbaImage) -> Segment {
        Segment::new(index, EncodedImage::encode_png(image).unwrap())
    }
}
