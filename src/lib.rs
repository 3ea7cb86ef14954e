//! Panorama generation.
//!
//! A free-text prompt is translated to English when needed, filtered, wrapped
//! in the configured style phrases and sent to an image model once per
//! segment. The segments are stitched into a single wide PNG and returned as
//! a `data:` URI.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use panorama::{PanoramaConfig, PanoramaPipeline};
//!
//! let config = PanoramaConfig::load(None)?;
//! let pipeline = PanoramaPipeline::from_config(&config)?;
//! let uri = pipeline
//!     .generate_panorama("a quiet beach at sunset", 1792, 1024, None)
//!     .await?;
//! println!("{}", uri);
//! # Ok(())
//! # }
//! ```

pub mod collaborators;
pub mod config;
pub mod engine;
pub mod error;

pub use config::{ConfigError, PanoramaConfig};
pub use engine::{
    Collaborators, DataUri, PanoramaPipeline, PanoramaRequest, PanoramaResult, SizeDescriptor,
    select_size,
};
pub use error::{FailureKind, PanoramaGenerationFailed, PipelineError};
pub use stitcher::{EncodedImage, Segment, StitchStrategy, Stitcher};
