// Generation sizes supported by the image API

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the fixed output sizes the image API accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeDescriptor {
    #[serde(rename = "256x256")]
    Square256,
    #[serde(rename = "512x512")]
    Square512,
    #[serde(rename = "1024x1024")]
    Square1024,
    #[serde(rename = "1792x1024")]
    Landscape1792,
    #[serde(rename = "1024x1792")]
    Portrait1792,
}

impl SizeDescriptor {
    /// All sizes in selection priority order
    pub const ALL: [SizeDescriptor; 5] = [
        SizeDescriptor::Square256,
        SizeDescriptor::Square512,
        SizeDescriptor::Square1024,
        SizeDescriptor::Landscape1792,
        SizeDescriptor::Portrait1792,
    ];

    /// Returned when a request exceeds every supported size
    pub const FALLBACK: SizeDescriptor = SizeDescriptor::ALL[0];

    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            SizeDescriptor::Square256 => (256, 256),
            SizeDescriptor::Square512 => (512, 512),
            SizeDescriptor::Square1024 => (1024, 1024),
            SizeDescriptor::Landscape1792 => (1792, 1024),
            SizeDescriptor::Portrait1792 => (1024, 1792),
        }
    }

    /// Wire form, e.g. `1792x1024`
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeDescriptor::Square256 => "256x256",
            SizeDescriptor::Square512 => "512x512",
            SizeDescriptor::Square1024 => "1024x1024",
            SizeDescriptor::Landscape1792 => "1792x1024",
            SizeDescriptor::Portrait1792 => "1024x1792",
        }
    }

    fn fits(&self, width: u32, height: u32) -> bool {
        let (w, h) = self.dimensions();
        width <= w && height <= h
    }
}

impl fmt::Display for SizeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeDescriptor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        SizeDescriptor::ALL
            .into_iter()
            .find(|size| size.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unsupported size '{}'", s))
    }
}

/// Pick the first supported size that covers the request.
///
/// Requests larger than every supported size get [`SizeDescriptor::FALLBACK`]
/// instead of an error. The downgrade is lossy: the caller still
/// gets an image, just a smaller one.
pub fn select_size(width: u32, height: u32) -> SizeDescriptor {
    SizeDescriptor::ALL
        .into_iter()
        .find(|size| size.fits(width, height))
        .unwrap_or_else(|| {
            tracing::warn!(
                "Requested {}x{} exceeds every supported size, falling back to {}",
                width,
                height,
                SizeDescriptor::FALLBACK
            );
            SizeDescriptor::FALLBACK
        })
}
