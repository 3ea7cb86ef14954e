// Statistical color matching between tiles

use image::{Rgba, RgbaImage};

/// Deviation below which a channel is treated as flat
const FLAT_CHANNEL_EPSILON: f64 = 1e-6;

/// Per-channel mean and population standard deviation over RGB
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub mean: [f64; 3],
    pub std_dev: [f64; 3],
}

impl ChannelStats {
    pub fn of(image: &RgbaImage) -> Self {
        let count = (u64::from(image.width()) * u64::from(image.height())).max(1) as f64;

        let mut sum = [0.0f64; 3];
        for pixel in image.pixels() {
            for c in 0..3 {
                sum[c] += f64::from(pixel[c]);
            }
        }
        let mean = sum.map(|s| s / count);

        let mut squared = [0.0f64; 3];
        for pixel in image.pixels() {
            for c in 0..3 {
                let d = f64::from(pixel[c]) - mean[c];
                squared[c] += d * d;
            }
        }
        let std_dev = squared.map(|s| (s / count).sqrt());

        Self { mean, std_dev }
    }
}

/// Remap `source` so each RGB channel has the mean and deviation of `reference`.
///
/// `matched = (x - mean(source)) / std(source) * std(reference) + mean(reference)`,
/// computed over the whole image. Flat channels are only shifted. Alpha is kept.
pub fn match_colors(source: &RgbaImage, reference: &RgbaImage) -> RgbaImage {
    let from = ChannelStats::of(source);
    let to = ChannelStats::of(reference);

    let mut scale = [1.0f64; 3];
    for c in 0..3 {
        if from.std_dev[c] > FLAT_CHANNEL_EPSILON {
            scale[c] = to.std_dev[c] / from.std_dev[c];
        }
    }

    let mut matched = RgbaImage::new(source.width(), source.height());
    for (x, y, pixel) in source.enumerate_pixels() {
        let mut out = [0u8; 4];
        for c in 0..3 {
            let value = (f64::from(pixel[c]) - from.mean[c]) * scale[c] + to.mean[c];
            out[c] = value.round().clamp(0.0, 255.0) as u8;
        }
        out[3] = pixel[3];
        matched.put_pixel(x, y, Rgba(out));
    }
    matched
}
