// Concatenate: equal-size segments side by side

use crate::error::{Result, StitchError};
use crate::plan::{Placement, StitchPlan};
use crate::Composition;
use image::{imageops, RgbaImage};

pub(crate) fn compose(images: &[RgbaImage]) -> Result<Composition> {
    let first = images
        .first()
        .ok_or_else(|| StitchError::invalid("no segments to concatenate"))?;
    let (width, height) = first.dimensions();

    if let Some((index, odd)) = images
        .iter()
        .enumerate()
        .find(|(_, image)| image.dimensions() != (width, height))
    {
        return Err(StitchError::invalid(format!(
            "segment {} is {}x{}, expected {}x{}",
            index,
            odd.width(),
            odd.height(),
            width,
            height
        )));
    }

    let count = u32::try_from(images.len())
        .map_err(|_| StitchError::invalid("too many segments"))?;
    let canvas_width = width
        .checked_mul(count)
        .ok_or_else(|| StitchError::invalid("panorama too wide"))?;

    let mut canvas = RgbaImage::new(canvas_width, height);
    let mut plan = StitchPlan::new(canvas_width, height);

    for (index, image) in images.iter().enumerate() {
        let left = index as u32 * width;
        imageops::replace(&mut canvas, image, i64::from(left), 0);
        plan.push(Placement::new(index, left, 0, width, height));
    }

    Ok(Composition { canvas, plan })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn patterned(width: u32, height: u32, seed: u8) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([seed, x as u8, y as u8, 255 - seed])
        })
    }

    #[test]
    fn test_segments_copied_unmodified_at_multiples_of_width() {
        let images: Vec<RgbaImage> = (0..3).map(|i| patterned(5, 4, i * 40)).collect();

        let composition = compose(&images).unwrap();

        assert_eq!(composition.canvas.dimensions(), (15, 4));
        for (i, image) in images.iter().enumerate() {
            for (x, y, pixel) in image.enumerate_pixels() {
                assert_eq!(composition.canvas.get_pixel(i as u32 * 5 + x, y), pixel);
            }
        }
        let lefts: Vec<u32> = composition.plan.placements.iter().map(|p| p.left).collect();
        assert_eq!(lefts, vec![0, 5, 10]);
        assert_eq!(composition.plan.total_overlap(), 0);
    }

    #[test]
    fn test_single_segment_is_identity() {
        let image = patterned(6, 3, 7);
        let composition = compose(std::slice::from_ref(&image)).unwrap();
        assert_eq!(composition.canvas, image);
    }

    #[test]
    fn test_mismatched_sizes_rejected() {
        let images = vec![patterned(4, 4, 0), patterned(4, 5, 0)];
        let err = compose(&images).unwrap_err();
        assert!(matches!(err, StitchError::InvalidInput(_)));
    }

    #[test]
    fn test_translucent_pixels_preserved() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([90, 60, 30, 128]));
        let composition = compose(&[image.clone(), image]).unwrap();
        assert_eq!(composition.canvas.get_pixel(3, 1).0, [90, 60, 30, 128]);
    }
}
