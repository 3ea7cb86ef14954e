// Overlap-blend: color-matched segments feathered across an aligned band

use crate::align::Aligner;
use crate::color::match_colors;
use crate::error::{Result, StitchError};
use crate::mask::GradientMask;
use crate::plan::{BlendBand, Placement, StitchPlan};
use crate::Composition;
use image::{imageops, Rgba, RgbaImage};

pub(crate) fn compose(
    images: &[RgbaImage],
    target_width: u32,
    overlap_percent: f32,
    aligner: &dyn Aligner,
) -> Result<Composition> {
    if !overlap_percent.is_finite() || !(0.0..1.0).contains(&overlap_percent) {
        return Err(StitchError::invalid(format!(
            "overlap percent must be in [0, 1), got {}",
            overlap_percent
        )));
    }

    let (first, rest) = images
        .split_first()
        .ok_or_else(|| StitchError::invalid("no segments to blend"))?;

    let overlap_width = (f64::from(target_width) * f64::from(overlap_percent)).floor() as u32;
    tracing::debug!(
        "Overlap-blend: {} segment(s), overlap window {}px, aligner {}",
        images.len(),
        overlap_width,
        aligner.name()
    );

    let mut composite = first.clone();
    let mut placements = vec![Placement::new(0, 0, 0, first.width(), first.height())];

    for (step, next) in rest.iter().enumerate() {
        let index = step + 1;
        let matched = match_colors(next, &composite);

        let running_width = composite.width();
        let window = overlap_width.min(running_width).min(next.width());
        let offset = aligner.offset(&composite, &matched, window);
        if offset > window {
            return Err(StitchError::failure(format!(
                "aligner {} returned offset {} outside window {}",
                aligner.name(),
                offset,
                window
            )));
        }

        let width = running_width + next.width() - offset;
        let height = composite.height().max(next.height());
        let left = running_width - offset;

        let mut canvas = RgbaImage::new(width, height);
        imageops::replace(&mut canvas, &composite, 0, 0);

        let mask = GradientMask::new(offset, composite.height());
        blend_over(&mut canvas, &matched, left, &mask);

        tracing::debug!(
            "Segment {}: placed at x={}, blended {}px, canvas now {}x{}",
            index,
            left,
            offset,
            width,
            height
        );

        let band = (offset > 0).then_some(BlendBand {
            left,
            width: offset,
        });
        placements.push(
            Placement::new(index, left, 0, next.width(), next.height()).with_blend(band),
        );
        composite = canvas;
    }

    let mut plan = StitchPlan::new(composite.width(), composite.height());
    for placement in placements {
        plan.push(placement);
    }

    Ok(Composition {
        canvas: composite,
        plan,
    })
}

/// Draw `segment` at column `left`, blending "over" the canvas inside the mask band.
/// Rows below the mask height have no composite underneath and are copied.
fn blend_over(canvas: &mut RgbaImage, segment: &RgbaImage, left: u32, mask: &GradientMask) {
    for (x, y, src) in segment.enumerate_pixels() {
        let cx = left + x;
        if x < mask.width() && y < mask.height() {
            let dst = *canvas.get_pixel(cx, y);
            canvas.put_pixel(cx, y, over(*src, dst, mask.weight(x)));
        } else {
            canvas.put_pixel(cx, y, *src);
        }
    }
}

/// Porter-Duff "over" with the source alpha scaled by `weight`
fn over(src: Rgba<u8>, dst: Rgba<u8>, weight: f32) -> Rgba<u8> {
    let sa = weight * f32::from(src[3]) / 255.0;
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= f32::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let value = (f32::from(src[c]) * sa + f32::from(dst[c]) * da * (1.0 - sa)) / out_a;
        out[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}
