// Crop-fill: main image followed by a centered strip cut from a fill image

use crate::error::{Result, StitchError};
use crate::plan::{CropRect, Placement, StitchPlan};
use crate::Composition;
use image::{imageops, RgbaImage};

pub(crate) fn compose(images: &[RgbaImage], target_width: u32) -> Result<Composition> {
    let [main, fill] = images else {
        return Err(StitchError::invalid(format!(
            "crop-fill needs exactly 2 segments, got {}",
            images.len()
        )));
    };

    if target_width <= main.width() {
        return Err(StitchError::invalid(format!(
            "target width {} leaves no room beside main image of width {}",
            target_width,
            main.width()
        )));
    }

    let crop_width = target_width - main.width();
    let crop = CropRect {
        x: fill.width().saturating_sub(crop_width) / 2,
        y: 0,
        width: crop_width.min(fill.width()),
        height: fill.height().min(main.height()),
    };

    tracing::debug!(
        "Crop-fill: main {}x{}, strip {}x{} from x={} of fill",
        main.width(),
        main.height(),
        crop.width,
        crop.height,
        crop.x
    );

    let strip = imageops::crop_imm(fill, crop.x, crop.y, crop.width, crop.height).to_image();

    let mut canvas = RgbaImage::new(target_width, main.height());
    imageops::replace(&mut canvas, main, 0, 0);
    imageops::replace(&mut canvas, &strip, i64::from(main.width()), 0);

    let mut plan = StitchPlan::new(target_width, main.height());
    plan.push(Placement::new(0, 0, 0, main.width(), main.height()));
    plan.push(
        Placement::new(1, main.width(), 0, crop.width, crop.height).with_crop(crop),
    );

    Ok(Composition { canvas, plan })
}
