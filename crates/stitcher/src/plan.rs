// Layout produced by a stitch strategy

use crate::error::{Result, StitchError};

/// Region taken from a source segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Canvas columns where a segment is blended over existing pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendBand {
    pub left: u32,
    pub width: u32,
}

/// Where one segment lands on the canvas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub index: usize,
    pub left: u32,
    pub top: u32,
    /// Size of the placed region on the canvas
    pub width: u32,
    pub height: u32,
    pub crop: Option<CropRect>,
    pub blend: Option<BlendBand>,
}

impl Placement {
    pub fn new(index: usize, left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            index,
            left,
            top,
            width,
            height,
            crop: None,
            blend: None,
        }
    }

    pub fn with_crop(mut self, crop: CropRect) -> Self {
        self.crop = Some(crop);
        self
    }

    pub fn with_blend(mut self, blend: Option<BlendBand>) -> Self {
        self.blend = blend;
        self
    }

    pub fn right(&self) -> u32 {
        self.left + self.width
    }
}

/// Canvas size plus per-segment placements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StitchPlan {
    pub width: u32,
    pub height: u32,
    pub placements: Vec<Placement>,
}

impl StitchPlan {
    /// Output is always RGBA so uncovered pixels can stay transparent
    pub const CHANNELS: u8 = 4;

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            placements: Vec::new(),
        }
    }

    pub fn push(&mut self, placement: Placement) {
        self.placements.push(placement);
    }

    /// Total width of all blend bands
    pub fn total_overlap(&self) -> u32 {
        self.placements
            .iter()
            .filter_map(|p| p.blend.map(|band| band.width))
            .sum()
    }

    /// Check that placements are ordered left to right and stay on the canvas
    pub fn validate(&self) -> Result<()> {
        let mut last_left = 0;
        for placement in &self.placements {
            if placement.left < last_left {
                return Err(StitchError::failure(format!(
                    "segment {} placed left of its predecessor",
                    placement.index
                )));
            }
            if placement.right() > self.width || placement.top + placement.height > self.height {
                return Err(StitchError::failure(format!(
                    "segment {} at ({}, {}) size {}x{} exceeds canvas {}x{}",
                    placement.index,
                    placement.left,
                    placement.top,
                    placement.width,
                    placement.height,
                    self.width,
                    self.height
                )));
            }
            last_left = placement.left;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_adjacent_placements() {
        let mut plan = StitchPlan::new(20, 10);
        plan.push(Placement::new(0, 0, 0, 10, 10));
        plan.push(Placement::new(1, 10, 0, 10, 10));
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_canvas() {
        let mut plan = StitchPlan::new(15, 10);
        plan.push(Placement::new(0, 0, 0, 10, 10));
        plan.push(Placement::new(1, 10, 0, 10, 10));
        assert!(matches!(plan.validate(), Err(StitchError::StitchFailure(_))));
    }

    #[test]
    fn test_total_overlap_sums_bands() {
        let mut plan = StitchPlan::new(30, 10);
        plan.push(Placement::new(0, 0, 0, 12, 10));
        plan.push(
            Placement::new(1, 8, 0, 12, 10).with_blend(Some(BlendBand { left: 8, width: 4 })),
        );
        plan.push(
            Placement::new(2, 17, 0, 12, 10).with_blend(Some(BlendBand { left: 17, width: 3 })),
        );
        assert_eq!(plan.total_overlap(), 7);
    }
}
