// Linear horizontal alpha ramp used to feather a seam

/// Per-column blend weight for the incoming segment across a shared band.
///
/// Weight is 0 at the seam-facing (left) edge, where the existing composite
/// wins, and 1 at the far edge, where the incoming segment wins.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientMask {
    weights: Vec<f32>,
    height: u32,
}

impl GradientMask {
    pub fn new(width: u32, height: u32) -> Self {
        let weights = match width {
            0 => Vec::new(),
            1 => vec![1.0],
            _ => {
                let last = (width - 1) as f32;
                (0..width).map(|x| x as f32 / last).collect()
            }
        };
        Self { weights, height }
    }

    pub fn width(&self) -> u32 {
        self.weights.len() as u32
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Weight for a column inside the band; columns past the band are fully opaque
    pub fn weight(&self, column: u32) -> f32 {
        self.weights.get(column as usize).copied().unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_endpoints_and_monotonic() {
        let mask = GradientMask::new(5, 3);
        assert_eq!(mask.width(), 5);
        assert_eq!(mask.height(), 3);
        assert_eq!(mask.weight(0), 0.0);
        assert_eq!(mask.weight(4), 1.0);
        for x in 1..5 {
            assert!(mask.weight(x) > mask.weight(x - 1));
        }
    }

    #[test]
    fn test_degenerate_widths() {
        assert_eq!(GradientMask::new(0, 2).width(), 0);
        assert_eq!(GradientMask::new(1, 2).weight(0), 1.0);
        assert_eq!(GradientMask::new(3, 2).weight(10), 1.0);
    }
}
