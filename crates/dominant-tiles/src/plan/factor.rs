use super::error::{Axis, PlanError};

/// Block size collapsed into a single output pixel.
///
/// Both components are at least 1; [`Factor::new`] rejects zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Factor {
    x: u32,
    y: u32,
}

impl Factor {
    /// Create a factor of `x` by `y` source pixels per output pixel.
    pub fn new(x: u32, y: u32) -> Result<Self, PlanError> {
        if x == 0 {
            return Err(PlanError::ZeroFactor { axis: Axis::X });
        }
        if y == 0 {
            return Err(PlanError::ZeroFactor { axis: Axis::Y });
        }
        Ok(Self { x, y })
    }

    /// Horizontal factor (`x_factor`).
    #[inline]
    pub fn x(&self) -> u32 {
        self.x
    }

    /// Vertical factor (`y_factor`).
    #[inline]
    pub fn y(&self) -> u32 {
        self.y
    }

    /// True when the factor leaves the image unchanged (1 by 1).
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.x == 1 && self.y == 1
    }

    /// Number of source pixels in one tile.
    #[inline]
    pub fn tile_pixels(&self) -> usize {
        self.x as usize * self.y as usize
    }

    /// Vote count at which a color wins its tile outright.
    #[inline]
    pub fn win_threshold(&self) -> usize {
        self.tile_pixels() / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_rejects_zero() {
        assert_eq!(
            Factor::new(0, 2),
            Err(PlanError::ZeroFactor { axis: Axis::X })
        );
        assert_eq!(
            Factor::new(2, 0),
            Err(PlanError::ZeroFactor { axis: Axis::Y })
        );
    }

    #[test]
    fn test_factor_identity() {
        assert!(Factor::new(1, 1).unwrap().is_identity());
        assert!(!Factor::new(1, 2).unwrap().is_identity());
    }

    #[test]
    fn test_win_threshold_uses_floor_division() {
        assert_eq!(Factor::new(2, 2).unwrap().win_threshold(), 2);
        assert_eq!(Factor::new(5, 1).unwrap().win_threshold(), 2);
        assert_eq!(Factor::new(3, 3).unwrap().win_threshold(), 4);
    }
}
