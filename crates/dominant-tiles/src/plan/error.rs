//! Error types for section planning.

use std::fmt;

/// Image axis a planning error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal axis (width, `x_factor`)
    X,
    /// Vertical axis (height, `y_factor`)
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Error type for factor validation and section planning.
///
/// Returned when the requested factor cannot produce at least one complete
/// tile on the given image, so no section could ever be scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A factor of zero was supplied
    ZeroFactor {
        /// Axis carrying the zero factor
        axis: Axis,
    },
    /// The image has no pixels along one axis
    EmptyImage {
        /// Image width in pixels
        width: u32,
        /// Image height in pixels
        height: u32,
    },
    /// A factor above 1 is not smaller than the image dimension on its axis
    FactorTooLarge {
        /// Axis carrying the oversized factor
        axis: Axis,
        /// Requested factor
        factor: u32,
        /// Image dimension along `axis`
        dimension: u32,
    },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::ZeroFactor { axis } => {
                write!(f, "{}_factor must be at least 1", axis)
            }
            PlanError::EmptyImage { width, height } => {
                write!(f, "image has no pixels ({}x{})", width, height)
            }
            PlanError::FactorTooLarge {
                axis,
                factor,
                dimension,
            } => {
                write!(
                    f,
                    "{}_factor {} must be smaller than the image dimension {}",
                    axis, factor, dimension
                )
            }
        }
    }
}

impl std::error::Error for PlanError {}
