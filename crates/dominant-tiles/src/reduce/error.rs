//! Error types for tile reduction.

use std::fmt;

/// Error type for dominant-color reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReduceError {
    /// Pixels have no bands
    NoBands,
    /// More bands per pixel than fit into a packed color key
    TooManyBands {
        /// Bands per pixel in the input
        bands: usize,
    },
    /// Source block is not a whole number of tiles
    PartialTiles {
        /// Block width in pixels
        width: usize,
        /// Block height in pixels
        height: usize,
    },
    /// A buffer does not have the length its geometry requires
    BufferLength {
        /// Which buffer is wrong ("source" or "output")
        buffer: &'static str,
        /// Required length in bytes
        expected: usize,
        /// Supplied length in bytes
        actual: usize,
    },
}

impl fmt::Display for ReduceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReduceError::NoBands => write!(f, "pixels must have at least one band"),
            ReduceError::TooManyBands { bands } => {
                write!(
                    f,
                    "{} bands per pixel do not fit a 32-bit color key (max {})",
                    bands,
                    super::MAX_BANDS
                )
            }
            ReduceError::PartialTiles { width, height } => {
                write!(
                    f,
                    "block of {}x{} pixels is not a whole number of tiles",
                    width, height
                )
            }
            ReduceError::BufferLength {
                buffer,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "{} buffer has {} bytes, expected {}",
                    buffer, actual, expected
                )
            }
        }
    }
}

impl std::error::Error for ReduceError {}
