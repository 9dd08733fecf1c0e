//! Per-tile color voting.

use std::collections::HashMap;

use super::color_key::ColorKey;
use super::error::ReduceError;
use crate::plan::Factor;

/// Outcome of voting over one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vote {
    /// Winning color.
    pub color: ColorKey,
    /// Pixels of the winning color seen before the scan stopped.
    pub count: usize,
    /// Pixels inspected before the scan stopped.
    pub inspected: usize,
}

/// Reduces tiles to their dominant color.
///
/// The vote table is kept between tiles so a reducer processing a whole
/// section allocates once.
///
/// # Example
///
/// ```
/// use dominant_tiles::{Factor, TileReducer};
///
/// let mut reducer = TileReducer::new(Factor::new(2, 2).unwrap(), 1).unwrap();
/// let tile: [&[u8]; 4] = [&[7], &[7], &[9], &[9]];
///
/// let vote = reducer.vote(tile);
/// assert_eq!(vote.color.value(), 7);
/// ```
pub struct TileReducer {
    factor: Factor,
    bands: usize,
    counts: HashMap<ColorKey, usize>,
}

impl TileReducer {
    /// Create a reducer for tiles of `factor` with `bands` bands per pixel.
    pub fn new(factor: Factor, bands: usize) -> Result<Self, ReduceError> {
        ColorKey::check_bands(bands)?;
        Ok(Self {
            factor,
            bands,
            counts: HashMap::with_capacity(factor.tile_pixels().min(256)),
        })
    }

    /// Vote over the pixels of one tile, given in scan order.
    ///
    /// A color replaces the current leader only when its count becomes
    /// strictly greater, so the first color to reach a count keeps it. The
    /// scan stops as soon as the leader holds `tile_pixels / 2` votes.
    pub fn vote<'p, I>(&mut self, pixels: I) -> Vote
    where
        I: IntoIterator<Item = &'p [u8]>,
    {
        let win = self.factor.win_threshold();
        self.counts.clear();

        let mut dominant = ColorKey::default();
        let mut dom_count = 0;
        let mut inspected = 0;

        for pixel in pixels {
            inspected += 1;
            let color = ColorKey::pack(pixel);
            let count = self.counts.entry(color).or_insert(0);
            *count += 1;

            if dom_count < *count {
                dom_count = *count;
                dominant = color;

                if dom_count >= win {
                    break;
                }
            }
        }

        Vote {
            color: dominant,
            count: dom_count,
            inspected,
        }
    }

    /// Vote over tile (`tile_x`, `tile_y`) of a block `block_width` pixels
    /// wide, scanning the tile row by row.
    pub fn reduce_tile(
        &mut self,
        block: &[u8],
        block_width: usize,
        tile_x: usize,
        tile_y: usize,
    ) -> Vote {
        let bands = self.bands;
        let fx = self.factor.x() as usize;
        let fy = self.factor.y() as usize;
        let row_stride = block_width * bands;
        let start = tile_x * fx * bands;
        let end = start + fx * bands;

        let pixels = block
            .chunks_exact(row_stride)
            .skip(tile_y * fy)
            .take(fy)
            .flat_map(move |row| row[start..end].chunks_exact(bands));

        self.vote(pixels)
    }

    /// Reduce a `width` x `height` pixel block into `out`, one pixel per
    /// tile, tiles in row-major order.
    pub fn reduce_block(
        &mut self,
        block: &[u8],
        width: usize,
        height: usize,
        out: &mut [u8],
    ) -> Result<(), ReduceError> {
        let bands = self.bands;
        let fx = self.factor.x() as usize;
        let fy = self.factor.y() as usize;

        if width % fx != 0 || height % fy != 0 {
            return Err(ReduceError::PartialTiles { width, height });
        }

        let expected = width * height * bands;
        if block.len() != expected {
            return Err(ReduceError::BufferLength {
                buffer: "source",
                expected,
                actual: block.len(),
            });
        }

        let tiles_x = width / fx;
        let tiles_y = height / fy;

        let expected = tiles_x * tiles_y * bands;
        if out.len() != expected {
            return Err(ReduceError::BufferLength {
                buffer: "output",
                expected,
                actual: out.len(),
            });
        }

        for tile_y in 0..tiles_y {
            for tile_x in 0..tiles_x {
                let vote = self.reduce_tile(block, width, tile_x, tile_y);
                let at = (tile_y * tiles_x + tile_x) * bands;
                vote.color.unpack_into(&mut out[at..at + bands]);
            }
        }

        Ok(())
    }
}

/// Reduce one section's source block into its output buffer.
///
/// `block` holds `width * height` pixels of `bands` bytes each, row-major;
/// `out` receives `(width / x_factor) * (height / y_factor)` pixels.
pub fn reduce_section(
    block: &[u8],
    width: usize,
    height: usize,
    bands: usize,
    factor: Factor,
    out: &mut [u8],
) -> Result<(), ReduceError> {
    TileReducer::new(factor, bands)?.reduce_block(block, width, height, out)
}
