//! Worker count and section geometry.
//!
//! The planner sizes sections so that every worker gets a nominal share of
//! tiles along each axis, then caps each section at `factor²` tiles per axis
//! so the work per task stays bounded no matter how large the image is.

use super::error::{Axis, PlanError};
use super::factor::Factor;

/// How pixels beyond the last whole section are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Remainder {
    /// Trailing rows and columns that do not fill a whole section are never
    /// processed and do not appear in the output.
    #[default]
    Discard,
    /// Section counts round up and the area past the image edge repeats the
    /// last row and column, so every source pixel lands in a section. The
    /// last section on each axis is cut back so the output holds exactly
    /// `ceil(dimension / factor)` tiles and no tile is made only of
    /// repeated edge pixels.
    PadEdge,
}

/// One schedulable section: its place in the section grid, the source pixel
/// rectangle it reads and the tile rectangle it produces in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    /// Section grid column.
    pub column: u32,
    /// Section grid row.
    pub row: u32,
    /// Left edge of the source region in pixels.
    pub x: u32,
    /// Top edge of the source region in pixels.
    pub y: u32,
    /// Source region width in pixels.
    pub width: u32,
    /// Source region height in pixels.
    pub height: u32,
    /// Left edge of the produced block in output pixels.
    pub output_x: u32,
    /// Top edge of the produced block in output pixels.
    pub output_y: u32,
    /// Produced block width in output pixels.
    pub output_width: u32,
    /// Produced block height in output pixels.
    pub output_height: u32,
}

impl Section {
    /// Byte length of this section's output buffer.
    #[inline]
    pub fn output_len(&self, bands: usize) -> usize {
        self.output_width as usize * self.output_height as usize * bands
    }

    /// Number of source pixels this section covers.
    #[inline]
    pub fn pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Partition of an image into sections, computed once per run.
///
/// # Example
///
/// ```
/// use dominant_tiles::{Factor, Remainder, SectionPlan};
///
/// let factor = Factor::new(3, 3).unwrap();
/// let plan = SectionPlan::new(10, 10, factor, 2, Remainder::Discard).unwrap();
///
/// assert_eq!(plan.worker_count(), 2);
/// assert_eq!(plan.x_section_size(), 3);
/// assert_eq!(plan.x_section_count(), 3);
/// // Pixel column 9 is not covered by any section.
/// assert_eq!(plan.processed_width(), 9);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPlan {
    factor: Factor,
    remainder: Remainder,
    width: u32,
    height: u32,
    worker_count: usize,
    x_tiles: u32,
    y_tiles: u32,
    x_section: u32,
    y_section: u32,
    x_section_count: u32,
    y_section_count: u32,
    output_width: u32,
    output_height: u32,
}

impl SectionPlan {
    /// Plan sections for a `width` x `height` image.
    ///
    /// `hardware_concurrency` is the number of threads the machine can run;
    /// callers inject it so the plan is reproducible.
    pub fn new(
        width: u32,
        height: u32,
        factor: Factor,
        hardware_concurrency: usize,
        remainder: Remainder,
    ) -> Result<Self, PlanError> {
        if width == 0 || height == 0 {
            return Err(PlanError::EmptyImage { width, height });
        }
        check_axis(Axis::X, factor.x(), width)?;
        check_axis(Axis::Y, factor.y(), height)?;

        let x_tiles = width / factor.x();
        let y_tiles = height / factor.y();

        let worker_count = worker_count(hardware_concurrency, x_tiles, y_tiles);

        let x_section = section_extent(x_tiles, worker_count, factor.x());
        let y_section = section_extent(y_tiles, worker_count, factor.y());

        let x_section_size = x_section * factor.x();
        let y_section_size = y_section * factor.y();

        let (x_section_count, y_section_count) = match remainder {
            Remainder::Discard => (width / x_section_size, height / y_section_size),
            Remainder::PadEdge => (
                width.div_ceil(x_section_size),
                height.div_ceil(y_section_size),
            ),
        };

        let (output_width, output_height) = match remainder {
            Remainder::Discard => (x_section_count * x_section, y_section_count * y_section),
            Remainder::PadEdge => (
                width.div_ceil(factor.x()).min(x_section_count * x_section),
                height.div_ceil(factor.y()).min(y_section_count * y_section),
            ),
        };

        Ok(Self {
            factor,
            remainder,
            width,
            height,
            worker_count,
            x_tiles,
            y_tiles,
            x_section,
            y_section,
            x_section_count,
            y_section_count,
            output_width,
            output_height,
        })
    }

    #[inline]
    pub fn factor(&self) -> Factor {
        self.factor
    }

    #[inline]
    pub fn remainder(&self) -> Remainder {
        self.remainder
    }

    /// Number of worker threads to run, always at least 1.
    #[inline]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Complete tiles along x (`width / x_factor`).
    #[inline]
    pub fn x_tiles(&self) -> u32 {
        self.x_tiles
    }

    /// Complete tiles along y (`height / y_factor`).
    #[inline]
    pub fn y_tiles(&self) -> u32 {
        self.y_tiles
    }

    /// Tiles per section along x (`x_section`).
    #[inline]
    pub fn x_section(&self) -> u32 {
        self.x_section
    }

    /// Tiles per section along y (`y_section`).
    #[inline]
    pub fn y_section(&self) -> u32 {
        self.y_section
    }

    /// Section width in source pixels.
    #[inline]
    pub fn x_section_size(&self) -> u32 {
        self.x_section * self.factor.x()
    }

    /// Section height in source pixels.
    #[inline]
    pub fn y_section_size(&self) -> u32 {
        self.y_section * self.factor.y()
    }

    #[inline]
    pub fn x_section_count(&self) -> u32 {
        self.x_section_count
    }

    #[inline]
    pub fn y_section_count(&self) -> u32 {
        self.y_section_count
    }

    /// Total number of sections (and therefore tasks).
    #[inline]
    pub fn section_count(&self) -> usize {
        self.x_section_count as usize * self.y_section_count as usize
    }

    /// Source pixels covered by a full-size section.
    #[inline]
    pub fn task_pixels(&self) -> u64 {
        self.x_section_size() as u64 * self.y_section_size() as u64
    }

    /// Nominal source pixels of all sections, counting every section at
    /// full size.
    #[inline]
    pub fn scheduled_pixels(&self) -> u64 {
        self.task_pixels() * self.section_count() as u64
    }

    /// Width of the source area covered by sections.
    ///
    /// With [`Remainder::Discard`] this can be smaller than the image width;
    /// with [`Remainder::PadEdge`] it can be larger by less than one tile.
    #[inline]
    pub fn processed_width(&self) -> u32 {
        self.output_width * self.factor.x()
    }

    /// Height of the source area covered by sections.
    #[inline]
    pub fn processed_height(&self) -> u32 {
        self.output_height * self.factor.y()
    }

    /// Output image width, derived from the sections rather than from
    /// `x_tiles`.
    #[inline]
    pub fn output_width(&self) -> u32 {
        self.output_width
    }

    /// Output image height, derived from the sections rather than from
    /// `y_tiles`.
    #[inline]
    pub fn output_height(&self) -> u32 {
        self.output_height
    }

    /// Source image width the plan was made for.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Source image height the plan was made for.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Section at grid position (`column`, `row`).
    ///
    /// Sections in the last column or row may be narrower than the nominal
    /// size when the output was cut back under [`Remainder::PadEdge`].
    pub fn section(&self, column: u32, row: u32) -> Section {
        let output_x = column * self.x_section;
        let output_y = row * self.y_section;
        let output_width = self.x_section.min(self.output_width - output_x);
        let output_height = self.y_section.min(self.output_height - output_y);

        Section {
            column,
            row,
            x: output_x * self.factor.x(),
            y: output_y * self.factor.y(),
            width: output_width * self.factor.x(),
            height: output_height * self.factor.y(),
            output_x,
            output_y,
            output_width,
            output_height,
        }
    }

    /// All sections in row-major grid order.
    pub fn sections(&self) -> impl Iterator<Item = Section> + '_ {
        (0..self.y_section_count)
            .flat_map(move |row| (0..self.x_section_count).map(move |column| (column, row)))
            .map(|(column, row)| self.section(column, row))
    }
}

fn check_axis(axis: Axis, factor: u32, dimension: u32) -> Result<(), PlanError> {
    if factor == 0 {
        return Err(PlanError::ZeroFactor { axis });
    }
    // A factor of 1 leaves its axis untouched, whatever its length.
    if factor > 1 && factor >= dimension {
        return Err(PlanError::FactorTooLarge {
            axis,
            factor,
            dimension,
        });
    }
    Ok(())
}

/// Even share of the hardware threads that still leaves every worker at
/// least one tile along both axes.
///
/// The hardware count is rounded up to even, then lowered in steps of two
/// until it fits, which lands on the largest even number within the limit.
fn worker_count(hardware_concurrency: usize, x_tiles: u32, y_tiles: u32) -> usize {
    let limit = x_tiles.min(y_tiles) as usize;
    let workers = hardware_concurrency.saturating_add(hardware_concurrency % 2);
    let workers = if workers > limit {
        limit - limit % 2
    } else {
        workers
    };

    workers.max(1)
}

/// Tiles per section along one axis, capped at `factor²`.
fn section_extent(tiles: u32, workers: usize, factor: u32) -> u32 {
    let cap = factor as u64 * factor as u64;
    let mut section = tiles / workers as u32;

    while section as u64 > cap {
        section /= 2;
    }

    section
}
