//! dominant-tiles: section planning and dominant-color tile reduction
//!
//! This library holds the pure, single-threaded parts of a pixel-art
//! downscaler: deciding how an image is cut into independently processable
//! sections, and collapsing every `x_factor × y_factor` tile of a section
//! into the color that occupies most of its pixels.
//!
//! # Quick Start
//!
//! ```
//! use dominant_tiles::{reduce_section, Factor, Remainder, SectionPlan};
//!
//! // 4x4 single-band image, 2x2 factor.
//! let pixels = [
//!     1, 1, 2, 2,
//!     1, 1, 2, 2,
//!     3, 3, 4, 4,
//!     3, 3, 4, 4,
//! ];
//! let factor = Factor::new(2, 2).unwrap();
//! let plan = SectionPlan::new(4, 4, factor, 1, Remainder::Discard).unwrap();
//! assert_eq!(plan.section_count(), 4);
//! assert_eq!((plan.output_width(), plan.output_height()), (2, 2));
//!
//! // The whole image reduced as one block.
//! let mut out = [0u8; 4];
//! reduce_section(&pixels, 4, 4, 1, factor, &mut out).unwrap();
//! assert_eq!(out, [1, 2, 3, 4]);
//! ```
//!
//! # Sections
//!
//! A [`SectionPlan`] is computed once per image. Its worker count is an even
//! share of the hardware concurrency that still leaves each worker at least
//! one tile along both axes (never less than one worker). Sections hold a
//! nominal per-worker share of tiles, capped at `factor²` tiles per axis.
//!
//! Under [`Remainder::Discard`] the pixels past the last whole section are
//! dropped: the output is `x_section_count * x_section` pixels wide, which
//! can be narrower than `width / x_factor`. [`Remainder::PadEdge`] rounds the
//! section counts up instead and narrows the last section so the output is
//! exactly `ceil(width / x_factor)` pixels wide.
//!
//! # Dominant color
//!
//! Tiles are scanned row-major. A color takes the lead only with a strictly
//! greater count, so the first color to reach a count wins ties, and the scan
//! ends once the leader holds `tile_pixels / 2` votes. See [`TileReducer`].

pub mod plan;
pub mod reduce;


pub use plan::{Axis, Factor, PlanError, Remainder, Section, SectionPlan};
pub use reduce::{reduce_section, ColorKey, ReduceError, TileReducer, Vote, MAX_BANDS};
