//! Dominant-color reduction
//!
//! Each tile of `x_factor × y_factor` source pixels collapses to the color
//! that holds the most pixels in it. Colors are compared as packed
//! [`ColorKey`]s, so at most [`MAX_BANDS`] bands per pixel are supported.

mod color_key;
mod dominant;
mod error;

pub use color_key::{ColorKey, MAX_BANDS};
pub use dominant::{reduce_section, TileReducer, Vote};
pub use error::ReduceError;
