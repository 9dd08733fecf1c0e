//! Aniniscale - pixel-art downscaler
//!
//! Collapses every `x_factor` x `y_factor` block of an image into the color
//! that occurs most often in it, working on sections in parallel.
//! This library exposes modules for integration testing.

pub mod error;
pub mod models;
pub mod services;
