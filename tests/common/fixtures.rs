//! Test images and scratch files.

use aniniscale::models::{Image, PixelFormat};
use aniniscale::services::{ImageCodec, PngCodec};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Named colors used across tests
pub mod colors {
    pub const RED: [u8; 3] = [220, 30, 30];
    pub const GREEN: [u8; 3] = [30, 200, 60];
    pub const BLUE: [u8; 3] = [20, 40, 230];
    pub const WHITE: [u8; 3] = [255, 255, 255];
}

/// The 4x4 single-band image whose 2x2 reduction is `[1, 2, 3, 4]`.
pub fn quadrants() -> Image {
    Image::new(
        4,
        4,
        PixelFormat::Gray,
        vec![
            1, 1, 2, 2, //
            1, 1, 2, 2, //
            3, 3, 4, 4, //
            3, 3, 4, 4,
        ],
    )
    .unwrap()
}

/// RGB pixel art: `cells_x` x `cells_y` flat-colored cells of `cell` pixels,
/// with one stray pixel of noise in every cell.
pub fn pixel_art(cells_x: u32, cells_y: u32, cell: u32) -> Image {
    let palette = [colors::RED, colors::GREEN, colors::BLUE];
    let width = cells_x * cell;
    let height = cells_y * cell;
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);

    for y in 0..height {
        for x in 0..width {
            let color = if x % cell == cell - 1 && y % cell == 0 {
                colors::WHITE
            } else {
                palette[((x / cell + y / cell) % 3) as usize]
            };
            pixels.extend_from_slice(&color);
        }
    }
    Image::new(width, height, PixelFormat::Rgb, pixels).unwrap()
}

/// Expected reduction of [`pixel_art`] at factor `cell`.
pub fn pixel_art_cells(cells_x: u32, cells_y: u32) -> Vec<u8> {
    let palette = [colors::RED, colors::GREEN, colors::BLUE];
    (0..cells_y)
        .flat_map(|y| (0..cells_x).map(move |x| palette[((x + y) % 3) as usize]))
        .flatten()
        .collect()
}

/// Scratch directory holding input and output files.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `image` as PNG and return its path.
    pub fn write_png(&self, name: &str, image: &Image) -> PathBuf {
        let path = self.path(name);
        PngCodec::new().save(image, &path).unwrap();
        path
    }

    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn read_png(&self, path: &Path) -> Image {
        PngCodec::new().open(path).unwrap()
    }
}
