use crate::error::ImageError;
use std::fmt;

/// Band layout of an 8-bit-per-band image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
}

impl PixelFormat {
    /// Bands (bytes) per pixel
    pub fn bands(self) -> usize {
        match self {
            PixelFormat::Gray => 1,
            PixelFormat::GrayAlpha => 2,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }

    pub fn from_bands(bands: usize) -> Result<Self, ImageError> {
        match bands {
            1 => Ok(PixelFormat::Gray),
            2 => Ok(PixelFormat::GrayAlpha),
            3 => Ok(PixelFormat::Rgb),
            4 => Ok(PixelFormat::Rgba),
            _ => Err(ImageError::UnsupportedBands(bands)),
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Gray => "gray",
            PixelFormat::GrayAlpha => "gray+alpha",
            PixelFormat::Rgb => "RGB",
            PixelFormat::Rgba => "RGBA",
        };
        f.write_str(name)
    }
}

/// Decoded image: row-major, band-interleaved, one byte per band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
}

/// A sub-image placed at (`x`, `y`) when composing an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Image {
    /// Wrap a pixel buffer, checking its length against the geometry.
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: Vec<u8>,
    ) -> Result<Self, ImageError> {
        check_len(width, height, format, pixels.len())?;
        Ok(Self {
            width,
            height,
            format,
            pixels,
        })
    }

    /// All-zero image.
    pub fn zeroed(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            pixels: vec![0; width as usize * height as usize * format.bands()],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn bands(&self) -> usize {
        self.format.bands()
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Bands of the pixel at (`x`, `y`).
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = self.offset(x, y);
        Some(&self.pixels[at..at + self.bands()])
    }

    /// Contiguous copy of a rectangle that must lie inside the image.
    pub fn extract_region(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ImageError> {
        let fits = x as u64 + width as u64 <= self.width as u64
            && y as u64 + height as u64 <= self.height as u64;
        if !fits {
            return Err(ImageError::OutOfBounds {
                x,
                y,
                width,
                height,
                bounds_width: self.width,
                bounds_height: self.height,
            });
        }

        let row_len = width as usize * self.bands();
        let mut out = Vec::with_capacity(row_len * height as usize);
        for row in y..y + height {
            let at = self.offset(x, row);
            out.extend_from_slice(&self.pixels[at..at + row_len]);
        }
        Ok(out)
    }

    /// Contiguous copy of a rectangle that may extend past the right and
    /// bottom edges; outside pixels repeat the nearest edge pixel.
    pub fn extract_region_clamped(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ImageError> {
        if self.width == 0 || self.height == 0 || x >= self.width || y >= self.height {
            return Err(ImageError::OutOfBounds {
                x,
                y,
                width,
                height,
                bounds_width: self.width,
                bounds_height: self.height,
            });
        }

        let bands = self.bands();
        let mut out = Vec::with_capacity(width as usize * height as usize * bands);
        for row in y..y + height {
            let sy = row.min(self.height - 1);
            let inside = (self.width - x).min(width);
            let at = self.offset(x, sy);
            out.extend_from_slice(&self.pixels[at..at + inside as usize * bands]);

            let edge = self.offset(self.width - 1, sy);
            for _ in inside..width {
                out.extend_from_slice(&self.pixels[edge..edge + bands]);
            }
        }
        Ok(out)
    }

    /// Assemble an image from non-overlapping blocks. Areas no block covers
    /// stay zero.
    pub fn compose_from_blocks<I>(
        width: u32,
        height: u32,
        format: PixelFormat,
        blocks: I,
    ) -> Result<Self, ImageError>
    where
        I: IntoIterator<Item = Block>,
    {
        let mut image = Self::zeroed(width, height, format);
        let mut covered = vec![false; width as usize * height as usize];
        let bands = format.bands();

        for block in blocks {
            let fits = block.x as u64 + block.width as u64 <= width as u64
                && block.y as u64 + block.height as u64 <= height as u64;
            if !fits {
                return Err(ImageError::OutOfBounds {
                    x: block.x,
                    y: block.y,
                    width: block.width,
                    height: block.height,
                    bounds_width: width,
                    bounds_height: height,
                });
            }
            check_len(block.width, block.height, format, block.pixels.len())?;

            let row_len = block.width as usize * bands;
            for dy in 0..block.height {
                let row = (block.y + dy) as usize * width as usize;
                let start = row + block.x as usize;
                let mask = &mut covered[start..start + block.width as usize];
                if mask.iter().any(|&c| c) {
                    return Err(ImageError::Overlap {
                        x: block.x,
                        y: block.y,
                        width: block.width,
                        height: block.height,
                    });
                }
                mask.fill(true);

                let src = dy as usize * row_len;
                let dst = image.offset(block.x, block.y + dy);
                image.pixels[dst..dst + row_len]
                    .copy_from_slice(&block.pixels[src..src + row_len]);
            }
        }

        Ok(image)
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.bands()
    }
}

fn check_len(
    width: u32,
    height: u32,
    format: PixelFormat,
    actual: usize,
) -> Result<(), ImageError> {
    let expected = width as usize * height as usize * format.bands();
    if actual != expected {
        return Err(ImageError::BufferLength {
            width,
            height,
            format,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// 4x3 gray image with pixel value `y * 10 + x`.
    fn ramp() -> Image {
        let pixels = (0..3u8)
            .flat_map(|y| (0..4u8).map(move |x| y * 10 + x))
            .collect();
        Image::new(4, 3, PixelFormat::Gray, pixels).unwrap()
    }

    #[test]
    fn test_new_rejects_wrong_length() {
        let err = Image::new(2, 2, PixelFormat::Rgb, vec![0; 11]).unwrap_err();
        assert_eq!(
            err,
            ImageError::BufferLength {
                width: 2,
                height: 2,
                format: PixelFormat::Rgb,
                expected: 12,
                actual: 11,
            }
        );
    }

    #[test]
    fn test_format_bands_round_trip() {
        for format in [
            PixelFormat::Gray,
            PixelFormat::GrayAlpha,
            PixelFormat::Rgb,
            PixelFormat::Rgba,
        ] {
            assert_eq!(PixelFormat::from_bands(format.bands()), Ok(format));
        }
        assert_eq!(
            PixelFormat::from_bands(5),
            Err(ImageError::UnsupportedBands(5))
        );
    }

    #[test]
    fn test_extract_region() {
        let region = ramp().extract_region(1, 1, 2, 2).unwrap();
        assert_eq!(region, vec![11, 12, 21, 22]);
    }

    #[test]
    fn test_extract_region_out_of_bounds() {
        let err = ramp().extract_region(3, 0, 2, 1).unwrap_err();
        assert!(matches!(err, ImageError::OutOfBounds { x: 3, .. }));
    }

    #[test]
    fn test_extract_region_clamped_repeats_edges() {
        let region = ramp().extract_region_clamped(2, 1, 4, 3).unwrap();
        assert_eq!(
            region,
            vec![
                12, 13, 13, 13, //
                22, 23, 23, 23, //
                22, 23, 23, 23,
            ]
        );
    }

    #[test]
    fn test_extract_region_clamped_matches_plain_inside() {
        let image = ramp();
        assert_eq!(
            image.extract_region_clamped(0, 0, 4, 3).unwrap(),
            image.extract_region(0, 0, 4, 3).unwrap()
        );
    }

    #[test]
    fn test_compose_from_blocks() {
        let blocks = vec![
            Block {
                x: 1,
                y: 0,
                width: 1,
                height: 2,
                pixels: vec![1, 2, 3, 4],
            },
            Block {
                x: 0,
                y: 1,
                width: 1,
                height: 1,
                pixels: vec![9, 9],
            },
        ];
        let image = Image::compose_from_blocks(2, 2, PixelFormat::GrayAlpha, blocks).unwrap();

        assert_eq!(image.pixels(), &[0, 0, 1, 2, 9, 9, 3, 4]);
        assert_eq!(image.pixel(1, 1), Some(&[3u8, 4][..]));
    }

    #[test]
    fn test_compose_rejects_overlap() {
        let block = |x| Block {
            x,
            y: 0,
            width: 2,
            height: 1,
            pixels: vec![7, 7],
        };
        let err = Image::compose_from_blocks(3, 1, PixelFormat::Gray, vec![block(0), block(1)])
            .unwrap_err();
        assert!(matches!(err, ImageError::Overlap { x: 1, .. }));
    }

    #[test]
    fn test_compose_rejects_block_outside() {
        let block = Block {
            x: 2,
            y: 0,
            width: 2,
            height: 1,
            pixels: vec![7, 7],
        };
        let err = Image::compose_from_blocks(3, 1, PixelFormat::Gray, vec![block]).unwrap_err();
        assert!(matches!(err, ImageError::OutOfBounds { .. }));
    }
}
