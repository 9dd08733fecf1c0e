use crate::error::CodecError;
use crate::models::{Image, PixelFormat};
use image::DynamicImage;
use std::path::Path;

/// Reads and writes images as 8-bit-per-band pixel buffers.
pub trait ImageCodec {
    fn open(&self, path: &Path) -> Result<Image, CodecError>;
    fn save(&self, image: &Image, path: &Path) -> Result<(), CodecError>;
}

/// Decodes any format the `image` crate knows and always writes PNG.
#[derive(Debug, Clone, Default)]
pub struct PngCodec {
    optimize: bool,
}

impl PngCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-compress encoded output with oxipng.
    pub fn optimize(mut self, enabled: bool) -> Self {
        self.optimize = enabled;
        self
    }

    /// Decode an in-memory image file.
    pub fn decode(&self, bytes: &[u8], origin: &Path) -> Result<Image, CodecError> {
        let decoded = image::load_from_memory(bytes).map_err(|source| CodecError::Decode {
            path: origin.to_path_buf(),
            source,
        })?;
        from_dynamic(decoded)
    }

    /// Encode as an 8-bit PNG with the image's own band layout.
    pub fn encode(&self, image: &Image) -> Result<Vec<u8>, CodecError> {
        let color_type = match image.format() {
            PixelFormat::Gray => png::ColorType::Grayscale,
            PixelFormat::GrayAlpha => png::ColorType::GrayscaleAlpha,
            PixelFormat::Rgb => png::ColorType::Rgb,
            PixelFormat::Rgba => png::ColorType::Rgba,
        };

        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, image.width(), image.height());
            encoder.set_color(color_type);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| CodecError::PngEncode(e.to_string()))?;
            writer
                .write_image_data(image.pixels())
                .map_err(|e| CodecError::PngEncode(e.to_string()))?;
            writer
                .finish()
                .map_err(|e| CodecError::PngEncode(e.to_string()))?;
        }

        if !self.optimize {
            return Ok(buf);
        }
        match oxipng::optimize_from_memory(
            &buf,
            &oxipng::Options {
                strip: oxipng::StripChunks::Safe,
                ..Default::default()
            },
        ) {
            Ok(optimized) => Ok(optimized),
            Err(e) => {
                tracing::warn!(error = %e, "PNG optimization failed, keeping unoptimized output");
                Ok(buf)
            }
        }
    }
}

impl ImageCodec for PngCodec {
    fn open(&self, path: &Path) -> Result<Image, CodecError> {
        let bytes = std::fs::read(path).map_err(|source| CodecError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image = self.decode(&bytes, path)?;

        tracing::debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            format = %image.format(),
            "Decoded image"
        );
        Ok(image)
    }

    fn save(&self, image: &Image, path: &Path) -> Result<(), CodecError> {
        let bytes = self.encode(image)?;
        std::fs::write(path, &bytes).map_err(|source| CodecError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Wrote PNG");
        Ok(())
    }
}

/// Convert to 8 bits per band, keeping the band layout.
fn from_dynamic(decoded: DynamicImage) -> Result<Image, CodecError> {
    let (width, height) = (decoded.width(), decoded.height());
    let color = decoded.color();
    let (format, pixels) = match (color.channel_count(), color.has_alpha()) {
        (1, false) => (PixelFormat::Gray, decoded.into_luma8().into_raw()),
        (2, true) => (PixelFormat::GrayAlpha, decoded.into_luma_alpha8().into_raw()),
        (3, false) => (PixelFormat::Rgb, decoded.into_rgb8().into_raw()),
        (4, true) => (PixelFormat::Rgba, decoded.into_rgba8().into_raw()),
        _ => return Err(CodecError::UnsupportedLayout(format!("{color:?}"))),
    };
    Image::new(width, height, format, pixels)
        .map_err(|e| CodecError::UnsupportedLayout(e.to_string()))
}
