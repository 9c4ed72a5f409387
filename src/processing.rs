//! Image normalization and recompression
//!
//! Pure byte-to-byte transformation: decode, flatten to opaque RGB,
//! downscale by the configured factor with Lanczos3, re-encode as JPEG.
//! No filesystem access at this layer; writes belong to the pipeline.

use crate::config::ImageConfig;
use crate::error::ProcessingError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::io::Cursor;
use tracing::debug;

/// Normalized, recompressed image bytes
#[derive(Clone, Debug)]
pub struct ProcessedImage {
    /// JPEG-encoded output
    pub data: Vec<u8>,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
}

/// Decode, normalize, downscale, and re-encode raw image bytes
///
/// Alpha channels are dropped, not composited onto a background; palette
/// images are expanded to RGB. Output dimensions are
/// `floor(axis × scale)` on each axis; a zero on either axis is
/// [`ProcessingError::ZeroDimension`].
pub fn process(
    raw: &[u8],
    options: &ImageConfig,
) -> std::result::Result<ProcessedImage, ProcessingError> {
    let decoded =
        image::load_from_memory(raw).map_err(|e| ProcessingError::Decode(e.to_string()))?;

    // Flatten to opaque RGB before resampling. to_rgb8 discards alpha and
    // expands palettes; for RGB input it is a no-op conversion.
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();

    let new_width = (f64::from(width) * f64::from(options.scale)).floor() as u32;
    let new_height = (f64::from(height) * f64::from(options.scale)).floor() as u32;
    if new_width == 0 || new_height == 0 {
        return Err(ProcessingError::ZeroDimension {
            width: new_width,
            height: new_height,
        });
    }

    let resized = image::imageops::resize(&rgb, new_width, new_height, FilterType::Lanczos3);

    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, options.jpeg_quality);
    resized
        .write_with_encoder(encoder)
        .map_err(|e| ProcessingError::Encode(e.to_string()))?;

    debug!(
        width,
        height, new_width, new_height, "recompressed image"
    );

    Ok(ProcessedImage {
        data: out.into_inner(),
        width: new_width,
        height: new_height,
    })
}
