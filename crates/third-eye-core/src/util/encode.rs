//! PNG encoding for captured images
//!
//! Captures are always delivered as PNG. The MCP layer ships images as
//! base64 text, so [`encode_png_base64`] is the entry point the dispatcher
//! uses; the byte-level functions back the CLI's write-to-file path.
//!
//! # Examples
//!
//! ```
//! use third_eye_core::{capture::ImageBuffer, util::encode::encode_png};
//!
//! let img = ImageBuffer::from_test_pattern(100, 100);
//! let png_bytes = encode_png(&img).unwrap();
//! assert_eq!(&png_bytes[0..4], &[0x89, b'P', b'N', b'G']);
//! ```

use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::{
    ImageEncoder,
    codecs::png::{CompressionType, FilterType, PngEncoder},
};

use crate::{
    capture::ImageBuffer,
    error::{CaptureError, CaptureResult},
};

/// Encodes an image as PNG with default compression
pub fn encode_png(buffer: &ImageBuffer) -> CaptureResult<Vec<u8>> {
    encode_png_with_compression(buffer, CompressionType::Default)
}

/// Encodes an image as PNG with specified compression level
///
/// Higher compression levels produce smaller files but take longer to
/// encode. Uses adaptive per-scanline filtering.
pub fn encode_png_with_compression(
    buffer: &ImageBuffer,
    compression: CompressionType,
) -> CaptureResult<Vec<u8>> {
    let mut output = Vec::new();

    let encoder =
        PngEncoder::new_with_quality(Cursor::new(&mut output), compression, FilterType::Adaptive);

    let rgba = buffer.to_rgba8();
    let (width, height) = rgba.dimensions();

    encoder
        .write_image(rgba.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .map_err(|e| CaptureError::EncodingFailed {
            format: "png".to_string(),
            reason: e.to_string(),
        })?;

    Ok(output)
}

/// Encodes an image as PNG and returns it base64-encoded
pub fn encode_png_base64(buffer: &ImageBuffer) -> CaptureResult<String> {
    let bytes = encode_png(buffer)?;
    Ok(STANDARD.encode(bytes))
}

/// Decodes a base64 PNG payload back to raw bytes
pub fn decode_base64(data: &str) -> CaptureResult<Vec<u8>> {
    STANDARD
        .decode(data)
        .map_err(|e| CaptureError::ImageError(format!("Invalid base64 image data: {}", e)))
}
