//! Image buffer wrapper for captured pixels
//!
//! This module provides an `ImageBuffer` wrapper around `image::DynamicImage`
//! with the transformations the capture tools need: width-capped downscaling
//! and cropping to a display-local region.
//!
//! # Examples
//!
//! ```
//! use third_eye_core::{capture::ImageBuffer, model::Region};
//!
//! let img = ImageBuffer::from_test_pattern(1920, 1080);
//!
//! // Cap the width at 800 pixels, keeping the aspect ratio
//! let fitted = img.fit_to_width(800).unwrap();
//! assert_eq!(fitted.dimensions(), (800, 450));
//!
//! // Crop a region
//! let cropped = img.crop(Region::new(100, 100, 800, 400)).unwrap();
//! assert_eq!(cropped.dimensions(), (800, 400));
//! ```

use image::GenericImageView;

use crate::{
    error::{CaptureError, CaptureResult},
    model::Region,
};

/// Wrapper around `image::DynamicImage` with transformation methods
///
/// All transformation methods return new `ImageBuffer` instances, leaving
/// the original unchanged.
#[derive(Clone, Debug)]
pub struct ImageBuffer {
    inner: image::DynamicImage,
}

impl ImageBuffer {
    /// Creates a new ImageBuffer from a DynamicImage
    pub fn new(image: image::DynamicImage) -> Self {
        Self { inner: image }
    }

    /// Downscales the image so its width is at most `max_width`
    ///
    /// Height keeps the source aspect ratio, rounded to the nearest
    /// pixel and never below 1. Images already narrower than `max_width`
    /// are returned unchanged. Uses Lanczos3 filtering.
    ///
    /// # Examples
    ///
    /// ```
    /// use third_eye_core::capture::ImageBuffer;
    ///
    /// let img = ImageBuffer::from_test_pattern(2560, 1440);
    /// assert_eq!(img.fit_to_width(1920).unwrap().dimensions(), (1920, 1080));
    ///
    /// // No-op when already narrow enough
    /// let small = ImageBuffer::from_test_pattern(640, 480);
    /// assert_eq!(small.fit_to_width(1920).unwrap().dimensions(), (640, 480));
    /// ```
    pub fn fit_to_width(&self, max_width: u32) -> CaptureResult<Self> {
        if max_width == 0 {
            return Err(CaptureError::ImageError("max width must be greater than 0".to_string()));
        }

        let (width, height) = self.dimensions();
        if width <= max_width {
            return Ok(self.clone());
        }

        let new_height = scaled_height(width, height, max_width);
        let resized =
            self.inner
                .resize_exact(max_width, new_height, image::imageops::FilterType::Lanczos3);

        Ok(Self::new(resized))
    }

    /// Crops the image to the specified region
    ///
    /// The region must be within the image bounds, otherwise an error is
    /// returned.
    pub fn crop(&self, region: Region) -> CaptureResult<Self> {
        let (img_width, img_height) = self.dimensions();

        if region.width == 0 || region.height == 0 {
            return Err(CaptureError::ImageError(format!(
                "Region {} has zero width or height",
                region
            )));
        }

        let fits = u64::from(region.x) + u64::from(region.width) <= u64::from(img_width)
            && u64::from(region.y) + u64::from(region.height) <= u64::from(img_height);
        if !fits {
            return Err(CaptureError::ImageError(format!(
                "Region {} extends beyond image bounds ({}x{})",
                region, img_width, img_height
            )));
        }

        let cropped = self
            .inner
            .crop_imm(region.x, region.y, region.width, region.height);

        Ok(Self::new(cropped))
    }

    /// Returns the dimensions of the image as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    /// Returns the image width in pixels
    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    /// Returns the image height in pixels
    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    /// Converts the image to RGBA8 format
    pub fn to_rgba8(&self) -> image::RgbaImage {
        self.inner.to_rgba8()
    }

    /// Creates a test pattern image with the specified dimensions
    ///
    /// Vertical gradient from blue (top) to cyan (bottom). Used by the mock
    /// backend so the server runs without a real display.
    pub fn from_test_pattern(width: u32, height: u32) -> Self {
        use image::{ImageBuffer as ImgBuf, Rgba};

        let start_color = Rgba([0u8, 0u8, 255u8, 255u8]); // Blue
        let end_color = Rgba([0u8, 255u8, 255u8, 255u8]); // Cyan

        let img = ImgBuf::from_fn(width, height, |_x, y| {
            let ratio = y as f32 / height.max(1) as f32;
            Rgba([
                (start_color[0] as f32 * (1.0 - ratio) + end_color[0] as f32 * ratio) as u8,
                (start_color[1] as f32 * (1.0 - ratio) + end_color[1] as f32 * ratio) as u8,
                (start_color[2] as f32 * (1.0 - ratio) + end_color[2] as f32 * ratio) as u8,
                255,
            ])
        });

        Self::new(image::DynamicImage::ImageRgba8(img))
    }

    /// Returns a reference to the inner DynamicImage
    pub fn inner(&self) -> &image::DynamicImage {
        &self.inner
    }

    /// Consumes self and returns the inner DynamicImage
    pub fn into_inner(self) -> image::DynamicImage {
        self.inner
    }
}

impl From<image::RgbaImage> for ImageBuffer {
    fn from(image: image::RgbaImage) -> Self {
        Self::new(image::DynamicImage::ImageRgba8(image))
    }
}

fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    let scaled = (f64::from(height) * f64::from(target_width) / f64::from(width)).round();
    (scaled as u32).max(1)
}
