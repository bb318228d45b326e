// SPDX-License-Identifier: MPL-2.0
//! Decoded frame types for the domain layer.
//!
//! These types represent pure pixel data without any presentation
//! dependencies. The renderer turns them into surface pixels.

use crate::domain::frame::FrameKind;
use crate::domain::viewer::WindowLevel;
use std::sync::Arc;

/// Raw RGBA image data of a decoded raster frame.
///
/// # Example
///
/// ```
/// use scanlens::domain::media::RawImage;
/// use std::sync::Arc;
///
/// let pixels = vec![255u8; 100 * 100 * 4]; // 100x100 RGBA
/// let image = RawImage::new(100, 100, Arc::new(pixels));
///
/// assert_eq!(image.width(), 100);
/// assert_eq!(image.height(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct RawImage {
    width: u32,
    height: u32,
    rgba_bytes: Arc<Vec<u8>>,
}

impl RawImage {
    /// Creates a new `RawImage` from dimensions and RGBA pixel data.
    ///
    /// # Panics
    ///
    /// Panics if the pixel data length doesn't match `width * height * 4`.
    #[must_use]
    pub fn new(width: u32, height: u32, rgba_bytes: Arc<Vec<u8>>) -> Self {
        let expected_len = (width as usize) * (height as usize) * 4;
        assert_eq!(
            rgba_bytes.len(),
            expected_len,
            "RGBA data length mismatch: expected {expected_len}, got {}",
            rgba_bytes.len()
        );

        Self {
            width,
            height,
            rgba_bytes,
        }
    }

    /// Creates a new `RawImage` from dimensions and owned RGBA pixel data.
    ///
    /// # Panics
    ///
    /// Panics if the pixel data length doesn't match `width * height * 4`.
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, rgba_bytes: Vec<u8>) -> Self {
        Self::new(width, height, Arc::new(rgba_bytes))
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn rgba_bytes(&self) -> &[u8] {
        &self.rgba_bytes
    }

    #[must_use]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

impl PartialEq for RawImage {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.rgba_bytes == other.rgba_bytes
    }
}

impl Eq for RawImage {}

/// How stored intensities map to brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Photometric {
    /// Minimum value is white.
    Monochrome1,
    /// Minimum value is black.
    #[default]
    Monochrome2,
}

/// Single-channel intensities of a decoded structured frame.
///
/// Samples already carry the modality rescale (slope/intercept).
#[derive(Debug, Clone)]
pub struct IntensityImage {
    width: u32,
    height: u32,
    samples: Arc<Vec<f32>>,
    photometric: Photometric,
    default_window: WindowLevel,
    value_range: (f32, f32),
}

impl IntensityImage {
    /// Creates an intensity image.
    ///
    /// Returns `None` when the sample count doesn't match the dimensions.
    /// Without an explicit default window, one spanning the sample range is used.
    #[must_use]
    pub fn new(
        width: u32,
        height: u32,
        samples: Vec<f32>,
        photometric: Photometric,
        default_window: Option<WindowLevel>,
    ) -> Option<Self> {
        if samples.len() != (width as usize) * (height as usize) {
            return None;
        }

        let value_range = samples
            .iter()
            .fold(None, |range: Option<(f32, f32)>, &v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .unwrap_or((0.0, 0.0));

        let default_window = default_window
            .unwrap_or_else(|| WindowLevel::from_range(value_range.0, value_range.1));

        Some(Self {
            width,
            height,
            samples: Arc::new(samples),
            photometric,
            default_window,
            value_range,
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[must_use]
    pub fn photometric(&self) -> Photometric {
        self.photometric
    }

    /// Window recorded in the file, or the full sample range.
    #[must_use]
    pub fn default_window(&self) -> WindowLevel {
        self.default_window
    }

    /// Smallest and largest sample value.
    #[must_use]
    pub fn value_range(&self) -> (f32, f32) {
        self.value_range
    }
}

/// A renderable handle produced by decoding a frame payload.
///
/// Cloning is cheap: pixel buffers are shared.
#[derive(Debug, Clone)]
pub enum DecodedFrame {
    Structured(IntensityImage),
    Raster(RawImage),
}

impl DecodedFrame {
    #[must_use]
    pub fn kind(&self) -> FrameKind {
        match self {
            DecodedFrame::Structured(_) => FrameKind::StructuredImage,
            DecodedFrame::Raster(_) => FrameKind::RasterImage,
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        match self {
            DecodedFrame::Structured(image) => image.width(),
            DecodedFrame::Raster(image) => image.width(),
        }
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        match self {
            DecodedFrame::Structured(image) => image.height(),
            DecodedFrame::Raster(image) => image.height(),
        }
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Window the frame should open with.
    #[must_use]
    pub fn default_window(&self) -> WindowLevel {
        match self {
            DecodedFrame::Structured(image) => image.default_window(),
            DecodedFrame::Raster(_) => WindowLevel::default(),
        }
    }
}
