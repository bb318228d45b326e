// SPDX-License-Identifier: MPL-2.0
//! Pixel pipeline: windowing decoded frames into RGBA and placing them on screen.
//!
//! Structured frames go through the linear VOI window function: intensities
//! below the window map to black, above it to white, and linearly in between.
//! MONOCHROME1 frames are inverted afterwards. Raster frames are only
//! premultiplied, as `tiny_skia` expects.

use crate::domain::media::{DecodedFrame, IntensityImage, Photometric, RawImage};
use crate::domain::viewer::{Point, Transform, WindowLevel};
use tiny_skia::{IntSize, Pixmap};

/// Maps one intensity to a display gray level.
#[must_use]
pub fn window_intensity(value: f32, window: WindowLevel, photometric: Photometric) -> u8 {
    let center = window.center();
    let width = window.width();

    let level = if width <= 1.0 {
        if value > center - 0.5 {
            1.0
        } else {
            0.0
        }
    } else {
        let lower = center - 0.5 - (width - 1.0) / 2.0;
        let upper = center - 0.5 + (width - 1.0) / 2.0;
        if value <= lower {
            0.0
        } else if value > upper {
            1.0
        } else {
            (value - (center - 0.5)) / (width - 1.0) + 0.5
        }
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let gray = (level.clamp(0.0, 1.0) * 255.0).round() as u8;
    match photometric {
        Photometric::Monochrome1 => 255 - gray,
        Photometric::Monochrome2 => gray,
    }
}

/// Renders a decoded frame into a pixmap of its own size.
///
/// `window` applies to structured frames only. Returns `None` for frames
/// with zero area.
#[must_use]
pub fn frame_pixmap(frame: &DecodedFrame, window: WindowLevel) -> Option<Pixmap> {
    match frame {
        DecodedFrame::Structured(image) => windowed_pixmap(image, window),
        DecodedFrame::Raster(image) => raster_pixmap(image),
    }
}

fn windowed_pixmap(image: &IntensityImage, window: WindowLevel) -> Option<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height())?;
    let photometric = image.photometric();

    let mut data = Vec::with_capacity(image.samples().len() * 4);
    for &value in image.samples() {
        let gray = window_intensity(value, window, photometric);
        data.extend_from_slice(&[gray, gray, gray, 255]);
    }

    Pixmap::from_vec(data, size)
}

fn raster_pixmap(image: &RawImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height())?;

    let mut data = image.rgba_bytes().to_vec();
    for pixel in data.chunks_exact_mut(4) {
        let alpha = u16::from(pixel[3]);
        if alpha < 255 {
            for channel in &mut pixel[..3] {
                #[allow(clippy::cast_possible_truncation)]
                let premultiplied = ((u16::from(*channel) * alpha + 127) / 255) as u8;
                *channel = premultiplied;
            }
        }
    }

    Pixmap::from_vec(data, size)
}

/// Affine transform from frame pixels to surface pixels.
///
/// The frame centre lands on the surface centre, offset by the translation
/// (in frame pixels) and then scaled.
#[must_use]
pub fn frame_to_surface(
    transform: &Transform,
    frame_size: (u32, u32),
    surface_size: (u32, u32),
) -> tiny_skia::Transform {
    let scale = transform.scale.value();
    let origin = frame_origin(transform, frame_size, surface_size);
    tiny_skia::Transform::from_row(scale, 0.0, 0.0, scale, origin.x, origin.y)
}

/// Surface position of the frame's top-left corner.
#[must_use]
pub fn frame_origin(
    transform: &Transform,
    frame_size: (u32, u32),
    surface_size: (u32, u32),
) -> Point {
    let scale = transform.scale.value();
    #[allow(clippy::cast_precision_loss)]
    let (frame_w, frame_h, surface_w, surface_h) = (
        frame_size.0 as f32,
        frame_size.1 as f32,
        surface_size.0 as f32,
        surface_size.1 as f32,
    );

    Point::new(
        (transform.translation.x - frame_w / 2.0) * scale + surface_w / 2.0,
        (transform.translation.y - frame_h / 2.0) * scale + surface_h / 2.0,
    )
}
