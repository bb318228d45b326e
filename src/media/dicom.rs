// SPDX-License-Identifier: MPL-2.0
//! Structured image (DICOM Part 10) decoding.
//!
//! Parsing and pixel decoding go through `dicom-object` and
//! `dicom-pixeldata`, so every transfer syntax those crates register works
//! here too, including the encapsulated JPEG and RLE ones. This module only
//! maps the result onto an [`IntensityImage`]: monochrome samples with the
//! modality rescale applied, plus the window recorded in the file.
//!
//! Files must carry the `DICM` magic, with or without the 128-byte preamble.
//! For multi-frame objects only the first frame is decoded.

use crate::domain::media::{IntensityImage, Photometric};
use crate::domain::viewer::WindowLevel;
use crate::error::DecodeError;
use crate::media::classifier::has_dicm_magic;
use dicom_dictionary_std::tags;
use dicom_object::{from_reader, DefaultDicomObject};
use dicom_pixeldata::PixelDecoder;

/// Length of the preamble in front of the `DICM` magic.
const PREAMBLE_LEN: usize = 128;

/// Decodes the first frame of a DICOM file into rescaled intensities.
///
/// # Errors
///
/// Returns [`DecodeError::Unsupported`] for colour or otherwise
/// non-monochrome images and [`DecodeError::Malformed`] when the file or its
/// pixel data cannot be read.
pub fn decode(bytes: &[u8]) -> Result<IntensityImage, DecodeError> {
    let object = open(bytes)?;
    let photometric = photometric(&object)?;

    let pixels = object
        .decode_pixel_data()
        .map_err(|e| DecodeError::Malformed(format!("pixel data: {e}")))?;

    let samples_per_pixel = pixels.samples_per_pixel();
    if samples_per_pixel != 1 {
        return Err(DecodeError::Unsupported(format!(
            "{samples_per_pixel} samples per pixel"
        )));
    }
    let frames = pixels.number_of_frames();
    if frames > 1 {
        tracing::debug!(frames, "multi-frame object, decoding the first frame");
    }

    let samples = pixels
        .to_vec_frame::<f32>(0)
        .map_err(|e| DecodeError::Malformed(format!("pixel conversion: {e}")))?;

    IntensityImage::new(
        pixels.columns(),
        pixels.rows(),
        samples,
        photometric,
        default_window(&object),
    )
    .ok_or_else(|| DecodeError::Malformed("sample count mismatch".into()))
}

fn open(bytes: &[u8]) -> Result<DefaultDicomObject, DecodeError> {
    let body = if has_dicm_magic(bytes) {
        &bytes[PREAMBLE_LEN..]
    } else if bytes.starts_with(b"DICM") {
        bytes
    } else {
        return Err(DecodeError::Malformed("missing DICM signature".into()));
    };
    from_reader(body).map_err(|e| DecodeError::Malformed(e.to_string()))
}

fn photometric(object: &DefaultDicomObject) -> Result<Photometric, DecodeError> {
    let value = object
        .element(tags::PHOTOMETRIC_INTERPRETATION)
        .ok()
        .and_then(|element| element.to_str().ok())
        .map(|text| text.trim().to_owned());

    match value.as_deref() {
        Some("MONOCHROME1") => Ok(Photometric::Monochrome1),
        Some("MONOCHROME2") | None => Ok(Photometric::Monochrome2),
        Some(other) => Err(DecodeError::Unsupported(format!(
            "photometric interpretation {other}"
        ))),
    }
}

/// First WindowCenter/WindowWidth pair, when the width is usable.
fn default_window(object: &DefaultDicomObject) -> Option<WindowLevel> {
    let first = |tag| {
        object
            .element(tag)
            .ok()
            .and_then(|element| element.to_multi_float64().ok())
            .and_then(|values| values.first().copied())
            .filter(|value| value.is_finite())
    };

    let center = first(tags::WINDOW_CENTER)?;
    let width = first(tags::WINDOW_WIDTH).filter(|width| *width > 0.0)?;
    #[allow(clippy::cast_possible_truncation)]
    let window = WindowLevel::new(width as f32, center as f32);
    Some(window)
}
