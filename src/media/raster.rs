// SPDX-License-Identifier: MPL-2.0
//! Raster image decoding (PNG, JPEG, GIF, BMP, WebP).

use crate::domain::media::RawImage;
use crate::error::DecodeError;
use image_rs::ImageError;

/// Decodes an encoded raster image into RGBA pixels.
///
/// Animated formats yield their first frame.
///
/// # Errors
///
/// Returns [`DecodeError::Unsupported`] for formats the decoder does not
/// handle and [`DecodeError::Malformed`] for corrupt data.
pub fn decode(bytes: &[u8]) -> Result<RawImage, DecodeError> {
    let image = image_rs::load_from_memory(bytes).map_err(DecodeError::from)?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(RawImage::from_rgba(width, height, rgba.into_raw()))
}

impl From<ImageError> for DecodeError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Unsupported(e) => DecodeError::Unsupported(e.to_string()),
            other => DecodeError::Malformed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::png_bytes;

    #[test]
    fn decodes_png_to_rgba() {
        let bytes = png_bytes(4, 3, [10, 20, 30, 255]);
        let image = decode(&bytes).expect("decode");

        assert_eq!((image.width(), image.height()), (4, 3));
        assert_eq!(&image.rgba_bytes()[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn unknown_bytes_are_rejected() {
        assert!(decode(b"not an image").is_err());
    }

    #[test]
    fn truncated_png_is_malformed() {
        let bytes = png_bytes(16, 16, [0, 0, 0, 255]);
        let err = decode(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }
}
