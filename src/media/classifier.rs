// SPDX-License-Identifier: MPL-2.0
//! Frame classification by name and content.
//!
//! Structured (DICOM) frames often ship without an extension, so a name
//! with no extension at all counts as structured. Entries inside metadata
//! directories, hidden files and DICOMDIR indexes never become frames.

use crate::domain::frame::FrameKind;
use std::path::Path;

/// File extensions of structured medical images.
pub const STRUCTURED_EXTENSIONS: &[&str] = &["dcm", "dicom", "dic", "ima"];

/// File extensions of raster images.
pub const RASTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Name fragments that mark a structured image regardless of extension.
const STRUCTURED_KEYWORDS: &[&str] = &["dicom", "dcm"];

/// Directories that only carry archive metadata.
const METADATA_DIRECTORIES: &[&str] = &["__MACOSX"];

/// Index files that describe a DICOM media set instead of holding pixels.
const INDEX_FILES: &[&str] = &["DICOMDIR"];

/// Byte offset of the `DICM` magic after the 128-byte preamble.
const DICM_OFFSET: usize = 128;

/// Outcome of classifying a name or a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameClass {
    StructuredImage,
    RasterImage,
    Unknown,
}

impl FrameClass {
    /// Frame kind for classes that qualify as frames.
    #[must_use]
    pub fn kind(self) -> Option<FrameKind> {
        match self {
            FrameClass::StructuredImage => Some(FrameKind::StructuredImage),
            FrameClass::RasterImage => Some(FrameKind::RasterImage),
            FrameClass::Unknown => None,
        }
    }
}

/// Classifies an archive entry or reference by its name.
///
/// `name` may contain directory components separated by `/` or `\`.
///
/// # Example
///
/// ```
/// use scanlens::media::classifier::{classify_name, FrameClass};
///
/// assert_eq!(classify_name("IMG00231"), FrameClass::StructuredImage);
/// assert_eq!(classify_name("photo.png"), FrameClass::RasterImage);
/// assert_eq!(classify_name("readme.txt"), FrameClass::Unknown);
/// ```
#[must_use]
pub fn classify_name(name: &str) -> FrameClass {
    let components: Vec<&str> = name
        .split(|c: char| c == '/' || c == '\\')
        .filter(|c| !c.is_empty())
        .collect();
    let Some((file_name, directories)) = components.split_last() else {
        return FrameClass::Unknown;
    };
    let file_name = *file_name;

    if directories
        .iter()
        .any(|dir| METADATA_DIRECTORIES.contains(dir))
    {
        return FrameClass::Unknown;
    }
    if file_name.starts_with('.') || INDEX_FILES.contains(&file_name) {
        return FrameClass::Unknown;
    }

    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let Some(extension) = extension else {
        return FrameClass::StructuredImage;
    };

    if STRUCTURED_EXTENSIONS.contains(&extension.as_str()) {
        return FrameClass::StructuredImage;
    }

    // Structured rules all win over the raster extensions.
    let lower = file_name.to_ascii_lowercase();
    if STRUCTURED_KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
        return FrameClass::StructuredImage;
    }

    if RASTER_EXTENSIONS.contains(&extension.as_str()) {
        return FrameClass::RasterImage;
    }

    FrameClass::Unknown
}

/// Classifies a buffer by its leading bytes.
#[must_use]
pub fn classify_bytes(bytes: &[u8]) -> FrameClass {
    if has_dicm_magic(bytes) {
        return FrameClass::StructuredImage;
    }

    match image_rs::guess_format(bytes) {
        Ok(
            image_rs::ImageFormat::Png
            | image_rs::ImageFormat::Jpeg
            | image_rs::ImageFormat::Gif
            | image_rs::ImageFormat::Bmp
            | image_rs::ImageFormat::WebP,
        ) => FrameClass::RasterImage,
        _ => FrameClass::Unknown,
    }
}

/// Classifies a single-file reference, trusting content over the name.
///
/// Falls back to the name when the content is not recognised, so that
/// preamble-less DICOM files still qualify through their filename.
#[must_use]
pub fn classify(name: &str, bytes: &[u8]) -> FrameClass {
    match classify_bytes(bytes) {
        FrameClass::Unknown => classify_name(name),
        known => known,
    }
}

/// Returns whether `bytes` carry the DICOM Part 10 signature.
#[must_use]
pub fn has_dicm_magic(bytes: &[u8]) -> bool {
    bytes.get(DICM_OFFSET..DICM_OFFSET + 4) == Some(b"DICM".as_slice())
}
