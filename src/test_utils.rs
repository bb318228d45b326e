// SPDX-License-Identifier: MPL-2.0
//! Test utilities for float comparisons and frame fixtures.
//!
//! This module re-exports the `approx` crate's assertion macros for float comparison,
//! which properly handle floating-point precision issues that `assert_eq!` cannot,
//! and builds small encoded frames for decoder and viewer tests.

// Re-export approx macros for convenient use in tests
pub use approx::{assert_abs_diff_eq, assert_abs_diff_ne, assert_relative_eq, assert_relative_ne};

use dicom_core::value::C;
use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
use dicom_dictionary_std::{tags, uids};
use dicom_object::mem::InMemElement;
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};
use std::io::{Cursor, Write};

/// Default epsilon for f32 comparisons.
/// Suitable for values that should be "exactly equal" but may have minor floating-point errors.
pub const F32_EPSILON: f32 = 1e-6;

/// Encodes a solid-colour RGBA PNG.
pub fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let image = image_rs::RgbaImage::from_pixel(width, height, image_rs::Rgba(rgba));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, image_rs::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

/// Builds an explicit VR little endian DICOM file with 16-bit unsigned
/// MONOCHROME2 pixels.
pub fn dicom_bytes(width: u16, height: u16, pixels: &[u16], window: Option<(f32, f32)>) -> Vec<u8> {
    assert_eq!(pixels.len(), usize::from(width) * usize::from(height));

    let mut elements = vec![
        short(tags::ROWS, height),
        short(tags::COLUMNS, width),
        DataElement::new(tags::PIXEL_DATA, VR::OW, PrimitiveValue::U16(C::from_slice(pixels))),
    ];
    if let Some((center, width)) = window {
        elements.push(text(tags::WINDOW_CENTER, VR::DS, &center.to_string()));
        elements.push(text(tags::WINDOW_WIDTH, VR::DS, &width.to_string()));
    }
    dicom_file(elements)
}

/// Writes a Part 10 file: 16-bit unsigned MONOCHROME2 image attributes,
/// overridden by `elements`.
pub fn dicom_file(elements: impl IntoIterator<Item = InMemElement>) -> Vec<u8> {
    let mut object = InMemDicomObject::from_element_iter([
        text(tags::SOP_CLASS_UID, VR::UI, uids::CT_IMAGE_STORAGE),
        text(tags::SOP_INSTANCE_UID, VR::UI, "2.25.1"),
        short(tags::SAMPLES_PER_PIXEL, 1),
        text(tags::PHOTOMETRIC_INTERPRETATION, VR::CS, "MONOCHROME2"),
        short(tags::BITS_ALLOCATED, 16),
        short(tags::BITS_STORED, 16),
        short(tags::HIGH_BIT, 15),
        short(tags::PIXEL_REPRESENTATION, 0),
    ]);
    for element in elements {
        object.put(element);
    }

    let file = object
        .with_meta(
            FileMetaTableBuilder::new()
                .media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
                .media_storage_sop_instance_uid("2.25.1")
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN),
        )
        .expect("file meta");
    let mut out = Vec::new();
    file.write_all(&mut out).expect("write dicom");
    out
}

/// A single US attribute.
pub fn short(tag: Tag, value: u16) -> InMemElement {
    DataElement::new(tag, VR::US, PrimitiveValue::from(value))
}

/// A single string attribute.
pub fn text(tag: Tag, vr: VR, value: &str) -> InMemElement {
    DataElement::new(tag, vr, PrimitiveValue::from(value))
}

/// Packs `(name, bytes)` pairs into a deflated zip archive.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, bytes) in entries {
        writer.start_file(*name, options).expect("start zip entry");
        writer.write_all(bytes).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// Serves fixed byte buffers by location; anything else is not found.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    files: std::collections::HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    pub fn with(mut self, location: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(location.to_string(), bytes);
        self
    }
}

#[async_trait::async_trait]
impl crate::fetch::Fetcher for MemoryFetcher {
    async fn fetch_bytes(&self, location: &str) -> Result<Vec<u8>, crate::error::FetchError> {
        self.files
            .get(location)
            .cloned()
            .ok_or_else(|| crate::error::FetchError::NotFound(location.to_string()))
    }
}
