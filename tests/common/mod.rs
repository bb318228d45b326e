// SPDX-License-Identifier: MPL-2.0
//! Shared fixtures for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use dicom_core::value::C;
use dicom_core::{DataElement, PrimitiveValue, VR};
use dicom_dictionary_std::{tags, uids};
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};
use scanlens::error::FetchError;
use scanlens::fetch::Fetcher;
use scanlens::notify::QueuedNotifier;
use scanlens::render::PixmapSurface;
use scanlens::{config::Config, media::StandardDecoder, Viewer};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::Arc;

pub fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let image = image_rs::RgbaImage::from_pixel(width, height, image_rs::Rgba(rgba));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, image_rs::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

/// Explicit VR little endian DICOM with 16-bit MONOCHROME2 pixels.
pub fn dicom(width: u16, height: u16, pixels: &[u16], window: Option<(f32, f32)>) -> Vec<u8> {
    assert_eq!(pixels.len(), usize::from(width) * usize::from(height));

    let us = |tag, value: u16| DataElement::new(tag, VR::US, PrimitiveValue::from(value));
    let mut object = InMemDicomObject::from_element_iter([
        DataElement::new(tags::SOP_CLASS_UID, VR::UI, PrimitiveValue::from(uids::CT_IMAGE_STORAGE)),
        DataElement::new(tags::SOP_INSTANCE_UID, VR::UI, PrimitiveValue::from("2.25.7")),
        us(tags::SAMPLES_PER_PIXEL, 1),
        DataElement::new(tags::PHOTOMETRIC_INTERPRETATION, VR::CS, PrimitiveValue::from("MONOCHROME2")),
        us(tags::ROWS, height),
        us(tags::COLUMNS, width),
        us(tags::BITS_ALLOCATED, 16),
        us(tags::BITS_STORED, 16),
        us(tags::HIGH_BIT, 15),
        us(tags::PIXEL_REPRESENTATION, 0),
        DataElement::new(tags::PIXEL_DATA, VR::OW, PrimitiveValue::U16(C::from_slice(pixels))),
    ]);
    if let Some((center, width)) = window {
        object.put(DataElement::new(tags::WINDOW_CENTER, VR::DS, PrimitiveValue::from(center.to_string())));
        object.put(DataElement::new(tags::WINDOW_WIDTH, VR::DS, PrimitiveValue::from(width.to_string())));
    }

    let file = object
        .with_meta(
            FileMetaTableBuilder::new()
                .media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
                .media_storage_sop_instance_uid("2.25.7")
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN),
        )
        .expect("file meta");
    let mut out = Vec::new();
    file.write_all(&mut out).expect("write dicom");
    out
}

/// A small DICOM slice with a gradient and a soft-tissue window.
pub fn slice(seed: u16) -> Vec<u8> {
    let pixels: Vec<u16> = (0..16).map(|i| seed.wrapping_add(i * 10)).collect();
    dicom(4, 4, &pixels, Some((40.0, 400.0)))
}

pub fn zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, bytes) in entries {
        writer.start_file(*name, options).expect("start entry");
        writer.write_all(bytes).expect("write entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// Serves in-memory buffers by location.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    pub fn with(mut self, location: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(location.to_string(), bytes);
        self
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch_bytes(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        self.files
            .get(location)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(location.to_string()))
    }
}

pub fn viewer(fetcher: MemoryFetcher, config: Config) -> (Viewer<PixmapSurface>, QueuedNotifier) {
    let notifier = QueuedNotifier::new();
    let viewer = Viewer::with_parts(
        config,
        PixmapSurface::new(128, 128),
        Arc::new(fetcher),
        Arc::new(StandardDecoder),
        Box::new(notifier.clone()),
    );
    (viewer, notifier)
}
