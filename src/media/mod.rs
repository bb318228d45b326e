// SPDX-License-Identifier: MPL-2.0
//! Frame loading: classification, archive extraction, decoding and preloading.
//!
//! The pipeline runs leaf-first: [`classifier`] decides what a name or buffer
//! holds, [`archive`] turns archive bytes into a [`Manifest`](crate::domain::frame::Manifest),
//! [`decoder`] turns one payload into pixels and [`preload`] decodes a whole
//! manifest ahead of display.

pub mod archive;
pub mod classifier;
pub mod decoder;
pub mod dicom;
pub mod preload;
pub mod raster;

// Re-export commonly used types
pub use archive::{extract, is_zip, single_frame};
pub use classifier::FrameClass;
pub use decoder::{FrameDecoder, SharedDecoder, StandardDecoder};
pub use preload::{CacheEntry, LoadState, PreloadCache, PreloadEvent, Progress, SessionId};
