// SPDX-License-Identifier: MPL-2.0
//! `scanlens` is a multi-frame medical image viewing engine.
//!
//! It turns a reference (a zip archive of DICOM slices and raster images, or a
//! single image) into an ordered stack of frames, decodes the stack in the
//! background, and renders the current frame through a pan/zoom/window-level
//! transform onto a host-provided surface. Navigation and tool handling are
//! headless: hosts forward input events and paint what the surface receives.

#![doc(html_root_url = "https://docs.rs/scanlens/0.3.0")]

pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod interaction;
pub mod media;
pub mod notify;
pub mod render;
pub mod viewer;

pub use error::{Error, Result};
pub use fetch::Reference;
pub use viewer::{Dispatch, LoadSummary, Viewer};

#[cfg(test)]
pub(crate) mod test_utils;
