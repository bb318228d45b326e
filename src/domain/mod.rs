// SPDX-License-Identifier: MPL-2.0
//! Domain layer - Core viewer types with no I/O.
//!
//! This module contains pure value types and the rules attached to them.
//! Nothing here touches the network, the filesystem or a drawing surface,
//! which keeps every rule testable in isolation.
//!
//! # Modules
//!
//! - [`frame`]: Frames and manifests ([`FrameKind`](frame::FrameKind),
//!   [`FrameEntry`](frame::FrameEntry), [`Manifest`](frame::Manifest), natural ordering)
//! - [`media`]: Decoded pixel data ([`RawImage`](media::RawImage),
//!   [`IntensityImage`](media::IntensityImage), [`DecodedFrame`](media::DecodedFrame))
//! - [`viewer`]: Viewer state ([`Scale`](viewer::Scale), [`WindowLevel`](viewer::WindowLevel),
//!   [`Transform`](viewer::Transform), [`Tool`](viewer::Tool), [`ViewerState`](viewer::ViewerState))

pub mod frame;
pub mod media;
pub mod viewer;
