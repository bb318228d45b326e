// SPDX-License-Identifier: MPL-2.0
//! Frame decoding port.
//!
//! This module defines the [`FrameDecoder`] trait that turns a frame payload
//! into a [`DecodedFrame`]. [`StandardDecoder`] dispatches to the built-in
//! DICOM and raster decoders; hosts and tests may substitute their own.

use crate::domain::frame::FrameKind;
use crate::domain::media::DecodedFrame;
use crate::error::DecodeError;
use crate::media::{dicom, raster};
use std::sync::Arc;

/// Port for decoding frame payloads.
///
/// Decoding is CPU-bound; callers run it off the async executor through
/// [`decode_blocking`].
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` for use across threads.
pub trait FrameDecoder: Send + Sync {
    /// Decodes `payload` according to its frame kind.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the payload cannot be decoded.
    fn decode(&self, kind: FrameKind, payload: &[u8]) -> Result<DecodedFrame, DecodeError>;
}

/// Decoder backed by the built-in DICOM and raster decoders.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDecoder;

impl FrameDecoder for StandardDecoder {
    fn decode(&self, kind: FrameKind, payload: &[u8]) -> Result<DecodedFrame, DecodeError> {
        match kind {
            FrameKind::StructuredImage => dicom::decode(payload).map(DecodedFrame::Structured),
            FrameKind::RasterImage => raster::decode(payload).map(DecodedFrame::Raster),
        }
    }
}

/// Shared handle to a decoder.
pub type SharedDecoder = Arc<dyn FrameDecoder>;

/// Decodes on the blocking thread pool.
///
/// # Errors
///
/// Returns the decoder's error, or [`DecodeError::Malformed`] if the
/// decoding task panicked.
pub async fn decode_blocking(
    decoder: SharedDecoder,
    kind: FrameKind,
    payload: Arc<[u8]>,
) -> Result<DecodedFrame, DecodeError> {
    tokio::task::spawn_blocking(move || decoder.decode(kind, &payload))
        .await
        .map_err(|e| DecodeError::Malformed(format!("decode task failed: {e}")))?
}
