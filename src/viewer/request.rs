// SPDX-License-Identifier: MPL-2.0
//! On-demand frame decoding requested by navigation.

use crate::domain::frame::FrameKind;
use crate::domain::media::DecodedFrame;
use crate::error::DecodeError;
use crate::media::decoder::{decode_blocking, SharedDecoder};
use crate::media::SessionId;
use std::fmt;
use std::sync::{Arc, Weak};

/// What the viewer did with an input event.
#[derive(Debug)]
pub enum Dispatch {
    /// The event changed or refreshed the view.
    Handled,
    /// The event had no effect.
    Ignored,
    /// Navigation reached a frame that is not decoded yet.
    ///
    /// Await [`FrameRequest::decode`] and feed the response back through
    /// `Viewer::complete_request`. Until then other navigation is blocked.
    /// Dropping the request, or its response, releases the navigation.
    Decode(FrameRequest),
}

impl Dispatch {
    #[must_use]
    pub fn is_handled(&self) -> bool {
        matches!(self, Dispatch::Handled)
    }
}

/// Keeps an on-demand navigation reserved while its request or response
/// is alive.
///
/// The viewer holds the matching [`LeaseWatch`]; once every copy of the
/// lease is gone the reservation counts as abandoned.
#[derive(Debug, Clone)]
pub(super) struct Lease {
    _held: Arc<()>,
}

impl Lease {
    pub(super) fn issue() -> (Self, LeaseWatch) {
        let held = Arc::new(());
        let watch = LeaseWatch(Arc::downgrade(&held));
        (Self { _held: held }, watch)
    }
}

#[derive(Debug, Clone)]
pub(super) struct LeaseWatch(Weak<()>);

impl LeaseWatch {
    pub(super) fn is_released(&self) -> bool {
        self.0.strong_count() == 0
    }
}

/// A decode the host runs off the event loop.
pub struct FrameRequest {
    pub(super) session: SessionId,
    pub(super) index: usize,
    pub(super) kind: FrameKind,
    pub(super) payload: Arc<[u8]>,
    pub(super) decoder: SharedDecoder,
    pub(super) lease: Lease,
}

impl FrameRequest {
    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    /// Decodes the frame on the blocking pool.
    pub async fn decode(self) -> FrameResponse {
        let result = decode_blocking(self.decoder, self.kind, self.payload).await;
        FrameResponse {
            session: self.session,
            index: self.index,
            result,
            lease: self.lease,
        }
    }
}

impl fmt::Debug for FrameRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameRequest")
            .field("session", &self.session)
            .field("index", &self.index)
            .field("kind", &self.kind)
            .field("payload_len", &self.payload.len())
            .finish_non_exhaustive()
    }
}

/// Outcome of a [`FrameRequest`].
#[derive(Debug, Clone)]
pub struct FrameResponse {
    pub session: SessionId,
    pub index: usize,
    pub result: Result<DecodedFrame, DecodeError>,
    lease: Lease,
}
