// SPDX-License-Identifier: MPL-2.0
//! Frame and manifest types.
//!
//! A [`Manifest`] is the ordered set of frames derived from one loaded
//! reference. It is built once per load and replaced wholesale on the next
//! load; entries never change after construction.

mod natural_order;

pub use natural_order::natural_cmp;

use std::fmt;
use std::sync::Arc;

/// How a frame's payload has to be decoded and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Medical image requiring window width/center to map intensities.
    StructuredImage,
    /// Conventional compressed image (PNG, JPEG, ...), displayed as-is.
    RasterImage,
}

impl FrameKind {
    /// Returns whether window/level adjustment applies to this kind.
    #[must_use]
    pub fn supports_windowing(self) -> bool {
        matches!(self, FrameKind::StructuredImage)
    }

    /// Short label used by the on-screen overlay.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            FrameKind::StructuredImage => "DICOM",
            FrameKind::RasterImage => "Image",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One displayable frame with its undecoded payload.
#[derive(Debug, Clone)]
pub struct FrameEntry {
    filename: String,
    payload: Arc<[u8]>,
    kind: FrameKind,
    order: usize,
}

impl FrameEntry {
    /// Returns the entry name as stored in the archive (or the reference filename).
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Returns the raw, still-encoded bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Returns a shared handle to the raw bytes.
    #[must_use]
    pub fn payload_arc(&self) -> Arc<[u8]> {
        Arc::clone(&self.payload)
    }

    #[must_use]
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    /// Returns the uncompressed payload size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.payload.len() as u64
    }

    /// Returns the position assigned by natural ordering (0-based).
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }
}

/// A frame that qualified for the manifest but has no position yet.
#[derive(Debug, Clone)]
pub struct FrameCandidate {
    pub filename: String,
    pub payload: Vec<u8>,
    pub kind: FrameKind,
}

impl FrameCandidate {
    pub fn new(filename: impl Into<String>, payload: Vec<u8>, kind: FrameKind) -> Self {
        Self {
            filename: filename.into(),
            payload,
            kind,
        }
    }
}

/// Ordered collection of frames for one viewing session.
#[derive(Debug, Clone)]
pub struct Manifest {
    entries: Arc<[FrameEntry]>,
    is_archive: bool,
}

impl Manifest {
    /// Builds a manifest from unordered candidates, assigning natural order.
    #[must_use]
    pub fn from_candidates(mut candidates: Vec<FrameCandidate>, is_archive: bool) -> Self {
        candidates.sort_by(|a, b| natural_cmp(&a.filename, &b.filename));

        let entries: Vec<FrameEntry> = candidates
            .into_iter()
            .enumerate()
            .map(|(order, candidate)| FrameEntry {
                filename: candidate.filename,
                payload: Arc::from(candidate.payload),
                kind: candidate.kind,
                order,
            })
            .collect();

        Self {
            entries: Arc::from(entries),
            is_archive,
        }
    }

    /// Builds a one-frame manifest for a non-archive reference.
    #[must_use]
    pub fn single(candidate: FrameCandidate) -> Self {
        Self::from_candidates(vec![candidate], false)
    }

    #[must_use]
    pub fn entries(&self) -> &[FrameEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FrameEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn total_frames(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn is_archive(&self) -> bool {
        self.is_archive
    }

    /// Total payload size of all frames in bytes.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(FrameEntry::size_bytes).sum()
    }
}
