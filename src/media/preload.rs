// SPDX-License-Identifier: MPL-2.0
//! Preload cache for instant frame navigation.
//!
//! After a manifest is built, every frame is decoded in the background,
//! strictly in manifest order and one at a time, so progress increases
//! monotonically. A frame that fails to decode is recorded as failed and
//! the pass moves on.
//!
//! # Design
//!
//! - **Sequential**: one decode in flight per session
//! - **Session-tagged**: every event carries the [`SessionId`] of the load
//!   that produced it; the viewer drops events from older sessions
//! - **Append-only**: entries are never removed during a session, only the
//!   whole cache is cleared on reload
//!
//! # Usage
//!
//! ```ignore
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let handle = spawn_preload(session, manifest.clone(), decoder, tx);
//!
//! while let Some(PreloadEvent::Frame { entry, .. }) = rx.recv().await {
//!     cache.record(entry);
//! }
//! ```

use crate::domain::frame::{FrameKind, Manifest};
use crate::domain::media::DecodedFrame;
use crate::media::decoder::{decode_blocking, SharedDecoder};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Identifier of one load; increases on every load of a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SessionId(u64);

impl SessionId {
    /// Returns the identifier of the following session.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Decode outcome of one frame.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    index: usize,
    decoded: Option<DecodedFrame>,
    error: Option<String>,
    kind: FrameKind,
}

impl CacheEntry {
    /// Entry for a frame that decoded successfully.
    #[must_use]
    pub fn loaded(index: usize, decoded: DecodedFrame) -> Self {
        Self {
            index,
            kind: decoded.kind(),
            decoded: Some(decoded),
            error: None,
        }
    }

    /// Entry for a frame that failed to decode.
    #[must_use]
    pub fn failed(index: usize, kind: FrameKind, error: impl Into<String>) -> Self {
        Self {
            index,
            decoded: None,
            error: Some(error.into()),
            kind,
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns whether a renderable handle is available.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.decoded.is_some()
    }

    #[must_use]
    pub fn decoded(&self) -> Option<&DecodedFrame> {
        self.decoded.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn kind(&self) -> FrameKind {
        self.kind
    }
}

/// Load state of a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Loaded,
    Failed,
}

/// Overall preload progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// `round(100 * completed / total)`.
    pub percent: u8,
    /// Frames that finished decoding, successfully or not.
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    #[must_use]
    pub fn new(completed: usize, total: usize) -> Self {
        let completed = completed.min(total);
        let percent = if total == 0 {
            100
        } else {
            // Integer round-half-up of 100 * completed / total.
            #[allow(clippy::cast_possible_truncation)]
            let percent = ((200 * completed + total) / (2 * total)) as u8;
            percent
        };
        Self {
            percent,
            completed,
            total,
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

/// Counts of frames per load state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreloadStats {
    pub loaded: usize,
    pub failed: usize,
    pub pending: usize,
}

/// Message sent by a running preload task.
#[derive(Debug, Clone)]
pub enum PreloadEvent {
    /// One more frame finished decoding.
    Frame {
        session: SessionId,
        entry: CacheEntry,
        progress: Progress,
    },
    /// Every frame of the session has been processed.
    Finished { session: SessionId },
}

impl PreloadEvent {
    #[must_use]
    pub fn session(&self) -> SessionId {
        match self {
            PreloadEvent::Frame { session, .. } | PreloadEvent::Finished { session } => *session,
        }
    }
}

/// Decoded frames of the current session, indexed like the manifest.
#[derive(Debug, Clone, Default)]
pub struct PreloadCache {
    entries: Vec<Option<CacheEntry>>,
    completed: usize,
}

impl PreloadCache {
    /// Creates an empty cache for a manifest of `total` frames.
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            entries: vec![None; total],
            completed: 0,
        }
    }

    /// Returns the entry of `index`, or `None` while it is pending.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CacheEntry> {
        self.entries.get(index).and_then(Option::as_ref)
    }

    /// Returns the decoded handle of `index` if it is loaded.
    #[must_use]
    pub fn decoded(&self, index: usize) -> Option<&DecodedFrame> {
        self.get(index).and_then(CacheEntry::decoded)
    }

    #[must_use]
    pub fn state(&self, index: usize) -> LoadState {
        match self.get(index) {
            None => LoadState::Pending,
            Some(entry) if entry.is_loaded() => LoadState::Loaded,
            Some(_) => LoadState::Failed,
        }
    }

    /// Records a finished frame.
    ///
    /// Returns `false` for out-of-range indices and frames already recorded.
    pub fn record(&mut self, entry: CacheEntry) -> bool {
        let Some(slot) = self.entries.get_mut(entry.index()) else {
            return false;
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(entry);
        self.completed += 1;
        true
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::new(self.completed, self.entries.len())
    }

    #[must_use]
    pub fn stats(&self) -> PreloadStats {
        let loaded = self
            .entries
            .iter()
            .flatten()
            .filter(|entry| entry.is_loaded())
            .count();
        PreloadStats {
            loaded,
            failed: self.completed - loaded,
            pending: self.entries.len() - self.completed,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed == self.entries.len()
    }

    /// Drops every entry, releasing decoded pixel buffers.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.completed = 0;
    }
}

/// Decodes every frame of `manifest` in order, reporting each result.
///
/// `on_frame` receives the entry and the progress after it. Returning
/// `false` from it stops the pass.
pub async fn run_preload<F>(manifest: &Manifest, decoder: SharedDecoder, mut on_frame: F)
where
    F: FnMut(CacheEntry, Progress) -> bool,
{
    let total = manifest.total_frames();

    for (index, frame) in manifest.entries().iter().enumerate() {
        let result =
            decode_blocking(decoder.clone(), frame.kind(), frame.payload_arc()).await;

        let entry = match result {
            Ok(decoded) => CacheEntry::loaded(index, decoded),
            Err(e) => {
                tracing::warn!(frame = frame.filename(), error = %e, "frame failed to decode");
                CacheEntry::failed(index, frame.kind(), e.to_string())
            }
        };

        if !on_frame(entry, Progress::new(index + 1, total)) {
            tracing::debug!(index, "preload stopped early");
            return;
        }
    }
}

/// Running preload task; aborted when dropped.
#[derive(Debug)]
pub struct PreloadHandle {
    session: SessionId,
    task: JoinHandle<()>,
}

impl PreloadHandle {
    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the task; events already sent stay in the channel.
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Drop for PreloadHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns the preload pass of a session on the current Tokio runtime.
///
/// Must be called from within a runtime. The task ends early when the
/// receiving side of `events` is dropped.
pub fn spawn_preload(
    session: SessionId,
    manifest: Manifest,
    decoder: SharedDecoder,
    events: UnboundedSender<PreloadEvent>,
) -> PreloadHandle {
    let task = tokio::spawn(async move {
        tracing::debug!(
            session = session.value(),
            frames = manifest.total_frames(),
            "preload started"
        );

        run_preload(&manifest, decoder, |entry, progress| {
            events
                .send(PreloadEvent::Frame {
                    session,
                    entry,
                    progress,
                })
                .is_ok()
        })
        .await;

        let _ = events.send(PreloadEvent::Finished { session });
    });

    PreloadHandle { session, task }
}
