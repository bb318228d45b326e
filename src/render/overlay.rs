// SPDX-License-Identifier: MPL-2.0
//! On-screen overlay describing the displayed frame.

use crate::domain::frame::FrameKind;
use crate::domain::viewer::WindowLevel;
use std::fmt;

/// Whether the displayed frame has pixels yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FrameStatus {
    /// Pixels are on screen.
    Ready,
    /// Waiting for a decode to finish.
    #[default]
    Loading,
    /// The frame could not be decoded.
    Unavailable(String),
    /// Nothing could be loaded; there are no frames to show.
    LoadFailed(String),
}

/// Informational text drawn over the frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Overlay {
    /// 0-based index of the displayed frame.
    pub index: usize,
    pub total: usize,
    pub kind: Option<FrameKind>,
    pub status: FrameStatus,
    pub scale_percent: u32,
    /// Present for structured frames only.
    pub window: Option<WindowLevel>,
}

impl Overlay {
    /// Overlay lines, top to bottom.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        if let FrameStatus::LoadFailed(reason) = &self.status {
            return vec![format!("Load failed: {reason}")];
        }
        let mut lines = Vec::with_capacity(3);

        let mut first = format!("{} / {}", self.index + 1, self.total);
        if let Some(kind) = self.kind {
            first.push_str("  ");
            first.push_str(kind.label());
        }
        lines.push(first);

        match &self.status {
            FrameStatus::Ready => {
                let mut second = format!("Zoom {}%", self.scale_percent);
                if let Some(window) = self.window {
                    second.push_str(&format!(
                        "  W {:.0} L {:.0}",
                        window.width(),
                        window.center()
                    ));
                }
                lines.push(second);
            }
            FrameStatus::Loading => lines.push("Loading...".to_owned()),
            FrameStatus::Unavailable(reason) => lines.push(format!("Unavailable: {reason}")),
            FrameStatus::LoadFailed(_) => {}
        }

        lines
    }
}

impl fmt::Display for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join(" | "))
    }
}
