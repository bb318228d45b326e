// SPDX-License-Identifier: MPL-2.0
//! Viewer state types: the view transform, interaction tools and the
//! read-only snapshot exposed to hosts.

pub mod newtypes;

pub use newtypes::{Point, Scale, Translation, WindowLevel};

use std::fmt;

/// Interaction mode bound to pointer input.
///
/// At most one tool is active at a time; `None` in [`ViewerState::active_tool`]
/// means pointer drags navigate frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Pan,
    Zoom,
    WindowLevel,
}

impl Tool {
    /// Tools that consume pointer drags, suppressing drag navigation.
    #[must_use]
    pub fn is_drag_exclusive(self) -> bool {
        matches!(self, Tool::Pan | Tool::WindowLevel)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tool::Pan => "pan",
            Tool::Zoom => "zoom",
            Tool::WindowLevel => "window-level",
        };
        f.write_str(name)
    }
}

/// A tool selection from the host toolbar.
///
/// `Reset` is an action rather than a mode: it restores the fit-to-view
/// transform and leaves the active tool unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSelection {
    Activate(Tool),
    Deactivate,
    Reset,
}

/// Pixel transform applied on every paint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: Scale,
    pub translation: Translation,
    pub window: WindowLevel,
}

impl Transform {
    /// Transform that fits a frame inside the surface, centred, unpanned.
    #[must_use]
    pub fn fit_to_view(
        frame_size: (u32, u32),
        surface_size: (u32, u32),
        window: WindowLevel,
    ) -> Self {
        let (frame_w, frame_h) = frame_size;
        let (surface_w, surface_h) = surface_size;

        let scale = if frame_w == 0 || frame_h == 0 || surface_w == 0 || surface_h == 0 {
            Scale::default()
        } else {
            #[allow(clippy::cast_precision_loss)]
            let fit = (surface_w as f32 / frame_w as f32).min(surface_h as f32 / frame_h as f32);
            Scale::new(fit)
        };

        Self {
            scale,
            translation: Translation::default(),
            window,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Scale::default(),
            translation: Translation::default(),
            window: WindowLevel::default(),
        }
    }
}

/// Read-only snapshot of the interactive state of a viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerState {
    pub current_index: usize,
    pub total_frames: usize,
    pub active_tool: Option<Tool>,
    pub transform: Transform,
}
