// SPDX-License-Identifier: MPL-2.0
//! Viewer newtypes.
//!
//! This module provides type-safe wrappers for transform values,
//! ensuring they are always within valid ranges.

use crate::config::{MAX_SCALE, MIN_SCALE, MIN_WINDOW_WIDTH};

// =============================================================================
// Scale
// =============================================================================

/// View scale factor, guaranteed positive and within [`MIN_SCALE`]..=[`MAX_SCALE`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(f32);

impl Scale {
    /// Creates a new scale, clamping the value to the global bounds.
    ///
    /// Non-finite input falls back to 1.0.
    #[must_use]
    pub fn new(value: f32) -> Self {
        Self::within(value, MIN_SCALE, MAX_SCALE)
    }

    /// Creates a new scale clamped to narrower configured bounds.
    #[must_use]
    pub fn within(value: f32, min: f32, max: f32) -> Self {
        let min = min.max(MIN_SCALE);
        let max = max.clamp(min, MAX_SCALE);
        let value = if value.is_finite() { value } else { 1.0 };
        Self(value.clamp(min, max))
    }

    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }

    /// Returns the scale as a rounded percentage for display.
    #[must_use]
    pub fn percent(self) -> u32 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = (self.0 * 100.0).round() as u32;
        percent
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self(1.0)
    }
}

// =============================================================================
// Point / Translation
// =============================================================================

/// A position in surface (screen) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Image offset from the centred position, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Translation {
    pub x: f32,
    pub y: f32,
}

impl Translation {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// =============================================================================
// WindowLevel
// =============================================================================

/// Intensity window for structured frames.
///
/// The width is always at least [`MIN_WINDOW_WIDTH`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowLevel {
    width: f32,
    center: f32,
}

impl WindowLevel {
    /// Creates a window, clamping the width to stay positive.
    #[must_use]
    pub fn new(width: f32, center: f32) -> Self {
        let width = if width.is_finite() { width } else { MIN_WINDOW_WIDTH };
        let center = if center.is_finite() { center } else { 0.0 };
        Self {
            width: width.max(MIN_WINDOW_WIDTH),
            center,
        }
    }

    /// Window spanning the given intensity range.
    #[must_use]
    pub fn from_range(min: f32, max: f32) -> Self {
        Self::new(max - min, (min + max) / 2.0)
    }

    #[must_use]
    pub fn width(self) -> f32 {
        self.width
    }

    #[must_use]
    pub fn center(self) -> f32 {
        self.center
    }

    /// Returns a window shifted by the given deltas.
    #[must_use]
    pub fn adjusted(self, delta_width: f32, delta_center: f32) -> Self {
        Self::new(self.width + delta_width, self.center + delta_center)
    }
}

impl Default for WindowLevel {
    /// Full 8-bit range; the value raster frames carry.
    fn default() -> Self {
        Self {
            width: 256.0,
            center: 128.0,
        }
    }
}
