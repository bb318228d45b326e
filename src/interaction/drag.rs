// SPDX-License-Identifier: MPL-2.0
//! Drag-to-navigate state.
//!
//! Vertical pointer travel accumulates; every `step_px` of travel yields one
//! frame step. Dragging down moves forward.

use super::input::Direction;
use crate::domain::viewer::Point;

/// Tracks a navigation drag gesture.
#[derive(Debug, Clone, Default)]
pub struct DragNavigation {
    last_position: Option<Point>,
    accumulated: f32,
}

impl DragNavigation {
    /// Starts a gesture at `position`.
    pub fn start(&mut self, position: Point) {
        self.last_position = Some(position);
        self.accumulated = 0.0;
    }

    /// Ends the gesture and forgets leftover travel.
    pub fn stop(&mut self) {
        self.last_position = None;
        self.accumulated = 0.0;
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.last_position.is_some()
    }

    /// Feeds a pointer move; returns a step once enough travel accumulated.
    ///
    /// At most one step is produced per move and leftover travel is capped
    /// below one step, so a fast flick does not queue up frames.
    pub fn update(&mut self, position: Point, step_px: f32) -> Option<Direction> {
        let last = self.last_position?;
        self.last_position = Some(position);
        self.accumulated += position.y - last.y;

        let step_px = step_px.max(1.0);
        let direction = if self.accumulated >= step_px {
            Direction::Forward
        } else if self.accumulated <= -step_px {
            Direction::Backward
        } else {
            return None;
        };

        let remainder = self.accumulated - step_px.copysign(self.accumulated);
        self.accumulated = remainder.clamp(-step_px + f32::EPSILON, step_px - f32::EPSILON);
        Some(direction)
    }
}
