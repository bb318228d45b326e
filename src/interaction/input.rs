// SPDX-License-Identifier: MPL-2.0
//! Input events a host forwards to the viewer.

use crate::domain::viewer::Point;

/// Keyboard modifiers held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        shift: false,
        alt: false,
    };

    /// Whether the navigation modifier (Ctrl or Shift) is held.
    ///
    /// It lets wheel and drag navigate frames while a tool would
    /// otherwise take them.
    #[must_use]
    pub fn navigation_held(self) -> bool {
        self.ctrl || self.shift
    }
}

/// Keys with a navigation meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    PageUp,
    PageDown,
    Home,
    End,
}

/// Navigation direction through the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Scrolling down (positive delta) moves forward.
    #[must_use]
    pub fn from_wheel(delta_y: f32) -> Option<Self> {
        if delta_y > 0.0 {
            Some(Direction::Forward)
        } else if delta_y < 0.0 {
            Some(Direction::Backward)
        } else {
            None
        }
    }

    /// Direction of a stepping key; `None` for Home and End.
    #[must_use]
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::ArrowDown | Key::ArrowRight | Key::PageDown => Some(Direction::Forward),
            Key::ArrowUp | Key::ArrowLeft | Key::PageUp => Some(Direction::Backward),
            Key::Home | Key::End => None,
        }
    }
}

/// Pointer, wheel and keyboard input in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Wheel scrolled; positive `delta_y` scrolls down.
    Wheel { delta_y: f32, modifiers: Modifiers },
    PointerDown { position: Point, modifiers: Modifiers },
    PointerMove { position: Point, modifiers: Modifiers },
    PointerUp { position: Point },
    Key(Key),
}
