// SPDX-License-Identifier: MPL-2.0
//! Pointer, wheel and keyboard interaction.
//!
//! - [`navigation`]: validated, serialized frame index transitions
//! - [`tools`]: the active interaction tool and its pointer bindings
//! - [`drag`]: drag-to-navigate gesture tracking

pub mod drag;
pub mod input;
pub mod navigation;
pub mod tools;

pub use drag::DragNavigation;
pub use input::{Direction, InputEvent, Key, Modifiers};
pub use navigation::{NavigationController, NavigationSource, Rejection};
pub use tools::{ToolManager, ToolOutcome, ToolSettings};
