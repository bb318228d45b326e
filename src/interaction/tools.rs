// SPDX-License-Identifier: MPL-2.0
//! Interaction tools and their pointer bindings.
//!
//! [`ToolManager`] keeps exactly one tool active (or none). Each tool is a
//! [`ToolHandler`] bound into [`PointerBindings`]; activating a tool always
//! unbinds the previous handler before binding the new one, so a pointer
//! event reaches at most one handler.

use crate::config::ToolsConfig;
use crate::domain::frame::FrameKind;
use crate::domain::viewer::{Point, Scale, Tool, Transform, Translation};
use crate::error::ToolError;

/// Numeric tool settings resolved from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolSettings {
    pub zoom_factor: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub window_level_sensitivity: f32,
}

impl ToolSettings {
    #[must_use]
    pub fn from_config(config: &ToolsConfig) -> Self {
        let (min_scale, max_scale) = config.scale_bounds();
        Self {
            zoom_factor: config.zoom_factor(),
            min_scale,
            max_scale,
            window_level_sensitivity: config.window_level_sensitivity(),
        }
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::from_config(&ToolsConfig::default())
    }
}

/// What a handler needs to act on the view.
pub struct ToolContext<'a> {
    pub transform: &'a mut Transform,
    /// Kind of the displayed frame; `None` when nothing is displayed.
    pub frame_kind: Option<FrameKind>,
    pub settings: &'a ToolSettings,
}

/// Result of routing one event to the active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOutcome {
    /// The tool has no use for the event; it may navigate instead.
    Ignored,
    /// The tool took the event without changing the view.
    Consumed,
    /// The transform changed; repaint.
    TransformChanged,
    /// Accepted but not applicable; informational.
    Rejected(ToolError),
}

/// Pointer and wheel callbacks of one tool.
///
/// Default methods ignore the event.
pub trait ToolHandler: Send {
    fn tool(&self) -> Tool;

    fn on_pointer_down(&mut self, _position: Point, _ctx: &mut ToolContext<'_>) -> ToolOutcome {
        ToolOutcome::Ignored
    }

    fn on_pointer_move(&mut self, _position: Point, _ctx: &mut ToolContext<'_>) -> ToolOutcome {
        ToolOutcome::Ignored
    }

    fn on_pointer_up(&mut self, _position: Point, _ctx: &mut ToolContext<'_>) -> ToolOutcome {
        ToolOutcome::Ignored
    }

    fn on_wheel(&mut self, _delta_y: f32, _ctx: &mut ToolContext<'_>) -> ToolOutcome {
        ToolOutcome::Ignored
    }

    /// Drops any pointer capture; called when the handler is unbound.
    fn release(&mut self) {}
}

// =============================================================================
// Handlers
// =============================================================================

/// Drag to move the image; movement is divided by the scale so the image
/// follows the pointer at any zoom.
#[derive(Debug, Default)]
pub struct PanHandler {
    origin: Option<Point>,
}

impl ToolHandler for PanHandler {
    fn tool(&self) -> Tool {
        Tool::Pan
    }

    fn on_pointer_down(&mut self, position: Point, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        if ctx.frame_kind.is_none() {
            return ToolOutcome::Rejected(ToolError::NoFrame);
        }
        self.origin = Some(position);
        ToolOutcome::Consumed
    }

    fn on_pointer_move(&mut self, position: Point, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        let Some(origin) = self.origin else {
            return ToolOutcome::Ignored;
        };
        self.origin = Some(position);

        let scale = ctx.transform.scale.value();
        let dx = (position.x - origin.x) / scale;
        let dy = (position.y - origin.y) / scale;
        if dx == 0.0 && dy == 0.0 {
            return ToolOutcome::Consumed;
        }

        let current = ctx.transform.translation;
        ctx.transform.translation = Translation::new(current.x + dx, current.y + dy);
        ToolOutcome::TransformChanged
    }

    fn on_pointer_up(&mut self, _position: Point, _ctx: &mut ToolContext<'_>) -> ToolOutcome {
        if self.origin.take().is_some() {
            ToolOutcome::Consumed
        } else {
            ToolOutcome::Ignored
        }
    }

    fn release(&mut self) {
        self.origin = None;
    }
}

/// Wheel to zoom: scrolling up zooms in by the configured factor.
#[derive(Debug, Default)]
pub struct ZoomHandler;

impl ToolHandler for ZoomHandler {
    fn tool(&self) -> Tool {
        Tool::Zoom
    }

    fn on_wheel(&mut self, delta_y: f32, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        let current = ctx.transform.scale.value();
        let target = if delta_y < 0.0 {
            current * ctx.settings.zoom_factor
        } else if delta_y > 0.0 {
            current / ctx.settings.zoom_factor
        } else {
            return ToolOutcome::Consumed;
        };

        let scale = Scale::within(target, ctx.settings.min_scale, ctx.settings.max_scale);
        if scale == ctx.transform.scale {
            return ToolOutcome::Consumed;
        }
        ctx.transform.scale = scale;
        ToolOutcome::TransformChanged
    }
}

/// Drag to adjust the intensity window of structured frames.
///
/// Horizontal travel changes the width, vertical travel the center.
#[derive(Debug, Default)]
pub struct WindowLevelHandler {
    origin: Option<Point>,
    captured: bool,
}

impl ToolHandler for WindowLevelHandler {
    fn tool(&self) -> Tool {
        Tool::WindowLevel
    }

    fn on_pointer_down(&mut self, position: Point, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        // The gesture stays captured even when rejected so the drag does not
        // fall through to navigation.
        self.captured = true;
        match ctx.frame_kind {
            None => ToolOutcome::Rejected(ToolError::NoFrame),
            Some(kind) if !kind.supports_windowing() => {
                ToolOutcome::Rejected(ToolError::WindowLevelUnsupported)
            }
            Some(_) => {
                self.origin = Some(position);
                ToolOutcome::Consumed
            }
        }
    }

    fn on_pointer_move(&mut self, position: Point, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        if !self.captured {
            return ToolOutcome::Ignored;
        }
        let Some(origin) = self.origin else {
            return ToolOutcome::Consumed;
        };
        self.origin = Some(position);

        let sensitivity = ctx.settings.window_level_sensitivity;
        let dw = (position.x - origin.x) * sensitivity;
        let dc = (position.y - origin.y) * sensitivity;
        if dw == 0.0 && dc == 0.0 {
            return ToolOutcome::Consumed;
        }

        ctx.transform.window = ctx.transform.window.adjusted(dw, dc);
        ToolOutcome::TransformChanged
    }

    fn on_pointer_up(&mut self, _position: Point, _ctx: &mut ToolContext<'_>) -> ToolOutcome {
        let was_captured = self.captured;
        self.release();
        if was_captured {
            ToolOutcome::Consumed
        } else {
            ToolOutcome::Ignored
        }
    }

    fn release(&mut self) {
        self.origin = None;
        self.captured = false;
    }
}

// =============================================================================
// Bindings
// =============================================================================

/// Identifies one bind operation; a new id is issued on every bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// The single slot pointer events are routed through.
#[derive(Default)]
pub struct PointerBindings {
    bound: Option<(HandlerId, Box<dyn ToolHandler>)>,
    next_id: u64,
    binds: u64,
    unbinds: u64,
}

impl PointerBindings {
    /// Binds `handler`, unbinding whatever was bound before.
    pub fn bind(&mut self, handler: Box<dyn ToolHandler>) -> HandlerId {
        self.unbind();
        let id = HandlerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.binds += 1;
        tracing::debug!(tool = %handler.tool(), "pointer handler bound");
        self.bound = Some((id, handler));
        id
    }

    /// Unbinds the current handler, releasing its capture.
    pub fn unbind(&mut self) -> Option<Tool> {
        let (_, mut handler) = self.bound.take()?;
        handler.release();
        self.unbinds += 1;
        Some(handler.tool())
    }

    #[must_use]
    pub fn bound_tool(&self) -> Option<Tool> {
        self.bound.as_ref().map(|(_, handler)| handler.tool())
    }

    #[must_use]
    pub fn bound_id(&self) -> Option<HandlerId> {
        self.bound.as_ref().map(|(id, _)| *id)
    }

    /// Number of handlers currently bound: zero or one.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        usize::from(self.bound.is_some())
    }

    #[must_use]
    pub fn bind_count(&self) -> u64 {
        self.binds
    }

    #[must_use]
    pub fn unbind_count(&self) -> u64 {
        self.unbinds
    }

    fn handler_mut(&mut self) -> Option<&mut (dyn ToolHandler + 'static)> {
        self.bound.as_mut().map(|(_, handler)| &mut **handler)
    }
}

impl std::fmt::Debug for PointerBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerBindings")
            .field("bound", &self.bound_tool())
            .field("binds", &self.binds)
            .field("unbinds", &self.unbinds)
            .finish()
    }
}

// =============================================================================
// Manager
// =============================================================================

fn handler_for(tool: Tool) -> Box<dyn ToolHandler> {
    match tool {
        Tool::Pan => Box::new(PanHandler::default()),
        Tool::Zoom => Box::new(ZoomHandler),
        Tool::WindowLevel => Box::new(WindowLevelHandler::default()),
    }
}

/// Owns the active tool of one viewer.
#[derive(Debug, Default)]
pub struct ToolManager {
    bindings: PointerBindings,
    settings: ToolSettings,
}

impl ToolManager {
    #[must_use]
    pub fn new(settings: ToolSettings) -> Self {
        Self {
            bindings: PointerBindings::default(),
            settings,
        }
    }

    #[must_use]
    pub fn active(&self) -> Option<Tool> {
        self.bindings.bound_tool()
    }

    #[must_use]
    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    #[must_use]
    pub fn bindings(&self) -> &PointerBindings {
        &self.bindings
    }

    /// Makes `tool` the active tool.
    ///
    /// Returns `false` if it already was; the existing binding is kept.
    pub fn activate(&mut self, tool: Tool) -> bool {
        if self.active() == Some(tool) {
            return false;
        }
        self.bindings.bind(handler_for(tool));
        tracing::info!(%tool, "tool activated");
        true
    }

    /// Deactivates the active tool, returning it.
    pub fn deactivate(&mut self) -> Option<Tool> {
        let previous = self.bindings.unbind();
        if let Some(tool) = previous {
            tracing::info!(%tool, "tool deactivated");
        }
        previous
    }

    /// Whether a pointer drag goes to the tool rather than navigation.
    #[must_use]
    pub fn captures_drag(&self, navigation_held: bool) -> bool {
        !navigation_held && self.active().is_some_and(Tool::is_drag_exclusive)
    }

    /// Whether the wheel goes to the tool rather than navigation.
    #[must_use]
    pub fn captures_wheel(&self, navigation_held: bool) -> bool {
        !navigation_held && self.active() == Some(Tool::Zoom)
    }

    pub fn pointer_down(
        &mut self,
        position: Point,
        transform: &mut Transform,
        frame_kind: Option<FrameKind>,
    ) -> ToolOutcome {
        let settings = self.settings;
        let mut ctx = ToolContext {
            transform,
            frame_kind,
            settings: &settings,
        };
        match self.bindings.handler_mut() {
            Some(handler) => handler.on_pointer_down(position, &mut ctx),
            None => ToolOutcome::Ignored,
        }
    }

    pub fn pointer_move(
        &mut self,
        position: Point,
        transform: &mut Transform,
        frame_kind: Option<FrameKind>,
    ) -> ToolOutcome {
        let settings = self.settings;
        let mut ctx = ToolContext {
            transform,
            frame_kind,
            settings: &settings,
        };
        match self.bindings.handler_mut() {
            Some(handler) => handler.on_pointer_move(position, &mut ctx),
            None => ToolOutcome::Ignored,
        }
    }

    pub fn pointer_up(
        &mut self,
        position: Point,
        transform: &mut Transform,
        frame_kind: Option<FrameKind>,
    ) -> ToolOutcome {
        let settings = self.settings;
        let mut ctx = ToolContext {
            transform,
            frame_kind,
            settings: &settings,
        };
        match self.bindings.handler_mut() {
            Some(handler) => handler.on_pointer_up(position, &mut ctx),
            None => ToolOutcome::Ignored,
        }
    }

    pub fn wheel(
        &mut self,
        delta_y: f32,
        transform: &mut Transform,
        frame_kind: Option<FrameKind>,
    ) -> ToolOutcome {
        let settings = self.settings;
        let mut ctx = ToolContext {
            transform,
            frame_kind,
            settings: &settings,
        };
        match self.bindings.handler_mut() {
            Some(handler) => handler.on_wheel(delta_y, &mut ctx),
            None => ToolOutcome::Ignored,
        }
    }
}
