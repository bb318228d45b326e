// SPDX-License-Identifier: MPL-2.0
//! Host-facing viewer.
//!
//! [`Viewer`] ties the pieces together for one drawing surface: it fetches
//! and extracts a reference, starts the preload pass, routes input through
//! the tool manager and navigation controller, and repaints through the
//! viewport renderer.
//!
//! # Event loop
//!
//! All state lives on the host's event loop; nothing here locks. Background
//! work reports back through two paths:
//!
//! - preload results arrive as [`PreloadEvent`]s the host applies with
//!   [`Viewer::pump`] (or [`Viewer::wait_for_preload`])
//! - a navigation that lands on an undecoded frame returns
//!   [`Dispatch::Decode`]; the host awaits the request and passes the
//!   response to [`Viewer::complete_request`]
//!
//! Both carry the [`SessionId`] of the load they belong to. Results from an
//! older load, or for a navigation that was superseded, are discarded.

mod request;

pub use request::{Dispatch, FrameRequest, FrameResponse};

use request::{Lease, LeaseWatch};

use crate::config::Config;
use crate::domain::frame::{FrameEntry, FrameKind, Manifest};
use crate::domain::media::DecodedFrame;
use crate::domain::viewer::{ToolSelection, Transform, ViewerState};
use crate::error::{Error, ExtractError, Result};
use crate::fetch::{AnyFetcher, Fetcher, Reference};
use crate::interaction::{
    Direction, DragNavigation, InputEvent, Key, NavigationController, NavigationSource,
    ToolManager, ToolOutcome, ToolSettings,
};
use crate::media::archive::{extract_with_report, is_zip, single_frame};
use crate::media::preload::{spawn_preload, PreloadHandle, PreloadStats};
use crate::media::{CacheEntry, PreloadCache, PreloadEvent, Progress, SessionId};
use crate::media::{SharedDecoder, StandardDecoder};
use crate::notify::{LogNotifier, Notification, Notifier};
use crate::render::{FrameStatus, Overlay, RenderSurface, ViewportRenderer};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

type ProgressCallback = Box<dyn FnMut(Progress) + Send>;

/// Result of a successful [`Viewer::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub session: SessionId,
    pub total_frames: usize,
    pub is_archive: bool,
    /// Archive entries left out: non-frames and unreadable entries.
    pub skipped_entries: usize,
}

/// Which consumer owns the current pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    Idle,
    Tool,
    Navigate,
}

#[derive(Debug)]
struct Displayed {
    index: usize,
    frame: Option<DecodedFrame>,
    status: FrameStatus,
}

/// Everything that belongs to one loaded reference.
#[derive(Debug)]
struct Session {
    id: SessionId,
    reference: Reference,
    manifest: Manifest,
    cache: PreloadCache,
    navigation: NavigationController,
    transform: Transform,
    fitted: bool,
    window_touched: bool,
    displayed: Displayed,
    preload: Option<PreloadHandle>,
    preload_done: bool,
    /// Watches the request of an on-demand navigation in flight.
    pending: Option<LeaseWatch>,
}

impl Session {
    fn frame_kind(&self) -> Option<FrameKind> {
        self.displayed.frame.as_ref().map(DecodedFrame::kind)
    }

    /// Abandons an on-demand navigation whose request and response were
    /// dropped without completing.
    fn release_dropped_request(&mut self) {
        let Some(index) = self.navigation.in_flight() else {
            self.pending = None;
            return;
        };
        if self.pending.as_ref().is_some_and(LeaseWatch::is_released) {
            tracing::debug!(index, "decode request dropped, releasing navigation");
            self.navigation.abandon();
            self.pending = None;
        }
    }

    fn awaiting_first_frame(&self) -> bool {
        self.displayed.frame.is_none() && self.displayed.status == FrameStatus::Loading
    }

    fn show(
        &mut self,
        index: usize,
        frame: Option<DecodedFrame>,
        status: FrameStatus,
        surface_size: (u32, u32),
    ) {
        if let Some(frame) = &frame {
            if !self.window_touched {
                self.transform.window = frame.default_window();
            }
            if !self.fitted {
                self.transform =
                    Transform::fit_to_view(frame.size(), surface_size, self.transform.window);
                self.fitted = true;
            }
        }
        self.displayed = Displayed {
            index,
            frame,
            status,
        };
    }

    fn fit(&mut self, surface_size: (u32, u32)) {
        match &self.displayed.frame {
            Some(frame) => {
                self.transform =
                    Transform::fit_to_view(frame.size(), surface_size, frame.default_window());
                self.fitted = true;
            }
            None => {
                self.transform = Transform::default();
                self.fitted = false;
            }
        }
        self.window_touched = false;
    }

    fn overlay(&self) -> Overlay {
        let index = self.displayed.index;
        let kind = self.manifest.get(index).map(FrameEntry::kind);
        Overlay {
            index,
            total: self.manifest.total_frames(),
            kind,
            status: self.displayed.status.clone(),
            scale_percent: self.transform.scale.percent(),
            window: kind
                .filter(|kind| kind.supports_windowing())
                .map(|_| self.transform.window),
        }
    }
}

fn frame_request(
    session: &Session,
    index: usize,
    decoder: &SharedDecoder,
) -> Option<(FrameRequest, LeaseWatch)> {
    let entry = session.manifest.get(index)?;
    let (lease, watch) = Lease::issue();
    let request = FrameRequest {
        session: session.id,
        index,
        kind: entry.kind(),
        payload: entry.payload_arc(),
        decoder: Arc::clone(decoder),
        lease,
    };
    Some((request, watch))
}

/// An interactive multi-frame viewer bound to one surface.
pub struct Viewer<S: RenderSurface> {
    config: Config,
    fetcher: Arc<dyn Fetcher>,
    decoder: SharedDecoder,
    notifier: Box<dyn Notifier>,
    renderer: ViewportRenderer<S>,
    tools: ToolManager,
    session: Option<Session>,
    last_session: SessionId,
    events_tx: UnboundedSender<PreloadEvent>,
    events_rx: UnboundedReceiver<PreloadEvent>,
    gesture: Gesture,
    drag: DragNavigation,
    on_progress: Option<ProgressCallback>,
    /// Reason the last load failed while no session was on screen.
    load_error: Option<String>,
    torn_down: bool,
}

impl<S: RenderSurface> Viewer<S> {
    /// Creates a viewer with the default fetcher, decoder and notifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fetch`] if the HTTP client cannot be built.
    pub fn new(config: Config, surface: S) -> Result<Self> {
        let fetcher = AnyFetcher::with_retries(&config.fetch)?;
        Ok(Self::with_parts(
            config,
            surface,
            Arc::new(fetcher),
            Arc::new(StandardDecoder),
            Box::new(LogNotifier),
        ))
    }

    /// Creates a viewer from explicit collaborators.
    #[must_use]
    pub fn with_parts(
        config: Config,
        surface: S,
        fetcher: Arc<dyn Fetcher>,
        decoder: SharedDecoder,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let tools = ToolManager::new(ToolSettings::from_config(&config.tools));
        let renderer = ViewportRenderer::with_cache_frames(surface, config.render.cache_frames());
        Self {
            config,
            fetcher,
            decoder,
            notifier,
            renderer,
            tools,
            session: None,
            last_session: SessionId::default(),
            events_tx,
            events_rx,
            gesture: Gesture::Idle,
            drag: DragNavigation::default(),
            on_progress: None,
            load_error: None,
            torn_down: false,
        }
    }

    /// Registers the preload progress callback, replacing any previous one.
    pub fn on_progress<F>(&mut self, callback: F)
    where
        F: FnMut(Progress) + Send + 'static,
    {
        self.on_progress = Some(Box::new(callback));
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Loads `reference`, replacing the current session once the new
    /// manifest is ready.
    ///
    /// Resolves when the first frame is displayed (or known to be
    /// unavailable); the remaining frames keep preloading in the background.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fetch`] or [`Error::Extract`] when the reference
    /// cannot be turned into frames; the previous session stays untouched.
    /// Returns [`Error::Closed`] after [`teardown`](Self::teardown).
    pub async fn load(&mut self, reference: Reference) -> Result<LoadSummary> {
        if self.torn_down {
            return Err(Error::Closed);
        }
        tracing::info!(%reference, "loading reference");

        let (manifest, skipped) = match self.fetch_manifest(&reference).await {
            Ok(built) => built,
            Err(err) => {
                tracing::warn!(%reference, error = %err, "load failed");
                self.notifier.notify(
                    Notification::error(err.message_key(), format!("Could not load {reference}: {err}"))
                        .with_arg("reference", reference.to_string()),
                );
                if self.session.is_none() {
                    self.load_error = Some(err.to_string());
                    self.repaint();
                }
                return Err(err);
            }
        };

        let summary = self.install(reference, manifest, skipped);
        self.show_first_frame().await;
        Ok(summary)
    }

    async fn fetch_manifest(&self, reference: &Reference) -> Result<(Manifest, usize)> {
        let bytes = self.fetcher.fetch_bytes(reference.location()).await?;
        let as_archive = reference.is_archive() || is_zip(&bytes);
        let filename = reference.filename();

        let built = tokio::task::spawn_blocking(move || {
            if as_archive {
                extract_with_report(&bytes)
                    .map(|(manifest, report)| (manifest, report.discarded.len() + report.failed.len()))
            } else {
                single_frame(&filename, bytes).map(|manifest| (manifest, 0))
            }
        })
        .await
        .map_err(|e| ExtractError::Corrupt(format!("extraction task failed: {e}")))?;

        Ok(built?)
    }

    fn install(&mut self, reference: Reference, manifest: Manifest, skipped: usize) -> LoadSummary {
        let id = self.last_session.next();
        self.last_session = id;

        if let Some(previous) = self.session.take() {
            tracing::debug!(session = previous.id.value(), "replacing session");
        }
        while self.events_rx.try_recv().is_ok() {}
        self.renderer.clear_cache();
        self.end_gesture();
        self.load_error = None;

        let total = manifest.total_frames();
        let preload = self.config.preload.is_enabled().then(|| {
            spawn_preload(
                id,
                manifest.clone(),
                Arc::clone(&self.decoder),
                self.events_tx.clone(),
            )
        });

        let summary = LoadSummary {
            session: id,
            total_frames: total,
            is_archive: manifest.is_archive(),
            skipped_entries: skipped,
        };
        tracing::info!(
            session = id.value(),
            frames = total,
            skipped,
            bytes = manifest.total_bytes(),
            "manifest ready"
        );

        self.session = Some(Session {
            id,
            reference,
            manifest,
            cache: PreloadCache::new(total),
            navigation: NavigationController::new(total, self.config.navigation.wheel_throttle()),
            transform: Transform::default(),
            fitted: false,
            window_touched: false,
            displayed: Displayed {
                index: 0,
                frame: None,
                status: FrameStatus::Loading,
            },
            preload_done: preload.is_none(),
            preload,
            pending: None,
        });
        self.repaint();
        summary
    }

    async fn show_first_frame(&mut self) {
        let preloading = self.session.as_ref().is_some_and(|s| s.preload.is_some());

        if preloading {
            while self.session.as_ref().is_some_and(|s| s.awaiting_first_frame() && !s.preload_done) {
                let Some(event) = self.events_rx.recv().await else {
                    break;
                };
                self.apply_event(event);
            }
            return;
        }

        let Some((request, _)) = self
            .session
            .as_ref()
            .and_then(|s| frame_request(s, 0, &self.decoder))
        else {
            return;
        };
        let response = request.decode().await;
        let size = self.renderer.surface_size();
        let Some(session) = self.session.as_mut().filter(|s| s.id == response.session) else {
            return;
        };
        match response.result {
            Ok(frame) => session.show(0, Some(frame), FrameStatus::Ready, size),
            Err(e) => {
                tracing::warn!(error = %e, "first frame failed to decode");
                session.show(0, None, FrameStatus::Unavailable(e.to_string()), size);
            }
        }
        self.repaint();
    }

    // =========================================================================
    // Preload events
    // =========================================================================

    /// Applies every preload event that has arrived, without waiting.
    ///
    /// Returns how many events belonged to the current session.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            if self.apply_event(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Applies preload events until the current session's pass finishes.
    pub async fn wait_for_preload(&mut self) {
        while self.session.as_ref().is_some_and(|s| !s.preload_done) {
            let Some(event) = self.events_rx.recv().await else {
                break;
            };
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: PreloadEvent) -> bool {
        let event_session = event.session();
        let Some(session) = self.session.as_mut().filter(|s| s.id == event_session) else {
            tracing::debug!(session = event_session.value(), "discarding stale preload event");
            return false;
        };

        match event {
            PreloadEvent::Frame { entry, progress, .. } => {
                let index = entry.index();
                if !session.cache.record(entry) {
                    return false;
                }
                if let Some(callback) = self.on_progress.as_mut() {
                    callback(progress);
                }

                let decoded = session.cache.decoded(index).cloned();
                let size = self.renderer.surface_size();
                let changed = if session.navigation.in_flight() == Some(index) {
                    // The preload beat the on-demand decode; its response
                    // will find nothing in flight and be dropped.
                    match decoded {
                        Some(frame) => {
                            session.navigation.complete(index);
                            session.show(index, Some(frame), FrameStatus::Ready, size);
                            true
                        }
                        None => false,
                    }
                } else if session.displayed.index == index && session.awaiting_first_frame() {
                    match decoded {
                        Some(frame) => session.show(index, Some(frame), FrameStatus::Ready, size),
                        None => {
                            let reason = session
                                .cache
                                .get(index)
                                .and_then(CacheEntry::error)
                                .unwrap_or_default()
                                .to_owned();
                            session.show(index, None, FrameStatus::Unavailable(reason), size);
                        }
                    }
                    true
                } else {
                    false
                };

                if changed {
                    self.repaint();
                }
            }
            PreloadEvent::Finished { .. } => {
                session.preload_done = true;
                let stats = session.cache.stats();
                let total = session.cache.total();
                tracing::info!(
                    session = event_session.value(),
                    loaded = stats.loaded,
                    failed = stats.failed,
                    "preload finished"
                );
                if stats.failed > 0 {
                    self.notifier.notify(
                        Notification::warning(
                            "notification-frames-failed",
                            format!("{} of {total} frames could not be decoded", stats.failed),
                        )
                        .with_arg("count", stats.failed.to_string())
                        .with_arg("total", total.to_string()),
                    );
                }
            }
        }
        true
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Routes one input event.
    ///
    /// `now` is the event time, used to throttle wheel navigation.
    pub fn handle_input(&mut self, event: InputEvent, now: Instant) -> Dispatch {
        if self.torn_down {
            return Dispatch::Ignored;
        }
        let Some(session) = self.session.as_mut() else {
            return Dispatch::Ignored;
        };
        session.release_dropped_request();

        match event {
            InputEvent::Wheel { delta_y, modifiers } => {
                if self.tools.captures_wheel(modifiers.navigation_held()) {
                    let kind = session.frame_kind();
                    let before = session.transform;
                    let outcome = self.tools.wheel(delta_y, &mut session.transform, kind);
                    return self.apply_outcome(outcome, before);
                }
                match Direction::from_wheel(delta_y) {
                    Some(direction) => self.navigate(direction, NavigationSource::Wheel, now),
                    None => Dispatch::Ignored,
                }
            }
            InputEvent::PointerDown {
                position,
                modifiers,
            } => {
                if self.tools.captures_drag(modifiers.navigation_held()) {
                    self.gesture = Gesture::Tool;
                    let kind = session.frame_kind();
                    let before = session.transform;
                    let outcome = self.tools.pointer_down(position, &mut session.transform, kind);
                    self.apply_outcome(outcome, before)
                } else {
                    self.gesture = Gesture::Navigate;
                    self.drag.start(position);
                    Dispatch::Handled
                }
            }
            InputEvent::PointerMove { position, .. } => match self.gesture {
                Gesture::Tool => {
                    let kind = session.frame_kind();
                    let before = session.transform;
                    let outcome = self.tools.pointer_move(position, &mut session.transform, kind);
                    self.apply_outcome(outcome, before)
                }
                Gesture::Navigate => {
                    match self.drag.update(position, self.config.navigation.drag_step()) {
                        Some(direction) => self.navigate(direction, NavigationSource::Drag, now),
                        None => Dispatch::Handled,
                    }
                }
                Gesture::Idle => Dispatch::Ignored,
            },
            InputEvent::PointerUp { position } => {
                let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
                match gesture {
                    Gesture::Tool => {
                        let kind = session.frame_kind();
                        let before = session.transform;
                        let outcome =
                            self.tools.pointer_up(position, &mut session.transform, kind);
                        self.apply_outcome(outcome, before)
                    }
                    Gesture::Navigate => {
                        self.drag.stop();
                        Dispatch::Handled
                    }
                    Gesture::Idle => Dispatch::Ignored,
                }
            }
            InputEvent::Key(key) => {
                let last = session.navigation.total().saturating_sub(1);
                match key {
                    Key::Home => self.jump(0, NavigationSource::Key, now),
                    Key::End => self.jump(last, NavigationSource::Key, now),
                    _ => match Direction::from_key(key) {
                        Some(direction) => self.navigate(direction, NavigationSource::Key, now),
                        None => Dispatch::Ignored,
                    },
                }
            }
        }
    }

    /// Routes an event and, if it needs a decode, runs it to completion.
    ///
    /// Returns whether the view changed.
    pub async fn dispatch(&mut self, event: InputEvent, now: Instant) -> bool {
        match self.handle_input(event, now) {
            Dispatch::Handled => true,
            Dispatch::Ignored => false,
            Dispatch::Decode(request) => {
                let response = request.decode().await;
                self.complete_request(response)
            }
        }
    }

    fn apply_outcome(&mut self, outcome: ToolOutcome, before: Transform) -> Dispatch {
        match outcome {
            ToolOutcome::Ignored => Dispatch::Ignored,
            ToolOutcome::Consumed => Dispatch::Handled,
            ToolOutcome::TransformChanged => {
                if let Some(session) = self.session.as_mut() {
                    if session.transform.window != before.window {
                        session.window_touched = true;
                    }
                }
                self.repaint();
                Dispatch::Handled
            }
            ToolOutcome::Rejected(err) => {
                tracing::debug!(error = %err, "tool request had no effect");
                self.notifier
                    .notify(Notification::info(err.message_key(), err.to_string()));
                Dispatch::Handled
            }
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    fn navigate(&mut self, direction: Direction, source: NavigationSource, now: Instant) -> Dispatch {
        let Some(session) = self.session.as_mut() else {
            return Dispatch::Ignored;
        };
        match session.navigation.request_step(direction, source, now) {
            Ok(target) => self.resolve(target),
            Err(rejection) => {
                tracing::trace!(%rejection, ?source, "navigation rejected");
                Dispatch::Ignored
            }
        }
    }

    fn jump(&mut self, index: usize, source: NavigationSource, now: Instant) -> Dispatch {
        let Some(session) = self.session.as_mut() else {
            return Dispatch::Ignored;
        };
        match session.navigation.request_index(index, now) {
            Ok(target) => self.resolve(target),
            Err(rejection) => {
                tracing::trace!(%rejection, ?source, index, "navigation rejected");
                Dispatch::Ignored
            }
        }
    }

    /// Displays the in-flight target from the cache, or asks for a decode.
    fn resolve(&mut self, target: usize) -> Dispatch {
        let size = self.renderer.surface_size();
        let Some(session) = self.session.as_mut() else {
            return Dispatch::Ignored;
        };

        if let Some(frame) = session.cache.decoded(target).cloned() {
            session.navigation.complete(target);
            session.pending = None;
            session.show(target, Some(frame), FrameStatus::Ready, size);
            self.repaint();
            return Dispatch::Handled;
        }

        match frame_request(session, target, &self.decoder) {
            Some((request, watch)) => {
                tracing::debug!(index = target, "frame not cached, decoding on demand");
                session.pending = Some(watch);
                Dispatch::Decode(request)
            }
            None => {
                session.navigation.abandon();
                Dispatch::Ignored
            }
        }
    }

    /// Applies the result of a [`FrameRequest`].
    ///
    /// Returns `false` when the response is stale: it belongs to an older
    /// load or its navigation was already resolved.
    pub fn complete_request(&mut self, response: FrameResponse) -> bool {
        let size = self.renderer.surface_size();
        let Some(session) = self.session.as_mut().filter(|s| s.id == response.session) else {
            tracing::debug!(
                session = response.session.value(),
                index = response.index,
                "discarding frame from a previous load"
            );
            return false;
        };
        if !session.navigation.complete(response.index) {
            tracing::debug!(index = response.index, "discarding superseded frame decode");
            return false;
        }
        session.pending = None;

        let index = response.index;
        match response.result {
            Ok(frame) => session.show(index, Some(frame), FrameStatus::Ready, size),
            Err(e) => {
                tracing::warn!(index, error = %e, "frame unavailable");
                let reason = e.to_string();
                session.show(index, None, FrameStatus::Unavailable(reason.clone()), size);
                self.notifier.notify(
                    Notification::warning(
                        "notification-frame-unavailable",
                        format!("Frame {} is unavailable: {reason}", index + 1),
                    )
                    .with_arg("index", (index + 1).to_string()),
                );
            }
        }
        self.repaint();
        true
    }

    /// Gives up the on-demand navigation in flight, staying on the current
    /// frame.
    ///
    /// Returns `false` when nothing was in flight. A response that arrives
    /// later is discarded.
    pub fn cancel_request(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Some(index) = session.navigation.in_flight() else {
            return false;
        };
        tracing::debug!(index, "navigation cancelled");
        session.navigation.abandon();
        session.pending = None;
        true
    }

    /// Requests frame `index` for display (e.g. a thumbnail click).
    ///
    /// Selecting the displayed frame repaints it.
    pub fn request_frame(&mut self, index: usize) -> Dispatch {
        if self.torn_down {
            return Dispatch::Ignored;
        }
        if let Some(session) = self.session.as_mut() {
            session.release_dropped_request();
        }
        let is_current = self.session.as_ref().is_some_and(|s| {
            s.navigation.in_flight().is_none() && s.displayed.index == index
        });
        if is_current {
            self.repaint();
            return Dispatch::Handled;
        }
        self.jump(index, NavigationSource::Select, Instant::now())
    }

    /// Displays frame `index`, decoding it if needed.
    ///
    /// Returns whether the frame is now the current frame.
    pub async fn select_frame(&mut self, index: usize) -> bool {
        match self.request_frame(index) {
            Dispatch::Handled => true,
            Dispatch::Ignored => false,
            Dispatch::Decode(request) => {
                let response = request.decode().await;
                self.complete_request(response)
            }
        }
    }

    // =========================================================================
    // Tools
    // =========================================================================

    /// Applies a toolbar selection.
    pub fn set_tool(&mut self, selection: ToolSelection) {
        if self.torn_down {
            return;
        }
        match selection {
            ToolSelection::Activate(tool) => {
                if self.tools.activate(tool) {
                    self.end_gesture();
                }
            }
            ToolSelection::Deactivate => {
                if self.tools.deactivate().is_some() {
                    self.end_gesture();
                }
            }
            ToolSelection::Reset => self.reset_view(),
        }
    }

    /// Restores the fit-to-view transform and the frame's default window.
    pub fn reset_view(&mut self) {
        if self.torn_down {
            return;
        }
        let size = self.renderer.surface_size();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.fit(size);
        self.repaint();
    }

    fn end_gesture(&mut self) {
        self.gesture = Gesture::Idle;
        self.drag.stop();
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Stops background work, unbinds tools and releases the surface.
    ///
    /// The viewer ignores input afterwards and refuses new loads.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        if let Some(session) = self.session.take() {
            if let Some(preload) = &session.preload {
                preload.abort();
            }
        }
        self.events_rx.close();
        while self.events_rx.try_recv().is_ok() {}

        self.tools.deactivate();
        self.end_gesture();
        self.on_progress = None;
        self.load_error = None;
        self.renderer.release();
        self.torn_down = true;
        tracing::info!("viewer torn down");
    }

    fn repaint(&mut self) -> bool {
        let Some(session) = &self.session else {
            return match self.failure_overlay() {
                Some(overlay) => self.renderer.paint(0, None, &Transform::default(), &overlay),
                None => false,
            };
        };
        let overlay = session.overlay();
        self.renderer.paint(
            session.displayed.index,
            session.displayed.frame.as_ref(),
            &session.transform,
            &overlay,
        )
    }

    fn failure_overlay(&self) -> Option<Overlay> {
        self.load_error.as_ref().map(|reason| Overlay {
            status: FrameStatus::LoadFailed(reason.clone()),
            ..Overlay::default()
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Snapshot of index, tool and transform; `None` before the first load.
    #[must_use]
    pub fn state(&self) -> Option<ViewerState> {
        self.session.as_ref().map(|session| ViewerState {
            current_index: session.navigation.current(),
            total_frames: session.manifest.total_frames(),
            active_tool: self.tools.active(),
            transform: session.transform,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    #[must_use]
    pub fn reference(&self) -> Option<&Reference> {
        self.session.as_ref().map(|s| &s.reference)
    }

    #[must_use]
    pub fn manifest(&self) -> Option<&Manifest> {
        self.session.as_ref().map(|s| &s.manifest)
    }

    /// Preload result of frame `index`; `None` while pending.
    #[must_use]
    pub fn cache_entry(&self, index: usize) -> Option<&CacheEntry> {
        self.session.as_ref().and_then(|s| s.cache.get(index))
    }

    #[must_use]
    pub fn preload_stats(&self) -> Option<PreloadStats> {
        self.session.as_ref().map(|s| s.cache.stats())
    }

    #[must_use]
    pub fn progress(&self) -> Option<Progress> {
        self.session.as_ref().map(|s| s.cache.progress())
    }

    /// Whether the current session's preload pass has finished (or never ran).
    #[must_use]
    pub fn is_preload_complete(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.preload_done)
    }

    /// The decoded frame on screen, if any.
    #[must_use]
    pub fn displayed_frame(&self) -> Option<&DecodedFrame> {
        self.session.as_ref().and_then(|s| s.displayed.frame.as_ref())
    }

    /// Overlay of the displayed frame, or of the failed load when nothing
    /// was ever displayed.
    #[must_use]
    pub fn overlay(&self) -> Option<Overlay> {
        match &self.session {
            Some(session) => Some(session.overlay()),
            None => self.failure_overlay(),
        }
    }

    #[must_use]
    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    #[must_use]
    pub fn renderer(&self) -> &ViewportRenderer<S> {
        &self.renderer
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        self.renderer.surface()
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::viewer::{Point, Tool};
    use crate::interaction::Modifiers;
    use crate::notify::{QueuedNotifier, Severity};
    use crate::render::PixmapSurface;
    use crate::test_utils::{assert_abs_diff_eq, dicom_bytes, png_bytes, zip_bytes, MemoryFetcher};
    use std::sync::Mutex;

    const STUDY: &str = "https://pacs.example/study.zip";
    const OTHER: &str = "https://pacs.example/other.zip";

    fn study() -> Vec<u8> {
        let first = dicom_bytes(4, 4, &[100; 16], Some((40.0, 400.0)));
        let second = png_bytes(4, 4, [200, 10, 10, 255]);
        zip_bytes(&[
            ("a_2.png", &second),
            ("readme.txt", b"notes"),
            ("a_1.dcm", &first),
        ])
    }

    fn structured_pair() -> Vec<u8> {
        let first = dicom_bytes(4, 4, &[10; 16], Some((40.0, 400.0)));
        let second = dicom_bytes(4, 4, &[20; 16], Some((40.0, 400.0)));
        zip_bytes(&[("s_1.dcm", &first), ("s_2.dcm", &second)])
    }

    fn viewer(config: Config) -> (Viewer<PixmapSurface>, QueuedNotifier) {
        let fetcher = MemoryFetcher::default()
            .with(STUDY, study())
            .with(OTHER, structured_pair());
        let notifier = QueuedNotifier::new();
        let viewer = Viewer::with_parts(
            config,
            PixmapSurface::new(64, 64),
            Arc::new(fetcher),
            Arc::new(StandardDecoder),
            Box::new(notifier.clone()),
        );
        (viewer, notifier)
    }

    fn without_preload() -> Config {
        let mut config = Config::default();
        config.preload.enabled = Some(false);
        config
    }

    fn key(key: Key) -> InputEvent {
        InputEvent::Key(key)
    }

    #[tokio::test]
    async fn load_displays_first_frame_and_reports_progress() {
        let (mut viewer, _) = viewer(Config::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        viewer.on_progress(move |progress| sink.lock().expect("lock").push(progress.percent));

        let summary = viewer.load(Reference::parse(STUDY)).await.expect("load");
        viewer.wait_for_preload().await;

        assert_eq!(summary.total_frames, 2);
        assert_eq!(summary.skipped_entries, 1);
        assert_eq!(*seen.lock().expect("lock"), vec![50, 100]);
        assert!(viewer.is_preload_complete());

        let state = viewer.state().expect("state");
        assert_eq!(state.current_index, 0);
        assert_eq!(state.total_frames, 2);
        assert_abs_diff_eq!(state.transform.scale.value(), 16.0);
        assert_abs_diff_eq!(state.transform.window.width(), 400.0);

        let overlay = viewer.surface().overlay().expect("presented");
        assert_eq!(overlay.status, FrameStatus::Ready);
        assert_eq!(overlay.kind, Some(FrameKind::StructuredImage));
    }

    #[tokio::test]
    async fn cached_navigation_is_synchronous() {
        let (mut viewer, _) = viewer(Config::default());
        viewer.load(Reference::parse(STUDY)).await.expect("load");
        viewer.wait_for_preload().await;

        let dispatch = viewer.handle_input(key(Key::ArrowDown), Instant::now());
        assert!(dispatch.is_handled());
        assert_eq!(viewer.state().expect("state").current_index, 1);
        assert_eq!(
            viewer.displayed_frame().map(DecodedFrame::kind),
            Some(FrameKind::RasterImage)
        );
    }

    #[tokio::test]
    async fn window_level_on_raster_frame_is_informational() {
        let (mut viewer, notifier) = viewer(Config::default());
        viewer.load(Reference::parse(STUDY)).await.expect("load");
        viewer.wait_for_preload().await;
        assert!(viewer.select_frame(1).await);

        viewer.set_tool(ToolSelection::Activate(Tool::WindowLevel));
        let before = viewer.state().expect("state").transform;
        let now = Instant::now();
        viewer.handle_input(
            InputEvent::PointerDown {
                position: Point::new(10.0, 10.0),
                modifiers: Modifiers::NONE,
            },
            now,
        );
        viewer.handle_input(
            InputEvent::PointerMove {
                position: Point::new(40.0, 30.0),
                modifiers: Modifiers::NONE,
            },
            now,
        );
        viewer.handle_input(
            InputEvent::PointerUp {
                position: Point::new(40.0, 30.0),
            },
            now,
        );

        let state = viewer.state().expect("state");
        assert_eq!(state.transform, before);
        assert_eq!(state.current_index, 1);

        let notes = notifier.drain();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity(), Severity::Info);
        assert_eq!(notes[0].message_key(), "notification-window-level-unsupported");
    }

    #[tokio::test]
    async fn adjusted_window_survives_navigation_until_reset() {
        let (mut viewer, _) = viewer(Config::default());
        viewer.load(Reference::parse(OTHER)).await.expect("load");
        viewer.wait_for_preload().await;

        viewer.set_tool(ToolSelection::Activate(Tool::WindowLevel));
        let now = Instant::now();
        viewer.handle_input(
            InputEvent::PointerDown {
                position: Point::new(0.0, 0.0),
                modifiers: Modifiers::NONE,
            },
            now,
        );
        viewer.handle_input(
            InputEvent::PointerMove {
                position: Point::new(100.0, 0.0),
                modifiers: Modifiers::NONE,
            },
            now,
        );
        viewer.handle_input(
            InputEvent::PointerUp {
                position: Point::new(100.0, 0.0),
            },
            now,
        );
        assert_abs_diff_eq!(viewer.state().expect("state").transform.window.width(), 500.0);

        viewer.handle_input(key(Key::ArrowDown), now);
        assert_eq!(viewer.state().expect("state").current_index, 1);
        assert_abs_diff_eq!(viewer.state().expect("state").transform.window.width(), 500.0);

        viewer.reset_view();
        assert_abs_diff_eq!(viewer.state().expect("state").transform.window.width(), 400.0);
    }

    #[tokio::test]
    async fn reset_is_idempotent() {
        let (mut viewer, _) = viewer(Config::default());
        viewer.load(Reference::parse(STUDY)).await.expect("load");
        viewer.wait_for_preload().await;
        let fitted = viewer.state().expect("state").transform;

        viewer.set_tool(ToolSelection::Activate(Tool::Zoom));
        let now = Instant::now();
        viewer.handle_input(
            InputEvent::Wheel {
                delta_y: -1.0,
                modifiers: Modifiers::NONE,
            },
            now,
        );
        assert!(viewer.state().expect("state").transform.scale.value() > fitted.scale.value());
        assert_eq!(viewer.state().expect("state").current_index, 0);

        viewer.set_tool(ToolSelection::Reset);
        let first = viewer.state().expect("state").transform;
        viewer.reset_view();
        let second = viewer.state().expect("state").transform;

        assert_eq!(first, fitted);
        assert_eq!(first, second);
        assert_eq!(viewer.tools().active(), Some(Tool::Zoom));
    }

    #[tokio::test]
    async fn navigation_modifier_lets_wheel_navigate_while_zooming() {
        let (mut viewer, _) = viewer(Config::default());
        viewer.load(Reference::parse(STUDY)).await.expect("load");
        viewer.wait_for_preload().await;
        viewer.set_tool(ToolSelection::Activate(Tool::Zoom));

        let dispatch = viewer.handle_input(
            InputEvent::Wheel {
                delta_y: 1.0,
                modifiers: Modifiers::CTRL,
            },
            Instant::now(),
        );
        assert!(dispatch.is_handled());
        assert_eq!(viewer.state().expect("state").current_index, 1);
    }

    #[tokio::test]
    async fn uncached_frame_blocks_navigation_until_decoded() {
        let (mut viewer, _) = viewer(without_preload());
        viewer.load(Reference::parse(STUDY)).await.expect("load");
        assert!(viewer.displayed_frame().is_some());
        let now = Instant::now();

        let Dispatch::Decode(request) = viewer.handle_input(key(Key::ArrowDown), now) else {
            panic!("expected a decode request");
        };
        assert_eq!(request.index(), 1);
        assert!(matches!(
            viewer.handle_input(key(Key::ArrowUp), now),
            Dispatch::Ignored
        ));
        assert_eq!(viewer.state().expect("state").current_index, 0);

        let response = request.decode().await;
        assert!(viewer.complete_request(response.clone()));
        assert_eq!(viewer.state().expect("state").current_index, 1);
        assert!(!viewer.complete_request(response));
    }

    #[tokio::test]
    async fn dropped_request_releases_navigation() {
        let (mut viewer, _) = viewer(without_preload());
        viewer.load(Reference::parse(STUDY)).await.expect("load");
        let now = Instant::now();

        let Dispatch::Decode(request) = viewer.handle_input(key(Key::ArrowDown), now) else {
            panic!("expected a decode request");
        };
        drop(request);

        let Dispatch::Decode(retry) = viewer.handle_input(key(Key::ArrowDown), now) else {
            panic!("expected a fresh decode request");
        };
        assert_eq!(retry.index(), 1);
        let response = retry.decode().await;
        drop(response);

        assert!(viewer.select_frame(1).await);
        assert_eq!(viewer.state().expect("state").current_index, 1);
    }

    #[tokio::test]
    async fn cancelled_select_does_not_block_navigation() {
        let (mut viewer, _) = viewer(without_preload());
        viewer.load(Reference::parse(STUDY)).await.expect("load");

        // The select starts its decode, then loses to the ready branch.
        tokio::select! {
            biased;
            _ = viewer.select_frame(1) => {}
            () = std::future::ready(()) => {}
        }

        assert!(viewer.select_frame(1).await);
        assert_eq!(viewer.state().expect("state").current_index, 1);
    }

    #[tokio::test]
    async fn cancel_request_discards_late_response() {
        let (mut viewer, _) = viewer(without_preload());
        viewer.load(Reference::parse(STUDY)).await.expect("load");

        let Dispatch::Decode(request) = viewer.handle_input(key(Key::End), Instant::now()) else {
            panic!("expected a decode request");
        };
        assert!(viewer.cancel_request());
        assert!(!viewer.cancel_request());

        assert!(!viewer.complete_request(request.decode().await));
        assert_eq!(viewer.state().expect("state").current_index, 0);
    }

    #[tokio::test]
    async fn failed_first_load_paints_error_overlay() {
        let (mut viewer, _) = viewer(Config::default());

        let err = viewer
            .load(Reference::parse("https://pacs.example/missing.zip"))
            .await
            .unwrap_err();

        let presented = viewer.surface().overlay().expect("presented");
        assert_eq!(presented.status, FrameStatus::LoadFailed(err.to_string()));
        assert_eq!(viewer.overlay().as_ref(), Some(presented));
        assert_eq!(viewer.state(), None);

        viewer.load(Reference::parse(STUDY)).await.expect("load");
        assert_eq!(
            viewer.surface().overlay().map(|overlay| overlay.status.clone()),
            Some(FrameStatus::Ready)
        );
    }

    #[tokio::test]
    async fn responses_from_previous_load_are_discarded() {
        let (mut viewer, _) = viewer(without_preload());
        viewer.load(Reference::parse(STUDY)).await.expect("load");

        let Dispatch::Decode(request) = viewer.handle_input(key(Key::End), Instant::now()) else {
            panic!("expected a decode request");
        };
        let response = request.decode().await;

        viewer.load(Reference::parse(OTHER)).await.expect("reload");
        assert!(!viewer.complete_request(response));
        assert_eq!(viewer.state().expect("state").current_index, 0);
        assert_eq!(
            viewer.displayed_frame().map(DecodedFrame::kind),
            Some(FrameKind::StructuredImage)
        );
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_session() {
        let (mut viewer, notifier) = viewer(Config::default());
        let summary = viewer.load(Reference::parse(STUDY)).await.expect("load");

        let err = viewer
            .load(Reference::parse("https://pacs.example/missing.zip"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
        assert_eq!(viewer.session_id(), Some(summary.session));
        assert_eq!(viewer.manifest().map(Manifest::total_frames), Some(2));

        let notes = notifier.drain();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity(), Severity::Error);
        assert_eq!(notes[0].message_key(), "error-load-fetch");
    }

    #[tokio::test]
    async fn teardown_releases_and_refuses_work() {
        let (mut viewer, _) = viewer(Config::default());
        viewer.set_tool(ToolSelection::Activate(Tool::Pan));
        viewer.load(Reference::parse(STUDY)).await.expect("load");

        viewer.teardown();
        viewer.teardown();

        assert!(viewer.is_torn_down());
        assert!(viewer.surface().is_released());
        assert_eq!(viewer.tools().active(), None);
        assert_eq!(viewer.state(), None);
        assert!(matches!(
            viewer.handle_input(key(Key::ArrowDown), Instant::now()),
            Dispatch::Ignored
        ));
        assert!(matches!(
            viewer.load(Reference::parse(STUDY)).await,
            Err(Error::Closed)
        ));
    }

    #[tokio::test]
    async fn input_before_load_is_ignored() {
        let (mut viewer, _) = viewer(Config::default());
        assert!(matches!(
            viewer.handle_input(key(Key::ArrowDown), Instant::now()),
            Dispatch::Ignored
        ));
        assert!(!viewer.select_frame(0).await);
    }
}
