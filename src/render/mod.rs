// SPDX-License-Identifier: MPL-2.0
//! Viewport rendering.
//!
//! [`ViewportRenderer`] paints the displayed frame onto a [`RenderSurface`]
//! through the current [`Transform`]: it windows structured frames, places
//! the result by scale and translation, and hands the composed pixmap to the
//! surface together with the [`Overlay`].
//!
//! Windowing a large frame is the expensive step, so windowed pixmaps are
//! kept in a small LRU keyed by frame and window. Pan and zoom repaints then
//! only recompose.

pub mod overlay;
pub mod pipeline;
pub mod surface;

pub use overlay::{FrameStatus, Overlay};
pub use surface::{PixmapSurface, RenderSurface};

use crate::config::DEFAULT_RENDER_CACHE_FRAMES;
use crate::domain::media::DecodedFrame;
use crate::domain::viewer::Transform;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tiny_skia::{Color, FilterQuality, Pixmap, PixmapPaint};

/// Windowed pixmap cache key: frame index plus the window bits for
/// structured frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct RenderKey {
    index: usize,
    window: Option<(u32, u32)>,
}

/// Statistics about windowed pixmap reuse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub paints: u64,
    pub hits: u64,
    pub misses: u64,
}

impl RenderStats {
    /// Returns the cache hit rate as a percentage (0.0 - 100.0).
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Paints frames onto a surface it owns until released.
pub struct ViewportRenderer<S: RenderSurface> {
    surface: S,
    cache: LruCache<RenderKey, Arc<Pixmap>>,
    stats: RenderStats,
    released: bool,
}

impl<S: RenderSurface> ViewportRenderer<S> {
    #[must_use]
    pub fn new(surface: S) -> Self {
        Self::with_cache_frames(surface, DEFAULT_RENDER_CACHE_FRAMES)
    }

    /// Creates a renderer keeping up to `frames` windowed pixmaps.
    #[must_use]
    pub fn with_cache_frames(surface: S, frames: usize) -> Self {
        let capacity = NonZeroUsize::new(frames).unwrap_or(NonZeroUsize::MIN);
        Self {
            surface,
            cache: LruCache::new(capacity),
            stats: RenderStats::default(),
            released: false,
        }
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn surface_size(&self) -> (u32, u32) {
        self.surface.size()
    }

    #[must_use]
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Paints `frame` (or an empty background while it is missing).
    ///
    /// Returns `false` when nothing was presented: the renderer was released
    /// or the surface has no area.
    pub fn paint(
        &mut self,
        index: usize,
        frame: Option<&DecodedFrame>,
        transform: &Transform,
        overlay: &Overlay,
    ) -> bool {
        if self.released {
            return false;
        }

        let surface_size = self.surface.size();
        let Some(mut canvas) = Pixmap::new(surface_size.0, surface_size.1) else {
            tracing::debug!(?surface_size, "surface has no area, skipping paint");
            return false;
        };
        canvas.fill(Color::BLACK);

        if let Some(frame) = frame {
            if let Some(pixmap) = self.windowed(index, frame, transform) {
                let matrix = pipeline::frame_to_surface(transform, frame.size(), surface_size);
                let paint = PixmapPaint {
                    quality: FilterQuality::Bilinear,
                    ..PixmapPaint::default()
                };
                canvas.draw_pixmap(0, 0, Pixmap::as_ref(&pixmap), &paint, matrix, None);
            }
        }

        self.surface.present(&canvas, overlay);
        self.stats.paints += 1;
        true
    }

    fn windowed(
        &mut self,
        index: usize,
        frame: &DecodedFrame,
        transform: &Transform,
    ) -> Option<Arc<Pixmap>> {
        let window = match frame {
            DecodedFrame::Structured(_) => Some((
                transform.window.width().to_bits(),
                transform.window.center().to_bits(),
            )),
            DecodedFrame::Raster(_) => None,
        };
        let key = RenderKey { index, window };

        if let Some(pixmap) = self.cache.get(&key) {
            self.stats.hits += 1;
            return Some(Arc::clone(pixmap));
        }

        self.stats.misses += 1;
        let pixmap = Arc::new(pipeline::frame_pixmap(frame, transform.window)?);
        self.cache.put(key, Arc::clone(&pixmap));
        Some(pixmap)
    }

    /// Forgets windowed pixmaps, e.g. when a new manifest replaces the old.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Releases the surface and every cached pixmap. Later paints are no-ops.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.cache.clear();
        self.surface.release();
        self.released = true;
    }
}
