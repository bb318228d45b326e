// SPDX-License-Identifier: MPL-2.0
//! Drawing surfaces the renderer presents to.

use super::overlay::Overlay;
use crate::error::{Error, Result};
use std::path::Path;
use tiny_skia::Pixmap;

/// A host-provided drawing target.
///
/// The renderer composes each paint into a pixmap of [`RenderSurface::size`]
/// and hands it over with the overlay; the host draws the overlay text.
pub trait RenderSurface {
    /// Current size in pixels.
    fn size(&self) -> (u32, u32);

    /// Shows a composed frame.
    fn present(&mut self, frame: &Pixmap, overlay: &Overlay);

    /// Gives up any resources held for drawing. Later presents are ignored.
    fn release(&mut self);
}

/// In-memory surface, used headless and for exporting the view as PNG.
#[derive(Debug)]
pub struct PixmapSurface {
    width: u32,
    height: u32,
    frame: Option<Pixmap>,
    overlay: Option<Overlay>,
    presents: u64,
    released: bool,
}

impl PixmapSurface {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame: None,
            overlay: None,
            presents: 0,
            released: false,
        }
    }

    /// Last presented frame.
    #[must_use]
    pub fn frame(&self) -> Option<&Pixmap> {
        self.frame.as_ref()
    }

    /// Overlay of the last present.
    #[must_use]
    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    /// Number of presents since creation.
    #[must_use]
    pub fn presents(&self) -> u64 {
        self.presents
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Encodes the last presented frame as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing was presented or encoding fails.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let frame = self
            .frame
            .as_ref()
            .ok_or_else(|| Error::Io("no frame has been presented".into()))?;
        frame.encode_png().map_err(|e| Error::Io(e.to_string()))
    }

    /// Writes the last presented frame to a PNG file.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing was presented or the file cannot be written.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        let png = self.encode_png()?;
        std::fs::write(path, png)?;
        Ok(())
    }
}

impl RenderSurface for PixmapSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn present(&mut self, frame: &Pixmap, overlay: &Overlay) {
        if self.released {
            return;
        }
        self.frame = Some(frame.clone());
        self.overlay = Some(overlay.clone());
        self.presents += 1;
    }

    fn release(&mut self) {
        self.frame = None;
        self.overlay = None;
        self.released = true;
    }
}
