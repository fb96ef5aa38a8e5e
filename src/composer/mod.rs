//! Session shell tying the store, drag controller and renderer together.
//!
//! Every mutator ends with an explicit `redraw()`: there is no hidden
//! dependency tracking, the redraw trigger is part of each mutation's
//! contract. All entry points run on one event-dispatch path; the external
//! analyzer/portrait calls are awaited by the host and fed back in through
//! the synchronous surface here.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};
use thiserror::Error;

use crate::config::CompositionConfig;
use crate::drag::DragController;
use crate::error::AppResult;
use crate::geometry::{CanvasFrame, Color, PixelPoint};
use crate::layer::{LayerId, LayerStore, SharedStyle};
use crate::render::{self, font::FontFace};
use crate::suggest::{LayoutAnalyzer, LayoutSuggestion, PortraitSource};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no base image loaded")]
    NoBaseImage,
    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

pub struct Composer<F: FontFace> {
    font: F,
    store: LayerStore,
    base: Option<RgbaImage>,
    frame: Option<CanvasFrame>,
    drag: DragController,
    canvas: Option<RgbaImage>,
}

impl<F: FontFace> Composer<F> {
    pub fn new(font: F) -> Self {
        Self::with_config(font, CompositionConfig::default())
    }

    pub fn with_config(font: F, config: CompositionConfig) -> Self {
        let mut store = LayerStore::new(SharedStyle {
            color: config.text_color,
            font_size: config.font_size,
            text_rotation: config.text_rotation,
        });
        store.set_portrait_scale(config.portrait_scale);
        store.set_portrait_rotation(config.portrait_rotation);
        Self {
            font,
            store,
            base: None,
            frame: None,
            drag: DragController::new(),
            canvas: None,
        }
    }

    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    pub fn frame(&self) -> Option<CanvasFrame> {
        self.frame
    }

    pub fn base_loaded(&self) -> bool {
        self.base.is_some()
    }

    /// The composite as of the last mutation; `None` until a base image is
    /// loaded.
    pub fn canvas(&self) -> Option<&RgbaImage> {
        self.canvas.as_ref()
    }

    /// Supply a new base template. The canvas frame follows the image's
    /// intrinsic dimensions and both text layers snap back to their
    /// documented defaults.
    pub fn load_base_image(&mut self, image: RgbaImage) {
        let frame = CanvasFrame::new(image.width(), image.height());
        tracing::info!(width = frame.width, height = frame.height, "base image loaded");
        self.base = Some(image);
        self.frame = Some(frame);
        self.store.reset_text_positions();
        self.redraw();
    }

    pub fn set_text(&mut self, layer: LayerId, value: impl Into<String>) {
        self.store.set_text(layer, value);
        self.redraw();
    }

    pub fn set_text_color(&mut self, color: Color) {
        self.store.set_shared_color(color);
        self.redraw();
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.store.set_shared_font_size(size);
        self.redraw();
    }

    pub fn set_text_rotation(&mut self, degrees: f32) {
        self.store.set_shared_text_rotation(degrees);
        self.redraw();
    }

    pub fn set_portrait_scale(&mut self, percent: f32) {
        self.store.set_portrait_scale(percent);
        self.redraw();
    }

    pub fn set_portrait_rotation(&mut self, degrees: f32) {
        self.store.set_portrait_rotation(degrees);
        self.redraw();
    }

    pub fn set_portrait_image(&mut self, image: Option<RgbaImage>) {
        self.store.set_portrait_image(image);
        self.redraw();
    }

    /// Pointer events are ignored until a base image is loaded.
    pub fn pointer_down(&mut self, pointer: PixelPoint) -> Option<LayerId> {
        let frame = self.frame?;
        let hit = self
            .drag
            .pointer_down(&mut self.store, &self.font, frame, pointer);
        if hit.is_some() {
            self.redraw();
        }
        hit
    }

    pub fn pointer_move(&mut self, pointer: PixelPoint) {
        let Some(frame) = self.frame else {
            return;
        };
        if self.drag.pointer_move(&mut self.store, frame, pointer) {
            self.redraw();
        }
    }

    pub fn pointer_up(&mut self) -> Option<LayerId> {
        let released = self.drag.pointer_up(&mut self.store);
        if released.is_some() {
            self.redraw();
        }
        released
    }

    /// Alternate mutation entry point for externally supplied coordinates.
    pub fn apply_suggestion(&mut self, suggestion: &LayoutSuggestion) {
        suggestion.apply(&mut self.store);
        self.redraw();
    }

    /// Snapshot the composite, hand it to the analyzer and apply whatever
    /// comes back. Any failure leaves the layers exactly as they were.
    pub fn analyze_layout<A: LayoutAnalyzer>(
        &mut self,
        analyzer: &A,
    ) -> AppResult<LayoutSuggestion> {
        let snapshot = self.export_png()?;
        let suggestion = analyzer.analyze_layout(&snapshot)?;
        self.apply_suggestion(&suggestion);
        Ok(suggestion)
    }

    /// Ask the portrait collaborator for a likeness of the current name. On
    /// failure the portrait layer keeps its previous image.
    pub fn generate_portrait<P: PortraitSource>(&mut self, source: &P) -> AppResult<()> {
        let prompt = format!(
            "A professional ID card portrait photo of a person named {}, \
             neutral background, realistic, passport style, high quality, \
             facing camera.",
            self.store.name().text
        );
        match source.generate_portrait(&prompt) {
            Ok(image) => {
                self.set_portrait_image(Some(image));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%err, "portrait generation failed; layer unchanged");
                Err(err.into())
            }
        }
    }

    /// Encode the current composite at frame resolution for the host to
    /// persist or upload.
    pub fn export_png(&self) -> Result<Vec<u8>, ExportError> {
        let canvas = self.canvas.as_ref().ok_or(ExportError::NoBaseImage)?;
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(canvas.clone())
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Recompose the cached canvas from the current store snapshot. A no-op
    /// while no base image is loaded.
    pub fn redraw(&mut self) {
        let (Some(base), Some(frame)) = (self.base.as_ref(), self.frame) else {
            self.canvas = None;
            return;
        };
        self.canvas = Some(render::compose(base, &self.store, frame, &self.font));
    }
}
