//! Layer records and the store that owns them.
//!
//! The store is a passive data holder: every mutator is a total function and
//! none of them render. The host integration triggers a redraw after each
//! mutation (see `composer`).

use image::RgbaImage;

use crate::config::{
    DEFAULT_ID_POSITION, DEFAULT_NAME_POSITION, DEFAULT_PORTRAIT_POSITION,
    DEFAULT_PORTRAIT_WIDTH,
};
use crate::geometry::{CanvasFrame, Color, NormPoint};

/// The fixed set of positionable layers. Closed on purpose: dispatch in the
/// drag controller and hit-tester is a plain match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerId {
    Name,
    Id,
    Portrait,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLayer {
    pub text: String,
    pub position: NormPoint,
    pub selected: bool,
}

impl TextLayer {
    fn new(position: NormPoint) -> Self {
        Self {
            text: String::new(),
            position,
            selected: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortraitLayer {
    /// Absent until a portrait is supplied; the layer is invisible and
    /// non-interactive while `None`.
    pub image: Option<RgbaImage>,
    pub position: NormPoint,
    /// Normalized width relative to canvas width. Height is always derived,
    /// never stored.
    pub width: f32,
    /// Degrees, about the layer's own center.
    pub rotation: f32,
    pub selected: bool,
}

impl PortraitLayer {
    fn new() -> Self {
        Self {
            image: None,
            position: DEFAULT_PORTRAIT_POSITION,
            width: DEFAULT_PORTRAIT_WIDTH,
            rotation: 0.0,
            selected: false,
        }
    }

    /// Pixel-space bounding box `(x, y, w, h)` of the unrotated portrait.
    /// Height comes from the intrinsic aspect ratio, so it is never
    /// stretched independently. `None` while no image is present.
    pub fn pixel_rect(&self, frame: CanvasFrame) -> Option<(f32, f32, f32, f32)> {
        let image = self.image.as_ref()?;
        if image.width() == 0 {
            return None;
        }
        let w = self.width * frame.width as f32;
        let h = w / image.width() as f32 * image.height() as f32;
        let origin = frame.to_pixels(self.position);
        Some((origin.x, origin.y, w, h))
    }
}

/// Visual parameters shared across layers rather than owned by one: text
/// color and font size apply to both text layers, text rotation uniformly
/// rotates both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharedStyle {
    pub color: Color,
    pub font_size: f32,
    pub text_rotation: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerStore {
    name: TextLayer,
    id: TextLayer,
    portrait: PortraitLayer,
    style: SharedStyle,
}

impl LayerStore {
    pub fn new(style: SharedStyle) -> Self {
        Self {
            name: TextLayer::new(DEFAULT_NAME_POSITION),
            id: TextLayer::new(DEFAULT_ID_POSITION),
            portrait: PortraitLayer::new(),
            style,
        }
    }

    pub fn name(&self) -> &TextLayer {
        &self.name
    }

    pub fn id(&self) -> &TextLayer {
        &self.id
    }

    pub fn portrait(&self) -> &PortraitLayer {
        &self.portrait
    }

    pub fn style(&self) -> SharedStyle {
        self.style
    }

    pub fn set_text(&mut self, layer: LayerId, value: impl Into<String>) {
        match layer {
            LayerId::Name => self.name.text = value.into(),
            LayerId::Id => self.id.text = value.into(),
            LayerId::Portrait => {}
        }
    }

    pub fn set_shared_color(&mut self, color: Color) {
        self.style.color = color;
    }

    pub fn set_shared_font_size(&mut self, size: f32) {
        self.style.font_size = size;
    }

    pub fn set_shared_text_rotation(&mut self, degrees: f32) {
        self.style.text_rotation = degrees;
    }

    /// Percent of canvas width, matching the external scale control.
    pub fn set_portrait_scale(&mut self, percent: f32) {
        self.portrait.width = percent / 100.0;
    }

    pub fn set_portrait_rotation(&mut self, degrees: f32) {
        self.portrait.rotation = degrees;
    }

    /// Replace or clear the portrait raster. Position, scale and rotation
    /// persist across swaps.
    pub fn set_portrait_image(&mut self, image: Option<RgbaImage>) {
        self.portrait.image = image;
    }

    /// Add a normalized delta to a layer's position. Deliberately unclamped:
    /// a layer may be dragged partly or fully outside the visible frame.
    pub fn translate(&mut self, layer: LayerId, dx: f32, dy: f32) {
        let position = match layer {
            LayerId::Name => &mut self.name.position,
            LayerId::Id => &mut self.id.position,
            LayerId::Portrait => &mut self.portrait.position,
        };
        position.x += dx;
        position.y += dy;
    }

    pub fn set_position(&mut self, layer: LayerId, position: NormPoint) {
        match layer {
            LayerId::Name => self.name.position = position,
            LayerId::Id => self.id.position = position,
            LayerId::Portrait => self.portrait.position = position,
        }
    }

    pub fn set_selected(&mut self, layer: LayerId, selected: bool) {
        match layer {
            LayerId::Name => self.name.selected = selected,
            LayerId::Id => self.id.selected = selected,
            LayerId::Portrait => self.portrait.selected = selected,
        }
    }

    pub fn selected_layer(&self) -> Option<LayerId> {
        if self.name.selected {
            Some(LayerId::Name)
        } else if self.id.selected {
            Some(LayerId::Id)
        } else if self.portrait.selected {
            Some(LayerId::Portrait)
        } else {
            None
        }
    }

    /// Back to the documented defaults; runs whenever a new base image is
    /// supplied.
    pub fn reset_text_positions(&mut self) {
        self.name.position = DEFAULT_NAME_POSITION;
        self.id.position = DEFAULT_ID_POSITION;
    }
}
