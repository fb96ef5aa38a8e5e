//! Pointer hit-testing against layer bounding regions.
//!
//! Pure predicates over a store snapshot. Two deliberate asymmetries carried
//! over from the observed behavior: text boxes are tested in unrotated space
//! even though the glyphs render rotated, while the portrait box does
//! compensate for its rotation (exact for rectangles).

use crate::geometry::{rotate_about, CanvasFrame, PixelPoint};
use crate::layer::{LayerId, LayerStore, PortraitLayer, SharedStyle, TextLayer};
use crate::render::font::FontFace;

/// Unrotated box test: `[x, x + measured_width] x [y, y + scaled_font_size]`
/// with the current text content. Empty text is never a hit.
pub fn hit_test_text<F: FontFace>(
    layer: &TextLayer,
    style: SharedStyle,
    font: &F,
    pointer: PixelPoint,
    frame: CanvasFrame,
) -> bool {
    if layer.text.is_empty() {
        return false;
    }
    let origin = frame.to_pixels(layer.position);
    let font_size = frame.scaled_font_size(style.font_size);
    let width = font.measure_width(&layer.text, font_size);
    pointer.x >= origin.x
        && pointer.x <= origin.x + width
        && pointer.y >= origin.y
        && pointer.y <= origin.y + font_size
}

/// Inverse-rotates the pointer about the portrait center, then tests the
/// unrotated half-extent box. Absent image is never a hit.
pub fn hit_test_portrait(
    layer: &PortraitLayer,
    pointer: PixelPoint,
    frame: CanvasFrame,
) -> bool {
    let Some((x, y, w, h)) = layer.pixel_rect(frame) else {
        return false;
    };
    let center = PixelPoint::new(x + w / 2.0, y + h / 2.0);
    let local = rotate_about(pointer, center, -layer.rotation);
    local.x >= x && local.x <= x + w && local.y >= y && local.y <= y + h
}

/// Priority chain: name, then id, then portrait. First positive hit wins, so
/// overlaps resolve by this fixed order — text always beats the portrait
/// even though the portrait paints beneath it.
pub fn hit_test<F: FontFace>(
    store: &LayerStore,
    font: &F,
    pointer: PixelPoint,
    frame: CanvasFrame,
) -> Option<LayerId> {
    let style = store.style();
    if hit_test_text(store.name(), style, font, pointer, frame) {
        Some(LayerId::Name)
    } else if hit_test_text(store.id(), style, font, pointer, frame) {
        Some(LayerId::Id)
    } else if hit_test_portrait(store.portrait(), pointer, frame) {
        Some(LayerId::Portrait)
    } else {
        None
    }
}
