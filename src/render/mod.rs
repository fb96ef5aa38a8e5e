//! Deterministic raster compositor.
//!
//! Fixed draw order per frame: clear, base image stretched to the frame,
//! portrait (rotated about its center), then the text layers name and id
//! (rotated about their anchors). Selection overlays draw last for the
//! actively dragged layer. Rendering reads all state fresh each call;
//! there is no diffing, every mutation triggers a full redraw.

pub mod font;

use image::{imageops, RgbaImage};

use crate::geometry::{rotate_about, CanvasFrame, Color, PixelPoint};
use crate::layer::{LayerStore, SharedStyle, TextLayer};
use font::FontFace;

/// Fixed overlay color for the actively dragged layer.
const SELECTION_COLOR: Color = Color::new(16, 185, 129);
const PORTRAIT_OUTLINE_WIDTH: f32 = 4.0;
const TEXT_OUTLINE_WIDTH: f32 = 2.0;
const HANDLE_SIZE: f32 = 10.0;
const TEXT_OUTLINE_PADDING: f32 = 5.0;
/// The selection box is taller than the hit box: it wraps the full line
/// height rather than the em size.
const TEXT_BOX_HEIGHT_FACTOR: f32 = 1.2;

/// Compose the full frame from a store snapshot. Pure: no state survives
/// between calls.
pub fn compose<F: FontFace>(
    base: &RgbaImage,
    store: &LayerStore,
    frame: CanvasFrame,
    font: &F,
) -> RgbaImage {
    let mut canvas = if base.dimensions() == (frame.width, frame.height) {
        base.clone()
    } else {
        imageops::resize(base, frame.width, frame.height, imageops::FilterType::Triangle)
    };

    draw_portrait(&mut canvas, store, frame);
    draw_text_layer(&mut canvas, store.name(), store.style(), frame, font);
    draw_text_layer(&mut canvas, store.id(), store.style(), frame, font);
    canvas
}

fn draw_portrait(canvas: &mut RgbaImage, store: &LayerStore, frame: CanvasFrame) {
    let portrait = store.portrait();
    let Some((x, y, w, h)) = portrait.pixel_rect(frame) else {
        return;
    };
    let image = portrait
        .image
        .as_ref()
        .expect("pixel_rect implies an image");
    let center = PixelPoint::new(x + w / 2.0, y + h / 2.0);
    draw_rotated_image(canvas, image, center, w, h, portrait.rotation);

    if portrait.selected {
        stroke_rotated_rect(
            canvas,
            center,
            w,
            h,
            portrait.rotation,
            PORTRAIT_OUTLINE_WIDTH,
            SELECTION_COLOR,
        );
        // Corner handles on the top-left and bottom-right, rotating with the
        // layer. Visual affordance only; they do not extend the hit region.
        for corner in [
            PixelPoint::new(-w / 2.0, -h / 2.0),
            PixelPoint::new(w / 2.0, h / 2.0),
        ] {
            let handle_center = offset_rotated(center, corner, portrait.rotation);
            fill_rotated_rect(
                canvas,
                handle_center,
                HANDLE_SIZE,
                HANDLE_SIZE,
                portrait.rotation,
                SELECTION_COLOR,
            );
        }
    }
}

fn draw_text_layer<F: FontFace>(
    canvas: &mut RgbaImage,
    layer: &TextLayer,
    style: SharedStyle,
    frame: CanvasFrame,
    font: &F,
) {
    let anchor = frame.to_pixels(layer.position);
    let font_size = frame.scaled_font_size(style.font_size);

    if let Some(sprite) = font.rasterize(&layer.text, font_size, style.color) {
        let sprite_w = sprite.image.width() as f32;
        let sprite_h = sprite.image.height() as f32;
        // The sprite rotates about the layer anchor, not its own center:
        // carry the anchor-relative offset through the rotation, then blit
        // about the displaced center.
        let local_center = PixelPoint::new(
            sprite.offset_x + sprite_w / 2.0,
            sprite.offset_y + sprite_h / 2.0,
        );
        let center = offset_rotated(anchor, local_center, style.text_rotation);
        draw_rotated_image(
            canvas,
            &sprite.image,
            center,
            sprite_w,
            sprite_h,
            style.text_rotation,
        );
    }

    if layer.selected {
        let width = font.measure_width(&layer.text, font_size);
        let height = font_size * TEXT_BOX_HEIGHT_FACTOR;
        let local_center = PixelPoint::new(width / 2.0, height / 2.0);
        let center = offset_rotated(anchor, local_center, style.text_rotation);
        stroke_rotated_rect(
            canvas,
            center,
            width + 2.0 * TEXT_OUTLINE_PADDING,
            height + 2.0 * TEXT_OUTLINE_PADDING,
            style.text_rotation,
            TEXT_OUTLINE_WIDTH,
            SELECTION_COLOR,
        );
    }
}

/// `origin + R(degrees) * offset`.
fn offset_rotated(origin: PixelPoint, offset: PixelPoint, degrees: f32) -> PixelPoint {
    let rotated = rotate_about(
        PixelPoint::new(origin.x + offset.x, origin.y + offset.y),
        origin,
        degrees,
    );
    PixelPoint::new(rotated.x, rotated.y)
}

/// Blit `src` scaled to `dest_w` x `dest_h` and rotated by `degrees` about
/// `center`, bilinear-sampled through the inverse mapping so the output has
/// no gaps regardless of angle.
fn draw_rotated_image(
    canvas: &mut RgbaImage,
    src: &RgbaImage,
    center: PixelPoint,
    dest_w: f32,
    dest_h: f32,
    degrees: f32,
) {
    if dest_w <= 0.0 || dest_h <= 0.0 || src.width() == 0 || src.height() == 0 {
        return;
    }
    let half_w = dest_w / 2.0;
    let half_h = dest_h / 2.0;
    let src_w = src.width() as i32;
    let src_h = src.height() as i32;
    let scale_x = src.width() as f32 / dest_w;
    let scale_y = src.height() as f32 / dest_h;

    for_each_covered_pixel(canvas, center, half_w, half_h, degrees, |canvas, px, py, lx, ly| {
        let src_x = (lx + half_w) * scale_x - 0.5;
        let src_y = (ly + half_h) * scale_y - 0.5;

        let x0 = src_x.floor() as i32;
        let y0 = src_y.floor() as i32;
        if x0 < -1 || y0 < -1 || x0 >= src_w || y0 >= src_h {
            return;
        }
        let fx = src_x - x0 as f32;
        let fy = src_y - y0 as f32;

        let sample = |sx: i32, sy: i32| -> [f32; 4] {
            if sx < 0 || sy < 0 || sx >= src_w || sy >= src_h {
                [0.0; 4]
            } else {
                let p = src.get_pixel(sx as u32, sy as u32).0;
                [p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32]
            }
        };

        let tl = sample(x0, y0);
        let tr = sample(x0 + 1, y0);
        let bl = sample(x0, y0 + 1);
        let br = sample(x0 + 1, y0 + 1);

        let mut rgba = [0.0f32; 4];
        for (c, out) in rgba.iter_mut().enumerate() {
            let top = tl[c] + (tr[c] - tl[c]) * fx;
            let bot = bl[c] + (br[c] - bl[c]) * fx;
            *out = top + (bot - top) * fy;
        }
        blend_pixel(canvas, px, py, rgba);
    });
}

/// Solid rotated rectangle, blended opaque.
fn fill_rotated_rect(
    canvas: &mut RgbaImage,
    center: PixelPoint,
    w: f32,
    h: f32,
    degrees: f32,
    color: Color,
) {
    let rgba = [color.r as f32, color.g as f32, color.b as f32, 255.0];
    for_each_covered_pixel(canvas, center, w / 2.0, h / 2.0, degrees, |canvas, px, py, _, _| {
        blend_pixel(canvas, px, py, rgba);
    });
}

/// Rectangle outline with `thickness` centered on the path, drawn as four
/// rotated edge bars.
fn stroke_rotated_rect(
    canvas: &mut RgbaImage,
    center: PixelPoint,
    w: f32,
    h: f32,
    degrees: f32,
    thickness: f32,
    color: Color,
) {
    let edges = [
        (PixelPoint::new(0.0, -h / 2.0), w + thickness, thickness),
        (PixelPoint::new(0.0, h / 2.0), w + thickness, thickness),
        (PixelPoint::new(-w / 2.0, 0.0), thickness, h + thickness),
        (PixelPoint::new(w / 2.0, 0.0), thickness, h + thickness),
    ];
    for (offset, edge_w, edge_h) in edges {
        let edge_center = offset_rotated(center, offset, degrees);
        fill_rotated_rect(canvas, edge_center, edge_w, edge_h, degrees, color);
    }
}

/// Visit every canvas pixel inside the rotated box `half_w` x `half_h`
/// about `center`, passing the pixel and its unrotated local coordinates.
fn for_each_covered_pixel(
    canvas: &mut RgbaImage,
    center: PixelPoint,
    half_w: f32,
    half_h: f32,
    degrees: f32,
    mut visit: impl FnMut(&mut RgbaImage, u32, u32, f32, f32),
) {
    let (sin, cos) = degrees.to_radians().sin_cos();

    // Axis-aligned bounds of the rotated box.
    let extent_x = half_w * cos.abs() + half_h * sin.abs();
    let extent_y = half_w * sin.abs() + half_h * cos.abs();
    let min_x = ((center.x - extent_x).floor() as i64).max(0) as u32;
    let min_y = ((center.y - extent_y).floor() as i64).max(0) as u32;
    let max_x = ((center.x + extent_x).ceil() as i64).min(canvas.width() as i64 - 1);
    let max_y = ((center.y + extent_y).ceil() as i64).min(canvas.height() as i64 - 1);
    if max_x < min_x as i64 || max_y < min_y as i64 {
        return;
    }

    for py in min_y..=max_y as u32 {
        for px in min_x..=max_x as u32 {
            let dx = px as f32 + 0.5 - center.x;
            let dy = py as f32 + 0.5 - center.y;
            // Inverse rotation back into the box's local space.
            let lx = dx * cos + dy * sin;
            let ly = -dx * sin + dy * cos;
            if lx >= -half_w && lx <= half_w && ly >= -half_h && ly <= half_h {
                visit(canvas, px, py, lx, ly);
            }
        }
    }
}

/// Source-over blend of an RGBA sample (0..255 floats) onto the canvas.
fn blend_pixel(canvas: &mut RgbaImage, x: u32, y: u32, rgba: [f32; 4]) {
    let alpha = rgba[3] / 255.0;
    if alpha <= 0.0 {
        return;
    }
    let pixel = canvas.get_pixel_mut(x, y);
    if alpha >= 1.0 {
        pixel.0 = [
            rgba[0].round() as u8,
            rgba[1].round() as u8,
            rgba[2].round() as u8,
            255,
        ];
        return;
    }
    for c in 0..3 {
        let blended = rgba[c] * alpha + pixel.0[c] as f32 * (1.0 - alpha);
        pixel.0[c] = blended.round().clamp(0.0, 255.0) as u8;
    }
    let out_a = rgba[3] + pixel.0[3] as f32 * (1.0 - alpha);
    pixel.0[3] = out_a.round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompositionConfig;
    use crate::geometry::NormPoint;
    use crate::layer::LayerId;
    use crate::render::font::testing::BlockFace;
    use image::Rgba;

    const FRAME: CanvasFrame = CanvasFrame::new(800, 500);
    const BASE: Rgba<u8> = Rgba([40, 40, 40, 255]);
    const PORTRAIT: Rgba<u8> = Rgba([200, 200, 200, 255]);

    fn base_image() -> RgbaImage {
        RgbaImage::from_pixel(800, 500, BASE)
    }

    fn portrait_image(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, PORTRAIT)
    }

    fn store() -> LayerStore {
        let defaults = CompositionConfig::default();
        LayerStore::new(SharedStyle {
            color: defaults.text_color,
            font_size: defaults.font_size,
            text_rotation: defaults.text_rotation,
        })
    }

    #[test]
    fn empty_store_renders_the_stretched_base_only() {
        let store = store();
        let canvas = compose(&base_image(), &store, FRAME, &BlockFace);
        assert_eq!(canvas.dimensions(), (800, 500));
        assert_eq!(*canvas.get_pixel(0, 0), BASE);
        assert_eq!(*canvas.get_pixel(799, 499), BASE);

        let small_base = RgbaImage::from_pixel(80, 50, BASE);
        let stretched = compose(&small_base, &store, FRAME, &BlockFace);
        assert_eq!(stretched.dimensions(), (800, 500));
        assert_eq!(*stretched.get_pixel(400, 250), BASE);
    }

    #[test]
    fn portrait_height_derives_from_intrinsic_aspect() {
        let mut store = store();
        store.set_portrait_image(Some(portrait_image(300, 400)));
        let canvas = compose(&base_image(), &store, FRAME, &BlockFace);

        // Rect is (80, 175) size 200 x 266.67.
        assert_eq!(*canvas.get_pixel(180, 300), PORTRAIT);
        // Inside horizontally, just above the derived bottom edge.
        assert_eq!(*canvas.get_pixel(180, 438), PORTRAIT);
        // Below the derived bottom edge: base shows through.
        assert_eq!(*canvas.get_pixel(180, 445), BASE);
        // Right of the width: base.
        assert_eq!(*canvas.get_pixel(285, 300), BASE);
    }

    #[test]
    fn portrait_rotation_moves_coverage() {
        let mut store = store();
        store.set_portrait_image(Some(portrait_image(300, 400)));

        // Center (180, 308.33); (180, 428) is inside the unrotated box
        // (half-height 133) but outside the box rotated 90 degrees
        // (half-height becomes 100).
        let canvas = compose(&base_image(), &store, FRAME, &BlockFace);
        assert_eq!(*canvas.get_pixel(180, 428), PORTRAIT);

        store.set_portrait_rotation(90.0);
        let canvas = compose(&base_image(), &store, FRAME, &BlockFace);
        assert_eq!(*canvas.get_pixel(180, 428), BASE);
        // A point only the rotated box covers: (300, 308) is 120px right of
        // center, beyond the unrotated half-width 100 but inside the rotated
        // half-width 133.
        assert_eq!(*canvas.get_pixel(300, 308), PORTRAIT);
    }

    #[test]
    fn text_draws_at_anchor_with_baseline_top() {
        let mut store = store();
        store.set_text(LayerId::Name, "AB");
        store.set_shared_text_rotation(0.0);
        store.set_shared_color(Color::new(255, 0, 0));

        // Block sprite: 18 x 15 at anchor (408, 220).
        let canvas = compose(&base_image(), &store, FRAME, &BlockFace);
        assert_eq!(*canvas.get_pixel(412, 227), Rgba([255, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(430, 227), BASE);
        assert_eq!(*canvas.get_pixel(412, 240), BASE);
    }

    #[test]
    fn text_rotates_about_its_anchor() {
        let mut store = store();
        store.set_text(LayerId::Name, "AB");
        store.set_shared_color(Color::new(255, 0, 0));
        store.set_shared_text_rotation(90.0);

        // Rotating the 18 x 15 sprite 90 degrees about the anchor lands it
        // at x in [anchor-15, anchor], y in [anchor, anchor+18].
        let canvas = compose(&base_image(), &store, FRAME, &BlockFace);
        assert_eq!(*canvas.get_pixel(401, 229), Rgba([255, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(418, 222), BASE);
    }

    #[test]
    fn selected_portrait_gets_outline_and_handles() {
        let mut store = store();
        store.set_portrait_image(Some(portrait_image(300, 400)));
        store.set_selected(LayerId::Portrait, true);
        let canvas = compose(&base_image(), &store, FRAME, &BlockFace);

        let green = Rgba([SELECTION_COLOR.r, SELECTION_COLOR.g, SELECTION_COLOR.b, 255]);
        // Top edge midpoint of the rect (80, 175)-(280, 441.67).
        assert_eq!(*canvas.get_pixel(180, 175), green);
        // Top-left corner handle.
        assert_eq!(*canvas.get_pixel(78, 173), green);
        // Bottom-right corner handle.
        assert_eq!(*canvas.get_pixel(281, 443), green);
        // Interior stays portrait-colored.
        assert_eq!(*canvas.get_pixel(180, 300), PORTRAIT);
    }

    #[test]
    fn selected_text_gets_a_padded_outline() {
        let mut store = store();
        store.set_text(LayerId::Name, "AB");
        store.set_shared_text_rotation(0.0);
        store.set_selected(LayerId::Name, true);
        let canvas = compose(&base_image(), &store, FRAME, &BlockFace);

        let green = Rgba([SELECTION_COLOR.r, SELECTION_COLOR.g, SELECTION_COLOR.b, 255]);
        // Box spans (403, 215)-(431, 243):5px padding around 18 x 18.
        assert_eq!(*canvas.get_pixel(417, 215), green);
        assert_eq!(*canvas.get_pixel(403, 229), green);
    }

    #[test]
    fn layers_clipped_at_frame_edges_do_not_panic() {
        let mut store = store();
        store.set_text(LayerId::Name, "AB");
        store.set_position(LayerId::Name, NormPoint::new(-0.01, -0.01));
        store.set_portrait_image(Some(portrait_image(300, 400)));
        store.set_position(LayerId::Portrait, NormPoint::new(0.9, 0.9));
        store.set_portrait_rotation(30.0);

        let canvas = compose(&base_image(), &store, FRAME, &BlockFace);
        assert_eq!(canvas.dimensions(), (800, 500));
    }
}
