//! Text measurement and rasterization seam.
//!
//! Hit-testing and rendering both depend on glyph metrics, so the font is a
//! trait boundary: production uses an `ab_glyph` face, tests use a
//! deterministic block face with fixed advances.

use ab_glyph::{point, Font, FontArc, GlyphId, InvalidFont, ScaleFont};
use image::RgbaImage;

use crate::geometry::Color;

/// A rasterized single line of text. `offset_x`/`offset_y` locate the
/// sprite's top-left corner relative to the layer anchor (top of the em box,
/// i.e. canvas `textBaseline = top` semantics).
#[derive(Debug, Clone)]
pub struct TextSprite {
    pub image: RgbaImage,
    pub offset_x: f32,
    pub offset_y: f32,
}

pub trait FontFace {
    /// Advance width of `text` at `px_size`, in pixels.
    fn measure_width(&self, text: &str, px_size: f32) -> f32;

    /// Rasterize `text` at `px_size` into an RGBA sprite. `None` when there
    /// is nothing drawable (empty text, whitespace only).
    fn rasterize(&self, text: &str, px_size: f32, color: Color) -> Option<TextSprite>;
}

/// Production face backed by a loaded font.
#[derive(Debug, Clone)]
pub struct GlyphFace {
    font: FontArc,
}

impl GlyphFace {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, InvalidFont> {
        Ok(Self::new(FontArc::try_from_vec(bytes)?))
    }

    /// Kerning-aware glyph positions along a single baseline. Returns the
    /// positioned glyph ids and the total advance.
    fn layout(&self, text: &str, px_size: f32) -> (Vec<(GlyphId, f32)>, f32) {
        let scaled = self.font.as_scaled(px_size);
        let mut glyphs = Vec::with_capacity(text.len());
        let mut cursor_x = 0.0f32;
        let mut last_glyph: Option<GlyphId> = None;

        for ch in text.chars() {
            let glyph_id = self.font.glyph_id(ch);
            if let Some(prev) = last_glyph {
                cursor_x += scaled.kern(prev, glyph_id);
            }
            glyphs.push((glyph_id, cursor_x));
            cursor_x += scaled.h_advance(glyph_id);
            last_glyph = Some(glyph_id);
        }

        (glyphs, cursor_x)
    }
}

impl FontFace for GlyphFace {
    fn measure_width(&self, text: &str, px_size: f32) -> f32 {
        self.layout(text, px_size).1
    }

    fn rasterize(&self, text: &str, px_size: f32, color: Color) -> Option<TextSprite> {
        let scaled = self.font.as_scaled(px_size);
        let ascent = scaled.ascent();
        let (glyphs, _) = self.layout(text, px_size);

        // Outline pass: collect bounds of everything that has ink.
        let mut outlined = Vec::with_capacity(glyphs.len());
        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;

        for (glyph_id, x) in glyphs {
            let glyph = glyph_id.with_scale_and_position(px_size, point(x, ascent));
            if let Some(outline) = self.font.outline_glyph(glyph) {
                let bounds = outline.px_bounds();
                min_x = min_x.min(bounds.min.x);
                min_y = min_y.min(bounds.min.y);
                max_x = max_x.max(bounds.max.x);
                max_y = max_y.max(bounds.max.y);
                outlined.push(outline);
            }
        }

        if outlined.is_empty() || min_x >= max_x || min_y >= max_y {
            return None;
        }

        let origin_x = min_x.floor();
        let origin_y = min_y.floor();
        let width = (max_x.ceil() - origin_x) as u32;
        let height = (max_y.ceil() - origin_y) as u32;
        if width == 0 || height == 0 {
            return None;
        }

        let mut coverage = vec![0.0f32; width as usize * height as usize];
        for outline in &outlined {
            let bounds = outline.px_bounds();
            let glyph_x = bounds.min.x - origin_x;
            let glyph_y = bounds.min.y - origin_y;
            outline.draw(|px, py, cov| {
                let x = (px as f32 + glyph_x) as i32;
                let y = (py as f32 + glyph_y) as i32;
                if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                    let idx = y as usize * width as usize + x as usize;
                    coverage[idx] = coverage[idx].max(cov);
                }
            });
        }

        let mut image = RgbaImage::new(width, height);
        for (idx, cov) in coverage.iter().enumerate() {
            if *cov > 0.001 {
                let alpha = (cov * 255.0).round().min(255.0) as u8;
                let x = (idx % width as usize) as u32;
                let y = (idx / width as usize) as u32;
                image.put_pixel(x, y, image::Rgba([color.r, color.g, color.b, alpha]));
            }
        }

        Some(TextSprite {
            image,
            offset_x: origin_x,
            offset_y: origin_y,
        })
    }
}
