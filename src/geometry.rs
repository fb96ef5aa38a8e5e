//! Shared geometric and color primitives used across store, hit-test and
//! render modules.
//!
//! Layer positions and sizes are normalized: fractions of the canvas frame,
//! independent of the loaded template's pixel resolution.

/// Logical width the shared font size is specified against. A base image
/// twice this wide renders text at twice the pixel size.
pub const REFERENCE_WIDTH: f32 = 800.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormPoint {
    pub x: f32,
    pub y: f32,
}

impl NormPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

impl PixelPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Device-pixel dimensions of the rendering surface. Fixed per loaded base
/// image; changes only when a new base image is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasFrame {
    pub width: u32,
    pub height: u32,
}

impl CanvasFrame {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Normalized -> device pixels. No clamping: callers own range validity.
    pub fn to_pixels(self, point: NormPoint) -> PixelPoint {
        PixelPoint::new(point.x * self.width as f32, point.y * self.height as f32)
    }

    /// Device pixels -> normalized. Inverse of `to_pixels` up to rounding.
    pub fn to_normalized(self, point: PixelPoint) -> NormPoint {
        NormPoint::new(point.x / self.width as f32, point.y / self.height as f32)
    }

    /// Scale a logical font size so text proportions stay visually constant
    /// across base images of differing resolution.
    pub fn scaled_font_size(self, logical_size: f32) -> f32 {
        logical_size * self.width as f32 / REFERENCE_WIDTH
    }
}

/// Rotate `point` about `center` by `degrees`.
pub fn rotate_about(point: PixelPoint, center: PixelPoint, degrees: f32) -> PixelPoint {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    PixelPoint::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` string (the shape color pickers hand over).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
        let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
        let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
        Some(Self::new(r, g, b))
    }
}
