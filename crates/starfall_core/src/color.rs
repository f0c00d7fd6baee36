//! Stroke colours.
//!
//! Components are stored as 0-1 floats; the raster surface quantizes to
//! RGBA8 only when blending into its buffer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red component (0-1).
    pub r: f32,
    /// Green component (0-1).
    pub g: f32,
    /// Blue component (0-1).
    pub b: f32,
    /// Alpha component (0-1).
    pub a: f32,
}

impl Color {
    /// Solid white, the ambient streak colour.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    /// Gold (255, 215, 0), the highlight streak colour.
    pub const GOLD: Self = Self::rgba(1.0, 215.0 / 255.0, 0.0, 1.0);

    /// Creates a color from RGBA values (0-1).
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color from 8-bit channels.
    #[must_use]
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            1.0,
        )
    }

    /// Returns a new color with different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    /// Returns a new color with alpha multiplied by `factor`, clamped to 0-1.
    #[must_use]
    pub fn scale_alpha(self, factor: f32) -> Self {
        self.with_alpha((self.a * factor).clamp(0.0, 1.0))
    }

    /// Quantizes to 8-bit RGBA.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Formats as a CSS `rgba()` string, which is what canvas-backed hosts
/// accept as a stroke style.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, _] = self.to_rgba8();
        write!(f, "rgba({r},{g},{b},{})", self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gold_quantizes_exactly() {
        assert_eq!(Color::GOLD.to_rgba8(), [255, 215, 0, 255]);
    }

    #[test]
    fn test_scale_alpha_clamps() {
        let c = Color::WHITE.with_alpha(0.8).scale_alpha(2.0);
        assert!((c.a - 1.0).abs() < f32::EPSILON);
        let c = Color::WHITE.scale_alpha(0.5);
        assert!((c.a - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_css_format() {
        assert_eq!(Color::WHITE.with_alpha(0.5).to_string(), "rgba(255,255,255,0.5)");
        assert_eq!(Color::rgb8(255, 215, 0).to_string(), "rgba(255,215,0,1)");
    }
}
