//! CSS-style colors for overlay drawing.

use std::fmt;

/// An sRGB color with straight alpha, rendered as a CSS `rgba()` string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Opacity, 0.0 (transparent) to 1.0 (opaque).
    pub a: f64,
}

impl Rgba {
    /// Creates a color from channels and opacity.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// White with the given opacity.
    #[must_use]
    pub const fn white(a: f64) -> Self {
        Self::new(255, 255, 255, a)
    }

    /// Black with the given opacity.
    #[must_use]
    pub const fn black(a: f64) -> Self {
        Self::new(0, 0, 0, a)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_as_css() {
        assert_eq!(Rgba::white(0.4).to_string(), "rgba(255,255,255,0.4)");
        assert_eq!(Rgba::white(1.0).to_string(), "rgba(255,255,255,1)");
        assert_eq!(Rgba::black(0.8).to_string(), "rgba(0,0,0,0.8)");
    }

    #[test]
    fn clamps_alpha() {
        assert_eq!(Rgba::new(1, 2, 3, 7.0).to_string(), "rgba(1,2,3,1)");
    }
}
