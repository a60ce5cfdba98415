use std::fmt;

use serde::{Deserialize, Serialize};

/// RGB color with components in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Color {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    /// Build from a 0xRRGGBB literal, handy for the theme tables.
    pub fn hex(rgb: u32) -> Self {
        Color {
            r: ((rgb >> 16) & 0xff) as f32 / 255.0,
            g: ((rgb >> 8) & 0xff) as f32 / 255.0,
            b: (rgb & 0xff) as f32 / 255.0,
        }
    }

    /// Fully saturated color at the given hue, hue in [0, 1) wrapping.
    pub fn from_hue(hue: f32) -> Self {
        let h = (hue.rem_euclid(1.0)) * 6.0;
        let x = 1.0 - (h % 2.0 - 1.0).abs();
        let (r, g, b) = match h as u32 {
            0 => (1.0, x, 0.0),
            1 => (x, 1.0, 0.0),
            2 => (0.0, 1.0, x),
            3 => (0.0, x, 1.0),
            4 => (x, 0.0, 1.0),
            _ => (1.0, 0.0, x),
        };
        Color { r, g, b }
    }

    pub fn lerp(a: &Color, b: &Color, t: f32) -> Color {
        if t >= 1.0 {
            return *b;
        }
        Color {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
        }
    }

    pub fn scale(&self, factor: f32) -> Color {
        Color::new(self.r * factor, self.g * factor, self.b * factor)
    }

    pub fn to_bytes(&self) -> (u8, u8, u8) {
        (
            (self.r.clamp(0.0, 1.0) * 255.0) as u8,
            (self.g.clamp(0.0, 1.0) * 255.0) as u8,
            (self.b.clamp(0.0, 1.0) * 255.0) as u8,
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (r, g, b) = self.to_bytes();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// The three-color palette every interpreter draws from. The three fields
/// are the axes of the partial color shift.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub foreground: Color,
    pub background: Color,
    pub background_contrast: Color,
}

impl ColorScheme {
    pub const AXES: usize = 3;

    pub fn new(foreground: Color, background: Color, background_contrast: Color) -> Self {
        ColorScheme {
            foreground,
            background,
            background_contrast,
        }
    }

    pub fn as_array(&self) -> [Color; Self::AXES] {
        [self.foreground, self.background, self.background_contrast]
    }

    pub fn from_array(colors: [Color; Self::AXES]) -> Self {
        ColorScheme {
            foreground: colors[0],
            background: colors[1],
            background_contrast: colors[2],
        }
    }

    pub fn lerp(a: &ColorScheme, b: &ColorScheme, t: f32) -> ColorScheme {
        if t >= 1.0 {
            return *b;
        }
        ColorScheme {
            foreground: Color::lerp(&a.foreground, &b.foreground, t),
            background: Color::lerp(&a.background, &b.background, t),
            background_contrast: Color::lerp(&a.background_contrast, &b.background_contrast, t),
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "fg {} / bg {} / accent {}",
            self.foreground, self.background, self.background_contrast
        )
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_lerp_endpoints_are_exact() {
        let a = Color::hex(0x102030);
        let b = Color::hex(0xffcc00);
        assert_eq!(Color::lerp(&a, &b, 0.0), a);
        assert_eq!(Color::lerp(&a, &b, 1.0), b);
    }

    #[test]
    fn test_lerp_midpoint() {
        let a = Color::new(0.0, 0.2, 1.0);
        let b = Color::new(1.0, 0.4, 0.0);
        let mid = Color::lerp(&a, &b, 0.5);
        assert_relative_eq!(mid.r, 0.5, epsilon = 1e-6);
        assert_relative_eq!(mid.g, 0.3, epsilon = 1e-6);
        assert_relative_eq!(mid.b, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_hue_wraps() {
        let a = Color::from_hue(0.25);
        let b = Color::from_hue(1.25);
        assert_relative_eq!(a.r, b.r, epsilon = 1e-5);
        assert_relative_eq!(a.g, b.g, epsilon = 1e-5);
        assert_relative_eq!(a.b, b.b, epsilon = 1e-5);
    }

    #[test]
    fn test_scheme_array_round_trip() {
        let scheme = ColorScheme::new(
            Color::hex(0xff2d95),
            Color::hex(0x10004a),
            Color::hex(0x00e5ff),
        );
        assert_eq!(ColorScheme::from_array(scheme.as_array()), scheme);
    }
}
