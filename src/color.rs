/*
MIT License

Copyright (c) 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/
use std::fmt;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

/// sRGB color with components in `[0, 1]`.
///
/// Serialized as a `#rrggbb` string, the format the debug panel persists.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Self = Self::from_rgb8(0x00, 0x00, 0x00);
    pub const WHITE: Self = Self::from_rgb8(0xff, 0xff, 0xff);
    pub const GRAY: Self = Self::from_rgb8(0x80, 0x80, 0x80);
    pub const DARK_GRAY: Self = Self::from_rgb8(0xa9, 0xa9, 0xa9);
    pub const TEAL: Self = Self::from_rgb8(0x00, 0x80, 0x80);
    pub const ORANGE: Self = Self::from_rgb8(0xff, 0xa5, 0x00);
    pub const RED: Self = Self::from_rgb8(0xff, 0x00, 0x00);
    pub const GREEN: Self = Self::from_rgb8(0x00, 0xff, 0x00);
    pub const BLUE: Self = Self::from_rgb8(0x00, 0x00, 0xff);

    #[must_use]
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Parses `#rrggbb`, `#rgb` or one of the few CSS names the scene uses.
    pub fn parse(value: &str) -> anyhow::Result<Self> {
        let value = value.trim();
        let Some(hex) = value.strip_prefix('#') else {
            return Self::from_name(value);
        };
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("Invalid color {value:?}, expected hex digits");
        }
        let expanded: String = match hex.len() {
            6 => hex.to_owned(),
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            _ => bail!("Invalid color {value:?}, expected #rrggbb"),
        };
        let rgb = u32::from_str_radix(&expanded, 16)
            .with_context(|| format!("Invalid color {value:?}"))?;
        let [_, r, g, b] = rgb.to_be_bytes();
        Ok(Self::from_rgb8(r, g, b))
    }

    fn from_name(name: &str) -> anyhow::Result<Self> {
        Ok(match name.to_ascii_lowercase().as_str() {
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "gray" | "grey" => Self::GRAY,
            "darkgray" | "darkgrey" => Self::DARK_GRAY,
            "teal" => Self::TEAL,
            "orange" => Self::ORANGE,
            "red" => Self::RED,
            "green" => Self::GREEN,
            "blue" => Self::BLUE,
            _ => bail!("Unknown color name {name:?}"),
        })
    }

    /// 8-bit sRGB components, as color pickers and the `#rrggbb` form use them.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_rgb8(self) -> [u8; 3] {
        let encode = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [encode(self.r), encode(self.g), encode(self.b)]
    }

    /// Linear-light components, what the shaders blend with.
    #[must_use]
    pub fn to_linear(self) -> [f32; 3] {
        fn decode(c: f32) -> f32 {
            if c <= 0.040_45 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        [decode(self.r), decode(self.g), decode(self.b)]
    }

    #[must_use]
    pub fn scaled_linear(self, factor: f32) -> [f32; 3] {
        self.to_linear().map(|c| c * factor)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_rgb8();
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl TryFrom<String> for Color {
    type Error = anyhow::Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_names() {
        let cube = Color::parse("#f69f1f").unwrap();
        assert_eq!(cube, Color::from_rgb8(0xf6, 0x9f, 0x1f));
        assert_eq!(Color::parse("#fff").unwrap(), Color::WHITE);
        assert_eq!(Color::parse("teal").unwrap(), Color::TEAL);
        assert_eq!(Color::parse("DarkGray").unwrap(), Color::DARK_GRAY);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("#gggggg").is_err());
        assert!(Color::parse("#+12345").is_err());
        assert!(Color::parse("#+12").is_err());
        assert!(Color::parse("# 12345").is_err());
        assert!(Color::parse("chartreuse-ish").is_err());
    }

    #[test]
    fn rgb8_keeps_srgb_bytes() {
        let cube = Color::from_rgb8(0xf6, 0x9f, 0x1f);
        assert_eq!(cube.to_rgb8(), [0xf6, 0x9f, 0x1f]);
        assert_eq!(Color { r: 1.5, g: -0.2, b: 0.5 }.to_rgb8(), [0xff, 0x00, 0x80]);
    }

    #[test]
    fn displays_as_hex() {
        assert_eq!(Color::from_rgb8(0xf6, 0x9f, 0x1f).to_string(), "#f69f1f");
        assert_eq!(Color::ORANGE.to_string(), "#ffa500");
    }

    #[test]
    fn linear_conversion_keeps_extremes() {
        assert_eq!(Color::BLACK.to_linear(), [0.0, 0.0, 0.0]);
        let [r, g, b] = Color::WHITE.to_linear();
        assert!((r - 1.0).abs() < 1e-6 && (g - 1.0).abs() < 1e-6 && (b - 1.0).abs() < 1e-6);
        let [mid, _, _] = Color::GRAY.to_linear();
        assert!(mid > 0.2 && mid < 0.23);
    }
}
