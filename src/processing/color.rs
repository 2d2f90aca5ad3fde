use std::fmt;
use std::str::FromStr;

use image::Rgba;
use palette::Srgb;
use serde::Deserialize;
use thiserror::Error;

/// Fully transparent "no ink" pixel.
pub const TRANSPARENT: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// Rec. 601 luma of an 8-bit pixel, in the 0–255 range. Alpha is ignored.
pub fn luminance(pixel: &Rgba<u8>) -> f32 {
    0.299 * f32::from(pixel[0]) + 0.587 * f32::from(pixel[1]) + 0.114 * f32::from(pixel[2])
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid ink color {0:?}: expected #rrggbb")]
pub struct ParseInkError(String);

/// The single foreground color used for dark dithered pixels.
///
/// Components are sRGB-encoded floats, always clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct InkColor(Srgb<f32>);

impl InkColor {
    pub const BLACK: Self = Self(Srgb::new(0.0, 0.0, 0.0));

    /// Builds a color from floats; out-of-range and non-finite values are clamped.
    pub fn new(red: f32, green: f32, blue: f32) -> Self {
        Self(Srgb::new(clamp_unit(red), clamp_unit(green), clamp_unit(blue)))
    }

    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self(Srgb::new(red, green, blue).into_format())
    }

    pub fn components(&self) -> [f32; 3] {
        [self.0.red, self.0.green, self.0.blue]
    }

    pub fn to_rgb8(&self) -> [u8; 3] {
        let rgb: Srgb<u8> = self.0.into_format();
        [rgb.red, rgb.green, rgb.blue]
    }

    /// The opaque pixel written for "ink".
    pub fn to_rgba8(&self) -> Rgba<u8> {
        let [r, g, b] = self.to_rgb8();
        Rgba([r, g, b, 255])
    }

    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl Default for InkColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for InkColor {
    type Err = ParseInkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let rgb = Srgb::<u8>::from_str(trimmed).map_err(|_| ParseInkError(s.to_owned()))?;
        Ok(Self::from_rgb8(rgb.red, rgb.green, rgb.blue))
    }
}

impl TryFrom<String> for InkColor {
    type Error = ParseInkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for InkColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_components() {
        let ink = InkColor::new(1.5, -0.2, f32::NAN);
        assert_eq!(ink.components(), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn hex_round_trips_losslessly() {
        for hex in ["#000000", "#d7263d", "#ffffff", "#01fe80"] {
            let ink: InkColor = hex.parse().unwrap();
            assert_eq!(ink.to_hex(), hex);
        }
    }

    #[test]
    fn parses_without_hash() {
        let ink: InkColor = "ff0000".parse().unwrap();
        assert_eq!(ink.to_rgba8(), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn rejects_garbage() {
        assert!("#12345".parse::<InkColor>().is_err());
        assert!("red".parse::<InkColor>().is_err());
    }

    #[test]
    fn mid_gray_luminance() {
        let gray = luminance(&Rgba([127, 127, 127, 255]));
        assert!((gray - 127.0).abs() < 1e-3);
    }
}
