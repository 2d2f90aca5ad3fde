//! Ordered (4×4 Bayer) dithering evaluated per output pixel.
//!
//! The GPU path runs the same rule in `render/shaders/plane.wgsl`; this module
//! is the CPU evaluator and the source of the shader's constants.

use image::{Rgba, RgbaImage};
use serde::Deserialize;

use super::color::{InkColor, TRANSPARENT, luminance};

/// Bayer threshold matrix, row-major, normalized to `[0, 1)`.
pub const BAYER_4X4: [f32; 16] = [
    0.0 / 16.0,
    8.0 / 16.0,
    2.0 / 16.0,
    10.0 / 16.0,
    12.0 / 16.0,
    4.0 / 16.0,
    14.0 / 16.0,
    6.0 / 16.0,
    3.0 / 16.0,
    11.0 / 16.0,
    1.0 / 16.0,
    9.0 / 16.0,
    15.0 / 16.0,
    7.0 / 16.0,
    13.0 / 16.0,
    5.0 / 16.0,
];

/// Pixel dimensions of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        super::layout::aspect_of(self.width, self.height)
    }

    /// Same viewport with both sides forced to at least one pixel.
    pub fn non_zero(self) -> Self {
        Self::new(self.width.max(1), self.height.max(1))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 800)
    }
}

/// Matrix slot for pixel-space coordinates.
pub fn bayer_index(px: f32, py: f32) -> usize {
    let col = (px.floor() as i64).rem_euclid(4) as usize;
    let row = (py.floor() as i64).rem_euclid(4) as usize;
    row * 4 + col
}

/// Parameters of the per-pixel ordered dither function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedDither {
    pub ink: InkColor,
    pub scale: f32,
    pub viewport: Viewport,
}

impl OrderedDither {
    pub fn new(ink: InkColor, scale: f32, viewport: Viewport) -> Self {
        Self {
            ink,
            scale: super::clamp_scale(scale),
            viewport: viewport.non_zero(),
        }
    }

    /// Threshold for surface coordinate `(u, v)` in `[0, 1]²`.
    pub fn threshold(&self, u: f32, v: f32) -> f32 {
        let px = u * self.viewport.width as f32 / self.scale;
        let py = v * self.viewport.height as f32 / self.scale;
        BAYER_4X4[bayer_index(px, py)]
    }

    /// A pixel is inked when its luminance (0–1) is above the threshold.
    pub fn is_dark(&self, luma: f32, u: f32, v: f32) -> bool {
        luma > self.threshold(u, v)
    }

    /// Color of the dithered surface at `(u, v)`, sampling `source` nearest-texel.
    pub fn color_at(&self, source: &RgbaImage, u: f32, v: f32) -> Rgba<u8> {
        let luma = sample_luma(source, u, v);
        if self.is_dark(luma, u, v) {
            self.ink.to_rgba8()
        } else {
            TRANSPARENT
        }
    }

    /// Evaluates [`Self::color_at`] at every pixel center of a `width × height` raster.
    pub fn render(&self, source: &RgbaImage, width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let u = (x as f32 + 0.5) / width as f32;
            let v = (y as f32 + 0.5) / height as f32;
            self.color_at(source, u, v)
        })
    }
}

fn sample_luma(source: &RgbaImage, u: f32, v: f32) -> f32 {
    let (w, h) = source.dimensions();
    if w == 0 || h == 0 {
        return 0.0;
    }
    let x = ((u.clamp(0.0, 1.0) * w as f32) as u32).min(w - 1);
    let y = ((v.clamp(0.0, 1.0) * h as f32) as u32).min(h - 1);
    luminance(source.get_pixel(x, y)) / 255.0
}
