//! Floyd–Steinberg error diffusion into an ink / transparent raster.

use fast_image_resize as fir;
use image::{RgbaImage, imageops};
use tracing::{debug, warn};

use super::color::{InkColor, TRANSPARENT, luminance};
use super::resize_rgba;

/// Quantization threshold on the 0–255 luma scale.
pub const THRESHOLD: f32 = 127.5;

/// Neighbor offsets and weights that receive a pixel's residual.
pub const FLOYD_STEINBERG: [(i32, i32, f32); 4] = [
    (1, 0, 7.0 / 16.0),
    (-1, 1, 3.0 / 16.0),
    (0, 1, 5.0 / 16.0),
    (1, 1, 1.0 / 16.0),
];

/// Size of the reduced work buffer for a given dither scale.
pub fn work_dimensions(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let scale = if scale.is_finite() { scale.max(1.0) } else { 1.0 };
    let w = (width as f32 / scale).ceil().max(1.0) as u32;
    let h = (height as f32 / scale).ceil().max(1.0) as u32;
    (w, h)
}

/// Quantizes one luma value; returns whether it is dark and the residual.
pub fn quantize(value: f32) -> (bool, f32) {
    let quantized = if value > THRESHOLD { 255.0 } else { 0.0 };
    (quantized == 0.0, value - quantized)
}

/// Runs error diffusion over a luma buffer in place and returns the dark mask.
///
/// Pixels are visited row-major; the residual of each goes to unvisited
/// neighbors only, out-of-range neighbors are skipped and accumulated values
/// are clamped to `[0, 255]`.
pub fn diffuse_luma(luma: &mut [f32], width: usize, height: usize) -> Vec<bool> {
    debug_assert_eq!(luma.len(), width * height);
    let mut dark = vec![false; luma.len()];
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let (is_dark, error) = quantize(luma[idx]);
            dark[idx] = is_dark;
            spread_error(luma, width, height, x, y, error);
        }
    }
    dark
}

fn spread_error(luma: &mut [f32], width: usize, height: usize, x: usize, y: usize, error: f32) {
    for (dx, dy, weight) in FLOYD_STEINBERG {
        let nx = x as i64 + i64::from(dx);
        let ny = y as i64 + i64::from(dy);
        if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
            continue;
        }
        let n = ny as usize * width + nx as usize;
        luma[n] = (luma[n] + error * weight).clamp(0.0, 255.0);
    }
}

/// Dithers `image` into an ink / transparent raster of the same dimensions.
///
/// The source is reduced by `scale` first so each dither cell covers
/// `scale × scale` output pixels, then blown back up with nearest-neighbor.
pub fn diffuse(image: &RgbaImage, ink: InkColor, scale: f32) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return RgbaImage::new(width, height);
    }

    let (work_w, work_h) = work_dimensions(width, height, scale);
    let work = downsample(image, work_w, work_h);
    let mut luma: Vec<f32> = work.pixels().map(luminance).collect();
    let dark = diffuse_luma(&mut luma, work_w as usize, work_h as usize);

    let ink_px = ink.to_rgba8();
    let mut raster = RgbaImage::new(work_w, work_h);
    for (pixel, is_dark) in raster.pixels_mut().zip(dark) {
        *pixel = if is_dark { ink_px } else { TRANSPARENT };
    }
    debug!(work_w, work_h, width, height, scale, "error diffusion complete");

    if (work_w, work_h) == (width, height) {
        raster
    } else {
        imageops::resize(&raster, width, height, imageops::FilterType::Nearest)
    }
}

fn downsample(source: &RgbaImage, target_w: u32, target_h: u32) -> RgbaImage {
    if source.width() == target_w && source.height() == target_h {
        return source.clone();
    }
    match resize_rgba(source, target_w, target_h, fir::FilterType::Bilinear) {
        Ok(resized) => resized,
        Err(err) => {
            warn!(error = %err, "fast resize failed; falling back to imageops");
            imageops::resize(source, target_w, target_h, imageops::FilterType::Triangle)
        }
    }
}
