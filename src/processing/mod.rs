pub mod color;
pub mod diffusion;
pub mod layout;
pub mod ordered;
pub mod random;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use fast_image_resize as fir;
use image::RgbaImage;
use serde::Deserialize;

use color::InkColor;
use ordered::{OrderedDither, Viewport};

/// Smallest dither scale; one work pixel per image pixel.
pub const MIN_SCALE: f32 = 1.0;

pub(crate) fn clamp_scale(scale: f32) -> f32 {
    if scale.is_finite() {
        scale.max(MIN_SCALE)
    } else {
        MIN_SCALE
    }
}

/// Convolution resize of an RGBA8 raster with `filter`.
pub(crate) fn resize_rgba(
    source: &RgbaImage,
    target_w: u32,
    target_h: u32,
    filter: fir::FilterType,
) -> anyhow::Result<RgbaImage> {
    let src_view = fir::images::ImageRef::new(
        source.width(),
        source.height(),
        source.as_raw(),
        fir::PixelType::U8x4,
    )
    .context("failed to create source view for resize")?;
    let mut dst_image = fir::images::Image::new(target_w, target_h, fir::PixelType::U8x4);
    let options = fir::ResizeOptions::new().resize_alg(fir::ResizeAlg::Convolution(filter));
    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_view, &mut dst_image, Some(&options))
        .with_context(|| format!("resize to {target_w}x{target_h} failed"))?;
    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| anyhow::anyhow!("failed to construct resized RGBA image"))
}

/// Ink color and dither cell size applied to the current image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DitherConfig {
    ink: InkColor,
    scale: f32,
}

impl DitherConfig {
    /// `scale` below one (or non-finite) is clamped to one.
    pub fn new(ink: InkColor, scale: f32) -> Self {
        Self {
            ink,
            scale: clamp_scale(scale),
        }
    }

    pub fn ink(&self) -> InkColor {
        self.ink
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn with_ink(self, ink: InkColor) -> Self {
        Self { ink, ..self }
    }
}

impl Default for DitherConfig {
    fn default() -> Self {
        Self::new(InkColor::BLACK, MIN_SCALE)
    }
}

/// Which algorithm turns the photo into ink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DitherStrategy {
    /// Floyd–Steinberg on the CPU, uploaded as a texture.
    #[default]
    ErrorDiffusion,
    /// 4×4 Bayer thresholds evaluated per fragment.
    Ordered,
}

impl DitherStrategy {
    const NAMES: &'static [&'static str] = &["error-diffusion", "ordered"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ErrorDiffusion => "error-diffusion",
            Self::Ordered => "ordered",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::ErrorDiffusion => Self::Ordered,
            Self::Ordered => Self::ErrorDiffusion,
        }
    }

    /// Whether the output changes with the viewport's pixel size.
    pub fn depends_on_viewport(self) -> bool {
        matches!(self, Self::Ordered)
    }

    pub fn apply(self, image: &Arc<RgbaImage>, config: &DitherConfig, viewport: Viewport) -> DitherOutput {
        match self {
            Self::ErrorDiffusion => {
                DitherOutput::Raster(diffusion::diffuse(image, config.ink(), config.scale()))
            }
            Self::Ordered => DitherOutput::Ordered {
                source: Arc::clone(image),
                dither: OrderedDither::new(config.ink(), config.scale(), viewport),
            },
        }
    }
}

impl fmt::Display for DitherStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DitherStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error-diffusion" | "diffusion" | "floyd-steinberg" => Ok(Self::ErrorDiffusion),
            "ordered" | "bayer" => Ok(Self::Ordered),
            other => Err(format!(
                "unknown dither strategy {other:?}; expected one of {}",
                Self::NAMES.join(", ")
            )),
        }
    }
}

/// Result of dithering: a finished raster, or a source image plus the
/// per-pixel function that a shader evaluates over it.
#[derive(Debug, Clone)]
pub enum DitherOutput {
    Raster(RgbaImage),
    Ordered {
        source: Arc<RgbaImage>,
        dither: OrderedDither,
    },
}

impl DitherOutput {
    /// CPU rendering of the output; ordered output is evaluated at viewport size.
    pub fn preview(&self) -> RgbaImage {
        match self {
            Self::Raster(raster) => raster.clone(),
            Self::Ordered { source, dither } => {
                dither.render(source, dither.viewport.width, dither.viewport.height)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_clamps_scale() {
        assert_eq!(DitherConfig::new(InkColor::BLACK, 0.0).scale(), 1.0);
        assert_eq!(DitherConfig::new(InkColor::BLACK, f32::INFINITY).scale(), 1.0);
        assert_eq!(DitherConfig::new(InkColor::BLACK, 2.5).scale(), 2.5);
    }

    #[test]
    fn strategy_names_parse() {
        assert_eq!("ordered".parse::<DitherStrategy>(), Ok(DitherStrategy::Ordered));
        assert_eq!(
            "error-diffusion".parse::<DitherStrategy>(),
            Ok(DitherStrategy::ErrorDiffusion)
        );
        assert!("halftone".parse::<DitherStrategy>().is_err());
        assert_eq!(DitherStrategy::Ordered.toggled(), DitherStrategy::ErrorDiffusion);
    }

    #[test]
    fn resize_keeps_flat_color_with_either_filter() {
        let source = RgbaImage::from_pixel(40, 20, image::Rgba([90, 90, 90, 255]));
        for filter in [fir::FilterType::Bilinear, fir::FilterType::CatmullRom] {
            let resized = resize_rgba(&source, 10, 5, filter).unwrap();
            assert_eq!(resized.dimensions(), (10, 5));
            assert!(resized.pixels().all(|px| px.0 == [90, 90, 90, 255]), "{filter:?}");
        }
    }
}
