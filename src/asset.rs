//! Decoded source photo retained between recolor/randomize calls.

use std::sync::Arc;

use fast_image_resize as fir;
use image::RgbaImage;
use tracing::debug;

use crate::error::Error;
use crate::processing::layout::aspect_of;
use crate::processing::resize_rgba;

/// Immutable decoded raster plus a label describing where it came from.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    source: String,
    image: Arc<RgbaImage>,
}

impl ImageAsset {
    /// # Errors
    /// Returns [`Error::EmptyImage`] when either dimension is zero.
    pub fn new(source: impl Into<String>, image: RgbaImage) -> Result<Self, Error> {
        let source = source.into();
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::EmptyImage(source));
        }
        Ok(Self {
            source,
            image: Arc::new(image),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn image(&self) -> &Arc<RgbaImage> {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn aspect(&self) -> f32 {
        aspect_of(self.width(), self.height())
    }

    /// Shrinks the asset so neither side exceeds `max_dim`, keeping its aspect.
    ///
    /// # Errors
    /// Returns [`Error::Render`] if the resize itself fails.
    pub fn fit_within(self, max_dim: u32) -> Result<Self, Error> {
        let (w, h) = (self.width(), self.height());
        let max_dim = max_dim.max(1);
        if w <= max_dim && h <= max_dim {
            return Ok(self);
        }
        let scale = (max_dim as f32 / w as f32).min(max_dim as f32 / h as f32);
        let target_w = ((w as f32 * scale).round() as u32).clamp(1, max_dim);
        let target_h = ((h as f32 * scale).round() as u32).clamp(1, max_dim);
        debug!(w, h, target_w, target_h, "shrinking image to texture limits");
        let resized = resize_rgba(&self.image, target_w, target_h, fir::FilterType::CatmullRom)
            .map_err(Error::Render)?;
        Ok(Self {
            source: self.source,
            image: Arc::new(resized),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn rejects_empty_images() {
        let err = ImageAsset::new("empty", RgbaImage::new(0, 10)).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn fit_within_keeps_small_images() {
        let asset = ImageAsset::new("a", RgbaImage::new(20, 10)).unwrap();
        let fitted = asset.clone().fit_within(64).unwrap();
        assert!(Arc::ptr_eq(asset.image(), fitted.image()));
    }

    #[test]
    fn fit_within_preserves_aspect() {
        let asset =
            ImageAsset::new("big", RgbaImage::from_pixel(400, 100, Rgba([9, 9, 9, 255]))).unwrap();
        let fitted = asset.fit_within(100).unwrap();
        assert_eq!((fitted.width(), fitted.height()), (100, 25));
        assert_eq!(fitted.source(), "big");
    }
}
