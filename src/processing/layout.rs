/// Width/height of the flat plane the dithered image is drawn on, in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSize {
    pub width: f32,
    pub height: f32,
}

impl PlaneSize {
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Euler rotation of the plane in radians, applied in X, Y, Z order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Rotation {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Aspect ratio of a pixel rectangle; zero dimensions are treated as one.
pub fn aspect_of(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

/// Visible width/height of the z = 0 plane for a camera `distance` units away.
pub fn visible_extent(fov_degrees: f32, distance: f32, viewport_aspect: f32) -> (f32, f32) {
    let visible_height = 2.0 * (fov_degrees.to_radians() / 2.0).tan() * distance;
    (visible_height * viewport_aspect, visible_height)
}

/// Sizes a plane so an image of `image_aspect` is fully contained in the
/// visible frustum, then shrinks it by `padding`.
///
/// Non-positive aspects fall back to square and `padding` is clamped into `(0, 1]`.
pub fn fit_plane(
    image_aspect: f32,
    viewport_aspect: f32,
    fov_degrees: f32,
    distance: f32,
    padding: f32,
) -> PlaneSize {
    let image_aspect = positive_or_one(image_aspect);
    let viewport_aspect = positive_or_one(viewport_aspect);
    let padding = if padding.is_finite() {
        padding.clamp(f32::EPSILON, 1.0)
    } else {
        1.0
    };

    let (visible_width, visible_height) = visible_extent(fov_degrees, distance, viewport_aspect);
    let (width, height) = if image_aspect > viewport_aspect {
        (visible_width, visible_width / image_aspect)
    } else {
        (visible_height * image_aspect, visible_height)
    };

    PlaneSize {
        width: width * padding,
        height: height * padding,
    }
}

fn positive_or_one(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_height_at_fifty_degrees() {
        let (_, h) = visible_extent(50.0, 2.0, 1.0);
        // 2 * tan(25deg) * 2
        assert!((h - 1.865_232).abs() < 1e-4);
    }

    #[test]
    fn wide_image_fits_to_width() {
        let size = fit_plane(2.0, 1.0, 50.0, 2.0, 1.0);
        let (vw, _) = visible_extent(50.0, 2.0, 1.0);
        assert!((size.width - vw).abs() < 1e-5);
        assert!((size.aspect() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn tall_image_fits_to_height() {
        let size = fit_plane(0.5, 16.0 / 9.0, 50.0, 2.0, 1.0);
        let (_, vh) = visible_extent(50.0, 2.0, 16.0 / 9.0);
        assert!((size.height - vh).abs() < 1e-5);
        assert!((size.aspect() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn padding_scales_both_dimensions() {
        let full = fit_plane(1.5, 1.0, 50.0, 2.0, 1.0);
        let padded = fit_plane(1.5, 1.0, 50.0, 2.0, 0.6);
        assert!((padded.width - full.width * 0.6).abs() < 1e-5);
        assert!((padded.height - full.height * 0.6).abs() < 1e-5);
    }

    #[test]
    fn degenerate_inputs_do_not_produce_nan() {
        let size = fit_plane(0.0, f32::NAN, 50.0, 2.0, -3.0);
        assert!(size.width.is_finite() && size.width > 0.0);
        assert!(size.height.is_finite() && size.height > 0.0);
    }
}
