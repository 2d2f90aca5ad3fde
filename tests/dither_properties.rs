use std::sync::Arc;

use image::{Rgba, RgbaImage};
use poster_dither::processing::color::{InkColor, TRANSPARENT};
use poster_dither::processing::diffusion::diffuse;
use poster_dither::processing::ordered::{BAYER_4X4, OrderedDither, Viewport};
use poster_dither::processing::{DitherConfig, DitherStrategy};

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

fn gray(width: u32, height: u32, value: u8) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([value, value, value, 255]))
}

fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let v = ((x * 255 / width.max(1)) as u8).wrapping_add((y * 7) as u8);
        Rgba([v, v / 2, 255 - v, 255])
    })
}

fn assert_binary(image: &RgbaImage, ink: Rgba<u8>) {
    for (x, y, pixel) in image.enumerate_pixels() {
        assert!(
            *pixel == ink || *pixel == TRANSPARENT,
            "pixel ({x}, {y}) = {pixel:?} is neither ink nor transparent"
        );
    }
}

#[test]
fn diffusion_output_is_binary_at_any_scale() {
    let source = gradient(37, 23);
    for scale in [1.0, 1.5, 2.0, 3.7] {
        let out = diffuse(&source, InkColor::from_rgb8(255, 0, 0), scale);
        assert_eq!(out.dimensions(), (37, 23), "scale {scale}");
        assert_binary(&out, RED);
    }
}

#[test]
fn ordered_output_is_binary() {
    let dither = OrderedDither::new(InkColor::from_rgb8(255, 0, 0), 2.5, Viewport::new(64, 48));
    let out = dither.render(&gradient(20, 20), 64, 48);
    assert_binary(&out, RED);
}

#[test]
fn diffusion_of_mid_gray_is_about_half_ink() {
    let out = diffuse(&gray(100, 100, 127), InkColor::from_rgb8(255, 0, 0), 1.0);
    let mut total_dark = 0usize;
    for y in 0..100 {
        let dark = (0..100).filter(|&x| *out.get_pixel(x, y) == RED).count();
        assert!(dark > 0 && dark < 100, "row {y} is uniform");
        total_dark += dark;
    }
    let ratio = total_dark as f32 / 10_000.0;
    assert!((ratio - 0.5).abs() < 0.05, "dark ratio {ratio}");
}

#[test]
fn diffusion_is_deterministic() {
    let source = gradient(53, 41);
    let ink = InkColor::from_rgb8(255, 0, 0);
    for scale in [1.0, 2.5] {
        let first = diffuse(&source, ink, scale);
        let second = diffuse(&source, ink, scale);
        assert_eq!(first.as_raw(), second.as_raw(), "scale {scale}");
    }
}

#[test]
fn diffusion_of_mid_gray_starts_as_a_checkerboard() {
    let out = diffuse(&gray(100, 100, 127), InkColor::from_rgb8(255, 0, 0), 1.0);
    for y in 0..4 {
        let row: String = (0..100)
            .map(|x| if *out.get_pixel(x, y) == RED { '#' } else { '.' })
            .collect();
        let expected: String = (0..100)
            .map(|x| if (x + y) % 2 == 0 { '#' } else { '.' })
            .collect();
        assert_eq!(row, expected, "row {y}");
    }
}

#[test]
fn diffusion_extremes_are_uniform() {
    let ink = InkColor::from_rgb8(255, 0, 0);
    let black = diffuse(&gray(16, 16, 0), ink, 1.0);
    assert!(black.pixels().all(|p| *p == RED));
    let white = diffuse(&gray(16, 16, 255), ink, 1.0);
    assert!(white.pixels().all(|p| *p == TRANSPARENT));
}

#[test]
fn ordered_mid_gray_follows_bayer_matrix() {
    let dither = OrderedDither::new(InkColor::from_rgb8(255, 0, 0), 1.0, Viewport::new(100, 100));
    let out = dither.render(&gray(100, 100, 127), 100, 100);
    for (x, y, pixel) in out.enumerate_pixels() {
        let slot = ((y % 4) * 4 + x % 4) as usize;
        let expect_dark = BAYER_4X4[slot] * 16.0 < 8.0;
        assert_eq!(*pixel == RED, expect_dark, "pixel ({x}, {y})");
    }
    for (x, y, pixel) in out.enumerate_pixels() {
        if x + 4 < 100 {
            assert_eq!(pixel, out.get_pixel(x + 4, y));
        }
        if y + 4 < 100 {
            assert_eq!(pixel, out.get_pixel(x, y + 4));
        }
    }
}

#[test]
fn ordered_scale_widens_cells() {
    let dither = OrderedDither::new(InkColor::BLACK, 2.0, Viewport::new(64, 64));
    let out = dither.render(&gray(64, 64, 127), 64, 64);
    for y in 0..64 {
        for x in (0..64).step_by(2) {
            assert_eq!(out.get_pixel(x, y), out.get_pixel(x + 1, y), "({x}, {y})");
        }
    }
}

#[test]
fn strategy_apply_matches_direct_evaluation() {
    let source = Arc::new(gradient(30, 20));
    let config = DitherConfig::new(InkColor::from_rgb8(10, 20, 30), 2.0);
    let viewport = Viewport::new(120, 80);

    let raster = DitherStrategy::ErrorDiffusion
        .apply(&source, &config, viewport)
        .preview();
    assert_eq!(raster, diffuse(&source, config.ink(), 2.0));

    let ordered = DitherStrategy::Ordered.apply(&source, &config, viewport).preview();
    let direct = OrderedDither::new(config.ink(), 2.0, viewport).render(&source, 120, 80);
    assert_eq!(ordered, direct);
}
