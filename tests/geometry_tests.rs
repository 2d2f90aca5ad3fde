use poster_dither::config::CameraConfig;
use poster_dither::processing::layout::{Rotation, fit_plane, visible_extent};
use poster_dither::render::camera::{Camera, project};

fn close(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "{a} vs {b}");
}

#[test]
fn square_image_on_wide_viewport_is_height_bound() {
    let (_, visible_h) = visible_extent(50.0, 2.0, 16.0 / 9.0);
    let plane = fit_plane(1.0, 16.0 / 9.0, 50.0, 2.0, 0.6);
    // 2 * 2 * tan(25deg) = 1.8652
    close(visible_h, 1.8652, 1e-3);
    close(plane.height, visible_h * 0.6, 1e-4);
    close(plane.width, plane.height, 1e-5);
}

#[test]
fn panorama_on_wide_viewport_is_width_bound() {
    let aspect = 16.0 / 9.0;
    let (visible_w, _) = visible_extent(50.0, 2.0, aspect);
    let plane = fit_plane(4.0, aspect, 50.0, 2.0, 0.6);
    close(plane.width, visible_w * 0.6, 1e-4);
    close(plane.aspect(), 4.0, 1e-4);
}

#[test]
fn portrait_viewport_keeps_image_inside() {
    let aspect = 9.0 / 16.0;
    let (visible_w, visible_h) = visible_extent(50.0, 2.0, aspect);
    for image_aspect in [0.25, 0.5, 1.0, 1.5, 3.0] {
        let plane = fit_plane(image_aspect, aspect, 50.0, 2.0, 1.0);
        assert!(plane.width <= visible_w + 1e-5, "aspect {image_aspect}");
        assert!(plane.height <= visible_h + 1e-5, "aspect {image_aspect}");
        close(plane.aspect(), image_aspect, 1e-4);
    }
}

#[test]
fn fitted_corners_project_inside_padding() {
    let aspect = 1280.0 / 800.0;
    let camera = Camera::new(&CameraConfig::default(), aspect);
    let plane = fit_plane(aspect, aspect, 50.0, 2.0, 0.6);
    let mvp = camera.mvp(Rotation::default());
    let corner = project(&mvp, [plane.width / 2.0, plane.height / 2.0, 0.0]);
    close(corner[0], 0.6, 1e-4);
    close(corner[1], 0.6, 1e-4);
    assert!((0.0..=1.0).contains(&corner[2]));
}

#[test]
fn small_tilt_stays_on_screen() {
    let aspect = 1.6;
    let camera = Camera::new(&CameraConfig::default(), aspect);
    let plane = fit_plane(1.0, aspect, 50.0, 2.0, 0.6);
    let mvp = camera.mvp(Rotation::new(0.15, -0.15, 0.15));
    for (sx, sy) in [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)] {
        let ndc = project(&mvp, [sx * plane.width / 2.0, sy * plane.height / 2.0, 0.0]);
        assert!(ndc[0].abs() < 1.0 && ndc[1].abs() < 1.0, "{ndc:?}");
    }
}
