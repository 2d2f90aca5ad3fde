//! Perspective camera looking down -Z at the poster plane.
//!
//! Matrices are column-major `[[f32; 4]; 4]` so they upload directly as WGSL
//! `mat4x4<f32>`. Clip-space depth is `[0, 1]`.

use crate::config::CameraConfig;
use crate::processing::layout::{Rotation, visible_extent};

pub type Mat4 = [[f32; 4]; 4];

pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    fov_degrees: f32,
    distance: f32,
    near: f32,
    far: f32,
    aspect: f32,
}

impl Camera {
    pub fn new(cfg: &CameraConfig, aspect: f32) -> Self {
        Self {
            fov_degrees: cfg.fov_degrees,
            distance: cfg.distance,
            near: cfg.near,
            far: cfg.far,
            aspect,
        }
    }

    pub fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// World-space size of the z = 0 plane seen by the camera.
    pub fn visible_extent(&self) -> (f32, f32) {
        visible_extent(self.fov_degrees, self.distance, self.aspect)
    }

    pub fn projection(&self) -> Mat4 {
        let f = 1.0 / (self.fov_degrees.to_radians() / 2.0).tan();
        let range = self.near - self.far;
        [
            [f / self.aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, self.far / range, -1.0],
            [0.0, 0.0, self.near * self.far / range, 0.0],
        ]
    }

    pub fn view(&self) -> Mat4 {
        translation(0.0, 0.0, -self.distance)
    }

    /// Model-view-projection for a plane at the origin with `rotation`.
    pub fn mvp(&self, rotation: Rotation) -> Mat4 {
        mul(&mul(&self.projection(), &self.view()), &rotation_matrix(rotation))
    }
}

pub fn translation(x: f32, y: f32, z: f32) -> Mat4 {
    let mut m = IDENTITY;
    m[3] = [x, y, z, 1.0];
    m
}

/// Euler XYZ rotation: `Rx * Ry * Rz`.
pub fn rotation_matrix(rotation: Rotation) -> Mat4 {
    let (sx, cx) = rotation.x.sin_cos();
    let (sy, cy) = rotation.y.sin_cos();
    let (sz, cz) = rotation.z.sin_cos();
    let rx = [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, cx, sx, 0.0],
        [0.0, -sx, cx, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ];
    let ry = [
        [cy, 0.0, -sy, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [sy, 0.0, cy, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ];
    let rz = [
        [cz, sz, 0.0, 0.0],
        [-sz, cz, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ];
    mul(&mul(&rx, &ry), &rz)
}

pub fn mul(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [[0.0; 4]; 4];
    for (col, out_col) in out.iter_mut().enumerate() {
        for (row, cell) in out_col.iter_mut().enumerate() {
            *cell = (0..4).map(|k| a[k][row] * b[col][k]).sum();
        }
    }
    out
}

/// Applies `m` to a point and performs the perspective divide.
pub fn project(m: &Mat4, point: [f32; 3]) -> [f32; 3] {
    let v = [point[0], point[1], point[2], 1.0];
    let mut clip = [0.0f32; 4];
    for (row, c) in clip.iter_mut().enumerate() {
        *c = (0..4).map(|k| m[k][row] * v[k]).sum();
    }
    [clip[0] / clip[3], clip[1] / clip[3], clip[2] / clip[3]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::layout::fit_plane;

    fn camera(aspect: f32) -> Camera {
        Camera::new(&CameraConfig::default(), aspect)
    }

    #[test]
    fn identity_is_neutral() {
        let m = rotation_matrix(Rotation::new(0.1, -0.05, 0.12));
        assert_eq!(mul(&IDENTITY, &m), m);
        assert_eq!(mul(&m, &IDENTITY), m);
    }

    #[test]
    fn origin_projects_to_center() {
        let ndc = project(&camera(1.5).mvp(Rotation::default()), [0.0, 0.0, 0.0]);
        assert!(ndc[0].abs() < 1e-6 && ndc[1].abs() < 1e-6);
        assert!((0.0..=1.0).contains(&ndc[2]));
    }

    #[test]
    fn fitted_plane_lands_inside_padding() {
        let cam = camera(16.0 / 9.0);
        // Wider than the viewport: fit to width.
        let size = fit_plane(3.0, cam.aspect(), cam.fov_degrees(), cam.distance(), 0.6);
        let corner = project(
            &cam.mvp(Rotation::default()),
            [size.width / 2.0, size.height / 2.0, 0.0],
        );
        assert!((corner[0] - 0.6).abs() < 1e-4, "x = {}", corner[0]);
        assert!(corner[1] < 0.6);
    }

    #[test]
    fn z_rotation_turns_counter_clockwise() {
        let m = rotation_matrix(Rotation::new(0.0, 0.0, std::f32::consts::FRAC_PI_2));
        let p = project(&m, [1.0, 0.0, 0.0]);
        assert!(p[0].abs() < 1e-6);
        assert!((p[1] - 1.0).abs() < 1e-6);
    }
}
