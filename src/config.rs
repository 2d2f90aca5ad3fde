use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::processing::DitherStrategy;
use crate::processing::color::InkColor;
use crate::processing::ordered::Viewport;
use crate::processing::random::{
    DEFAULT_MAX_ROTATION, DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE, Randomizer,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Distance from the camera to the poster plane.
    pub distance: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 50.0,
            distance: 2.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl CameraConfig {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.fov_degrees.is_finite() && self.fov_degrees > 0.0 && self.fov_degrees < 180.0,
            "camera.fov-degrees must be between 0 and 180"
        );
        ensure!(
            self.distance.is_finite() && self.distance > 0.0,
            "camera.distance must be positive"
        );
        ensure!(
            self.near.is_finite() && self.near > 0.0,
            "camera.near must be positive"
        );
        ensure!(
            self.far.is_finite() && self.far > self.near,
            "camera.far must be greater than camera.near"
        );
        ensure!(
            self.distance > self.near && self.distance < self.far,
            "camera.distance must lie between camera.near and camera.far"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Fraction of the visible frustum the plane may cover.
    pub padding_factor: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding_factor: 0.6,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct RandomizeConfig {
    /// Per-axis rotation limit in radians.
    pub max_rotation: f32,
    pub min_scale: f32,
    /// Exclusive upper bound of the dither scale.
    pub max_scale: f32,
    /// Fixed seed for reproducible randomization.
    pub seed: Option<u64>,
}

impl Default for RandomizeConfig {
    fn default() -> Self {
        Self {
            max_rotation: DEFAULT_MAX_ROTATION,
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            seed: None,
        }
    }
}

impl RandomizeConfig {
    pub fn randomizer(&self) -> Randomizer {
        Randomizer::new(self.seed, self.max_rotation, self.min_scale, self.max_scale)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.max_rotation.is_finite() && self.max_rotation >= 0.0,
            "randomize.max-rotation must be non-negative"
        );
        ensure!(
            self.min_scale.is_finite() && self.min_scale >= 1.0,
            "randomize.min-scale must be at least 1"
        );
        ensure!(
            self.max_scale.is_finite() && self.max_scale >= self.min_scale,
            "randomize.max-scale must not be below randomize.min-scale"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    pub strategy: DitherStrategy,
    /// Ink used for the first load.
    pub ink_color: InkColor,
    /// Initial drawing-surface size in pixels.
    pub viewport: Viewport,
    pub camera: CameraConfig,
    pub layout: LayoutConfig,
    pub randomize: RandomizeConfig,
    /// Ink colors the viewer cycles through.
    pub palette: Vec<InkColor>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            strategy: DitherStrategy::default(),
            ink_color: InkColor::BLACK,
            viewport: Viewport::default(),
            camera: CameraConfig::default(),
            layout: LayoutConfig::default(),
            randomize: RandomizeConfig::default(),
            palette: default_palette(),
        }
    }
}

fn default_palette() -> Vec<InkColor> {
    vec![
        InkColor::from_rgb8(0x00, 0x00, 0x00),
        InkColor::from_rgb8(0xd7, 0x26, 0x3d),
        InkColor::from_rgb8(0x1b, 0x99, 0x8b),
        InkColor::from_rgb8(0x2e, 0x29, 0x4e),
    ]
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            self.viewport.width > 0 && self.viewport.height > 0,
            "viewport dimensions must be positive"
        );
        ensure!(
            self.layout.padding_factor.is_finite()
                && self.layout.padding_factor > 0.0
                && self.layout.padding_factor <= 1.0,
            "layout.padding-factor must be in (0, 1]"
        );
        ensure!(!self.palette.is_empty(), "palette must list at least one color");
        self.camera
            .validate()
            .context("invalid camera configuration")?;
        self.randomize
            .validate()
            .context("invalid randomize configuration")?;
        Ok(self)
    }
}
