use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::layout::Rotation;

/// Per-axis tilt limit, radians.
pub const DEFAULT_MAX_ROTATION: f32 = 0.15;
/// Dither scale is drawn from `[DEFAULT_MIN_SCALE, DEFAULT_MAX_SCALE)`.
pub const DEFAULT_MIN_SCALE: f32 = 1.0;
pub const DEFAULT_MAX_SCALE: f32 = 4.0;

/// Parameters a randomize event changes; everything downstream is deterministic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomParams {
    pub rotation: Rotation,
    pub scale: f32,
}

impl Default for RandomParams {
    fn default() -> Self {
        Self {
            rotation: Rotation::default(),
            scale: DEFAULT_MIN_SCALE,
        }
    }
}

#[derive(Debug)]
pub struct Randomizer {
    rng: StdRng,
    max_rotation: f32,
    min_scale: f32,
    max_scale: f32,
}

impl Randomizer {
    /// A seeded randomizer repeats the same sequence of parameters.
    pub fn new(seed: Option<u64>, max_rotation: f32, min_scale: f32, max_scale: f32) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let max_rotation = if max_rotation.is_finite() {
            max_rotation.abs()
        } else {
            0.0
        };
        let min_scale = super::clamp_scale(min_scale);
        Self {
            rng,
            max_rotation,
            min_scale,
            max_scale: max_scale.max(min_scale),
        }
    }

    pub fn sample(&mut self) -> RandomParams {
        RandomParams {
            rotation: self.sample_rotation(),
            scale: self.sample_scale(),
        }
    }

    pub fn sample_rotation(&mut self) -> Rotation {
        Rotation::new(self.angle(), self.angle(), self.angle())
    }

    pub fn sample_scale(&mut self) -> f32 {
        if self.max_scale <= self.min_scale {
            return self.min_scale;
        }
        self.rng.random_range(self.min_scale..self.max_scale)
    }

    fn angle(&mut self) -> f32 {
        if self.max_rotation == 0.0 {
            return 0.0;
        }
        self.rng.random_range(-self.max_rotation..=self.max_rotation)
    }
}

impl Default for Randomizer {
    fn default() -> Self {
        Self::new(None, DEFAULT_MAX_ROTATION, DEFAULT_MIN_SCALE, DEFAULT_MAX_SCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_in_range() {
        let mut r = Randomizer::new(Some(7), 0.15, 1.0, 4.0);
        for _ in 0..1000 {
            let p = r.sample();
            for angle in [p.rotation.x, p.rotation.y, p.rotation.z] {
                assert!((-0.15..=0.15).contains(&angle));
            }
            assert!((1.0..4.0).contains(&p.scale));
        }
    }

    #[test]
    fn seeded_sequences_repeat() {
        let mut a = Randomizer::new(Some(42), 0.15, 1.0, 4.0);
        let mut b = Randomizer::new(Some(42), 0.15, 1.0, 4.0);
        for _ in 0..10 {
            assert_eq!(a.sample(), b.sample());
        }
    }

    #[test]
    fn collapsed_ranges_are_constant() {
        let mut r = Randomizer::new(Some(1), 0.0, 2.0, 2.0);
        let p = r.sample();
        assert_eq!(p.rotation, Rotation::default());
        assert_eq!(p.scale, 2.0);
    }
}
