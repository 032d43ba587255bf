//! Gerstner (trochoidal) waves.
//!
//! A surface particle at rest position `p0` travels on a circle: it is pushed
//! `A * cos(phase)` along the propagation direction and lifted `A * sin(phase)`,
//! so particles on a crest move with the wave and crests come out sharper than
//! troughs.
//!
//! The surface seen at a fixed world position is therefore not a plain
//! function of that position; recovering it means first finding which rest
//! position was displaced there.
//!
//! ## Height modes
//!
//! - [`GerstnerHeight::Approximate`] evaluates the phase directly at the world
//!   position and ignores the horizontal displacement. This is only faithful for
//!   small `amplitude / wavelength` ratios, but it is the default because the
//!   buoyancy tuning in this crate was done against it.
//! - [`GerstnerHeight::Trochoidal`] inverts the displacement with bracketed
//!   Newton iterations and samples the true trochoid. It requires `k * A < 1`,
//!   above which the crest folds over itself.
//!
//! The horizontal term is `+A * cos(phase)`. With the opposite sign the
//! particles on a crest move against the wave and the profile comes out
//! inverted, with sharp troughs and flat crests.

use bevy::math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::{slope_to_normal, WaveField, WaveParams};
use crate::{
    constants::{TROCHOID_ITERATIONS, TROCHOID_TOLERANCE},
    error::ConfigError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GerstnerHeight {
    /// Height sampled at the world position, no displacement correction
    #[default]
    Approximate,
    /// Height of the particle displaced onto the world position
    Trochoidal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GerstnerWave {
    params: WaveParams,
    height_mode: GerstnerHeight,
}

impl GerstnerWave {
    pub fn new(params: WaveParams, height_mode: GerstnerHeight) -> Result<Self, ConfigError> {
        if height_mode == GerstnerHeight::Trochoidal {
            let steepness = params.wave_number() * params.amplitude();
            if steepness >= 1.0 {
                return Err(ConfigError::OverturningWave(steepness));
            }
            if steepness > 0.9 {
                log::warn!(
                    "Trochoidal wave with k * A = {steepness:.3} is close to overturning; crests will be nearly cusped"
                );
            }
        }
        Ok(Self {
            params,
            height_mode,
        })
    }

    /// Gerstner wave using the world-position approximation.
    pub fn approximate(params: WaveParams) -> Self {
        Self {
            params,
            height_mode: GerstnerHeight::Approximate,
        }
    }

    pub fn params(&self) -> &WaveParams {
        &self.params
    }

    pub fn height_mode(&self) -> GerstnerHeight {
        self.height_mode
    }

    /// Displacement of the particle whose rest position is `rest` (x, z).
    ///
    /// Returns (x_offset, y_offset, z_offset) relative to the flat surface.
    pub fn particle_displacement(&self, rest: Vec2, time: f32) -> Vec3 {
        let d = self.params.direction();
        let (sin_phase, cos_phase) = self.params.phase_at(rest.x, rest.y, time).sin_cos();
        let horizontal = d * self.params.amplitude() * cos_phase;

        Vec3::new(horizontal.x, self.params.amplitude() * sin_phase, horizontal.y)
    }

    /// Where the particle resting at `rest` is drawn on the water surface.
    pub fn surface_position(&self, rest: Vec2, time: f32) -> Vec3 {
        Vec3::new(rest.x, self.params.base_level(), rest.y)
            + self.particle_displacement(rest, time)
    }

    /// Rest position of the particle displaced onto world (x, z).
    ///
    /// Only the coordinate along the propagation direction moves, so this is a
    /// one-dimensional root find of `s + A * cos(phase(s)) = dir · p`. Newton
    /// steps are kept inside the bracket `[dir · p - A, dir · p + A]` and fall
    /// back to bisection when they leave it or stall.
    pub fn rest_position(&self, x: f32, z: f32, time: f32) -> Vec2 {
        let d = self.params.direction();
        let world = Vec2::new(x, z);
        let along = d.dot(world);
        let a = self.params.amplitude();
        let k = self.params.wave_number();

        // f(s) = s + A cos(phase(s)) - along is increasing and changes sign
        // on [along - A, along + A]
        let (mut lo, mut hi) = (along - a, along + a);
        let mut s = along;
        let mut last_step = hi - lo;
        for _ in 0..TROCHOID_ITERATIONS {
            let (sin_phase, cos_phase) = self.params.phase_along(s, time).sin_cos();
            let residual = s + a * cos_phase - along;
            if residual.abs() <= TROCHOID_TOLERANCE {
                break;
            }
            if residual > 0.0 {
                hi = s;
            } else {
                lo = s;
            }

            let derivative = 1.0 - a * k * sin_phase;
            let newton = s - residual / derivative;
            let next = if newton > lo && newton < hi && (newton - s).abs() < 0.5 * last_step {
                newton
            } else {
                0.5 * (lo + hi)
            };
            last_step = (next - s).abs();
            s = next;
        }

        world + d * (s - along)
    }

    fn trochoid_normal(&self, x: f32, z: f32, time: f32) -> Vec3 {
        let rest = self.rest_position(x, z, time);
        let (sin_phase, cos_phase) = self.params.phase_at(rest.x, rest.y, time).sin_cos();
        let ka = self.params.wave_number() * self.params.amplitude();
        // dY/dX of the curve (s + A cos(phase), A sin(phase)) along the direction
        let slope = ka * cos_phase / (1.0 - ka * sin_phase);
        slope_to_normal(self.params.direction() * slope)
    }
}

impl WaveField for GerstnerWave {
    fn height(&self, x: f32, z: f32, time: f32) -> f32 {
        let sample = match self.height_mode {
            GerstnerHeight::Approximate => Vec2::new(x, z),
            GerstnerHeight::Trochoidal => self.rest_position(x, z, time),
        };
        self.params.base_level() + self.params.elevation(sample.x, sample.y, time)
    }

    fn normal(&self, x: f32, z: f32, time: f32) -> Vec3 {
        match self.height_mode {
            GerstnerHeight::Approximate => slope_to_normal(self.params.slope(x, z, time)),
            GerstnerHeight::Trochoidal => self.trochoid_normal(x, z, time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waves::finite_difference_normal;

    fn steep_params() -> WaveParams {
        // k * A = 2π/8 * 0.6 ≈ 0.47
        WaveParams::new(0.6, 8.0, Vec2::new(1.0, 0.3), 1.5)
            .unwrap()
            .with_base_level(10.0)
    }

    #[test]
    fn test_rejects_overturning_trochoid() {
        let params = WaveParams::new(2.0, 8.0, Vec2::X, 1.0).unwrap();
        assert!(matches!(
            GerstnerWave::new(params, GerstnerHeight::Trochoidal),
            Err(ConfigError::OverturningWave(_))
        ));
        // The approximation has no such limit
        assert!(GerstnerWave::new(params, GerstnerHeight::Approximate).is_ok());
    }

    #[test]
    fn test_rest_position_inverts_displacement() {
        let wave = GerstnerWave::new(steep_params(), GerstnerHeight::Trochoidal).unwrap();
        for &(x, z, t) in &[(0.0, 0.0, 0.0), (2.3, -4.1, 0.8), (-7.5, 1.0, 3.3)] {
            let rest = wave.rest_position(x, z, t);
            let surface = wave.surface_position(rest, t);
            assert!((surface.x - x).abs() < 1e-4, "x: {} vs {x}", surface.x);
            assert!((surface.z - z).abs() < 1e-4, "z: {} vs {z}", surface.z);
            assert!((surface.y - wave.height(x, z, t)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_trochoid_crests_are_sharper_than_troughs() {
        let params = steep_params();
        let wave = GerstnerWave::new(params, GerstnerHeight::Trochoidal).unwrap();
        // Crest and trough bands measured over one wavelength at t = 0
        let dir = params.direction();
        let samples = 400;
        let above = (0..samples)
            .map(|i| dir * (i as f32 / samples as f32 * params.wavelength()))
            .filter(|p| wave.height(p.x, p.y, 0.0) > params.base_level())
            .count();
        assert!(above < samples / 2, "crest occupies {above} of {samples} samples");
    }

    #[test]
    fn test_approximation_matches_sine_profile() {
        let params = steep_params();
        let wave = GerstnerWave::approximate(params);
        let h = wave.height(1.0, 2.0, 0.4);
        assert!((h - (params.base_level() + params.elevation(1.0, 2.0, 0.4))).abs() < 1e-6);
    }

    #[test]
    fn test_trochoid_normal_matches_finite_difference() {
        // Gentler than `steep_params` so the fixed sampling offset resolves the crest
        let params = WaveParams::new(0.3, 8.0, Vec2::new(1.0, 0.3), 1.5).unwrap();
        let wave = GerstnerWave::new(params, GerstnerHeight::Trochoidal).unwrap();
        for i in 0..20 {
            let x = i as f32 * 0.61 - 5.0;
            let z = i as f32 * 0.37 - 2.0;
            let t = i as f32 * 0.11;
            let analytic = wave.normal(x, z, t);
            let sampled = finite_difference_normal(&wave, x, z, t);
            assert!((analytic - sampled).length() < 5e-3, "{analytic} vs {sampled}");
        }
    }

    #[test]
    fn test_normal_is_normalized() {
        let wave = GerstnerWave::approximate(steep_params());
        let normal = wave.normal(5.0, 5.0, 1.0);
        assert!((normal.length() - 1.0).abs() < 0.001, "Normal should be unit length");
    }

    #[test]
    fn test_rest_position_near_overturning() {
        // k * A = 2π/10 * 1.55 ≈ 0.974
        let params = WaveParams::new(1.55, 10.0, Vec2::X, 1.0).unwrap();
        let wave = GerstnerWave::new(params, GerstnerHeight::Trochoidal).unwrap();
        for i in 0..2000 {
            let x = i as f32 * 0.005;
            for t in [0.0, 0.37, 4.2] {
                let rest = wave.rest_position(x, 0.0, t);
                assert!((rest.x - x).abs() <= params.amplitude() + 1e-4, "rest {rest} for x={x}");
                let surface = wave.surface_position(rest, t);
                assert!((surface.x - x).abs() < 1e-3, "x={x} t={t}: landed on {}", surface.x);
                assert!(surface.z.abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_steep_crest_height() {
        let params = WaveParams::new(1.55, 10.0, Vec2::X, 0.0).unwrap();
        let wave = GerstnerWave::new(params, GerstnerHeight::Trochoidal).unwrap();
        // Rest position 2.5 is the crest particle; it is drawn at x = 2.5 + A cos(π/2)
        let crest = wave.surface_position(Vec2::new(2.5, 0.0), 0.0);
        assert!((wave.height(crest.x, 0.0, 0.0) - 1.55).abs() < 1e-3);
    }
}
