use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::error::{ensure_finite, ConfigError};

/// Raw, unvalidated description of one travelling wave.
///
/// This is the shape waves take in scene files; turn it into [`WaveParams`]
/// with [`WaveLayer::into_params`] before sampling anything.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveLayer {
    /// Peak height above the base level
    pub amplitude: f32,
    /// Crest-to-crest distance in world units
    pub wavelength: f32,
    /// Propagation direction in the (x, z) plane, normalized on use
    pub direction: Vec2,
    /// Phase speed along `direction` (signed)
    pub speed: f32,
    /// Constant phase offset in radians
    pub phase: f32,
}

impl Default for WaveLayer {
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            wavelength: 10.0,
            direction: Vec2::X,
            speed: 1.0,
            phase: 0.0,
        }
    }
}

impl WaveLayer {
    pub const fn new(amplitude: f32, wavelength: f32, dir_x: f32, dir_z: f32, speed: f32) -> Self {
        Self {
            amplitude,
            wavelength,
            direction: Vec2::new(dir_x, dir_z),
            speed,
            phase: 0.0,
        }
    }

    /// Validate the layer around the given base height.
    pub fn into_params(self, base_level: f32) -> Result<WaveParams, ConfigError> {
        Ok(WaveParams::new(self.amplitude, self.wavelength, self.direction, self.speed)?
            .with_phase(ensure_finite("phase", self.phase)?)
            .with_base_level(ensure_finite("base_level", base_level)?))
    }
}

/// Validated parameters of a single travelling wave.
///
/// Wavelength and amplitude are strictly positive and the direction is
/// non-zero; these are checked once here so that sampling never has to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveParams {
    amplitude: f32,
    wavelength: f32,
    direction: Vec2,
    speed: f32,
    phase: f32,
    base_level: f32,
}

impl WaveParams {
    pub fn new(
        amplitude: f32,
        wavelength: f32,
        direction: Vec2,
        speed: f32,
    ) -> Result<Self, ConfigError> {
        let amplitude = ensure_finite("amplitude", amplitude)?;
        let wavelength = ensure_finite("wavelength", wavelength)?;
        let speed = ensure_finite("speed", speed)?;
        if wavelength <= 0.0 {
            return Err(ConfigError::NonPositiveWavelength(wavelength));
        }
        if amplitude <= 0.0 {
            return Err(ConfigError::NonPositiveAmplitude(amplitude));
        }
        if !direction.is_finite() || direction.length_squared() == 0.0 {
            return Err(ConfigError::ZeroDirection);
        }

        Ok(Self {
            amplitude,
            wavelength,
            direction,
            speed,
            phase: 0.0,
            base_level: 0.0,
        })
    }

    pub fn with_phase(mut self, phase: f32) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_base_level(mut self, base_level: f32) -> Self {
        self.base_level = base_level;
        self
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn wavelength(&self) -> f32 {
        self.wavelength
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn phase_offset(&self) -> f32 {
        self.phase
    }

    pub fn base_level(&self) -> f32 {
        self.base_level
    }

    /// Direction as configured, before normalization.
    pub fn raw_direction(&self) -> Vec2 {
        self.direction
    }

    /// Normalized propagation direction.
    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.direction.normalize()
    }

    /// Wave number k = 2π / wavelength
    #[inline]
    pub fn wave_number(&self) -> f32 {
        2.0 * PI / self.wavelength
    }

    /// Time for one full crest to pass a fixed point, `None` for a standing
    /// (zero speed) wave.
    pub fn period(&self) -> Option<f32> {
        (self.speed != 0.0).then(|| self.wavelength / self.speed.abs())
    }

    /// Phase of the wave at a distance `along` the propagation direction.
    #[inline]
    pub fn phase_along(&self, along: f32, time: f32) -> f32 {
        self.wave_number() * (along - self.speed * time) + self.phase
    }

    /// Phase = k * (dir · (x, z) - speed * t) + phase
    #[inline]
    pub fn phase_at(&self, x: f32, z: f32, time: f32) -> f32 {
        self.phase_along(self.direction().dot(Vec2::new(x, z)), time)
    }

    /// Vertical offset from the base level, `A * sin(phase)`.
    #[inline]
    pub fn elevation(&self, x: f32, z: f32, time: f32) -> f32 {
        self.amplitude * self.phase_at(x, z, time).sin()
    }

    /// Gradient of [`Self::elevation`] in the (x, z) plane.
    #[inline]
    pub fn slope(&self, x: f32, z: f32, time: f32) -> Vec2 {
        let d = self.direction();
        d * (self.wave_number() * self.amplitude * self.phase_at(x, z, time).cos())
    }
}
