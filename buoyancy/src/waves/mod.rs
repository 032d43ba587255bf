//! Analytic water surfaces.
//!
//! Every surface answers two questions for a horizontal position `(x, z)` at
//! time `t`: how high is the water, and which way does the surface face. Time
//! is always passed in, never stored, so a surface can be shared read-only by
//! every body being simulated in a tick.
//!
//! ## Usage
//!
//! ```rust
//! use bevy::math::Vec2;
//! use buoyancy::waves::{SinusoidalWave, WaveField, WaveParams};
//!
//! let params = WaveParams::new(1.0, 10.0, Vec2::X, 1.0).unwrap();
//! let wave = SinusoidalWave::new(params);
//! let crest = wave.height(2.5, 0.0, 0.0);
//! assert!((crest - 1.0).abs() < 1e-5);
//! ```

pub mod gerstner;
pub mod params;
pub mod sinusoidal;
pub mod stack;

use bevy::math::{Vec2, Vec3};
use bevy_log::debug;
use serde::{Deserialize, Serialize};

use crate::{constants::NORMAL_SAMPLE_OFFSET, error::ConfigError};

pub use gerstner::{GerstnerHeight, GerstnerWave};
pub use params::{WaveLayer, WaveParams};
pub use sinusoidal::{NormalMode, SinusoidalWave};
pub use stack::{WavePreset, WaveStack};

/// A water surface that can be sampled anywhere at any time.
pub trait WaveField {
    /// World-space height of the surface above (x, z).
    fn height(&self, x: f32, z: f32, time: f32) -> f32;

    /// Unit normal of the surface above (x, z).
    fn normal(&self, x: f32, z: f32, time: f32) -> Vec3;
}

impl<T: WaveField + ?Sized> WaveField for &T {
    fn height(&self, x: f32, z: f32, time: f32) -> f32 {
        (**self).height(x, z, time)
    }

    fn normal(&self, x: f32, z: f32, time: f32) -> Vec3 {
        (**self).normal(x, z, time)
    }
}

/// Normal of a height field with gradient `slope` = (∂h/∂x, ∂h/∂z).
#[inline]
pub fn slope_to_normal(slope: Vec2) -> Vec3 {
    Vec3::new(-slope.x, 1.0, -slope.y).normalize()
}

/// Central-difference normal of any surface, using [`NORMAL_SAMPLE_OFFSET`].
pub fn finite_difference_normal<F: WaveField + ?Sized>(
    field: &F,
    x: f32,
    z: f32,
    time: f32,
) -> Vec3 {
    let offset = NORMAL_SAMPLE_OFFSET;
    let height_right = field.height(x + offset, z, time);
    let height_left = field.height(x - offset, z, time);
    let height_forward = field.height(x, z + offset, time);
    let height_back = field.height(x, z - offset, time);

    let gradient = Vec2::new(
        (height_right - height_left) / (2.0 * offset),
        (height_forward - height_back) / (2.0 * offset),
    );
    slope_to_normal(gradient)
}

/// One of the supported surfaces, chosen at configuration time.
#[derive(Debug, Clone, PartialEq)]
pub enum WaveSurface {
    Sinusoidal(SinusoidalWave),
    Gerstner(GerstnerWave),
    Stack(WaveStack),
}

impl WaveSurface {
    /// Flat water at `base_level`.
    pub fn still(base_level: f32) -> Self {
        WaveSurface::Stack(WaveStack::new(base_level))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WaveSurface::Sinusoidal(_) => "sinusoidal",
            WaveSurface::Gerstner(_) => "gerstner",
            WaveSurface::Stack(_) => "stack",
        }
    }
}

impl Default for WaveSurface {
    fn default() -> Self {
        Self::still(0.0)
    }
}

impl WaveField for WaveSurface {
    #[inline]
    fn height(&self, x: f32, z: f32, time: f32) -> f32 {
        match self {
            WaveSurface::Sinusoidal(wave) => wave.height(x, z, time),
            WaveSurface::Gerstner(wave) => wave.height(x, z, time),
            WaveSurface::Stack(stack) => stack.height(x, z, time),
        }
    }

    #[inline]
    fn normal(&self, x: f32, z: f32, time: f32) -> Vec3 {
        match self {
            WaveSurface::Sinusoidal(wave) => wave.normal(x, z, time),
            WaveSurface::Gerstner(wave) => wave.normal(x, z, time),
            WaveSurface::Stack(stack) => stack.normal(x, z, time),
        }
    }
}

/// Serializable surface description, validated into a [`WaveSurface`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WaveConfig {
    Sinusoidal {
        layer: WaveLayer,
        #[serde(default)]
        base_level: f32,
        #[serde(default)]
        normals: NormalMode,
    },
    Gerstner {
        layer: WaveLayer,
        #[serde(default)]
        base_level: f32,
        #[serde(default)]
        height: GerstnerHeight,
    },
    Stack {
        layers: Vec<WaveLayer>,
        #[serde(default)]
        base_level: f32,
    },
    Preset {
        preset: WavePreset,
        #[serde(default)]
        base_level: f32,
    },
}

impl Default for WaveConfig {
    fn default() -> Self {
        WaveConfig::Sinusoidal {
            layer: WaveLayer::default(),
            base_level: 0.0,
            normals: NormalMode::Analytic,
        }
    }
}

impl TryFrom<&WaveConfig> for WaveSurface {
    type Error = ConfigError;

    fn try_from(config: &WaveConfig) -> Result<Self, Self::Error> {
        let surface = match *config {
            WaveConfig::Sinusoidal {
                layer,
                base_level,
                normals,
            } => WaveSurface::Sinusoidal(
                SinusoidalWave::new(layer.into_params(base_level)?).with_normal_mode(normals),
            ),
            WaveConfig::Gerstner {
                layer,
                base_level,
                height,
            } => WaveSurface::Gerstner(GerstnerWave::new(layer.into_params(base_level)?, height)?),
            WaveConfig::Stack {
                ref layers,
                base_level,
            } => WaveSurface::Stack(WaveStack::from_layers(base_level, layers)?),
            WaveConfig::Preset { preset, base_level } => {
                WaveSurface::Stack(preset.to_stack(base_level)?)
            }
        };
        debug!("Configured {} wave surface", surface.kind());
        Ok(surface)
    }
}

impl TryFrom<WaveConfig> for WaveSurface {
    type Error = ConfigError;

    fn try_from(config: WaveConfig) -> Result<Self, Self::Error> {
        WaveSurface::try_from(&config)
    }
}
