//! Plain travelling sine wave: `h = base + A * sin(k * (dir · p - speed * t) + phase)`.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use super::{finite_difference_normal, slope_to_normal, WaveField, WaveParams};

/// How a wave computes its surface normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NormalMode {
    /// Closed-form derivative of the height function
    #[default]
    Analytic,
    /// Central differences with [`crate::NORMAL_SAMPLE_OFFSET`]
    FiniteDifference,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinusoidalWave {
    params: WaveParams,
    normal_mode: NormalMode,
}

impl SinusoidalWave {
    pub fn new(params: WaveParams) -> Self {
        Self {
            params,
            normal_mode: NormalMode::Analytic,
        }
    }

    pub fn with_normal_mode(mut self, normal_mode: NormalMode) -> Self {
        self.normal_mode = normal_mode;
        self
    }

    pub fn params(&self) -> &WaveParams {
        &self.params
    }

    pub fn normal_mode(&self) -> NormalMode {
        self.normal_mode
    }

    /// Exact normal from the partial derivatives of the height function.
    pub fn analytic_normal(&self, x: f32, z: f32, time: f32) -> Vec3 {
        slope_to_normal(self.params.slope(x, z, time))
    }
}

impl WaveField for SinusoidalWave {
    #[inline]
    fn height(&self, x: f32, z: f32, time: f32) -> f32 {
        self.params.base_level() + self.params.elevation(x, z, time)
    }

    fn normal(&self, x: f32, z: f32, time: f32) -> Vec3 {
        match self.normal_mode {
            NormalMode::Analytic => self.analytic_normal(x, z, time),
            NormalMode::FiniteDifference => finite_difference_normal(self, x, z, time),
        }
    }
}
