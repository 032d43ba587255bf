//! Superposition of several sine waves around one base level.
//!
//! The summed surface has no single closed-form normal worth maintaining, so
//! normals always come from central differences.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use super::{finite_difference_normal, WaveField, WaveLayer, WaveParams};
use crate::error::ConfigError;

/// Sum of sine waves sharing one base level.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveStack {
    base_level: f32,
    waves: Vec<WaveParams>,
}

impl WaveStack {
    /// An empty stack is flat water at `base_level`.
    pub fn new(base_level: f32) -> Self {
        Self {
            base_level,
            waves: Vec::new(),
        }
    }

    pub fn from_layers(base_level: f32, layers: &[WaveLayer]) -> Result<Self, ConfigError> {
        let mut stack = Self::new(base_level);
        for layer in layers {
            stack.waves.push(layer.into_params(base_level)?);
        }
        Ok(stack)
    }

    pub fn add_wave(&mut self, wave: WaveParams) {
        self.waves.push(wave.with_base_level(self.base_level));
    }

    pub fn base_level(&self) -> f32 {
        self.base_level
    }

    pub fn waves(&self) -> &[WaveParams] {
        &self.waves
    }
}

impl WaveField for WaveStack {
    fn height(&self, x: f32, z: f32, time: f32) -> f32 {
        self.base_level
            + self
                .waves
                .iter()
                .map(|wave| wave.elevation(x, z, time))
                .sum::<f32>()
    }

    fn normal(&self, x: f32, z: f32, time: f32) -> Vec3 {
        finite_difference_normal(self, x, z, time)
    }
}

/// Preset wave stacks for different kinds of water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WavePreset {
    /// Completely still water (no waves)
    Still,
    /// Calm water with a single gentle swell
    Calm,
    /// Lake with gentle crossing waves
    Lake,
    /// Standard ocean waves
    #[default]
    Ocean,
    /// Stormy ocean with large waves
    Storm,
}

impl WavePreset {
    pub fn layers(self) -> &'static [WaveLayer] {
        const CALM: [WaveLayer; 1] = [WaveLayer::new(0.1, 6.0, 1.0, 0.2, 0.5)];
        const LAKE: [WaveLayer; 2] = [
            WaveLayer::new(0.2, 4.0, 1.0, 0.0, 0.8),
            WaveLayer::new(0.08, 2.5, 0.3, 1.0, 1.0),
        ];
        const OCEAN: [WaveLayer; 4] = [
            WaveLayer::new(0.75, 8.0, 1.0, 0.3, 1.5),  // Primary swell
            WaveLayer::new(0.4, 5.0, -0.7, 1.0, 1.8),  // Cross swell
            WaveLayer::new(0.2, 3.0, 0.5, -1.0, 2.2),  // Chop
            WaveLayer::new(0.07, 1.5, -1.0, -0.5, 2.8), // Ripples
        ];
        const STORM: [WaveLayer; 4] = [
            WaveLayer::new(3.0, 12.0, 1.0, 0.2, 2.0),
            WaveLayer::new(1.8, 8.0, -0.5, 1.0, 2.5),
            WaveLayer::new(0.9, 5.0, 0.7, -0.7, 3.0),
            WaveLayer::new(0.5, 3.0, -1.0, -0.3, 3.5),
        ];

        match self {
            WavePreset::Still => &[],
            WavePreset::Calm => &CALM,
            WavePreset::Lake => &LAKE,
            WavePreset::Ocean => &OCEAN,
            WavePreset::Storm => &STORM,
        }
    }

    pub fn to_stack(self, base_level: f32) -> Result<WaveStack, ConfigError> {
        WaveStack::from_layers(base_level, self.layers())
    }
}
