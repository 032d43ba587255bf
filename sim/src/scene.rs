use bevy::prelude::*;
use bevy_log::info;
use buoyancy::{
    Alignment, BodyConfig, BuoyantBody, ConfigError, Floater, FloaterConfig, WaveConfig,
    WaveSurface, DEFAULT_ALIGNMENT_RATE, DEFAULT_GRAVITY,
};
use ron::de::from_str;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A scene as written on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub name: String,
    pub wave: WaveConfig,
    /// Downward gravity, m/s²
    pub gravity: f32,
    pub bodies: Vec<BodySpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BodySpec {
    Buoyant {
        name: String,
        position: Vec3,
        half_extents: Vec3,
        mass: f32,
        #[serde(default)]
        config: BodyConfig,
    },
    Floater {
        name: String,
        position: Vec3,
        width: f32,
        mass: f32,
        #[serde(default)]
        config: FloaterConfig,
    },
}

/// A validated scene, ready to spawn.
#[derive(Debug, Clone)]
pub struct Scene {
    pub name: String,
    pub surface: WaveSurface,
    pub gravity: f32,
    pub bodies: Vec<SceneBody>,
}

#[derive(Debug, Clone)]
pub enum SceneBody {
    Buoyant {
        name: String,
        position: Vec3,
        half_extents: Vec3,
        mass: f32,
        body: BuoyantBody,
    },
    Floater {
        name: String,
        position: Vec3,
        width: f32,
        mass: f32,
        floater: Floater,
    },
}

impl SceneBody {
    pub fn name(&self) -> &str {
        match self {
            SceneBody::Buoyant { name, .. } | SceneBody::Floater { name, .. } => name,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: "default".into(),
            wave: WaveConfig::default(),
            gravity: DEFAULT_GRAVITY,
            bodies: vec![
                BodySpec::Buoyant {
                    name: "crate".into(),
                    position: Vec3::new(0.0, 1.0, 0.0),
                    half_extents: Vec3::splat(0.5),
                    mass: 400.0,
                    config: BodyConfig::default(),
                },
                BodySpec::Floater {
                    name: "buoy".into(),
                    position: Vec3::new(4.0, 0.5, 0.0),
                    width: 0.6,
                    mass: 150.0,
                    config: FloaterConfig {
                        volume: 0.36,
                        ..default()
                    },
                },
                BodySpec::Floater {
                    name: "raft".into(),
                    position: Vec3::new(-4.0, 0.5, 2.0),
                    width: 2.0,
                    mass: 600.0,
                    config: FloaterConfig {
                        volume: 2.0,
                        vertical_extent: 0.5,
                        alignment: Alignment::Nudge {
                            rate: DEFAULT_ALIGNMENT_RATE,
                        },
                        normal_probes: vec![
                            Vec3::new(-1.0, 0.0, -1.0),
                            Vec3::new(1.0, 0.0, -1.0),
                            Vec3::new(-1.0, 0.0, 1.0),
                            Vec3::new(1.0, 0.0, 1.0),
                        ],
                        ..default()
                    },
                },
            ],
        }
    }
}

impl SceneConfig {
    /// Validates every body and the wave surface.
    pub fn build(&self) -> Result<Scene, ConfigError> {
        if !self.gravity.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "gravity",
                value: self.gravity,
            });
        }
        if self.gravity < 0.0 {
            return Err(ConfigError::NegativeGravity(self.gravity));
        }

        let surface = WaveSurface::try_from(&self.wave)?;
        let bodies = self
            .bodies
            .iter()
            .map(|spec| match spec {
                BodySpec::Buoyant {
                    name,
                    position,
                    half_extents,
                    mass,
                    config,
                } => {
                    check_position(*position)?;
                    check_size("half_extents.x", half_extents.x)?;
                    check_size("half_extents.y", half_extents.y)?;
                    check_size("half_extents.z", half_extents.z)?;
                    check_mass(*mass)?;
                    let body = BuoyantBody::try_from(config)?;
                    warn_if_sinking(name, *mass, body.volume(), body.water_density());

                    Ok(SceneBody::Buoyant {
                        name: name.clone(),
                        position: *position,
                        half_extents: *half_extents,
                        mass: *mass,
                        body,
                    })
                }
                BodySpec::Floater {
                    name,
                    position,
                    width,
                    mass,
                    config,
                } => {
                    check_position(*position)?;
                    check_size("width", *width)?;
                    check_mass(*mass)?;
                    let floater = Floater::try_from(config)?;
                    warn_if_sinking(name, *mass, floater.volume(), floater.water_density());

                    Ok(SceneBody::Floater {
                        name: name.clone(),
                        position: *position,
                        width: *width,
                        mass: *mass,
                        floater,
                    })
                }
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Scene {
            name: self.name.clone(),
            surface,
            gravity: self.gravity,
            bodies,
        })
    }
}

fn check_position(position: Vec3) -> Result<(), ConfigError> {
    if position.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite {
            field: "position",
            value: position.max_element(),
        })
    }
}

fn check_size(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveSize { field, value })
    }
}

fn check_mass(mass: f32) -> Result<(), ConfigError> {
    if mass.is_finite() && mass > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveMass(mass))
    }
}

/// A body heavier than the water it can displace goes to the bottom.
fn warn_if_sinking(name: &str, mass: f32, volume: f32, water_density: f32) {
    let capacity = volume * water_density;
    if mass > capacity {
        log::warn!(
            "Body {name} weighs {mass} kg but can only displace {capacity} kg of water, it will sink"
        );
    }
}

pub fn read_scene_config(path: &Path) -> Result<SceneConfig, Box<dyn std::error::Error>> {
    let contents: String = fs::read_to_string(path)?;
    let config: SceneConfig = from_str(&contents)?;

    info!("Loaded scene file from disk: {}", path.display());

    Ok(config)
}

/// Reads and validates a scene, falling back to the built-in one when no
/// path is given.
pub fn load_scene(path: Option<&Path>) -> Result<Scene, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => read_scene_config(path)?,
        None => {
            info!("No scene file given, using the built-in scene");
            SceneConfig::default()
        }
    };

    Ok(config.build()?)
}
