//! Static configuration of floating bodies.
//!
//! Two flavours exist:
//! - [`BuoyantBody`] samples the water at many points and produces per-point
//!   forces, so torque arises naturally from where the water pushes.
//! - [`Floater`] samples once at its origin and produces a single net force,
//!   with an optional alignment step to keep it upright on the waves.
//!
//! Both validate everything on construction; stepping them can never fail.

use bevy::math::Vec3;
use bevy_log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ALIGNMENT_GAIN, DEFAULT_ANGULAR_DAMPING, DEFAULT_LINEAR_DAMPING, DEFAULT_POINT_RADIUS,
    WATER_DENSITY,
};
use crate::error::{ensure_finite, ConfigError};
use crate::sampler::{cube_corners, SamplePoint};

fn check_volume(volume: f32) -> Result<f32, ConfigError> {
    if ensure_finite("volume", volume)? <= 0.0 {
        return Err(ConfigError::NonPositiveVolume(volume));
    }
    Ok(volume)
}

fn check_density(density: f32) -> Result<f32, ConfigError> {
    if ensure_finite("water_density", density)? <= 0.0 {
        return Err(ConfigError::NonPositiveDensity(density));
    }
    Ok(density)
}

fn check_damping(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if ensure_finite(field, value)? < 0.0 {
        return Err(ConfigError::NegativeDamping { field, value });
    }
    Ok(value)
}

fn check_points(points: &[SamplePoint]) -> Result<(), ConfigError> {
    if points.is_empty() {
        return Err(ConfigError::NoSamplePoints);
    }
    for (index, point) in points.iter().enumerate() {
        if !point.radius.is_finite() || point.radius <= 0.0 {
            return Err(ConfigError::NonPositiveRadius {
                index,
                radius: point.radius,
            });
        }
        if !point.offset.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "sample point offset",
                value: point.offset.max_element(),
            });
        }
    }
    Ok(())
}

/// Multi-point buoyant body.
#[derive(Debug, Clone, PartialEq)]
pub struct BuoyantBody {
    volume: f32,
    water_density: f32,
    linear_damping: f32,
    angular_damping: f32,
    level_offset: f32,
    points: Vec<SamplePoint>,
    /// volume / points.len(), kept in sync by `set_points`
    point_volume: f32,
}

impl BuoyantBody {
    pub fn new(volume: f32, points: Vec<SamplePoint>) -> Result<Self, ConfigError> {
        let volume = check_volume(volume)?;
        check_points(&points)?;
        let point_volume = volume / points.len() as f32;

        Ok(Self {
            volume,
            water_density: WATER_DENSITY,
            linear_damping: DEFAULT_LINEAR_DAMPING,
            angular_damping: DEFAULT_ANGULAR_DAMPING,
            level_offset: 0.0,
            points,
            point_volume,
        })
    }

    /// Body sampled at the 8 corners of a cube of half-size `half_extent`.
    pub fn cube(volume: f32, half_extent: f32, point_radius: f32) -> Result<Self, ConfigError> {
        let half_extent = ensure_finite("half_extent", half_extent)?;
        Self::new(volume, cube_corners(half_extent, point_radius))
    }

    pub fn with_water_density(mut self, density: f32) -> Result<Self, ConfigError> {
        self.water_density = check_density(density)?;
        Ok(self)
    }

    pub fn with_damping(mut self, linear: f32, angular: f32) -> Result<Self, ConfigError> {
        self.linear_damping = check_damping("linear_damping", linear)?;
        self.angular_damping = check_damping("angular_damping", angular)?;
        Ok(self)
    }

    pub fn with_level_offset(mut self, level_offset: f32) -> Result<Self, ConfigError> {
        self.level_offset = ensure_finite("level_offset", level_offset)?;
        Ok(self)
    }

    /// Replace the sample layout, re-splitting the volume between points.
    pub fn set_points(&mut self, points: Vec<SamplePoint>) -> Result<(), ConfigError> {
        check_points(&points)?;
        self.point_volume = self.volume / points.len() as f32;
        self.points = points;
        Ok(())
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn water_density(&self) -> f32 {
        self.water_density
    }

    pub fn linear_damping(&self) -> f32 {
        self.linear_damping
    }

    pub fn angular_damping(&self) -> f32 {
        self.angular_damping
    }

    pub fn level_offset(&self) -> f32 {
        self.level_offset
    }

    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    /// Volume each sample point stands for.
    pub fn point_volume(&self) -> f32 {
        self.point_volume
    }
}

/// Serializable description of a [`BuoyantBody`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub volume: f32,
    pub water_density: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub level_offset: f32,
    /// Explicit sample layout; empty means "use the cube corners"
    pub points: Vec<SamplePoint>,
    /// Half-size of the synthesized cube layout
    pub half_extent: f32,
    /// Radius of the synthesized cube corners
    pub point_radius: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            volume: 1.0,
            water_density: WATER_DENSITY,
            linear_damping: DEFAULT_LINEAR_DAMPING,
            angular_damping: DEFAULT_ANGULAR_DAMPING,
            level_offset: 0.0,
            points: Vec::new(),
            half_extent: 0.5,
            point_radius: DEFAULT_POINT_RADIUS,
        }
    }
}

impl TryFrom<&BodyConfig> for BuoyantBody {
    type Error = ConfigError;

    fn try_from(config: &BodyConfig) -> Result<Self, Self::Error> {
        let body = if config.points.is_empty() {
            BuoyantBody::cube(config.volume, config.half_extent, config.point_radius)?
        } else {
            BuoyantBody::new(config.volume, config.points.clone())?
        };
        let body = body
            .with_water_density(config.water_density)?
            .with_damping(config.linear_damping, config.angular_damping)?
            .with_level_offset(config.level_offset)?;

        debug!(
            "Buoyant body: volume {} split over {} points",
            body.volume,
            body.points.len()
        );
        Ok(body)
    }
}

/// How a [`Floater`] keeps its up axis on the water normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Alignment {
    /// No alignment at all
    Off,
    /// Proportional torque `gain * axis * angle` toward the water normal
    Torque { gain: f32 },
    /// Directly slerp the orientation toward the water normal, `rate` per second
    Nudge { rate: f32 },
}

impl Default for Alignment {
    fn default() -> Self {
        Alignment::Torque {
            gain: DEFAULT_ALIGNMENT_GAIN,
        }
    }
}

/// Single-point buoyant body.
#[derive(Debug, Clone, PartialEq)]
pub struct Floater {
    volume: f32,
    water_density: f32,
    linear_damping: f32,
    angular_damping: f32,
    level_offset: f32,
    vertical_extent: f32,
    alignment: Alignment,
    /// Local offsets where the water normal is averaged for alignment
    normal_probes: Vec<Vec3>,
}

impl Floater {
    pub fn new(volume: f32, vertical_extent: f32) -> Result<Self, ConfigError> {
        let volume = check_volume(volume)?;
        if ensure_finite("vertical_extent", vertical_extent)? <= 0.0 {
            return Err(ConfigError::NonPositiveExtent(vertical_extent));
        }

        Ok(Self {
            volume,
            water_density: WATER_DENSITY,
            linear_damping: DEFAULT_LINEAR_DAMPING,
            angular_damping: DEFAULT_ANGULAR_DAMPING,
            level_offset: 0.0,
            vertical_extent,
            alignment: Alignment::default(),
            normal_probes: vec![Vec3::ZERO],
        })
    }

    pub fn with_water_density(mut self, density: f32) -> Result<Self, ConfigError> {
        self.water_density = check_density(density)?;
        Ok(self)
    }

    pub fn with_damping(mut self, linear: f32, angular: f32) -> Result<Self, ConfigError> {
        self.linear_damping = check_damping("linear_damping", linear)?;
        self.angular_damping = check_damping("angular_damping", angular)?;
        Ok(self)
    }

    pub fn with_level_offset(mut self, level_offset: f32) -> Result<Self, ConfigError> {
        self.level_offset = ensure_finite("level_offset", level_offset)?;
        Ok(self)
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Result<Self, ConfigError> {
        match alignment {
            Alignment::Off => {}
            Alignment::Torque { gain } => {
                check_damping("alignment gain", gain)?;
            }
            Alignment::Nudge { rate } => {
                check_damping("alignment rate", rate)?;
            }
        }
        self.alignment = alignment;
        Ok(self)
    }

    /// Average the alignment normal over these local offsets instead of the origin.
    pub fn with_normal_probes(mut self, probes: Vec<Vec3>) -> Result<Self, ConfigError> {
        if probes.is_empty() {
            return Err(ConfigError::NoSamplePoints);
        }
        if let Some(bad) = probes.iter().find(|p| !p.is_finite()) {
            return Err(ConfigError::NonFinite {
                field: "normal probe",
                value: bad.max_element(),
            });
        }
        self.normal_probes = probes;
        Ok(self)
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn water_density(&self) -> f32 {
        self.water_density
    }

    pub fn linear_damping(&self) -> f32 {
        self.linear_damping
    }

    pub fn angular_damping(&self) -> f32 {
        self.angular_damping
    }

    pub fn level_offset(&self) -> f32 {
        self.level_offset
    }

    pub fn vertical_extent(&self) -> f32 {
        self.vertical_extent
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn normal_probes(&self) -> &[Vec3] {
        &self.normal_probes
    }
}

/// Serializable description of a [`Floater`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloaterConfig {
    pub volume: f32,
    pub vertical_extent: f32,
    pub water_density: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub level_offset: f32,
    pub alignment: Alignment,
    /// Empty means "the body origin only"
    pub normal_probes: Vec<Vec3>,
}

impl Default for FloaterConfig {
    fn default() -> Self {
        Self {
            volume: 1.0,
            vertical_extent: 1.0,
            water_density: WATER_DENSITY,
            linear_damping: DEFAULT_LINEAR_DAMPING,
            angular_damping: DEFAULT_ANGULAR_DAMPING,
            level_offset: 0.0,
            alignment: Alignment::default(),
            normal_probes: Vec::new(),
        }
    }
}

impl TryFrom<&FloaterConfig> for Floater {
    type Error = ConfigError;

    fn try_from(config: &FloaterConfig) -> Result<Self, Self::Error> {
        let mut floater = Floater::new(config.volume, config.vertical_extent)?
            .with_water_density(config.water_density)?
            .with_damping(config.linear_damping, config.angular_damping)?
            .with_level_offset(config.level_offset)?
            .with_alignment(config.alignment)?;
        if !config.normal_probes.is_empty() {
            floater = floater.with_normal_probes(config.normal_probes.clone())?;
        }

        debug!(
            "Floater: volume {}, extent {}, alignment {:?}",
            floater.volume, floater.vertical_extent, floater.alignment
        );
        Ok(floater)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_volume_is_split_evenly() {
        let body = BuoyantBody::cube(2.0, 0.5, 0.2).unwrap();
        assert_eq!(body.points().len(), 8);
        assert_eq!(body.point_volume(), 0.25);
    }

    #[test]
    fn test_set_points_resplits_volume() {
        let mut body = BuoyantBody::cube(2.0, 0.5, 0.2).unwrap();
        body.set_points(vec![
            SamplePoint::new(Vec3::new(-1.0, 0.0, 0.0), 0.3),
            SamplePoint::new(Vec3::new(1.0, 0.0, 0.0), 0.3),
        ])
        .unwrap();
        assert_eq!(body.point_volume(), 1.0);

        // A rejected layout leaves the body untouched
        assert_eq!(body.set_points(Vec::new()), Err(ConfigError::NoSamplePoints));
        assert_eq!(body.points().len(), 2);
        assert_eq!(body.point_volume(), 1.0);
    }

    #[test]
    fn test_rejects_invalid_bodies() {
        assert_eq!(
            BuoyantBody::cube(0.0, 0.5, 0.2),
            Err(ConfigError::NonPositiveVolume(0.0))
        );
        assert_eq!(
            BuoyantBody::new(1.0, Vec::new()),
            Err(ConfigError::NoSamplePoints)
        );
        assert_eq!(
            BuoyantBody::cube(1.0, 0.5, 0.0),
            Err(ConfigError::NonPositiveRadius {
                index: 0,
                radius: 0.0
            })
        );
        assert!(BuoyantBody::cube(1.0, 0.5, 0.2)
            .unwrap()
            .with_damping(-0.1, 0.0)
            .is_err());
        assert!(BuoyantBody::cube(1.0, 0.5, 0.2)
            .unwrap()
            .with_water_density(0.0)
            .is_err());
    }

    #[test]
    fn test_config_synthesizes_cube_when_no_points_given() {
        let body = BuoyantBody::try_from(&BodyConfig::default()).unwrap();
        assert_eq!(body.points().len(), 8);
        assert_eq!(body.water_density(), WATER_DENSITY);

        let explicit = BodyConfig {
            points: vec![SamplePoint::new(Vec3::ZERO, 0.5)],
            volume: 3.0,
            ..Default::default()
        };
        let body = BuoyantBody::try_from(&explicit).unwrap();
        assert_eq!(body.points().len(), 1);
        assert_eq!(body.point_volume(), 3.0);
    }

    #[test]
    fn test_floater_validation() {
        assert_eq!(
            Floater::new(1.0, 0.0),
            Err(ConfigError::NonPositiveExtent(0.0))
        );
        assert!(Floater::new(1.0, 1.0)
            .unwrap()
            .with_alignment(Alignment::Nudge { rate: -1.0 })
            .is_err());
        assert!(Floater::new(1.0, 1.0)
            .unwrap()
            .with_normal_probes(Vec::new())
            .is_err());

        let floater = Floater::try_from(&FloaterConfig::default()).unwrap();
        assert_eq!(floater.normal_probes(), &[Vec3::ZERO]);
        assert_eq!(floater.alignment(), Alignment::default());
    }
}
