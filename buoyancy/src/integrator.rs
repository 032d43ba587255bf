//! Per-step buoyancy forces.
//!
//! Everything here is a pure function of the body's configuration, its
//! current [`BodyState`], the wave field, the time and gravity. Nothing is
//! carried from one step to the next.

use std::ops::{Add, AddAssign};

use bevy::math::{Quat, Vec3};
use bevy_log::trace;

use crate::body::{Alignment, BuoyantBody, Floater};
use crate::sampler::{body_fill_fraction, point_displaced_volume, submergence};
use crate::waves::WaveField;

/// Pose and velocities of a rigid body, as read from the physics engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl Default for BodyState {
    fn default() -> Self {
        Self::at_rest(Vec3::ZERO, Quat::IDENTITY)
    }
}

impl BodyState {
    pub fn at_rest(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }

    pub fn with_velocity(mut self, linear: Vec3, angular: Vec3) -> Self {
        self.linear_velocity = linear;
        self.angular_velocity = angular;
        self
    }

    /// Local body offset to world space.
    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }
}

/// Force and torque acting on a body, torque taken about some reference point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Wrench {
    pub force: Vec3,
    pub torque: Vec3,
}

impl Wrench {
    pub const ZERO: Self = Self {
        force: Vec3::ZERO,
        torque: Vec3::ZERO,
    };

    pub fn new(force: Vec3, torque: Vec3) -> Self {
        Self { force, torque }
    }

    /// `force` applied at `point`, expressed about `reference`.
    pub fn at_point(force: Vec3, point: Vec3, reference: Vec3) -> Self {
        Self {
            force,
            torque: (point - reference).cross(force),
        }
    }
}

impl Add for Wrench {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            force: self.force + rhs.force,
            torque: self.torque + rhs.torque,
        }
    }
}

impl AddAssign for Wrench {
    fn add_assign(&mut self, rhs: Self) {
        self.force += rhs.force;
        self.torque += rhs.torque;
    }
}

/// Buoyant force acting at one submerged sample point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointForce {
    /// World-space application point
    pub point: Vec3,
    /// World-space force
    pub force: Vec3,
    /// Water displaced by this point
    pub displaced_volume: f32,
}

/// Forces acting on a [`BuoyantBody`] for one step.
///
/// Buoyancy is kept as point forces so the rigid body can apply each one where
/// it acts; [`BuoyancyForces::net_about`] reduces them when a single force and
/// torque are needed instead.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuoyancyForces {
    pub point_forces: Vec<PointForce>,
    /// Whole-body damping, torque about the center of mass
    pub damping: Wrench,
}

impl BuoyancyForces {
    pub fn displaced_volume(&self) -> f32 {
        self.point_forces.iter().map(|p| p.displaced_volume).sum()
    }

    /// Sum of the buoyant point forces, damping excluded.
    pub fn buoyant_force(&self) -> Vec3 {
        self.point_forces.iter().map(|p| p.force).sum()
    }

    pub fn is_submerged(&self) -> bool {
        !self.point_forces.is_empty()
    }

    /// Net force, and torque about `center_of_mass`, damping included.
    pub fn net_about(&self, center_of_mass: Vec3) -> Wrench {
        self.point_forces
            .iter()
            .fold(self.damping, |acc, p| {
                acc + Wrench::at_point(p.force, p.point, center_of_mass)
            })
    }
}

/// Forces acting on a [`Floater`] for one step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FloaterForces {
    /// Buoyancy, damping and alignment torque, applied at the body origin
    pub wrench: Wrench,
    pub displaced_volume: f32,
    /// Averaged water normal, `None` while the floater is out of the water
    pub surface_normal: Option<Vec3>,
}

/// F = ρ g V
#[inline]
pub fn buoyant_force_magnitude(water_density: f32, gravity: f32, displaced_volume: f32) -> f32 {
    water_density * gravity.abs() * displaced_volume
}

/// Linear and angular damping opposing the body's motion.
#[inline]
pub fn damping(state: &BodyState, linear: f32, angular: f32) -> Wrench {
    Wrench {
        force: -state.linear_velocity * linear,
        torque: -state.angular_velocity * angular,
    }
}

/// Proportional torque rotating the body's up axis onto `normal`.
pub fn alignment_torque(rotation: Quat, normal: Vec3, gain: f32) -> Vec3 {
    let delta = Quat::from_rotation_arc(rotation * Vec3::Y, normal);
    let (axis, angle) = delta.to_axis_angle();
    if angle.abs() <= f32::EPSILON {
        return Vec3::ZERO;
    }
    axis * angle * gain
}

/// Orientation moved a bounded step toward having its up axis on `normal`.
///
/// The yaw of the body is preserved: only the tilt is corrected.
pub fn nudge_toward_normal(rotation: Quat, normal: Vec3, dt: f32, rate: f32) -> Quat {
    let target = Quat::from_rotation_arc(rotation * Vec3::Y, normal) * rotation;
    rotation.slerp(target, (dt * rate).clamp(0.0, 1.0)).normalize()
}

impl BuoyantBody {
    /// Forces on this body for one step.
    ///
    /// Points above the water contribute nothing; damping always applies.
    pub fn evaluate(
        &self,
        field: &impl WaveField,
        state: &BodyState,
        time: f32,
        gravity: f32,
    ) -> BuoyancyForces {
        let point_forces: Vec<PointForce> = self
            .points()
            .iter()
            .filter_map(|sample| {
                let point = state.transform_point(sample.offset);
                let depth = submergence(point, field, time, self.level_offset());
                if depth <= 0.0 {
                    return None;
                }

                let displaced_volume =
                    point_displaced_volume(self.point_volume(), depth, sample.radius);
                if displaced_volume <= 0.0 {
                    return None;
                }

                let normal = field.normal(point.x, point.z, time);
                let magnitude =
                    buoyant_force_magnitude(self.water_density(), gravity, displaced_volume);
                Some(PointForce {
                    point,
                    force: normal * magnitude,
                    displaced_volume,
                })
            })
            .collect();

        trace!(
            "{} of {} sample points submerged",
            point_forces.len(),
            self.points().len()
        );

        BuoyancyForces {
            point_forces,
            damping: damping(state, self.linear_damping(), self.angular_damping()),
        }
    }
}

impl Floater {
    /// Forces on this floater for one step, with the torque about its origin.
    pub fn evaluate(
        &self,
        field: &impl WaveField,
        state: &BodyState,
        time: f32,
        gravity: f32,
    ) -> FloaterForces {
        let mut wrench = damping(state, self.linear_damping(), self.angular_damping());

        let bottom = state.position - Vec3::Y * (self.vertical_extent() * 0.5);
        let depth = submergence(bottom, field, time, self.level_offset());
        let displaced_volume = self.volume() * body_fill_fraction(depth, self.vertical_extent());
        if displaced_volume <= 0.0 {
            return FloaterForces {
                wrench,
                displaced_volume: 0.0,
                surface_normal: None,
            };
        }

        let at_origin = field.normal(state.position.x, state.position.z, time);
        wrench.force +=
            at_origin * buoyant_force_magnitude(self.water_density(), gravity, displaced_volume);

        let surface_normal = self.average_normal(field, state, time);
        if let Alignment::Torque { gain } = self.alignment() {
            wrench.torque += alignment_torque(state.rotation, surface_normal, gain);
        }

        FloaterForces {
            wrench,
            displaced_volume,
            surface_normal: Some(surface_normal),
        }
    }

    /// Water normal averaged over the floater's normal probes.
    pub fn average_normal(&self, field: &impl WaveField, state: &BodyState, time: f32) -> Vec3 {
        self.normal_probes()
            .iter()
            .map(|offset| {
                let p = state.transform_point(*offset);
                field.normal(p.x, p.z, time)
            })
            .sum::<Vec3>()
            .normalize_or(Vec3::Y)
    }

    /// Orientation after this step's alignment nudge, if nudging is enabled
    /// and the floater is in the water.
    pub fn nudged_rotation(&self, rotation: Quat, forces: &FloaterForces, dt: f32) -> Option<Quat> {
        match (self.alignment(), forces.surface_normal) {
            (Alignment::Nudge { rate }, Some(normal)) => {
                Some(nudge_toward_normal(rotation, normal, dt, rate))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Alignment;
    use crate::constants::{DEFAULT_GRAVITY, WATER_DENSITY};
    use crate::sampler::SamplePoint;
    use crate::waves::{SinusoidalWave, WaveParams, WaveSurface};
    use bevy::math::Vec2;

    fn still_water() -> WaveSurface {
        WaveSurface::still(0.0)
    }

    #[test]
    fn test_body_above_water_only_feels_damping() {
        let body = BuoyantBody::cube(1.0, 0.5, 0.2).unwrap();
        let state = BodyState::at_rest(Vec3::new(0.0, 5.0, 0.0), Quat::IDENTITY)
            .with_velocity(Vec3::new(1.0, -2.0, 0.5), Vec3::new(0.0, 1.0, 0.0));
        let forces = body.evaluate(&still_water(), &state, 0.0, DEFAULT_GRAVITY);

        assert!(!forces.is_submerged());
        assert_eq!(forces.displaced_volume(), 0.0);
        let net = forces.net_about(state.position);
        assert_eq!(net.force, Vec3::new(-0.1, 0.2, -0.05));
        assert_eq!(net.torque, Vec3::new(0.0, -0.1, 0.0));
    }

    #[test]
    fn test_half_submerged_cube_displaces_half_its_volume() {
        // Bottom corners at y = -0.5 sit 0.5 under the surface, top corners at +0.5 are dry
        let body = BuoyantBody::cube(2.0, 0.5, 0.2).unwrap();
        let state = BodyState::default();
        let forces = body.evaluate(&still_water(), &state, 0.0, DEFAULT_GRAVITY);

        assert_eq!(forces.point_forces.len(), 4);
        assert!((forces.displaced_volume() - 1.0).abs() < 1e-6);
        for point in &forces.point_forces {
            assert!(point.point.y < 0.0);
            assert!((point.displaced_volume - body.point_volume()).abs() < 1e-6);
        }

        let expected = WATER_DENSITY * DEFAULT_GRAVITY * 1.0;
        let net = forces.net_about(Vec3::ZERO);
        assert!((net.force - Vec3::Y * expected).length() < 1e-2);
        // Symmetric layout, no righting torque
        assert!(net.torque.length() < 1e-3);
    }

    #[test]
    fn test_displaced_volume_never_exceeds_body_volume() {
        let body = BuoyantBody::cube(3.0, 0.5, 0.2).unwrap();
        for depth in [-2.0, -0.5, 0.0, 0.3, 0.7, 1.0, 5.0, 100.0] {
            for angle in [0.0, 0.4, 1.2] {
                let state = BodyState::at_rest(
                    Vec3::new(0.0, -depth, 0.0),
                    Quat::from_rotation_z(angle) * Quat::from_rotation_x(angle * 0.5),
                );
                let forces = body.evaluate(&still_water(), &state, 0.0, DEFAULT_GRAVITY);
                let displaced = forces.displaced_volume();
                assert!(displaced <= body.volume() + 1e-5, "{displaced} at depth {depth}");
                assert!(displaced >= 0.0);
            }
        }
    }

    #[test]
    fn test_force_is_linear_in_volume_and_density() {
        let single = |volume: f32, density: f32| {
            let body = BuoyantBody::new(volume, vec![SamplePoint::new(Vec3::ZERO, 0.2)])
                .unwrap()
                .with_water_density(density)
                .unwrap();
            let state = BodyState::at_rest(Vec3::new(0.0, -1.0, 0.0), Quat::IDENTITY);
            body.evaluate(&still_water(), &state, 0.0, DEFAULT_GRAVITY)
                .buoyant_force()
        };

        let base = single(1.0, WATER_DENSITY);
        assert!((single(2.0, WATER_DENSITY) - base * 2.0).length() < 1e-2);
        assert!((single(1.0, WATER_DENSITY * 2.0) - base * 2.0).length() < 1e-2);
    }

    #[test]
    fn test_tilted_body_gets_righting_torque() {
        // Rolled onto its +x side: the lower side is deeper, pushing it back
        let body = BuoyantBody::new(
            1.0,
            vec![
                SamplePoint::new(Vec3::new(-1.0, 0.0, 0.0), 0.5),
                SamplePoint::new(Vec3::new(1.0, 0.0, 0.0), 0.5),
            ],
        )
        .unwrap();
        let state = BodyState::at_rest(Vec3::ZERO, Quat::from_rotation_z(-0.3));
        let forces = body.evaluate(&still_water(), &state, 0.0, DEFAULT_GRAVITY);

        assert_eq!(forces.point_forces.len(), 1);
        let net = forces.net_about(state.position);
        // Rotation about +z lifts the +x side back up
        assert!(net.torque.z > 0.0, "{:?}", net.torque);
    }

    #[test]
    fn test_point_forces_follow_water_normal() {
        let params = WaveParams::new(0.5, 10.0, Vec2::X, 1.0).unwrap();
        let wave = WaveSurface::Sinusoidal(SinusoidalWave::new(params));
        let body = BuoyantBody::cube(1.0, 0.5, 0.2).unwrap();
        let state = BodyState::at_rest(Vec3::new(0.3, -1.0, 0.0), Quat::IDENTITY);
        let forces = body.evaluate(&wave, &state, 0.7, DEFAULT_GRAVITY);

        for point in &forces.point_forces {
            let normal = wave.normal(point.point.x, point.point.z, 0.7);
            assert!(point.force.normalize().dot(normal) > 0.9999);
        }
    }

    #[test]
    fn test_damping_opposes_velocity() {
        let velocity = Vec3::new(2.0, -1.0, 3.0);
        let state = BodyState::default().with_velocity(velocity, Vec3::new(0.5, 0.0, -1.0));
        let low = damping(&state, 0.5, 0.2);
        let high = damping(&state, 1.0, 0.4);

        assert!((low.force.normalize().dot(velocity.normalize()) + 1.0).abs() < 1e-6);
        assert_eq!(high.force, low.force * 2.0);
        assert_eq!(high.torque, low.torque * 2.0);
    }

    #[test]
    fn test_floater_half_submerged() {
        // Extent 1, bottom at y = -0.5, water at 0: submergence 0.5
        let floater = Floater::new(1.0, 1.0).unwrap();
        let state = BodyState::default();
        let forces = floater.evaluate(&still_water(), &state, 0.0, DEFAULT_GRAVITY);

        assert!((forces.displaced_volume - 0.5).abs() < 1e-6);
        let expected = WATER_DENSITY * DEFAULT_GRAVITY * 0.5;
        assert!((forces.wrench.force.y - expected).abs() < 0.01);
        assert!((forces.wrench.force.y - 4890.285).abs() < 0.05);
        assert_eq!(forces.surface_normal, Some(Vec3::Y));
        assert!(forces.wrench.torque.length() < 1e-6);
    }

    #[test]
    fn test_floater_out_of_water() {
        let floater = Floater::new(1.0, 1.0).unwrap();
        let state = BodyState::at_rest(Vec3::new(0.0, 3.0, 0.0), Quat::IDENTITY)
            .with_velocity(Vec3::Y, Vec3::ZERO);
        let forces = floater.evaluate(&still_water(), &state, 0.0, DEFAULT_GRAVITY);

        assert_eq!(forces.displaced_volume, 0.0);
        assert_eq!(forces.surface_normal, None);
        assert_eq!(forces.wrench.force, Vec3::new(0.0, -0.1, 0.0));
        assert!(floater
            .nudged_rotation(Quat::IDENTITY, &forces, 0.02)
            .is_none());
    }

    #[test]
    fn test_alignment_torque_rights_a_tilted_floater() {
        let floater = Floater::new(1.0, 1.0)
            .unwrap()
            .with_alignment(Alignment::Torque { gain: 10.0 })
            .unwrap()
            .with_damping(0.0, 0.0)
            .unwrap();
        let state = BodyState::at_rest(Vec3::ZERO, Quat::from_rotation_x(0.4));
        let forces = floater.evaluate(&still_water(), &state, 0.0, DEFAULT_GRAVITY);

        assert!((forces.wrench.torque - Vec3::new(-4.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_nudge_moves_toward_normal_without_overshoot() {
        let floater = Floater::new(1.0, 1.0)
            .unwrap()
            .with_alignment(Alignment::Nudge { rate: 2.0 })
            .unwrap();
        let tilted = Quat::from_rotation_x(0.4) * Quat::from_rotation_y(1.0);
        let state = BodyState::at_rest(Vec3::ZERO, tilted);
        let forces = floater.evaluate(&still_water(), &state, 0.0, DEFAULT_GRAVITY);
        // Nudge mode adds no torque beyond damping
        assert_eq!(forces.wrench.torque, Vec3::ZERO);

        let nudged = floater.nudged_rotation(tilted, &forces, 0.1).unwrap();
        let before = (tilted * Vec3::Y).angle_between(Vec3::Y);
        let after = (nudged * Vec3::Y).angle_between(Vec3::Y);
        assert!(after < before);
        assert!((after - before * 0.8).abs() < 1e-3);

        // A huge step lands exactly on the normal, keeping the heading
        let snapped = floater.nudged_rotation(tilted, &forces, 10.0).unwrap();
        assert!((snapped * Vec3::Y - Vec3::Y).length() < 1e-4);
        let heading = |q: Quat| (q * Vec3::Z).with_y(0.0).normalize();
        assert!(heading(snapped).dot(heading(tilted)) > 0.99);
    }

    #[test]
    fn test_average_normal_over_probes() {
        let params = WaveParams::new(0.5, 10.0, Vec2::X, 0.0).unwrap();
        let wave = SinusoidalWave::new(params);
        let floater = Floater::new(1.0, 1.0)
            .unwrap()
            .with_normal_probes(vec![Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0)])
            .unwrap();
        // Opposite slopes a half wavelength apart cancel out
        let normal = floater.average_normal(&wave, &BodyState::default(), 0.0);
        assert!((normal - Vec3::Y).length() < 1e-4, "{normal}");
    }
}
