//! Bevy plugin driving buoyancy on Rapier rigid bodies.

use bevy::prelude::*;
use bevy_log::debug;
use bevy_rapier3d::prelude::*;

use crate::body::{BuoyantBody, Floater};
use crate::constants::DEFAULT_GRAVITY;
use crate::integrator::BodyState;
use crate::waves::{WaveField, WaveSurface};

/// The water surface every buoyant body in the world floats on.
#[derive(Resource, Debug, Clone, Default, Deref, DerefMut)]
pub struct Ocean(pub WaveSurface);

/// Multi-point buoyant body. Forces are applied per sample point.
///
/// Both force systems overwrite `ExternalForce`, so a body is either
/// `Buoyant` or a [`FloaterBody`]. When both are present the floater wins and
/// this component is ignored.
#[derive(Component, Debug, Clone, Deref)]
pub struct Buoyant(pub BuoyantBody);

/// Single-point floater. Forces are applied as one net force and torque.
#[derive(Component, Debug, Clone, Deref)]
pub struct FloaterBody(pub Floater);

/// How deep a body sat in the water on the last physics step.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Submersion {
    pub displaced_volume: f32,
    pub submerged_points: usize,
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuoyancySet {
    /// Writes `ExternalForce` before Rapier picks it up
    ApplyForces,
}

/// Adds the [`Ocean`] resource and the force systems.
///
/// Systems run in `FixedUpdate` ahead of Rapier's backend sync, so Rapier
/// must be added with `in_fixed_schedule()` for the forces to land on the
/// same step.
pub struct BuoyancyPlugin;

impl Plugin for BuoyancyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Ocean>()
            .configure_sets(
                FixedUpdate,
                BuoyancySet::ApplyForces.before(PhysicsSet::SyncBackend),
            )
            .add_systems(
                FixedUpdate,
                (apply_buoyancy, apply_floater_forces).in_set(BuoyancySet::ApplyForces),
            );

        debug!("Buoyancy plugin registered");
    }
}

/// Gravity magnitude of the first Rapier context, or [`DEFAULT_GRAVITY`]
/// when no context exists.
pub fn gravity_magnitude(contexts: &Query<&RapierConfiguration>) -> f32 {
    contexts
        .iter()
        .next()
        .map_or(DEFAULT_GRAVITY, |config| config.gravity.length())
}

fn body_state(transform: &Transform, velocity: &Velocity) -> BodyState {
    BodyState::at_rest(transform.translation, transform.rotation)
        .with_velocity(velocity.linvel, velocity.angvel)
}

/// Replaces each [`Buoyant`] body's `ExternalForce` with this step's
/// buoyancy and damping. Entities that are also a [`FloaterBody`] are skipped.
pub fn apply_buoyancy(
    ocean: Res<Ocean>,
    time: Res<Time>,
    contexts: Query<&RapierConfiguration>,
    mut bodies: Query<
        (
            &Buoyant,
            &Transform,
            &Velocity,
            &ReadMassProperties,
            &mut ExternalForce,
            Option<&mut Submersion>,
        ),
        Without<FloaterBody>,
    >,
) {
    let gravity = gravity_magnitude(&contexts);
    let elapsed = time.elapsed_secs();
    let surface = &ocean.0;

    bodies.par_iter_mut().for_each(
        |(buoyant, transform, velocity, mass, mut external, submersion)| {
            let state = body_state(transform, velocity);
            let forces = buoyant.evaluate(surface, &state, elapsed, gravity);
            let center_of_mass = transform.transform_point(mass.get().local_center_of_mass);

            *external = forces.point_forces.iter().fold(
                ExternalForce {
                    force: forces.damping.force,
                    torque: forces.damping.torque,
                },
                |acc, point| {
                    acc + ExternalForce::at_point(point.force, point.point, center_of_mass)
                },
            );

            if let Some(mut submersion) = submersion {
                *submersion = Submersion {
                    displaced_volume: forces.displaced_volume(),
                    submerged_points: forces.point_forces.len(),
                };
            }
        },
    );
}

/// Replaces each [`FloaterBody`]'s `ExternalForce`, and nudges its rotation
/// toward the water normal when it aligns that way.
pub fn apply_floater_forces(
    ocean: Res<Ocean>,
    time: Res<Time>,
    contexts: Query<&RapierConfiguration>,
    mut floaters: Query<(
        &FloaterBody,
        &mut Transform,
        &Velocity,
        &ReadMassProperties,
        &mut ExternalForce,
        Option<&mut Submersion>,
    )>,
) {
    let gravity = gravity_magnitude(&contexts);
    let elapsed = time.elapsed_secs();
    let dt = time.delta_secs();
    let surface = &ocean.0;

    floaters.par_iter_mut().for_each(
        |(floater, mut transform, velocity, mass, mut external, submersion)| {
            let state = body_state(&transform, velocity);
            let forces = floater.evaluate(surface, &state, elapsed, gravity);
            let center_of_mass = transform.transform_point(mass.get().local_center_of_mass);

            // The floater's force acts at its origin
            *external = ExternalForce::at_point(
                forces.wrench.force,
                transform.translation,
                center_of_mass,
            ) + ExternalForce {
                force: Vec3::ZERO,
                torque: forces.wrench.torque,
            };

            if let Some(rotation) = floater.nudged_rotation(transform.rotation, &forces, dt) {
                transform.rotation = rotation;
            }

            if let Some(mut submersion) = submersion {
                *submersion = Submersion {
                    displaced_volume: forces.displaced_volume,
                    submerged_points: usize::from(forces.displaced_volume > 0.0),
                };
            }
        },
    );
}

impl Ocean {
    pub fn new(surface: WaveSurface) -> Self {
        Self(surface)
    }

    /// Surface height under a world position.
    pub fn height_at(&self, position: Vec3, time: f32) -> f32 {
        self.0.height(position.x, position.z, time)
    }
}
