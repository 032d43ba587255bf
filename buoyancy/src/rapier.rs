//! Rapier bundles for buoyant bodies.
//!
//! Rapier's own damping is switched off on these bundles; the buoyancy
//! systems apply the body's damping themselves.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::body::{BuoyantBody, Floater};
use crate::plugin::{Buoyant, FloaterBody, Submersion};

/// Dynamic rigid body floating on its sample points.
#[derive(Bundle)]
pub struct BuoyantBodyBundle {
    pub body: RigidBody,
    pub collider: Collider,
    pub mass: ColliderMassProperties,
    pub velocity: Velocity,
    pub external_force: ExternalForce,
    pub read_mass: ReadMassProperties,
    pub damping: Damping,
    pub transform: Transform,
    pub buoyant: Buoyant,
    pub submersion: Submersion,
}

impl BuoyantBodyBundle {
    /// Box collider of `half_extents` weighing `mass` kilograms.
    pub fn new(body: BuoyantBody, half_extents: Vec3, mass: f32) -> Self {
        Self {
            body: RigidBody::Dynamic,
            collider: Collider::cuboid(half_extents.x, half_extents.y, half_extents.z),
            mass: ColliderMassProperties::Mass(mass),
            velocity: Velocity::zero(),
            external_force: ExternalForce::default(),
            read_mass: ReadMassProperties::default(),
            damping: no_damping(),
            transform: Transform::default(),
            buoyant: Buoyant(body),
            submersion: Submersion::default(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

/// Dynamic rigid body floating as a single point.
#[derive(Bundle)]
pub struct FloaterBundle {
    pub body: RigidBody,
    pub collider: Collider,
    pub mass: ColliderMassProperties,
    pub velocity: Velocity,
    pub external_force: ExternalForce,
    pub read_mass: ReadMassProperties,
    pub damping: Damping,
    pub transform: Transform,
    pub floater: FloaterBody,
    pub submersion: Submersion,
}

impl FloaterBundle {
    /// Box collider as tall as the floater's vertical extent.
    pub fn new(floater: Floater, width: f32, mass: f32) -> Self {
        let half_height = floater.vertical_extent() * 0.5;
        Self {
            body: RigidBody::Dynamic,
            collider: Collider::cuboid(width * 0.5, half_height, width * 0.5),
            mass: ColliderMassProperties::Mass(mass),
            velocity: Velocity::zero(),
            external_force: ExternalForce::default(),
            read_mass: ReadMassProperties::default(),
            damping: no_damping(),
            transform: Transform::default(),
            floater: FloaterBody(floater),
            submersion: Submersion::default(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

fn no_damping() -> Damping {
    Damping {
        linear_damping: 0.0,
        angular_damping: 0.0,
    }
}

/// Startup system setting the gravity of every Rapier context.
pub fn configure_gravity(gravity: Vec3) -> impl FnMut(Query<&mut RapierConfiguration>) {
    move |mut query: Query<&mut RapierConfiguration>| {
        for mut config in query.iter_mut() {
            config.gravity = gravity;
            config.physics_pipeline_active = true;
        }
    }
}
