//! Analytic water surfaces coupled to a multi-point buoyancy integrator.
//!
//! The crate is split the same way the force pipeline runs each physics tick:
//!
//! ```text
//!   waves       height / normal of the water surface at (x, z, t)
//!     │
//!   sampler     per-point submergence and displaced volume
//!     │
//!   integrator  buoyant forces, damping, alignment torque
//!     │
//!   plugin      writes the result into Rapier's ExternalForce
//! ```
//!
//! Everything above `plugin` is plain math over `bevy::math` types and can be
//! driven without an ECS world.

pub mod body;
pub mod constants;
pub mod error;
pub mod integrator;
pub mod plugin;
pub mod rapier;
pub mod sampler;
pub mod waves;

pub use body::{Alignment, BodyConfig, BuoyantBody, Floater, FloaterConfig};
pub use constants::*;
pub use error::ConfigError;
pub use integrator::{BodyState, BuoyancyForces, FloaterForces, PointForce, Wrench};
pub use plugin::{Buoyant, BuoyancyPlugin, BuoyancySet, FloaterBody, Ocean, Submersion};
pub use rapier::{BuoyantBodyBundle, FloaterBundle};
pub use sampler::SamplePoint;
pub use waves::{WaveConfig, WaveField, WaveParams, WaveSurface};
