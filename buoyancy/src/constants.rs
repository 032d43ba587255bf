/// Density of fresh water (kg/m³).
pub const WATER_DENSITY: f32 = 997.0;

/// Gravity magnitude used when no Rapier context is available (m/s²).
pub const DEFAULT_GRAVITY: f32 = 9.81;

/// Horizontal offset used by every central-difference normal in the crate.
///
/// The error of the finite-difference normal grows with surface curvature,
/// roughly `O(offset² · k³ · A)` for a single sinusoid of wave number `k`.
pub const NORMAL_SAMPLE_OFFSET: f32 = 0.1;

/// Capture radius given to synthesized cube-corner sample points.
pub const DEFAULT_POINT_RADIUS: f32 = 0.2;

/// Linear damping coefficient for bodies without an explicit one.
pub const DEFAULT_LINEAR_DAMPING: f32 = 0.1;

/// Angular damping coefficient for bodies without an explicit one.
pub const DEFAULT_ANGULAR_DAMPING: f32 = 0.1;

/// Slerp rate (per second) of the floater's orientation nudge.
pub const DEFAULT_ALIGNMENT_RATE: f32 = 2.0;

/// Proportional gain of the floater's alignment torque (N·m per radian).
pub const DEFAULT_ALIGNMENT_GAIN: f32 = 50.0;

/// Iteration cap of the bracketed Newton solve inverting the trochoidal
/// displacement. Every step at least keeps the bracket, so the cap only
/// matters for waves close to overturning.
pub const TROCHOID_ITERATIONS: usize = 48;

/// Residual (world units along the wave direction) at which the trochoid
/// inversion stops early.
pub const TROCHOID_TOLERANCE: f32 = 1e-5;
