//! Submergence sampling.
//!
//! A sample point is not infinitesimal: it is treated as a small blob of
//! diameter `2 * radius` that fills linearly as the water rises across it.
//! Once fully under, a point contributes its whole volume share and no more.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_POINT_RADIUS;
use crate::waves::WaveField;

/// Buoyancy sample point in the body's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    /// Offset from the body origin, local space
    pub offset: Vec3,
    /// Capture radius used to turn depth into a fill fraction
    #[serde(default = "default_radius")]
    pub radius: f32,
}

fn default_radius() -> f32 {
    DEFAULT_POINT_RADIUS
}

impl SamplePoint {
    pub const fn new(offset: Vec3, radius: f32) -> Self {
        Self { offset, radius }
    }
}

/// The 8 corners of a cube of half-size `half_extent`, all with `radius`.
pub fn cube_corners(half_extent: f32, radius: f32) -> Vec<SamplePoint> {
    let h = half_extent;
    [
        Vec3::new(-h, -h, -h),
        Vec3::new(h, -h, -h),
        Vec3::new(-h, -h, h),
        Vec3::new(h, -h, h),
        Vec3::new(-h, h, -h),
        Vec3::new(h, h, -h),
        Vec3::new(-h, h, h),
        Vec3::new(h, h, h),
    ]
    .into_iter()
    .map(|offset| SamplePoint::new(offset, radius))
    .collect()
}

/// Depth of `point` below the water surface.
/// Positive underwater, zero or negative above.
#[inline]
pub fn submergence(point: Vec3, field: &impl WaveField, time: f32, level_offset: f32) -> f32 {
    (field.height(point.x, point.z, time) + level_offset) - point.y
}

/// Fill fraction of a sample point of `radius` submerged by `depth`.
#[inline]
pub fn fill_fraction(depth: f32, radius: f32) -> f32 {
    if depth <= 0.0 {
        return 0.0;
    }
    (depth / (2.0 * radius)).clamp(0.0, 1.0)
}

/// Water displaced by one sample point; never more than its `share`.
#[inline]
pub fn point_displaced_volume(share: f32, depth: f32, radius: f32) -> f32 {
    share * fill_fraction(depth, radius)
}

/// Fill fraction of a whole body of height `vertical_extent` whose bottom
/// is `depth` under the surface.
#[inline]
pub fn body_fill_fraction(depth: f32, vertical_extent: f32) -> f32 {
    if depth <= 0.0 {
        return 0.0;
    }
    (depth / vertical_extent).clamp(0.0, 1.0)
}
