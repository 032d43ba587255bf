use thiserror::Error;

/// Invalid wave or body configuration.
///
/// Always raised by constructors, never while stepping a simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("wavelength must be positive, got {0}")]
    NonPositiveWavelength(f32),
    #[error("wave amplitude must be positive, got {0}")]
    NonPositiveAmplitude(f32),
    #[error("wave direction must be a non-zero vector")]
    ZeroDirection,
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },
    #[error("trochoidal wave overturns: k * amplitude = {0} must stay below 1")]
    OverturningWave(f32),
    #[error("body volume must be positive, got {0}")]
    NonPositiveVolume(f32),
    #[error("water density must be positive, got {0}")]
    NonPositiveDensity(f32),
    #[error("{field} must not be negative, got {value}")]
    NegativeDamping { field: &'static str, value: f32 },
    #[error("a buoyant body needs at least one sample point")]
    NoSamplePoints,
    #[error("sample point {index} has non-positive radius {radius}")]
    NonPositiveRadius { index: usize, radius: f32 },
    #[error("vertical extent must be positive, got {0}")]
    NonPositiveExtent(f32),
    #[error("body mass must be positive, got {0}")]
    NonPositiveMass(f32),
    #[error("{field} must be positive, got {value}")]
    NonPositiveSize { field: &'static str, value: f32 },
    #[error("gravity is the downward acceleration and must not be negative, got {0}")]
    NegativeGravity(f32),
}

pub(crate) fn ensure_finite(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}
