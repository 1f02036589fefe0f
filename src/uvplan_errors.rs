use thiserror::Error;

/// Crate-wide error type.
///
/// Covers the two fatal families of the engine:
/// - **domain violations**: physically invalid input, rejected at the point of use,
/// - **ephemeris file failures**: a missing or malformed orbit-ephemeris file.
///
/// Degraded-precision situations (query outside the ephemeris span, Kepler
/// non-convergence, missing interpolant) are *not* errors; they are reported through
/// [`Diagnostic`](crate::diagnostics::Diagnostic) and computation continues.
#[derive(Error, Debug)]
pub enum UvplanError {
    #[error("Eccentricity out of the elliptical range [0, 1): {0}")]
    InvalidEccentricity(f64),

    #[error("Semi-major axis must be strictly positive, got {0} m")]
    InvalidSemiMajorAxis(f64),

    #[error("Gravitational parameter must be strictly positive, got {0} m^3/s^2")]
    InvalidGravitationalParameter(f64),

    #[error("Antenna diameter must be strictly positive, got {0} m")]
    InvalidDiameter(f64),

    #[error("Bandwidth must be strictly positive, got {0} MHz")]
    InvalidBandwidth(f64),

    #[error("Scan duration must be strictly positive, got {0} s")]
    InvalidDuration(f64),

    #[error("No scan with identifier {0} in the observation")]
    ScanNotFound(usize),

    #[error("Ephemeris file not found at: {0}")]
    EphemerisFileNotFound(String),

    #[error("Ephemeris file {path}: {valid} valid sample line(s), at least 2 required")]
    EphemerisTooShort { path: String, valid: usize },

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),
}

impl PartialEq for UvplanError {
    fn eq(&self, other: &Self) -> bool {
        use UvplanError::*;
        match (self, other) {
            (InvalidEccentricity(a), InvalidEccentricity(b)) => a == b,
            (InvalidSemiMajorAxis(a), InvalidSemiMajorAxis(b)) => a == b,
            (InvalidGravitationalParameter(a), InvalidGravitationalParameter(b)) => a == b,
            (InvalidDiameter(a), InvalidDiameter(b)) => a == b,
            (InvalidBandwidth(a), InvalidBandwidth(b)) => a == b,
            (InvalidDuration(a), InvalidDuration(b)) => a == b,
            (ScanNotFound(a), ScanNotFound(b)) => a == b,
            (EphemerisFileNotFound(a), EphemerisFileNotFound(b)) => a == b,
            (
                EphemerisTooShort { path: p1, valid: v1 },
                EphemerisTooShort { path: p2, valid: v2 },
            ) => p1 == p2 && v1 == v2,

            // Io errors are not comparable: equality on the variant only
            (IoError(_), IoError(_)) => true,

            _ => false,
        }
    }
}
