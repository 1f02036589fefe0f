//! # Kepler-equation solver
//!
//! Newton–Raphson solution of the elliptical Kepler equation
//! `E − e·sin(E) = M`, used by the Keplerian orbit propagation in
//! [`orbit::keplerian`](crate::orbit::keplerian).
//!
//! Only elliptical orbits are supported (`0 ≤ e < 1`); anything else is a
//! domain error at the call site. Non-convergence is **not** an error: the best
//! estimate is returned together with a
//! [`Diagnostic::KeplerNonConvergence`](crate::diagnostics::Diagnostic) so that
//! propagation continues with degraded precision.

use std::f64::consts::PI;

use crate::constants::{Radian, DPI};
use crate::diagnostics::{Diagnostic, Outcome};
use crate::uvplan_errors::UvplanError;

/// Default convergence tolerance on the Newton step.
pub const KEPLER_TOLERANCE: f64 = 1e-8;

/// Default iteration cap of the Newton loop.
pub const KEPLER_MAX_ITERATIONS: usize = 200;

/// Above this eccentricity the Newton iteration is seeded at π instead of M,
/// which avoids the slow-convergence region near periapsis.
const HIGH_ECC_SEED: f64 = 0.9;

/// Returns the principal value of an angle in radians, in [0, 2π).
pub fn principal_angle(a: Radian) -> Radian {
    a.rem_euclid(DPI)
}

/// Returns the principal difference between two angles, in [-π, π].
pub fn angle_diff(a: Radian, b: Radian) -> Radian {
    let a = principal_angle(a);
    let b = principal_angle(b);

    let mut diff = a - b;
    if diff > PI {
        diff -= DPI;
    } else if diff < -PI {
        diff += DPI;
    }
    diff
}

/// Solve the elliptical Kepler equation for the eccentric anomaly.
///
/// Newton–Raphson on `f(x) = x − e·sin(x) − M`, iterating
/// `x ← x − f(x)/f'(x)` until `|Δx| < tolerance` or `max_iterations` is
/// reached. The iteration is seeded with `x₀ = M` for `e < 0.9` and `x₀ = π`
/// otherwise.
///
/// Arguments
/// -----------------
/// * `mean_anomaly`: mean anomaly `M` in radians (any value, reduced internally).
/// * `eccentricity`: orbital eccentricity, must lie in `[0, 1)`.
/// * `tolerance`: convergence threshold on the Newton step.
/// * `max_iterations`: iteration cap.
///
/// Return
/// ----------
/// * The eccentric anomaly in radians, wrapped in an [`Outcome`]. When the
///   iteration cap is hit, the best estimate is returned with a
///   [`Diagnostic::KeplerNonConvergence`] attached.
/// * [`UvplanError::InvalidEccentricity`] when `eccentricity ∉ [0, 1)`.
pub fn solve_kepler(
    mean_anomaly: Radian,
    eccentricity: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<Outcome<Radian>, UvplanError> {
    if !(0.0..1.0).contains(&eccentricity) {
        return Err(UvplanError::InvalidEccentricity(eccentricity));
    }

    Ok(solve_kepler_unchecked(
        mean_anomaly,
        eccentricity,
        tolerance,
        max_iterations,
    ))
}

/// Newton iteration of [`solve_kepler`] without the eccentricity domain check.
///
/// Used by [`KeplerianElements`](crate::orbit::keplerian::KeplerianElements)
/// propagation, where the eccentricity was already validated at construction.
pub(crate) fn solve_kepler_unchecked(
    mean_anomaly: Radian,
    eccentricity: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Outcome<Radian> {
    let m = principal_angle(mean_anomaly);
    let mut x = if eccentricity < HIGH_ECC_SEED { m } else { PI };

    let mut iterations = 0;
    loop {
        let f = x - eccentricity * x.sin() - m;
        let fp = 1.0 - eccentricity * x.cos();
        let dx = -f / fp;
        x += dx;
        iterations += 1;

        if dx.abs() < tolerance {
            return Outcome::clean(x);
        }
        if iterations >= max_iterations {
            let residual = (x - eccentricity * x.sin() - m).abs();
            return Outcome::degraded(
                x,
                Diagnostic::KeplerNonConvergence {
                    iterations,
                    residual,
                },
            );
        }
    }
}

/// [`solve_kepler`] with the crate default tolerance and iteration cap.
pub fn solve_kepler_default(
    mean_anomaly: Radian,
    eccentricity: f64,
) -> Result<Outcome<Radian>, UvplanError> {
    solve_kepler(
        mean_anomaly,
        eccentricity,
        KEPLER_TOLERANCE,
        KEPLER_MAX_ITERATIONS,
    )
}

/// Eccentric anomaly → true anomaly for an elliptical orbit.
pub fn eccentric_to_true_anomaly(eccentric_anomaly: Radian, eccentricity: f64) -> Radian {
    let half = eccentric_anomaly / 2.0;
    2.0 * ((1.0 + eccentricity).sqrt() * half.sin()).atan2((1.0 - eccentricity).sqrt() * half.cos())
}

/// True anomaly → eccentric anomaly for an elliptical orbit.
pub fn true_to_eccentric_anomaly(true_anomaly: Radian, eccentricity: f64) -> Radian {
    let half = true_anomaly / 2.0;
    2.0 * ((1.0 - eccentricity).sqrt() * half.sin()).atan2((1.0 + eccentricity).sqrt() * half.cos())
}
