//! # Keplerian orbit propagation
//!
//! Validated orbital elements and their closed-form propagation to a Cartesian
//! state vector: mean anomaly from elapsed time, eccentric anomaly through the
//! Newton solver of [`kepler`](crate::kepler), then the perifocal state rotated
//! into the ground-fixed frame by the standard 3-1-3 sequence (RAAN,
//! inclination, argument of periapsis).

use nalgebra::{Matrix3, Vector3};

use crate::constants::{Meter, Radian, SecondsJ2000};
use crate::diagnostics::Outcome;
use crate::kepler::{
    eccentric_to_true_anomaly, solve_kepler_unchecked, true_to_eccentric_anomaly,
    KEPLER_MAX_ITERATIONS, KEPLER_TOLERANCE,
};
use crate::ref_frame::rotmt;
use crate::uvplan_errors::UvplanError;

use super::StateVector;

/// Keplerian orbital elements of a space antenna.
///
/// Units:
/// * `semi_major_axis`: meters
/// * `eccentricity`: unitless, elliptical range [0, 1)
/// * `inclination`, `ascending_node_longitude`, `periapsis_argument`,
///   `true_anomaly`: radians
/// * `epoch`: seconds since J2000.0 (instant at which `true_anomaly` holds)
/// * `mu`: gravitational parameter of the central body, m³/s²
///
/// Construction goes through [`KeplerianElements::new`], which rejects
/// non-elliptical or non-physical inputs, so a held value is always
/// propagatable.
#[derive(Debug, Clone, PartialEq)]
pub struct KeplerianElements {
    pub semi_major_axis: Meter,
    pub eccentricity: f64,
    pub inclination: Radian,
    pub ascending_node_longitude: Radian,
    pub periapsis_argument: Radian,
    pub true_anomaly: Radian,
    pub epoch: SecondsJ2000,
    pub mu: f64,
}

impl KeplerianElements {
    /// Validate and build an element set.
    ///
    /// Arguments
    /// -----------------
    /// * `semi_major_axis`: meters, strictly positive.
    /// * `eccentricity`: in [0, 1).
    /// * `inclination`, `raan`, `argp`, `true_anomaly`: radians.
    /// * `epoch`: seconds since J2000.0.
    /// * `mu`: m³/s², strictly positive.
    ///
    /// Return
    /// ----------
    /// * The element set, or the domain error naming the offending value.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        semi_major_axis: Meter,
        eccentricity: f64,
        inclination: Radian,
        raan: Radian,
        argp: Radian,
        true_anomaly: Radian,
        epoch: SecondsJ2000,
        mu: f64,
    ) -> Result<Self, UvplanError> {
        if semi_major_axis <= 0.0 {
            return Err(UvplanError::InvalidSemiMajorAxis(semi_major_axis));
        }
        if !(0.0..1.0).contains(&eccentricity) {
            return Err(UvplanError::InvalidEccentricity(eccentricity));
        }
        if mu <= 0.0 {
            return Err(UvplanError::InvalidGravitationalParameter(mu));
        }

        Ok(KeplerianElements {
            semi_major_axis,
            eccentricity,
            inclination,
            ascending_node_longitude: raan,
            periapsis_argument: argp,
            true_anomaly,
            epoch,
            mu,
        })
    }

    /// Mean motion `n = sqrt(mu / a³)`, rad/s.
    pub fn mean_motion(&self) -> f64 {
        (self.mu / self.semi_major_axis.powi(3)).sqrt()
    }

    /// Orbital period, seconds.
    pub fn period(&self) -> f64 {
        crate::constants::DPI / self.mean_motion()
    }

    /// Mean anomaly at the element epoch, derived from the epoch true anomaly.
    pub fn epoch_mean_anomaly(&self) -> Radian {
        let ecc_anom = true_to_eccentric_anomaly(self.true_anomaly, self.eccentricity);
        ecc_anom - self.eccentricity * ecc_anom.sin()
    }

    /// Rotation from the perifocal frame into the ground-fixed frame
    /// (3-1-3 sequence: RAAN about Z, inclination about X, argument of
    /// periapsis about Z).
    fn perifocal_rotation(&self) -> Matrix3<f64> {
        rotmt(self.ascending_node_longitude, 2)
            * rotmt(self.inclination, 0)
            * rotmt(self.periapsis_argument, 2)
    }

    /// Propagate to the instant `t` (seconds since J2000.0).
    ///
    /// Deterministic and closed-form aside from the Kepler solve; a
    /// non-converged solve degrades precision (diagnostic attached) but never
    /// fails.
    ///
    /// Return
    /// ----------
    /// * Ground-fixed [`StateVector`] in meters and m/s.
    pub fn state_at(&self, t: SecondsJ2000) -> Outcome<StateVector> {
        let e = self.eccentricity;
        let a = self.semi_major_axis;

        let mean_anomaly = self.epoch_mean_anomaly() + self.mean_motion() * (t - self.epoch);
        let solved = solve_kepler_unchecked(mean_anomaly, e, KEPLER_TOLERANCE, KEPLER_MAX_ITERATIONS);
        let ecc_anom = solved.value;

        let nu = eccentric_to_true_anomaly(ecc_anom, e);
        let radius = a * (1.0 - e * ecc_anom.cos());

        // Perifocal position and vis-viva-consistent velocity
        let position = radius * Vector3::new(nu.cos(), nu.sin(), 0.0);
        let velocity = ((self.mu * a).sqrt() / radius)
            * Vector3::new(-ecc_anom.sin(), (1.0 - e * e).sqrt() * ecc_anom.cos(), 0.0);

        let rot = self.perifocal_rotation();
        Outcome {
            value: StateVector {
                position: rot * position,
                velocity: rot * velocity,
            },
            diagnostics: solved.diagnostics,
        }
    }
}
