//! # Orbit models for space antennas
//!
//! An [`OrbitModel`] turns either a discretized ephemeris or a Keplerian
//! element set into a continuous position/velocity function of time in the
//! ground-fixed frame. The two data sources are **mutually exclusive** by
//! construction: [`OrbitSource`] is a tagged union, so switching modes is a
//! single assignment and any interpolant fitted on the old ephemeris dies with
//! it.
//!
//! Degraded paths (query outside the ephemeris span, linear fallback before an
//! interpolant is fitted, Kepler non-convergence) return best-effort states
//! with [`Diagnostic`](crate::diagnostics::Diagnostic) entries; they are never
//! errors.

pub mod ephemeris;
pub mod interpolant;
pub mod keplerian;

use camino::Utf8Path;
use nalgebra::Vector3;

use crate::constants::{Meter, SecondsJ2000};
use crate::diagnostics::{Diagnostic, Outcome};
use crate::uvplan_errors::UvplanError;

use ephemeris::Ephemeris;
use keplerian::KeplerianElements;

/// Position (m) and velocity (m/s) in the ground-fixed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position: Vector3<Meter>,
    pub velocity: Vector3<f64>,
}

impl StateVector {
    pub fn zero() -> Self {
        StateVector {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
        }
    }
}

/// The active source of truth of an orbit model.
#[derive(Debug, Clone, PartialEq)]
pub enum OrbitSource {
    Ephemeris(Ephemeris),
    Keplerian(KeplerianElements),
}

/// Continuous position/velocity of one space antenna.
///
/// `fallback` is the antenna's static coordinate/velocity pair, returned (with
/// a diagnostic) when an ephemeris query falls outside the sample span; the
/// samples are never extrapolated.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitModel {
    source: OrbitSource,
    fallback: StateVector,
}

impl OrbitModel {
    pub fn from_keplerian(elements: KeplerianElements) -> Self {
        OrbitModel {
            source: OrbitSource::Keplerian(elements),
            fallback: StateVector::zero(),
        }
    }

    pub fn from_ephemeris(ephemeris: Ephemeris) -> Self {
        OrbitModel {
            source: OrbitSource::Ephemeris(ephemeris),
            fallback: StateVector::zero(),
        }
    }

    /// Load an OEM-like ephemeris file and switch to ephemeris mode.
    ///
    /// On failure the model keeps its previous state (whatever mode it was in).
    pub fn load_oem_file(&mut self, path: &Utf8Path) -> Result<(), UvplanError> {
        let ephemeris = Ephemeris::read_oem_file(path)?;
        self.source = OrbitSource::Ephemeris(ephemeris);
        Ok(())
    }

    /// Switch to Keplerian mode, discarding ephemeris samples and interpolants.
    pub fn set_keplerian(&mut self, elements: KeplerianElements) {
        self.source = OrbitSource::Keplerian(elements);
    }

    /// Static state used when an ephemeris query falls outside the span.
    pub fn set_fallback(&mut self, fallback: StateVector) {
        self.fallback = fallback;
    }

    pub fn source(&self) -> &OrbitSource {
        &self.source
    }

    /// The held ephemeris, for interpolant selection; `None` in Keplerian mode.
    pub fn ephemeris_mut(&mut self) -> Option<&mut Ephemeris> {
        match &mut self.source {
            OrbitSource::Ephemeris(e) => Some(e),
            OrbitSource::Keplerian(_) => None,
        }
    }

    /// State vector at `t` (seconds since J2000.0), ground-fixed frame.
    ///
    /// * Keplerian mode: closed-form propagation through the Kepler solver.
    /// * Ephemeris mode: active interpolant, or linear interpolation between
    ///   the bracketing samples when none is fitted (diagnostic attached); the
    ///   static fallback outside the span (diagnostic attached).
    pub fn state_at(&self, t: SecondsJ2000) -> Outcome<StateVector> {
        match &self.source {
            OrbitSource::Keplerian(elements) => elements.state_at(t),
            OrbitSource::Ephemeris(eph) => {
                if !eph.covers(t) {
                    let (span_start, span_end) = eph.span();
                    return Outcome::degraded(
                        self.fallback,
                        Diagnostic::OutsideEphemerisSpan {
                            query: t,
                            span_start,
                            span_end,
                        },
                    );
                }

                if let Some(interp) = eph.interpolant() {
                    let (position, velocity) = interp.evaluate(t);
                    return Outcome::clean(StateVector { position, velocity });
                }

                // Lower-precision path: no interpolant fitted yet
                let i = eph.bracket(t);
                let a = &eph.samples()[i];
                let b = &eph.samples()[i + 1];
                let s = (t - a.t) / (b.t - a.t);
                let state = StateVector {
                    position: a.position.lerp(&b.position, s),
                    velocity: a.velocity.lerp(&b.velocity, s),
                };
                Outcome::degraded(state, Diagnostic::LinearFallback { query: t })
            }
        }
    }
}
