//! # Ephemeris interpolants
//!
//! Two fitted representations of a discretized ephemeris, both evaluated for
//! position **and** first derivative so that velocity comes from the same
//! model:
//!
//! * [`HermiteInterpolant`]: piecewise cubic segments built from the position
//!   and velocity of consecutive samples; local and C¹-continuous, passes
//!   through every control point.
//! * [`ChebyshevInterpolant`]: a degree-bounded least-squares fit in the
//!   Chebyshev basis over the full sample span, with time normalized into
//!   [-1, 1]; global and smoothing.
//!
//! Exactly one interpolant is active at a time on an ephemeris; it is rebuilt
//! on demand and discarded whenever the sample sequence changes.

use nalgebra::{DMatrix, DVector, Vector3};

use crate::constants::{Meter, SecondsJ2000};

use super::ephemeris::EphemerisSample;

/// One cubic segment of a Hermite interpolant, covering `[t0, t1]`.
///
/// Position is stored as coefficients of the normalized local variable
/// `s = (t - t0) / (t1 - t0)`: `p(s) = c0 + c1·s + c2·s² + c3·s³`.
#[derive(Debug, Clone, PartialEq)]
struct HermiteSegment {
    t0: SecondsJ2000,
    t1: SecondsJ2000,
    coeffs: [Vector3<f64>; 4],
}

impl HermiteSegment {
    fn from_samples(a: &EphemerisSample, b: &EphemerisSample) -> Self {
        let dt = b.t - a.t;
        // Endpoint derivatives expressed in the normalized variable
        let m0 = a.velocity * dt;
        let m1 = b.velocity * dt;
        let c0 = a.position;
        let c1 = m0;
        let c2 = 3.0 * (b.position - a.position) - 2.0 * m0 - m1;
        let c3 = 2.0 * (a.position - b.position) + m0 + m1;
        HermiteSegment {
            t0: a.t,
            t1: b.t,
            coeffs: [c0, c1, c2, c3],
        }
    }

    fn evaluate(&self, t: SecondsJ2000) -> (Vector3<Meter>, Vector3<f64>) {
        let dt = self.t1 - self.t0;
        let s = (t - self.t0) / dt;
        let [c0, c1, c2, c3] = &self.coeffs;
        let position = c0 + c1 * s + c2 * (s * s) + c3 * (s * s * s);
        let derivative = c1 + c2 * (2.0 * s) + c3 * (3.0 * s * s);
        (position, derivative / dt)
    }
}

/// Piecewise cubic Hermite interpolant over an ascending sample sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct HermiteInterpolant {
    segments: Vec<HermiteSegment>,
}

impl HermiteInterpolant {
    /// Precompute one cubic segment per consecutive sample pair.
    /// Callers guarantee at least 2 samples in ascending time order.
    pub fn fit(samples: &[EphemerisSample]) -> Self {
        let segments = samples
            .windows(2)
            .map(|w| HermiteSegment::from_samples(&w[0], &w[1]))
            .collect();
        HermiteInterpolant { segments }
    }

    /// Evaluate position and velocity at `t` (must lie inside the fitted span;
    /// the boundary segments are used for boundary instants).
    pub fn evaluate(&self, t: SecondsJ2000) -> (Vector3<Meter>, Vector3<f64>) {
        let idx = match self
            .segments
            .binary_search_by(|seg| seg.t0.partial_cmp(&t).unwrap_or(std::cmp::Ordering::Less))
        {
            Ok(i) => i,
            Err(0) => 0,
            Err(i) => (i - 1).min(self.segments.len() - 1),
        };
        self.segments[idx].evaluate(t)
    }
}

/// Degree-bounded Chebyshev least-squares fit of an ephemeris, one coefficient
/// set per Cartesian axis, over the normalized domain [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct ChebyshevInterpolant {
    span_start: SecondsJ2000,
    span_end: SecondsJ2000,
    /// `coeffs[axis][j]` multiplies `T_j` for that axis.
    coeffs: [Vec<f64>; 3],
}

impl ChebyshevInterpolant {
    /// Fit the samples with Chebyshev polynomials up to `degree` (bounded by
    /// the number of samples minus one).
    ///
    /// Arguments
    /// -----------------
    /// * `samples`: at least 2, ascending in time.
    /// * `degree`: requested polynomial degree bound.
    pub fn fit(samples: &[EphemerisSample], degree: usize) -> Self {
        let n = samples.len();
        let span_start = samples[0].t;
        let span_end = samples[n - 1].t;
        let deg = degree.min(n - 1);

        // Design matrix of T_j at the normalized sample times
        let mut design = DMatrix::zeros(n, deg + 1);
        for (i, sample) in samples.iter().enumerate() {
            let x = normalize(sample.t, span_start, span_end);
            let mut t_prev = 1.0;
            let mut t_cur = x;
            design[(i, 0)] = 1.0;
            for j in 1..=deg {
                design[(i, j)] = t_cur;
                let t_next = 2.0 * x * t_cur - t_prev;
                t_prev = t_cur;
                t_cur = t_next;
            }
        }

        let svd = design.svd(true, true);
        let mut coeffs: [Vec<f64>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for axis in 0..3 {
            let rhs = DVector::from_iterator(n, samples.iter().map(|s| s.position[axis]));
            let solved = svd
                .solve(&rhs, f64::EPSILON.sqrt())
                .unwrap_or_else(|_| DVector::zeros(deg + 1));
            coeffs[axis] = solved.iter().copied().collect();
        }

        ChebyshevInterpolant {
            span_start,
            span_end,
            coeffs,
        }
    }

    /// Evaluate position and velocity at `t` inside the fitted span.
    ///
    /// The value uses the `T_j` recurrence; the derivative uses
    /// `T_j'(x) = j·U_{j-1}(x)` with the second-kind recurrence, then rescales
    /// by the domain mapping (`dx/dt = 2 / (span_end - span_start)`).
    pub fn evaluate(&self, t: SecondsJ2000) -> (Vector3<Meter>, Vector3<f64>) {
        let x = normalize(t, self.span_start, self.span_end);
        let dxdt = 2.0 / (self.span_end - self.span_start);

        let mut position = Vector3::zeros();
        let mut derivative = Vector3::zeros();
        for axis in 0..3 {
            let c = &self.coeffs[axis];
            let (mut t_prev, mut t_cur) = (1.0, x);
            let (mut u_prev, mut u_cur) = (1.0, 2.0 * x);

            let mut value = c[0];
            let mut slope = 0.0;
            for (j, &cj) in c.iter().enumerate().skip(1) {
                value += cj * t_cur;
                slope += cj * j as f64 * u_prev;

                let t_next = 2.0 * x * t_cur - t_prev;
                t_prev = t_cur;
                t_cur = t_next;
                let u_next = 2.0 * x * u_cur - u_prev;
                u_prev = u_cur;
                u_cur = u_next;
            }
            position[axis] = value;
            derivative[axis] = slope * dxdt;
        }
        (position, derivative)
    }
}

/// Map `t` from `[start, end]` into the Chebyshev domain [-1, 1].
fn normalize(t: SecondsJ2000, start: SecondsJ2000, end: SecondsJ2000) -> f64 {
    2.0 * (t - start) / (end - start) - 1.0
}

/// The active interpolant of an ephemeris, chosen explicitly by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpolant {
    Hermite(HermiteInterpolant),
    Chebyshev(ChebyshevInterpolant),
}

impl Interpolant {
    pub fn evaluate(&self, t: SecondsJ2000) -> (Vector3<Meter>, Vector3<f64>) {
        match self {
            Interpolant::Hermite(h) => h.evaluate(t),
            Interpolant::Chebyshev(c) => c.evaluate(t),
        }
    }
}
