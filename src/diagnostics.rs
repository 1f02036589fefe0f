//! # Structured precision diagnostics
//!
//! Several orbit and geometry paths are allowed to continue with **degraded
//! precision** instead of failing: a query time outside the ephemeris span, a
//! Kepler solve that hits its iteration cap, an ephemeris evaluated before any
//! interpolant has been fitted. Those situations are part of each function's
//! contract, so they travel with the return value as [`Diagnostic`] entries
//! inside an [`Outcome`] rather than through a global logger.
//!
//! An [`Outcome`] is deliberately cheap: the common case carries no diagnostic
//! and allocates nothing.

use smallvec::SmallVec;

use crate::constants::SecondsJ2000;

/// A non-fatal precision signal attached to a computed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// The Kepler solver stopped at `max_iterations` before reaching its tolerance.
    /// The best estimate is returned; `residual` is `|x − e·sin(x) − M|` at exit.
    KeplerNonConvergence { iterations: usize, residual: f64 },

    /// The queried time falls outside the ephemeris sample span; the antenna's
    /// static fallback state was returned instead of an extrapolation.
    OutsideEphemerisSpan {
        query: SecondsJ2000,
        span_start: SecondsJ2000,
        span_end: SecondsJ2000,
    },

    /// No interpolant has been fitted yet; linear interpolation between the two
    /// bracketing samples was used.
    LinearFallback { query: SecondsJ2000 },
}

/// A computed value bundled with any precision diagnostics raised on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub diagnostics: SmallVec<[Diagnostic; 2]>,
}

impl<T> Outcome<T> {
    /// A clean result with no diagnostic attached.
    pub fn clean(value: T) -> Self {
        Outcome {
            value,
            diagnostics: SmallVec::new(),
        }
    }

    /// A result carrying a single diagnostic.
    pub fn degraded(value: T, diagnostic: Diagnostic) -> Self {
        let mut diagnostics = SmallVec::new();
        diagnostics.push(diagnostic);
        Outcome { value, diagnostics }
    }

    /// True if any diagnostic was raised while producing the value.
    pub fn is_degraded(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Transform the value, keeping the diagnostics.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }

    /// Move this outcome's diagnostics into an external sink and return the bare value.
    pub fn drain_into(self, sink: &mut Vec<Diagnostic>) -> T {
        sink.extend(self.diagnostics);
        self.value
    }
}
