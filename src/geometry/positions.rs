//! Inertial antenna positions at an instant.
//!
//! Ground antennas rotate their fixed ground coordinates into the inertial
//! frame; space antennas resolve their orbit model first, then rotate the
//! resulting ground-fixed vector the same way. Both paths go through the
//! [`FrameTransform`] seam.

use nalgebra::Vector3;

use crate::catalog::{Antenna, Mount, Observation, Scan};
use crate::constants::{AntMap, Meter, SecondsJ2000};
use crate::diagnostics::{Diagnostic, Outcome};
use crate::ref_frame::FrameTransform;

/// Inertial position of one antenna; orbit diagnostics are appended to `sink`.
pub(crate) fn resolve_position(
    antenna: &Antenna,
    t: SecondsJ2000,
    frame: &dyn FrameTransform,
    sink: &mut Vec<Diagnostic>,
) -> Vector3<Meter> {
    match &antenna.mount {
        Mount::Ground { position, .. } => frame.terrestrial_to_inertial(position, t),
        Mount::Space { orbit, .. } => {
            let state = orbit.state_at(t).drain_into(sink);
            frame.terrestrial_to_inertial(&state.position, t)
        }
    }
}

/// Inertial positions of every antenna referenced by any active scan.
///
/// Return
/// ----------
/// * Antenna code → inertial position (meters), with any orbit-precision
///   diagnostics attached to the outcome.
pub fn antenna_positions(
    obs: &Observation,
    t: SecondsJ2000,
    frame: &dyn FrameTransform,
) -> Outcome<AntMap<Vector3<Meter>>> {
    let mut diagnostics = Vec::new();
    let mut positions = AntMap::default();
    for idx in obs.referenced_antennas() {
        if let Some(antenna) = obs.antenna(idx) {
            let p = resolve_position(antenna, t, frame, &mut diagnostics);
            positions.insert(antenna.code.clone(), p);
        }
    }
    Outcome {
        value: positions,
        diagnostics: diagnostics.into(),
    }
}

/// Inertial positions of the antennas of one scan (stale indices dropped).
/// Used by the (u,v) sampler, which needs fresh positions at every instant.
pub(crate) fn scan_antenna_positions(
    obs: &Observation,
    scan: &Scan,
    t: SecondsJ2000,
    frame: &dyn FrameTransform,
    sink: &mut Vec<Diagnostic>,
) -> AntMap<Vector3<Meter>> {
    let mut positions = AntMap::default();
    for antenna in obs.scan_antennas(scan) {
        let p = resolve_position(antenna, t, frame, sink);
        positions.insert(antenna.code.clone(), p);
    }
    positions
}
