//! Per-antenna source visibility.
//!
//! Ground antennas see the source when its local elevation and azimuth fall
//! inside the antenna's configured ranges. Space antennas use the simplified
//! planning test: inertial range from Earth center below the configured
//! threshold, and pitch/yaw allowed ranges both containing zero. The threshold
//! and attitude rule are planning heuristics carried in
//! [`CalcConfig`](super::CalcConfig), not occlusion physics.

use nalgebra::Vector3;

use crate::catalog::{Mount, Observation, Scan};
use crate::constants::{AntMap, Meter, SecondsJ2000, RADEG};
use crate::ref_frame::{FrameTransform, GeodeticSite};

use super::CalcConfig;

/// Visibility of the scan's source from each of the scan's antennas at `t`.
///
/// Empty for an off-source scan or a stale source index. Antennas whose
/// position could not be resolved are reported not visible.
pub fn source_visibility(
    obs: &Observation,
    scan: &Scan,
    t: SecondsJ2000,
    frame: &dyn FrameTransform,
    config: &CalcConfig,
    positions: &AntMap<Vector3<Meter>>,
) -> AntMap<bool> {
    let mut visibility = AntMap::default();
    let Some(source) = obs.scan_source(scan) else {
        return visibility;
    };

    for antenna in obs.scan_antennas(scan) {
        let visible = match &antenna.mount {
            Mount::Space {
                pitch_range,
                yaw_range,
                ..
            } => {
                let in_range = positions
                    .get(&antenna.code)
                    .map(|p| p.norm() < config.space_visibility_range)
                    .unwrap_or(false);
                in_range && pitch_range.contains_zero() && yaw_range.contains_zero()
            }
            Mount::Ground {
                position,
                elevation_range,
                azimuth_range,
            } => {
                let site = GeodeticSite::from_cartesian(position);
                let (elevation, azimuth) =
                    frame.horizontal_coordinates(source.ra, source.dec, &site, t);
                elevation_range.contains(elevation / RADEG)
                    && azimuth_range.contains(azimuth / RADEG)
            }
        };
        visibility.insert(antenna.code.clone(), visible);
    }
    visibility
}
