//! Baseline projections.
//!
//! The projection of an unordered antenna pair is the plain position-difference
//! vector in the inertial frame; it feeds the (u,v) rotation downstream.

use itertools::Itertools;
use nalgebra::Vector3;

use crate::catalog::{Observation, Scan};
use crate::constants::{AntMap, Meter};
use crate::result_cache::{BaselineKey, BaselineMap};

/// Baseline vector for every unordered pair of the scan's antennas whose
/// positions are resolved, keyed `"A-B"` in scan order. Swapping the pair
/// order negates the vector. Empty for an off-source scan, which has no
/// interferometric target.
pub fn baseline_projections(
    obs: &Observation,
    scan: &Scan,
    positions: &AntMap<Vector3<Meter>>,
) -> BaselineMap<Vector3<Meter>> {
    let mut baselines = BaselineMap::default();
    if obs.scan_source(scan).is_none() {
        return baselines;
    }
    for (a, b) in obs.scan_antennas(scan).tuple_combinations() {
        let (Some(pa), Some(pb)) = (positions.get(&a.code), positions.get(&b.code)) else {
            continue;
        };
        baselines.insert(BaselineKey::new(a.code.clone(), b.code.clone()), pa - pb);
    }
    baselines
}

#[cfg(test)]
mod baselines_test {
    use super::*;
    use crate::catalog::{AngleRange, Antenna, Mount, ObservationType, Source};
    use smallvec::smallvec;

    fn obs_with_three() -> Observation {
        let mut obs = Observation::new(ObservationType::Vlbi);
        obs.add_source(Source {
            name: "SRC".into(),
            ra: 1.0,
            dec: 0.2,
        });
        for code in ["A", "B", "C"] {
            obs.add_antenna(
                Antenna::new(
                    code,
                    25.0,
                    vec![],
                    Mount::Ground {
                        position: Vector3::zeros(),
                        elevation_range: AngleRange::new(0.0, 90.0),
                        azimuth_range: AngleRange::new(0.0, 360.0),
                    },
                )
                .unwrap(),
            );
        }
        obs.add_scan(Scan {
            start: 0.0,
            duration: 60.0,
            source: Some(0),
            antennas: smallvec![0, 1, 2],
            frequencies: smallvec![],
            active: true,
        });
        obs
    }

    #[test]
    fn test_all_pairs_and_difference() {
        let obs = obs_with_three();
        let scan = obs.scan(0).unwrap();
        let mut positions = AntMap::default();
        positions.insert("A".to_string(), Vector3::new(1.0, 0.0, 0.0));
        positions.insert("B".to_string(), Vector3::new(0.0, 2.0, 0.0));
        positions.insert("C".to_string(), Vector3::new(0.0, 0.0, 3.0));

        let baselines = baseline_projections(&obs, scan, &positions);
        assert_eq!(baselines.len(), 3);
        assert_eq!(
            baselines[&BaselineKey::new("A", "B")],
            Vector3::new(1.0, -2.0, 0.0)
        );
        assert_eq!(
            baselines[&BaselineKey::new("B", "C")],
            Vector3::new(0.0, 2.0, -3.0)
        );
    }

    #[test]
    fn test_unresolved_positions_are_gaps() {
        let obs = obs_with_three();
        let scan = obs.scan(0).unwrap();
        let mut positions = AntMap::default();
        positions.insert("A".to_string(), Vector3::zeros());
        positions.insert("B".to_string(), Vector3::zeros());
        // C missing: only the A-B pair survives
        let baselines = baseline_projections(&obs, scan, &positions);
        assert_eq!(baselines.len(), 1);
        assert!(baselines.contains_key(&BaselineKey::new("A", "B")));
    }

    #[test]
    fn test_off_source_scan_is_empty() {
        let mut obs = obs_with_three();
        obs.add_scan(Scan {
            source: None,
            ..obs.scan(0).unwrap().clone()
        });
        let scan = obs.scan(1).unwrap();
        let mut positions = AntMap::default();
        positions.insert("A".to_string(), Vector3::zeros());
        positions.insert("B".to_string(), Vector3::zeros());
        assert!(baseline_projections(&obs, scan, &positions).is_empty());
    }
}
