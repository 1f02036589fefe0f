mod common;

use std::fmt::Write as _;

use approx::assert_relative_eq;
use camino::Utf8PathBuf;
use nalgebra::Vector3;
use smallvec::smallvec;

use uvplan::catalog::{
    AngleRange, Antenna, FrequencyChannel, Mount, Observation, ObservationType, Scan, Source,
};
use uvplan::constants::DPI;
use uvplan::diagnostics::Diagnostic;
use uvplan::geometry::GeometryCalculator;
use uvplan::orbit::ephemeris::Ephemeris;
use uvplan::orbit::OrbitModel;
use uvplan::result_cache::ResultCache;

use common::EF_POSITION;

const ORBIT_RADIUS_KM: f64 = 7000.0;
const ORBIT_PERIOD_S: f64 = 5828.5;

/// OEM-like text for a circular equatorial orbit sampled every 6 minutes over
/// two hours from J2000.0.
fn circular_oem_body() -> String {
    let mut body = String::from(
        "CCSDS_OEM_VERS = 2.0\n\
         META_START\n\
         OBJECT_NAME = PROBE-1\n\
         CENTER_NAME = EARTH\n\
         META_STOP\n",
    );
    let omega = DPI / ORBIT_PERIOD_S;
    for k in 0..=20 {
        let t = k as f64 * 360.0;
        let theta = omega * t;
        let minutes = 720 + (t as u64) / 60;
        writeln!(
            body,
            "2000-01-01T{:02}:{:02}:00.000 {:.6} {:.6} 0.0 {:.9} {:.9} 0.0",
            minutes / 60,
            minutes % 60,
            ORBIT_RADIUS_KM * theta.cos(),
            ORBIT_RADIUS_KM * theta.sin(),
            -ORBIT_RADIUS_KM * omega * theta.sin(),
            ORBIT_RADIUS_KM * omega * theta.cos(),
        )
        .unwrap();
    }
    body
}

fn write_temp(content: &str, name: &str) -> Utf8PathBuf {
    let dir = Utf8PathBuf::from_path_buf(std::env::temp_dir()).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn space_ground_observation(scan_start: f64) -> Observation {
    let path = write_temp(&circular_oem_body(), "uvplan_it_circular.oem");
    let mut orbit = OrbitModel::from_ephemeris(Ephemeris::read_oem_file(&path).unwrap());
    if let Some(eph) = orbit.ephemeris_mut() {
        eph.fit_hermite();
    }

    let mut obs = Observation::new(ObservationType::Vlbi);
    obs.add_antenna(
        Antenna::new(
            "EF",
            100.0,
            vec![(1600.0, 19.0), (5000.0, 20.0)],
            Mount::Ground {
                position: Vector3::new(EF_POSITION.0, EF_POSITION.1, EF_POSITION.2),
                elevation_range: AngleRange::new(0.0, 90.0),
                azimuth_range: AngleRange::new(0.0, 360.0),
            },
        )
        .unwrap(),
    );
    obs.add_antenna(
        Antenna::new(
            "RA",
            10.0,
            vec![(1600.0, 45.0), (5000.0, 50.0)],
            Mount::Space {
                orbit,
                pitch_range: AngleRange::new(-10.0, 10.0),
                yaw_range: AngleRange::new(-10.0, 10.0),
            },
        )
        .unwrap(),
    );
    // High declination keeps the source above the EF horizon all day
    obs.add_source(Source {
        name: "CIRC".into(),
        ra: 1.0,
        dec: 1.2,
    });
    obs.add_frequency(FrequencyChannel {
        frequency: 1600.0,
        bandwidth: 16.0,
    });
    obs.add_scan(Scan {
        start: scan_start,
        duration: 3600.0,
        source: Some(0),
        antennas: smallvec![0, 1],
        frequencies: smallvec![0],
        active: true,
    });
    obs
}

#[test]
fn test_oem_file_drives_the_orbit_model() {
    let path = write_temp(&circular_oem_body(), "uvplan_it_readback.oem");
    let mut eph = Ephemeris::read_oem_file(&path).unwrap();
    assert_eq!(eph.samples().len(), 21);
    let (start, end) = eph.span();
    assert_relative_eq!(start, 0.0, epsilon = 1e-3);
    assert_relative_eq!(end, 7200.0, epsilon = 1e-3);

    eph.fit_hermite();
    let model = OrbitModel::from_ephemeris(eph);

    // Off-sample query keeps the circular radius
    let out = model.state_at(450.0);
    assert!(!out.is_degraded());
    assert_relative_eq!(
        out.value.position.norm(),
        ORBIT_RADIUS_KM * 1000.0,
        max_relative = 1e-4
    );
}

#[test]
fn test_space_ground_pair_produces_uv() {
    let obs = space_ground_observation(0.0);
    let calc = GeometryCalculator::new();
    let mut cache = ResultCache::new();

    let failures = calc.calculate_all(&obs, &mut cache);
    assert!(failures.is_empty());

    let results = cache.get(0).unwrap();
    let visibility = results.visibility.as_ref().unwrap();
    assert_eq!(visibility["EF"], true);
    assert_eq!(visibility["RA"], true);

    let uv = results.uv_points.as_ref().unwrap();
    let points = uv.values().next().unwrap();
    assert_eq!(points.len(), calc.config().uv_time_samples);

    // Fitted interpolant, in-span queries: no degraded-precision diagnostics
    assert!(results.diagnostics.is_empty());
}

#[test]
fn test_scan_outside_ephemeris_span_degrades() {
    // The scan starts two days after the ephemeris ends
    let obs = space_ground_observation(200_000.0);
    let calc = GeometryCalculator::new();
    let mut cache = ResultCache::new();

    let failures = calc.calculate_all(&obs, &mut cache);
    assert!(failures.is_empty());

    let results = cache.get(0).unwrap();
    assert!(results
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::OutsideEphemerisSpan { .. })));

    // The fallback state is Earth center: the space antenna drops out but the
    // blocks themselves are present
    let visibility = results.visibility.as_ref().unwrap();
    assert_eq!(visibility["RA"], true); // norm 0 is inside the range gate
    assert!(results.uv_points.is_some());
}
