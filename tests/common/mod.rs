#![allow(dead_code)]

use nalgebra::Vector3;
use smallvec::smallvec;

use uvplan::catalog::{
    AngleRange, Antenna, FrequencyChannel, Mount, Observation, ObservationType, Scan, Source,
};
use uvplan::constants::DPI;
use uvplan::ref_frame::{EarthRotationFrame, GeodeticSite};

pub const EF_POSITION: (f64, f64, f64) = (4_033_947.0, 486_990.0, 4_900_431.0);
pub const WB_POSITION: (f64, f64, f64) = (3_828_445.0, 445_223.0, 5_064_921.0);

/// 3C273: RA 12h30m49.42s, Dec +12°23'28", J2000, radians.
pub fn quasar_3c273() -> Source {
    Source {
        name: "3C273".into(),
        ra: ((12.0 + 30.0 / 60.0 + 49.42 / 3600.0) * 15.0_f64).to_radians(),
        dec: (12.0 + 23.0 / 60.0 + 28.0 / 3600.0_f64).to_radians(),
    }
}

fn ground_antenna(code: &str, position: (f64, f64, f64), diameter: f64) -> Antenna {
    Antenna::new(
        code,
        diameter,
        vec![(1600.0, 19.0), (5000.0, 20.0), (8000.0, 25.0)],
        Mount::Ground {
            position: Vector3::new(position.0, position.1, position.2),
            elevation_range: AngleRange::new(0.0, 90.0),
            azimuth_range: AngleRange::new(0.0, 360.0),
        },
    )
    .unwrap()
}

fn angle_gap(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(DPI);
    d.min(DPI - d)
}

/// Instant within the first day after J2000.0 at which the source culminates
/// over the site (local sidereal time closest to the right ascension).
pub fn transit_time(site_position: (f64, f64, f64), ra: f64) -> f64 {
    let frame = EarthRotationFrame;
    let site = GeodeticSite::from_cartesian(&Vector3::new(
        site_position.0,
        site_position.1,
        site_position.2,
    ));
    (0..=(86_400 / 30))
        .map(|k| (k * 30) as f64)
        .min_by(|&a, &b| {
            angle_gap(frame.local_sidereal_time(&site, a), ra)
                .total_cmp(&angle_gap(frame.local_sidereal_time(&site, b), ra))
        })
        .unwrap()
}

/// Two-element VLBI array observing 3C273 for one hour around its transit.
pub fn vlbi_transit_observation() -> Observation {
    let mut obs = Observation::new(ObservationType::Vlbi);
    obs.add_antenna(ground_antenna("EF", EF_POSITION, 100.0));
    obs.add_antenna(ground_antenna("WB", WB_POSITION, 25.0));
    let source = quasar_3c273();
    let start = transit_time(EF_POSITION, source.ra) - 1800.0;
    obs.add_source(source);
    obs.add_frequency(FrequencyChannel {
        frequency: 4000.0,
        bandwidth: 4000.0,
    });
    obs.add_scan(Scan {
        start,
        duration: 3600.0,
        source: Some(0),
        antennas: smallvec![0, 1],
        frequencies: smallvec![0],
        active: true,
    });
    obs
}
