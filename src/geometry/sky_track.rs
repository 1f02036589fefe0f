//! Whole-sky projection support: source points, antenna boresight tracks,
//! single-dish field of view and sun separation.
//!
//! The visualization layer consumes an equal-area projection of the whole sky;
//! the Hammer projection is used here. A ground antenna's "track" is its
//! boresight (the midpoint of its configured elevation/azimuth ranges)
//! converted to celestial coordinates at sampled instants of the scan and
//! projected; the distance-to-track is the minimum Euclidean distance from the
//! projected source point to any track sample.

use crate::catalog::{Mount, Observation, ObservationType, Scan};
use crate::constants::{Radian, DIFFRACTION_COEFF, MHZ_TO_HZ, RADEG, VLIGHT};
use crate::ref_frame::{angular_separation, sun_radec, FrameTransform, GeodeticSite};
use crate::result_cache::{FieldOfView, FovEntry, SkyTrack};

use super::CalcConfig;

/// Hammer equal-area projection of a celestial direction.
///
/// Longitude is taken as `ra − π` so the whole sky maps into the canonical
/// ellipse with RA 12h at the center. Output coordinates are dimensionless,
/// `x ∈ [-2√2, 2√2]`, `y ∈ [-√2, √2]`.
pub fn hammer_projection(ra: Radian, dec: Radian) -> (f64, f64) {
    let lambda = ra - std::f64::consts::PI;
    let gamma = (1.0 + dec.cos() * (lambda / 2.0).cos()).sqrt();
    let x = 2.0 * std::f64::consts::SQRT_2 * dec.cos() * (lambda / 2.0).sin() / gamma;
    let y = std::f64::consts::SQRT_2 * dec.sin() / gamma;
    (x, y)
}

/// Minimum Euclidean distance from `point` to any sample of `track`;
/// `None` for an empty track.
pub fn track_distance(point: (f64, f64), track: &[(f64, f64)]) -> Option<f64> {
    track
        .iter()
        .map(|&(x, y)| ((x - point.0).powi(2) + (y - point.1).powi(2)).sqrt())
        .min_by(|a, b| a.total_cmp(b))
}

/// Projected source point, ground-antenna boresight tracks sampled over the
/// scan, and per-antenna distances to the source point.
pub fn sky_tracks(
    obs: &Observation,
    scan: &Scan,
    frame: &dyn FrameTransform,
    config: &CalcConfig,
) -> SkyTrack {
    let mut block = SkyTrack::default();

    let source_point = obs
        .scan_source(scan)
        .map(|src| hammer_projection(src.ra, src.dec));
    block.source_point = source_point;

    let samples = config.track_samples.max(2);
    let step = scan.duration / (samples - 1) as f64;

    for antenna in obs.scan_antennas(scan) {
        let Mount::Ground {
            position,
            elevation_range,
            azimuth_range,
        } = &antenna.mount
        else {
            continue;
        };
        let site = GeodeticSite::from_cartesian(position);
        let boresight_el = elevation_range.midpoint() * RADEG;
        let boresight_az = azimuth_range.midpoint() * RADEG;

        let track: Vec<(f64, f64)> = (0..samples)
            .map(|k| {
                let t = scan.start + k as f64 * step;
                let (ra, dec) =
                    frame.celestial_from_horizontal(boresight_el, boresight_az, &site, t);
                hammer_projection(ra, dec)
            })
            .collect();

        if let Some(distance) = source_point.and_then(|p| track_distance(p, &track)) {
            block.distances.insert(antenna.code.clone(), distance);
        }
        block.tracks.insert(antenna.code.clone(), track);
    }
    block
}

/// Diffraction-limited beam radius `1.22·λ/D` in radians.
pub fn beam_radius(diameter: f64, frequency_mhz: f64) -> Radian {
    let wavelength = VLIGHT / (frequency_mhz * MHZ_TO_HZ);
    DIFFRACTION_COEFF * wavelength / diameter
}

/// Single-dish field of view at the scan start: per antenna and per scan
/// frequency, the beam radius and the active sources falling inside it around
/// the scan's boresight source, plus the Sun's local position per ground
/// antenna.
pub fn field_of_view(obs: &Observation, scan: &Scan, frame: &dyn FrameTransform) -> FieldOfView {
    let mut block = FieldOfView::default();
    if obs.observation_type() != ObservationType::SingleDish {
        return block;
    }

    let boresight = obs.scan_source(scan);
    let (sun_ra, sun_dec) = sun_radec(scan.start);

    for antenna in obs.scan_antennas(scan) {
        let entries: Vec<FovEntry> = obs
            .scan_frequencies(scan)
            .map(|(_, channel)| {
                let radius = beam_radius(antenna.diameter, channel.frequency);
                let sources_in_beam = boresight
                    .map(|b| {
                        obs.sources()
                            .iter()
                            .enumerate()
                            .filter(|(_, s)| {
                                angular_separation(b.ra, b.dec, s.ra, s.dec) <= radius
                            })
                            .map(|(idx, _)| idx)
                            .collect()
                    })
                    .unwrap_or_default();
                FovEntry {
                    frequency: channel.frequency,
                    beam_radius: radius,
                    sources_in_beam,
                }
            })
            .collect();
        block.entries.insert(antenna.code.clone(), entries);

        if let Mount::Ground { position, .. } = &antenna.mount {
            let site = GeodeticSite::from_cartesian(position);
            let sun_hor = frame.horizontal_coordinates(sun_ra, sun_dec, &site, scan.start);
            block.sun_horizontal.insert(antenna.code.clone(), sun_hor);
        }
    }
    block
}

/// Angular separation between the Sun and the scan source at the scan start;
/// `None` for an off-source scan.
pub fn sun_separation(obs: &Observation, scan: &Scan) -> Option<Radian> {
    let source = obs.scan_source(scan)?;
    let (sun_ra, sun_dec) = sun_radec(scan.start);
    Some(angular_separation(source.ra, source.dec, sun_ra, sun_dec))
}

#[cfg(test)]
mod sky_track_test {
    use super::*;
    use crate::catalog::{AngleRange, Antenna, Source};
    use crate::ref_frame::EarthRotationFrame;
    use nalgebra::Vector3;
    use smallvec::smallvec;

    #[test]
    fn test_hammer_projection_center_and_bounds() {
        // RA 12h, Dec 0 maps to the origin
        let (x, y) = hammer_projection(std::f64::consts::PI, 0.0);
        assert!(x.abs() < 1e-12 && y.abs() < 1e-12);

        // Poles map onto the minor axis
        let (x, y) = hammer_projection(std::f64::consts::PI, std::f64::consts::FRAC_PI_2);
        assert!(x.abs() < 1e-12);
        assert!((y - std::f64::consts::SQRT_2).abs() < 1e-12);

        // Everything stays inside the canonical ellipse
        for k in 0..64 {
            let ra = k as f64 * 0.1;
            let dec = (k as f64 * 0.05).sin() * 1.5;
            let (x, y) = hammer_projection(ra, dec);
            assert!((x / (2.0 * std::f64::consts::SQRT_2)).powi(2) + (y / std::f64::consts::SQRT_2).powi(2) <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn test_track_distance() {
        let track = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)];
        assert_eq!(track_distance((1.0, 1.0), &track), Some(1.0));
        assert_eq!(track_distance((0.0, 0.0), &track), Some(0.0));
        assert_eq!(track_distance((0.0, 0.0), &[]), None);
    }

    #[test]
    fn test_beam_radius() {
        // 100 m dish at 1000 MHz: 1.22 * 0.29979 m / 100 m
        let radius = beam_radius(100.0, 1000.0);
        assert!((radius - 1.22 * 0.299792458 / 100.0).abs() < 1e-12);
    }

    fn single_dish_obs() -> Observation {
        let mut obs = Observation::new(ObservationType::SingleDish);
        obs.add_source(Source {
            name: "TARGET".into(),
            ra: 2.0,
            dec: 0.5,
        });
        obs.add_source(Source {
            name: "NEIGHBOR".into(),
            ra: 2.0 + 1e-5,
            dec: 0.5,
        });
        obs.add_source(Source {
            name: "FAR".into(),
            ra: 4.0,
            dec: -0.5,
        });
        obs.add_antenna(
            Antenna::new(
                "EF",
                100.0,
                vec![],
                Mount::Ground {
                    position: Vector3::new(4.0e6, 1.0e6, 4.5e6),
                    elevation_range: AngleRange::new(10.0, 80.0),
                    azimuth_range: AngleRange::new(0.0, 360.0),
                },
            )
            .unwrap(),
        );
        obs.add_frequency(crate::catalog::FrequencyChannel {
            frequency: 1000.0,
            bandwidth: 16.0,
        });
        obs.add_scan(Scan {
            start: 0.0,
            duration: 600.0,
            source: Some(0),
            antennas: smallvec![0],
            frequencies: smallvec![0],
            active: true,
        });
        obs
    }

    #[test]
    fn test_field_of_view_finds_neighbor() {
        let obs = single_dish_obs();
        let frame = EarthRotationFrame;
        let fov = field_of_view(&obs, obs.scan(0).unwrap(), &frame);
        let entries = &fov.entries["EF"];
        assert_eq!(entries.len(), 1);
        // The target itself and the 1e-5 rad neighbor are in the beam, FAR is not
        assert_eq!(entries[0].sources_in_beam, vec![0, 1]);
        assert!(fov.sun_horizontal.contains_key("EF"));
    }

    #[test]
    fn test_sky_tracks_have_samples_and_distance() {
        let obs = single_dish_obs();
        let frame = EarthRotationFrame;
        let config = CalcConfig::default();
        let block = sky_tracks(&obs, obs.scan(0).unwrap(), &frame, &config);
        assert!(block.source_point.is_some());
        assert_eq!(block.tracks["EF"].len(), config.track_samples);
        assert!(block.distances["EF"] >= 0.0);
    }

    #[test]
    fn test_sun_separation_off_source() {
        let mut obs = single_dish_obs();
        obs.add_scan(Scan {
            source: None,
            ..obs.scan(0).unwrap().clone()
        });
        assert!(sun_separation(&obs, obs.scan(1).unwrap()).is_none());
        assert!(sun_separation(&obs, obs.scan(0).unwrap()).is_some());
    }
}
