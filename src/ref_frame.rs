//! # Reference-frame boundary
//!
//! The engine consumes frame conversions through the [`FrameTransform`] trait:
//! rotation of a ground-fixed Cartesian position into the celestial inertial
//! frame at a given instant, and conversion of a celestial coordinate into
//! local horizon (elevation/azimuth) coordinates for an observing site. The
//! geometry calculator only ever talks to this trait, so a higher-precision
//! astronomical library can be slotted in without touching the pipeline.
//!
//! [`EarthRotationFrame`] is the default implementation: a pure Earth-rotation
//! model built on the GMST polynomial of [`time`](crate::time) (no precession,
//! nutation or polar motion). That matches the precision class of the rest of
//! the engine.
//!
//! The module also hosts the low-precision solar position used by the
//! field-of-view and sun-separation stages.

use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::constants::{Meter, Radian, SecondsJ2000, DPI, RADEG, SECONDS_PER_DAY};
use crate::time::gmst_at;

/// Rotation matrix of angle `alpha` around coordinate axis `k` (0 = X, 1 = Y, 2 = Z).
pub fn rotmt(alpha: Radian, k: usize) -> Matrix3<f64> {
    let axis = match k {
        0 => Vector3::x_axis(),
        1 => Vector3::y_axis(),
        2 => Vector3::z_axis(),
        _ => panic!("**** ROTMT: invalid axis index {k} (must be 0,1,2) ****"),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Geocentric site coordinates of a ground antenna, derived from its
/// ground-fixed Cartesian position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticSite {
    /// East longitude, radians
    pub longitude: Radian,
    /// Geocentric latitude, radians
    pub latitude: Radian,
}

impl GeodeticSite {
    /// Build a site from a ground-fixed Cartesian position in meters.
    pub fn from_cartesian(position: &Vector3<Meter>) -> Self {
        let longitude = position.y.atan2(position.x);
        let latitude = position.z.atan2(position.xy().norm());
        GeodeticSite {
            longitude,
            latitude,
        }
    }
}

/// Conversions between the ground-fixed rotating frame and the celestial
/// inertial frame, and between celestial and local horizon coordinates.
pub trait FrameTransform {
    /// Rotate a ground-fixed Cartesian position (meters) into the inertial
    /// frame for the instant `t`.
    fn terrestrial_to_inertial(&self, position: &Vector3<Meter>, t: SecondsJ2000)
        -> Vector3<Meter>;

    /// Apparent local horizon coordinates of a celestial direction for a site
    /// at the instant `t`.
    ///
    /// Return
    /// ----------
    /// * `(elevation, azimuth)` in radians; azimuth measured from north through
    ///   east, normalized to [0, 2π).
    fn horizontal_coordinates(
        &self,
        ra: Radian,
        dec: Radian,
        site: &GeodeticSite,
        t: SecondsJ2000,
    ) -> (Radian, Radian);

    /// Celestial direction currently seen at the given local horizon
    /// coordinates (inverse of [`horizontal_coordinates`](Self::horizontal_coordinates)).
    fn celestial_from_horizontal(
        &self,
        elevation: Radian,
        azimuth: Radian,
        site: &GeodeticSite,
        t: SecondsJ2000,
    ) -> (Radian, Radian);
}

/// Pure Earth-rotation frame model: the inertial frame is the ground-fixed
/// frame rotated by GMST around the polar axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct EarthRotationFrame;

impl EarthRotationFrame {
    /// Local sidereal time of a site, radians in [0, 2π).
    pub fn local_sidereal_time(&self, site: &GeodeticSite, t: SecondsJ2000) -> Radian {
        (gmst_at(t) + site.longitude).rem_euclid(DPI)
    }
}

impl FrameTransform for EarthRotationFrame {
    fn terrestrial_to_inertial(
        &self,
        position: &Vector3<Meter>,
        t: SecondsJ2000,
    ) -> Vector3<Meter> {
        rotmt(gmst_at(t), 2) * position
    }

    fn horizontal_coordinates(
        &self,
        ra: Radian,
        dec: Radian,
        site: &GeodeticSite,
        t: SecondsJ2000,
    ) -> (Radian, Radian) {
        let hour_angle = self.local_sidereal_time(site, t) - ra;
        let (sin_h, cos_h) = hour_angle.sin_cos();
        let (sin_dec, cos_dec) = dec.sin_cos();
        let (sin_lat, cos_lat) = site.latitude.sin_cos();

        let elevation = (sin_lat * sin_dec + cos_lat * cos_dec * cos_h).asin();
        let azimuth = (-cos_dec * sin_h)
            .atan2(sin_dec * cos_lat - cos_dec * sin_lat * cos_h)
            .rem_euclid(DPI);

        (elevation, azimuth)
    }

    fn celestial_from_horizontal(
        &self,
        elevation: Radian,
        azimuth: Radian,
        site: &GeodeticSite,
        t: SecondsJ2000,
    ) -> (Radian, Radian) {
        let (sin_el, cos_el) = elevation.sin_cos();
        let (sin_az, cos_az) = azimuth.sin_cos();
        let (sin_lat, cos_lat) = site.latitude.sin_cos();

        let sin_dec = sin_el * sin_lat + cos_el * cos_lat * cos_az;
        let dec = sin_dec.asin();
        let hour_angle = (-sin_az * cos_el).atan2(sin_el * cos_lat - cos_el * sin_lat * cos_az);
        let ra = (self.local_sidereal_time(site, t) - hour_angle).rem_euclid(DPI);

        (ra, dec)
    }
}

/// Low-precision apparent solar position (right ascension, declination) in
/// radians at the instant `t`.
///
/// Mean-element formulation (Astronomical Almanac low-accuracy series):
/// accurate to about 0.01°, which is ample for the field-of-view and
/// sun-avoidance checks it feeds.
pub fn sun_radec(t: SecondsJ2000) -> (Radian, Radian) {
    let n = t / SECONDS_PER_DAY; // days since J2000.0

    // Mean longitude and mean anomaly of the Sun, degrees
    let l = (280.460 + 0.9856474 * n).rem_euclid(360.0);
    let g = ((357.528 + 0.9856003 * n).rem_euclid(360.0)) * RADEG;

    // Ecliptic longitude with the equation-of-center correction
    let lambda = (l + 1.915 * g.sin() + 0.020 * (2.0 * g).sin()) * RADEG;

    // Mean obliquity of the ecliptic
    let epsilon = (23.439 - 4.0e-7 * n) * RADEG;

    let ra = (epsilon.cos() * lambda.sin()).atan2(lambda.cos()).rem_euclid(DPI);
    let dec = (epsilon.sin() * lambda.sin()).asin();
    (ra, dec)
}

/// Angular separation between two celestial directions, radians.
pub fn angular_separation(ra1: Radian, dec1: Radian, ra2: Radian, dec2: Radian) -> Radian {
    let cos_sep =
        dec1.sin() * dec2.sin() + dec1.cos() * dec2.cos() * (ra1 - ra2).cos();
    cos_sep.clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod ref_frame_test {
    use super::*;

    #[test]
    fn test_rotmt_z_quarter_turn() {
        let r = rotmt(std::f64::consts::FRAC_PI_2, 2);
        let v = r * Vector3::new(1.0, 0.0, 0.0);
        assert!((v - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_terrestrial_to_inertial_preserves_norm() {
        let frame = EarthRotationFrame;
        let p = Vector3::new(4_075_539.0, 931_735.0, 4_801_629.0);
        let q = frame.terrestrial_to_inertial(&p, 86_400.0 * 123.25);
        assert!((p.norm() - q.norm()).abs() < 1e-6);
        // The polar component is untouched by an Earth-rotation model
        assert!((p.z - q.z).abs() < 1e-9);
    }

    #[test]
    fn test_site_from_cartesian() {
        let site = GeodeticSite::from_cartesian(&Vector3::new(0.0, 6_378_137.0, 0.0));
        assert!((site.longitude - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!(site.latitude.abs() < 1e-12);

        let pole = GeodeticSite::from_cartesian(&Vector3::new(0.0, 0.0, 6_356_752.3));
        assert!((pole.latitude - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_source_at_zenith() {
        // A source whose declination equals the site latitude culminates at the
        // zenith when its hour angle is zero.
        let frame = EarthRotationFrame;
        let site = GeodeticSite {
            longitude: 0.3,
            latitude: 0.7,
        };
        let t = 1_000_000.0;
        let ra = frame.local_sidereal_time(&site, t);
        let (el, _az) = frame.horizontal_coordinates(ra, site.latitude, &site, t);
        assert!((el - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_horizontal_round_trip() {
        let frame = EarthRotationFrame;
        let site = GeodeticSite {
            longitude: -1.2,
            latitude: 0.45,
        };
        let t = 5.4e8;
        let ra = 3.27;
        let dec = -0.15;

        let (el, az) = frame.horizontal_coordinates(ra, dec, &site, t);
        let (ra_back, dec_back) = frame.celestial_from_horizontal(el, az, &site, t);
        assert!((ra_back - ra).abs() < 1e-9);
        assert!((dec_back - dec).abs() < 1e-9);
    }

    #[test]
    fn test_sun_near_march_equinox() {
        // 2000-03-20 07:35 UTC: solar declination crosses zero.
        let t = 79.0 * SECONDS_PER_DAY;
        let (_ra, dec) = sun_radec(t);
        assert!(dec.abs() < 0.01);
    }

    #[test]
    fn test_angular_separation() {
        assert!(angular_separation(0.0, 0.0, 0.0, 0.0).abs() < 1e-15);
        let sep = angular_separation(0.0, 0.0, std::f64::consts::PI, 0.0);
        assert!((sep - std::f64::consts::PI).abs() < 1e-12);
        let sep = angular_separation(1.0, 0.2, 1.0, 0.3);
        assert!((sep - 0.1).abs() < 1e-12);
    }
}
