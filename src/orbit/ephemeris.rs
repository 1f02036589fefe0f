//! # Discretized ephemerides and the OEM-like text reader
//!
//! An [`Ephemeris`] holds an ascending sequence of time/position/velocity
//! samples in the ground-fixed frame (meters, m/s, seconds since J2000.0) and
//! the optional interpolant fitted over them.
//!
//! ## File format
//! -----------------
//! The reader understands the CCSDS-OEM-like text layout:
//! - everything up to and including a `META_STOP` line is header and ignored,
//! - a `COVARIANCE_START` line ends the data section,
//! - each data line carries exactly 7 whitespace-separated fields: an ISO-8601
//!   timestamp (fractional seconds allowed), X/Y/Z position in **kilometers**,
//!   VX/VY/VZ velocity in **kilometers per second**.
//!
//! Malformed or short data lines are skipped; the load fails only when fewer
//! than 2 usable samples remain, or when the file is missing.

use std::fs::File;
use std::io::{BufRead, BufReader};

use camino::Utf8Path;
use nalgebra::Vector3;

use crate::constants::{Meter, SecondsJ2000, KM_TO_M};
use crate::time::parse_iso_to_seconds;
use crate::uvplan_errors::UvplanError;

use super::interpolant::{ChebyshevInterpolant, HermiteInterpolant, Interpolant};

/// Header/data separator of the OEM-like format.
const META_STOP: &str = "META_STOP";
/// Marker ending the data section when a covariance block follows.
const COVARIANCE_START: &str = "COVARIANCE_START";

/// One ephemeris sample: instant, position and velocity in the ground-fixed
/// frame (seconds since J2000.0, meters, meters per second).
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisSample {
    pub t: SecondsJ2000,
    pub position: Vector3<Meter>,
    pub velocity: Vector3<f64>,
}

/// An ascending sample sequence plus the interpolant fitted over it.
#[derive(Debug, Clone, PartialEq)]
pub struct Ephemeris {
    samples: Vec<EphemerisSample>,
    interpolant: Option<Interpolant>,
}

impl Ephemeris {
    /// Build an ephemeris from in-memory samples (sorted by time here; at
    /// least 2 required).
    pub fn from_samples(mut samples: Vec<EphemerisSample>) -> Result<Self, UvplanError> {
        if samples.len() < 2 {
            return Err(UvplanError::EphemerisTooShort {
                path: "<samples>".into(),
                valid: samples.len(),
            });
        }
        samples.sort_by(|a, b| a.t.total_cmp(&b.t));
        Ok(Ephemeris {
            samples,
            interpolant: None,
        })
    }

    /// Read an OEM-like ephemeris text file.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: UTF-8 path of the file.
    ///
    /// Return
    /// ----------
    /// * The parsed ephemeris (interpolant not yet fitted), or
    ///   [`UvplanError::EphemerisFileNotFound`] / [`UvplanError::EphemerisTooShort`].
    pub fn read_oem_file(path: &Utf8Path) -> Result<Self, UvplanError> {
        if !path.exists() {
            return Err(UvplanError::EphemerisFileNotFound(path.to_string()));
        }
        let reader = BufReader::new(File::open(path)?);

        let mut samples = Vec::new();
        let mut in_data = false;
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();

            if !in_data {
                if trimmed.starts_with(META_STOP) {
                    in_data = true;
                }
                continue;
            }
            if trimmed.starts_with(COVARIANCE_START) {
                break;
            }
            if trimmed.is_empty() {
                continue;
            }
            if let Some(sample) = parse_data_line(trimmed) {
                samples.push(sample);
            }
        }

        if samples.len() < 2 {
            return Err(UvplanError::EphemerisTooShort {
                path: path.to_string(),
                valid: samples.len(),
            });
        }
        samples.sort_by(|a, b| a.t.total_cmp(&b.t));
        Ok(Ephemeris {
            samples,
            interpolant: None,
        })
    }

    pub fn samples(&self) -> &[EphemerisSample] {
        &self.samples
    }

    /// Time span covered by the samples, `(first, last)` in seconds since J2000.0.
    pub fn span(&self) -> (SecondsJ2000, SecondsJ2000) {
        (
            self.samples[0].t,
            self.samples[self.samples.len() - 1].t,
        )
    }

    /// True if `t` lies inside the sample span.
    pub fn covers(&self, t: SecondsJ2000) -> bool {
        let (start, end) = self.span();
        (start..=end).contains(&t)
    }

    /// The currently active interpolant, if one has been fitted.
    pub fn interpolant(&self) -> Option<&Interpolant> {
        self.interpolant.as_ref()
    }

    /// Fit and activate the piecewise cubic Hermite interpolant.
    pub fn fit_hermite(&mut self) {
        self.interpolant = Some(Interpolant::Hermite(HermiteInterpolant::fit(&self.samples)));
    }

    /// Fit and activate the global Chebyshev interpolant with the given degree
    /// bound.
    pub fn fit_chebyshev(&mut self, degree: usize) {
        self.interpolant = Some(Interpolant::Chebyshev(ChebyshevInterpolant::fit(
            &self.samples,
            degree,
        )));
    }

    /// Drop the fitted interpolant (evaluation falls back to linear).
    pub fn clear_interpolant(&mut self) {
        self.interpolant = None;
    }

    /// Replace the sample sequence, invalidating any fitted interpolant.
    pub fn replace_samples(&mut self, samples: Vec<EphemerisSample>) -> Result<(), UvplanError> {
        *self = Ephemeris::from_samples(samples)?;
        Ok(())
    }

    /// Index `i` of the bracketing interval `[t_i, t_{i+1}]` for an in-span `t`.
    pub(crate) fn bracket(&self, t: SecondsJ2000) -> usize {
        match self
            .samples
            .binary_search_by(|s| s.t.total_cmp(&t))
        {
            Ok(i) => i.min(self.samples.len() - 2),
            Err(0) => 0,
            Err(i) => (i - 1).min(self.samples.len() - 2),
        }
    }
}

/// Parse one 7-field data line; `None` for anything malformed.
fn parse_data_line(line: &str) -> Option<EphemerisSample> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 7 {
        return None;
    }
    let t = parse_iso_to_seconds(fields[0]).ok()?;
    let mut values = [0.0_f64; 6];
    for (slot, field) in values.iter_mut().zip(&fields[1..]) {
        *slot = field.parse().ok()?;
    }
    Some(EphemerisSample {
        t,
        position: Vector3::new(values[0], values[1], values[2]) * KM_TO_M,
        velocity: Vector3::new(values[3], values[4], values[5]) * KM_TO_M,
    })
}

#[cfg(test)]
mod ephemeris_test {
    use super::*;

    const OEM_BODY: &str = "\
CCSDS_OEM_VERS = 2.0
META_START
OBJECT_NAME = PROBE-1
CENTER_NAME = EARTH
META_STOP
2000-01-01T12:00:00.000 7000.0 0.0 0.0 0.0 7.5 0.0
2000-01-01T12:10:00.000 6900.0 2900.0 0.0 -3.1 7.3 0.0
2000-01-01T12:20:00.000 6500.0 5600.0 0.0 -6.0 6.6 0.0
COVARIANCE_START
2000-01-01T12:30:00.000 9.9 9.9 9.9 9.9 9.9 9.9
";

    fn write_temp(content: &str, name: &str) -> camino::Utf8PathBuf {
        let dir = camino::Utf8PathBuf::from_path_buf(std::env::temp_dir()).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_data_line() {
        let sample =
            parse_data_line("2000-01-01T12:00:00.000 7000.0 0.0 0.0 0.0 7.5 0.0").unwrap();
        assert!(sample.t.abs() < 1e-6);
        assert_eq!(sample.position, Vector3::new(7.0e6, 0.0, 0.0));
        assert_eq!(sample.velocity, Vector3::new(0.0, 7500.0, 0.0));

        assert!(parse_data_line("2000-01-01T12:00:00.000 7000.0 0.0").is_none());
        assert!(parse_data_line("garbage a b c d e f").is_none());
    }

    #[test]
    fn test_read_oem_file() {
        let path = write_temp(OEM_BODY, "uvplan_oem_ok.txt");
        let eph = Ephemeris::read_oem_file(&path).unwrap();
        // The covariance line must not be ingested
        assert_eq!(eph.samples().len(), 3);
        let (start, end) = eph.span();
        assert!(start.abs() < 1e-6);
        assert!((end - 1200.0).abs() < 1e-3);
    }

    #[test]
    fn test_read_oem_file_missing() {
        let err = Ephemeris::read_oem_file(Utf8Path::new("/nonexistent/orbit.oem")).unwrap_err();
        assert!(matches!(err, UvplanError::EphemerisFileNotFound(_)));
    }

    #[test]
    fn test_read_oem_single_valid_line_is_format_error() {
        let body = "\
META_STOP
2000-01-01T12:00:00.000 7000.0 0.0 0.0 0.0 7.5 0.0
this line is broken
";
        let path = write_temp(body, "uvplan_oem_short.txt");
        let err = Ephemeris::read_oem_file(&path).unwrap_err();
        assert!(matches!(
            err,
            UvplanError::EphemerisTooShort { valid: 1, .. }
        ));
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let body = "\
META_STOP
2000-01-01T12:00:00.000 7000.0 0.0 0.0 0.0 7.5 0.0
not-a-timestamp 1 2 3 4 5 6
2000-01-01T12:10:00.000 6900.0 2900.0 0.0 -3.1 7.3 0.0
";
        let path = write_temp(body, "uvplan_oem_skip.txt");
        let eph = Ephemeris::read_oem_file(&path).unwrap();
        assert_eq!(eph.samples().len(), 2);
    }

    #[test]
    fn test_from_samples_requires_two() {
        let one = vec![EphemerisSample {
            t: 0.0,
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
        }];
        assert!(matches!(
            Ephemeris::from_samples(one),
            Err(UvplanError::EphemerisTooShort { valid: 1, .. })
        ));
    }

    #[test]
    fn test_bracket() {
        let samples = (0..4)
            .map(|k| EphemerisSample {
                t: k as f64 * 100.0,
                position: Vector3::zeros(),
                velocity: Vector3::zeros(),
            })
            .collect();
        let eph = Ephemeris::from_samples(samples).unwrap();
        assert_eq!(eph.bracket(0.0), 0);
        assert_eq!(eph.bracket(50.0), 0);
        assert_eq!(eph.bracket(100.0), 1);
        assert_eq!(eph.bracket(299.0), 2);
        assert_eq!(eph.bracket(300.0), 2);
    }

    #[test]
    fn test_replace_samples_invalidates_interpolant() {
        let samples: Vec<_> = (0..4)
            .map(|k| EphemerisSample {
                t: k as f64 * 100.0,
                position: Vector3::new(k as f64, 0.0, 0.0),
                velocity: Vector3::new(0.01, 0.0, 0.0),
            })
            .collect();
        let mut eph = Ephemeris::from_samples(samples.clone()).unwrap();
        eph.fit_hermite();
        assert!(eph.interpolant().is_some());
        eph.replace_samples(samples).unwrap();
        assert!(eph.interpolant().is_none());
    }
}
