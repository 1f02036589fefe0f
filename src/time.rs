//! # Time scales and sidereal rotation
//!
//! The engine keeps a single internal time representation: **seconds elapsed since
//! the J2000.0 epoch** (2000-01-01T12:00:00), aliased as
//! [`SecondsJ2000`](crate::constants::SecondsJ2000). This module provides the
//! bridges in and out of that representation (ISO-8601 timestamps through
//! [`hifitime::Epoch`], Modified Julian Date for the sidereal-time polynomial) and
//! the Greenwich Mean Sidereal Time used by every Earth-rotation dependent
//! computation in the crate.

use std::str::FromStr;

use hifitime::Epoch;

use crate::constants::{SecondsJ2000, DPI, SECONDS_PER_DAY, T2000};

/// Parse an ISO-8601 timestamp (fractional seconds allowed) into seconds since J2000.0.
///
/// Arguments
/// -----------------
/// * `stamp`: a timestamp such as `2025-03-01T12:30:00.500` (UTC assumed when no
///   time scale is given).
///
/// Return
/// ----------
/// * Seconds elapsed since 2000-01-01T12:00:00, or the underlying `hifitime`
///   parse error message.
pub fn parse_iso_to_seconds(stamp: &str) -> Result<SecondsJ2000, String> {
    let epoch = Epoch::from_str(stamp).map_err(|e| e.to_string())?;
    Ok(mjd_to_seconds(epoch.to_mjd_utc_days()))
}

/// Seconds since J2000.0 → Modified Julian Date (days).
pub fn seconds_to_mjd(t: SecondsJ2000) -> f64 {
    T2000 + t / SECONDS_PER_DAY
}

/// Modified Julian Date (days) → seconds since J2000.0.
pub fn mjd_to_seconds(mjd: f64) -> SecondsJ2000 {
    (mjd - T2000) * SECONDS_PER_DAY
}

/// Compute the Greenwich Mean Sidereal Time (GMST) in radians
/// for a given Modified Julian Date.
///
/// This function implements the IAU 1982 polynomial formula for the mean
/// sidereal time at 0h, plus the fractional-day correction term due to Earth's
/// rotation rate.
///
/// Arguments
/// -----------------
/// * `tjm` - Modified Julian Date (MJD)
///
/// Return
/// ----------
/// * GMST angle in radians, normalized to the interval [0, 2π).
///
/// Details
/// ----------
/// The GMST is computed in two steps:
/// 1. A cubic polynomial (coefficients C0–C3) gives GMST at 0h in seconds for
///    the given date.
/// 2. The contribution of Earth's rotation during the fractional day is added
///    using the factor `RAP`, which converts solar days to sidereal days.
pub fn gmst(tjm: f64) -> f64 {
    // Polynomial coefficients for GMST at 0h (in seconds)
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    // Ratio of sidereal day to solar day
    const RAP: f64 = 1.00273790934;

    // Integer MJD (0h) and centuries since J2000.0
    let itjm = tjm.floor();
    let t = (itjm - T2000) / 36525.0;

    let mut gmst0 = ((C3 * t + C2) * t + C1) * t + C0;
    gmst0 *= DPI / 86400.0;

    // Fraction of the current day, scaled to sidereal rate
    let h = tjm.fract() * DPI;
    let mut gmst = gmst0 + h * RAP;

    let mut i: i64 = (gmst / DPI).floor() as i64;
    if gmst < 0.0 {
        i -= 1;
    }
    gmst -= i as f64 * DPI;

    gmst
}

/// Greenwich Mean Sidereal Time at a seconds-since-J2000 instant, in radians.
pub fn gmst_at(t: SecondsJ2000) -> f64 {
    gmst(seconds_to_mjd(t))
}
