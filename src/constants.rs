//! # Constants and type definitions for uvplan
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! definitions** used throughout the `uvplan` library.
//!
//! ## Overview
//!
//! - Astronomical and geophysical constants
//! - Unit conversions (degrees ↔ radians, km ↔ m, MHz ↔ Hz)
//! - Core type aliases used across the crate
//! - Container types shared by the orbit and geometry layers
//!
//! These definitions are used by all main modules, including the orbit models,
//! the reference-frame utilities, and the geometry calculator.

use std::collections::HashMap;

use ahash::RandomState;

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// MJD epoch of J2000.0 (2000-01-01 12:00:00)
pub const T2000: f64 = 51544.5;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Hours → radians
pub const RADH: f64 = DPI / 24.0;

/// Numerical epsilon used for floating-point comparisons
pub const EPS: f64 = 1e-6;

/// Earth equatorial radius in meters (GRS1980/WGS84)
pub const EARTH_MAJOR_AXIS: f64 = 6_378_137.0;

/// Geocentric gravitational constant GM⊕ in m³/s² (EGM-96)
pub const EARTH_MU: f64 = 3.986_004_418e14;

/// Speed of light in m/s
pub const VLIGHT: f64 = 2.99792458e8;

/// Kilometers → meters
pub const KM_TO_M: f64 = 1_000.0;

/// Megahertz → hertz
pub const MHZ_TO_HZ: f64 = 1e6;

/// Diffraction coefficient of the primary-beam full width (1.22 λ/D)
pub const DIFFRACTION_COEFF: f64 = 1.22;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in meters
pub type Meter = f64;
/// Frequency in megahertz
pub type MegaHertz = f64;
/// Seconds elapsed since the J2000.0 epoch (2000-01-01T12:00:00)
pub type SecondsJ2000 = f64;
/// Short station code identifying an antenna (uniqueness enforced upstream)
pub type AntCode = String;

/// Hash map keyed by antenna code, using the crate-wide hasher
pub type AntMap<V> = HashMap<AntCode, V, RandomState>;

/// Index of a scan inside the owning observation, used as the result-cache key
pub type ScanId = usize;
