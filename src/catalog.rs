//! # Observation catalog records
//!
//! The read-only records the geometry engine consumes: sources, antennas,
//! frequency channels and scans, gathered in an [`Observation`]. Scans refer
//! to sources/antennas/frequencies by **integer index** into the owning
//! collections; every lookup here is bounds-checked and returns `Option`, so a
//! stale index degrades into a gap in the results instead of a panic.
//!
//! Antenna ground/space polymorphism is a tagged [`Mount`] variant rather than
//! a class hierarchy, so every call site in the calculator matches
//! exhaustively.

use nalgebra::Vector3;
use smallvec::SmallVec;

use crate::constants::{AntCode, Degree, MegaHertz, Meter, ScanId, SecondsJ2000};
use crate::orbit::OrbitModel;
use crate::uvplan_errors::UvplanError;

/// VLBI array or single-dish observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationType {
    Vlbi,
    SingleDish,
}

/// A celestial source, J2000 coordinates in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub name: String,
    pub ra: f64,
    pub dec: f64,
}

/// An inclusive angular range in degrees, `min..=max`.
///
/// An azimuth range with `min > max` wraps through north
/// (e.g. 270°..=30° covers the northern horizon).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleRange {
    pub min: Degree,
    pub max: Degree,
}

impl AngleRange {
    pub fn new(min: Degree, max: Degree) -> Self {
        AngleRange { min, max }
    }

    /// True if the range contains `angle` (degrees), honoring wrap-around.
    pub fn contains(&self, angle: Degree) -> bool {
        if self.min <= self.max {
            (self.min..=self.max).contains(&angle)
        } else {
            angle >= self.min || angle <= self.max
        }
    }

    /// True if the range contains zero, the attitude check used for
    /// space-antenna visibility.
    pub fn contains_zero(&self) -> bool {
        self.contains(0.0)
    }

    /// Midpoint of the range in degrees (the wrap-around midpoint for a
    /// wrapped range).
    pub fn midpoint(&self) -> Degree {
        if self.min <= self.max {
            (self.min + self.max) / 2.0
        } else {
            ((self.min + self.max + 360.0) / 2.0).rem_euclid(360.0)
        }
    }
}

/// Ground or space mounting of an antenna.
#[derive(Debug, Clone, PartialEq)]
pub enum Mount {
    Ground {
        /// Fixed ground coordinates, meters, ground-fixed frame.
        position: Vector3<Meter>,
        elevation_range: AngleRange,
        azimuth_range: AngleRange,
    },
    Space {
        orbit: OrbitModel,
        pitch_range: AngleRange,
        yaw_range: AngleRange,
    },
}

/// One antenna of the observation. `code` is unique (enforced upstream).
#[derive(Debug, Clone, PartialEq)]
pub struct Antenna {
    pub code: AntCode,
    pub diameter: Meter,
    /// Tabulated noise figure, (frequency MHz, value), kept sorted by frequency.
    pub noise_table: Vec<(MegaHertz, f64)>,
    pub mount: Mount,
}

impl Antenna {
    /// Build an antenna, validating the diameter and sorting the noise table.
    pub fn new(
        code: impl Into<AntCode>,
        diameter: Meter,
        mut noise_table: Vec<(MegaHertz, f64)>,
        mount: Mount,
    ) -> Result<Self, UvplanError> {
        if diameter <= 0.0 {
            return Err(UvplanError::InvalidDiameter(diameter));
        }
        noise_table.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Antenna {
            code: code.into(),
            diameter,
            noise_table,
            mount,
        })
    }

    pub fn is_space(&self) -> bool {
        matches!(self.mount, Mount::Space { .. })
    }
}

/// One frequency channel, MHz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyChannel {
    pub frequency: MegaHertz,
    pub bandwidth: MegaHertz,
}

/// A time-bounded scan. All cross-references are indices into the owning
/// [`Observation`] collections; `source` is `None` for an off-source scan.
#[derive(Debug, Clone, PartialEq)]
pub struct Scan {
    pub start: SecondsJ2000,
    pub duration: f64,
    pub source: Option<usize>,
    pub antennas: SmallVec<[usize; 8]>,
    pub frequencies: SmallVec<[usize; 4]>,
    pub active: bool,
}

impl Scan {
    pub fn end(&self) -> SecondsJ2000 {
        self.start + self.duration
    }
}

/// The observation: sources, antennas, frequency channels and scans, queried
/// by the geometry calculator through bounds-checked accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    observation_type: ObservationType,
    sources: Vec<Source>,
    antennas: Vec<Antenna>,
    frequencies: Vec<FrequencyChannel>,
    scans: Vec<Scan>,
}

impl Observation {
    pub fn new(observation_type: ObservationType) -> Self {
        Observation {
            observation_type,
            sources: Vec::new(),
            antennas: Vec::new(),
            frequencies: Vec::new(),
            scans: Vec::new(),
        }
    }

    pub fn observation_type(&self) -> ObservationType {
        self.observation_type
    }

    pub fn add_source(&mut self, source: Source) -> usize {
        self.sources.push(source);
        self.sources.len() - 1
    }

    pub fn add_antenna(&mut self, antenna: Antenna) -> usize {
        self.antennas.push(antenna);
        self.antennas.len() - 1
    }

    pub fn add_frequency(&mut self, channel: FrequencyChannel) -> usize {
        self.frequencies.push(channel);
        self.frequencies.len() - 1
    }

    pub fn add_scan(&mut self, scan: Scan) -> ScanId {
        self.scans.push(scan);
        self.scans.len() - 1
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn antennas(&self) -> &[Antenna] {
        &self.antennas
    }

    pub fn antennas_mut(&mut self) -> &mut [Antenna] {
        &mut self.antennas
    }

    pub fn frequencies(&self) -> &[FrequencyChannel] {
        &self.frequencies
    }

    pub fn scans(&self) -> &[Scan] {
        &self.scans
    }

    pub fn scans_mut(&mut self) -> &mut [Scan] {
        &mut self.scans
    }

    /// Bounds-checked lookups: a stale index is a gap, never a panic.
    pub fn source(&self, idx: usize) -> Option<&Source> {
        self.sources.get(idx)
    }

    pub fn antenna(&self, idx: usize) -> Option<&Antenna> {
        self.antennas.get(idx)
    }

    pub fn frequency(&self, idx: usize) -> Option<&FrequencyChannel> {
        self.frequencies.get(idx)
    }

    pub fn scan(&self, id: ScanId) -> Option<&Scan> {
        self.scans.get(id)
    }

    /// Active scans with their cache keys, in collection order.
    pub fn active_scans(&self) -> impl Iterator<Item = (ScanId, &Scan)> {
        self.scans
            .iter()
            .enumerate()
            .filter(|(_, scan)| scan.active)
    }

    /// The scan's source, `None` when off-source or the index is stale.
    pub fn scan_source(&self, scan: &Scan) -> Option<&Source> {
        scan.source.and_then(|idx| self.sources.get(idx))
    }

    /// Antennas referenced by the scan, stale indices silently dropped.
    pub fn scan_antennas<'a>(
        &'a self,
        scan: &'a Scan,
    ) -> impl Iterator<Item = &'a Antenna> + Clone {
        scan.antennas.iter().filter_map(|&idx| self.antennas.get(idx))
    }

    /// Frequency channels referenced by the scan, stale indices silently dropped.
    pub fn scan_frequencies<'a>(
        &'a self,
        scan: &'a Scan,
    ) -> impl Iterator<Item = (usize, &'a FrequencyChannel)> {
        scan.frequencies
            .iter()
            .filter_map(|&idx| self.frequencies.get(idx).map(|f| (idx, f)))
    }

    /// Indices of every antenna referenced by at least one active scan,
    /// deduplicated, in first-reference order.
    pub fn referenced_antennas(&self) -> Vec<usize> {
        let mut seen = vec![false; self.antennas.len()];
        let mut order = Vec::new();
        for (_, scan) in self.active_scans() {
            for &idx in &scan.antennas {
                if let Some(flag) = seen.get_mut(idx) {
                    if !*flag {
                        *flag = true;
                        order.push(idx);
                    }
                }
            }
        }
        order
    }
}

#[cfg(test)]
mod catalog_test {
    use super::*;
    use smallvec::smallvec;

    fn ground_mount() -> Mount {
        Mount::Ground {
            position: Vector3::new(4.0e6, 1.0e6, 4.5e6),
            elevation_range: AngleRange::new(5.0, 90.0),
            azimuth_range: AngleRange::new(0.0, 360.0),
        }
    }

    #[test]
    fn test_angle_range() {
        let plain = AngleRange::new(10.0, 80.0);
        assert!(plain.contains(10.0));
        assert!(plain.contains(80.0));
        assert!(!plain.contains(80.1));
        assert!(!plain.contains_zero());
        assert_eq!(plain.midpoint(), 45.0);

        let wrapped = AngleRange::new(270.0, 30.0);
        assert!(wrapped.contains(300.0));
        assert!(wrapped.contains(15.0));
        assert!(!wrapped.contains(100.0));
        assert!(wrapped.contains_zero());
        assert_eq!(wrapped.midpoint(), 330.0);
    }

    #[test]
    fn test_antenna_rejects_bad_diameter() {
        assert!(matches!(
            Antenna::new("EF", 0.0, vec![], ground_mount()),
            Err(UvplanError::InvalidDiameter(_))
        ));
    }

    #[test]
    fn test_antenna_sorts_noise_table() {
        let ant = Antenna::new(
            "EF",
            100.0,
            vec![(5000.0, 20.0), (1600.0, 19.0)],
            ground_mount(),
        )
        .unwrap();
        assert_eq!(ant.noise_table[0].0, 1600.0);
    }

    #[test]
    fn test_stale_indices_are_gaps() {
        let mut obs = Observation::new(ObservationType::Vlbi);
        obs.add_antenna(Antenna::new("EF", 100.0, vec![], ground_mount()).unwrap());
        let scan = Scan {
            start: 0.0,
            duration: 60.0,
            source: Some(7), // stale
            antennas: smallvec![0, 42], // 42 is stale
            frequencies: smallvec![],
            active: true,
        };
        obs.add_scan(scan);

        let scan = obs.scan(0).unwrap();
        assert!(obs.scan_source(scan).is_none());
        assert_eq!(obs.scan_antennas(scan).count(), 1);
        assert_eq!(obs.referenced_antennas(), vec![0]);
    }

    #[test]
    fn test_active_scans_filter() {
        let mut obs = Observation::new(ObservationType::Vlbi);
        let mut scan = Scan {
            start: 0.0,
            duration: 60.0,
            source: None,
            antennas: smallvec![],
            frequencies: smallvec![],
            active: false,
        };
        obs.add_scan(scan.clone());
        scan.active = true;
        obs.add_scan(scan);
        let active: Vec<_> = obs.active_scans().map(|(id, _)| id).collect();
        assert_eq!(active, vec![1]);
    }
}
