//! # Per-scan result cache
//!
//! [`ResultCache`] maps a scan identifier to its [`ScanResults`] block set.
//! Every block is an `Option` slot: a full recalculation fills them all, a
//! lazy accessor fills one on demand through [`block_or_insert`], and writing
//! a slot twice with the same inputs is idempotent by construction (the
//! pipeline is deterministic and single-threaded).

use std::collections::HashMap;

use ahash::RandomState;
use nalgebra::Vector3;

use crate::constants::{AntCode, AntMap, MegaHertz, Meter, Radian, ScanId};
use crate::diagnostics::Diagnostic;

/// An unordered antenna pair, displayed and keyed as `"A-B"` in the order the
/// pair was formed. Computing a baseline for `"B-A"` yields the negated vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaselineKey {
    pub first: AntCode,
    pub second: AntCode,
}

impl BaselineKey {
    pub fn new(first: impl Into<AntCode>, second: impl Into<AntCode>) -> Self {
        BaselineKey {
            first: first.into(),
            second: second.into(),
        }
    }

    /// The same pair in the opposite order.
    pub fn swapped(&self) -> Self {
        BaselineKey {
            first: self.second.clone(),
            second: self.first.clone(),
        }
    }
}

impl std::fmt::Display for BaselineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.first, self.second)
    }
}

/// Hash map keyed by antenna pair.
pub type BaselineMap<V> = HashMap<BaselineKey, V, RandomState>;

/// One (u, v) sample, meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvPoint {
    pub u: Meter,
    pub v: Meter,
}

/// Equal-area sky projection of the scan: the source point and, per ground
/// antenna, the sampled boresight track with its minimum distance to the
/// source point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkyTrack {
    /// Projected source point; `None` for an off-source scan.
    pub source_point: Option<(f64, f64)>,
    /// Projected boresight track per ground antenna, sampled over the scan.
    pub tracks: AntMap<Vec<(f64, f64)>>,
    /// Minimum Euclidean distance from the source point to each track.
    pub distances: AntMap<f64>,
}

/// Field-of-view entry of one antenna at one scan frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct FovEntry {
    pub frequency: MegaHertz,
    /// Diffraction-limited beam radius, radians.
    pub beam_radius: Radian,
    /// Indices of the active sources inside the beam around boresight.
    pub sources_in_beam: Vec<usize>,
}

/// Single-dish field of view at the scan start.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldOfView {
    /// Per antenna, one entry per scan frequency.
    pub entries: AntMap<Vec<FovEntry>>,
    /// Sun's local (elevation, azimuth) per ground antenna, radians.
    pub sun_horizontal: AntMap<(Radian, Radian)>,
}

/// A sampled 1-D beam response cut, peak-normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamPattern {
    /// Angular offsets (radians) for a single dish, image-plane offsets for
    /// a synthesized VLBI beam.
    pub offsets: Vec<f64>,
    pub response: Vec<f64>,
}

/// Beam block of a scan.
#[derive(Debug, Clone, PartialEq)]
pub enum BeamBlock {
    /// Analytic Gaussian beam per antenna (first scan frequency).
    SingleDish(AntMap<BeamPattern>),
    /// Synthesized beam from the gridded (u,v) density; `None` when the scan
    /// produced no (u,v) points.
    Vlbi(Option<BeamPattern>),
}

/// The named result blocks of one scan. Blocks not yet computed are `None`;
/// sensitivity values that legitimately have no meaning (empty table,
/// out-of-range frequency) are `Some` maps containing `None` entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScanResults {
    pub antenna_positions: Option<AntMap<Vector3<Meter>>>,
    pub visibility: Option<AntMap<bool>>,
    pub baselines: Option<BaselineMap<Vector3<Meter>>>,
    pub uv_points: Option<BaselineMap<Vec<UvPoint>>>,
    /// Per scan-frequency index: antenna code → noise figure (undefined allowed).
    pub antenna_sensitivity: Option<Vec<(usize, AntMap<Option<f64>>)>>,
    /// Per scan-frequency index: baseline → combined sensitivity.
    pub baseline_sensitivity: Option<Vec<(usize, BaselineMap<Option<f64>>)>>,
    pub sky_track: Option<SkyTrack>,
    pub field_of_view: Option<FieldOfView>,
    /// Sun-source separation at scan start, radians; inner `None` when off-source.
    pub sun_separation: Option<Option<Radian>>,
    pub beam: Option<BeamBlock>,
    /// Precision diagnostics raised while filling this scan's blocks.
    pub diagnostics: Vec<Diagnostic>,
}

/// Fill an optional block on miss and hand back the stored value.
pub fn block_or_insert<T>(slot: &mut Option<T>, compute: impl FnOnce() -> T) -> &T {
    slot.get_or_insert_with(compute)
}

/// Scan-keyed result storage owned by the calculation layer.
#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    blocks: HashMap<ScanId, ScanResults, RandomState>,
}

impl ResultCache {
    pub fn new() -> Self {
        ResultCache::default()
    }

    /// Drop every block; done at the start of a full recalculation.
    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    pub fn get(&self, id: ScanId) -> Option<&ScanResults> {
        self.blocks.get(&id)
    }

    /// The (possibly empty) block set of a scan, created on first access.
    pub fn entry(&mut self, id: ScanId) -> &mut ScanResults {
        self.blocks.entry(id).or_default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ScanId, &ScanResults)> {
        self.blocks.iter()
    }
}
