//! # Scan geometry calculator
//!
//! ## Overview
//!
//! The calculation layer between the [catalog](crate::catalog) and the
//! [result cache](crate::result_cache). Each result block of a scan has one
//! pure stage function in a submodule; [`GeometryCalculator`] drives them in
//! two modes:
//!
//! * [`calculate_all`](GeometryCalculator::calculate_all) clears the cache and
//!   fills every block of every active scan, collecting per-scan errors
//!   without aborting the remaining scans,
//! * the per-block accessors fill one block of one scan on demand, reusing
//!   dependency blocks already in the cache.
//!
//! Both modes are deterministic: recomputing a block with the same observation
//! yields the same value.
//!
//! ## See also
//!
//! * [`ResultCache`] for the block layout.
//! * [`crate::ref_frame::FrameTransform`] for the rotation-model seam.

pub mod baselines;
pub mod beam;
pub mod positions;
pub mod sensitivity;
pub mod sky_track;
pub mod uv_coverage;
pub mod visibility;

use nalgebra::Vector3;

use crate::catalog::{Observation, Scan};
use crate::constants::{AntMap, Meter, Radian, ScanId};
use crate::ref_frame::{EarthRotationFrame, FrameTransform};
use crate::result_cache::{
    block_or_insert, BaselineMap, BeamBlock, FieldOfView, ResultCache, SkyTrack, UvPoint,
};
use crate::uvplan_errors::UvplanError;

use baselines::baseline_projections;
use beam::scan_beam;
use positions::scan_antenna_positions;
use sensitivity::{scan_antenna_sensitivity, scan_baseline_sensitivity};
use sky_track::{field_of_view, sky_tracks, sun_separation};
use uv_coverage::uv_coverage;
use visibility::source_visibility;

/// Tunable knobs of the calculation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct CalcConfig {
    /// Space antennas farther than this from Earth center are treated as
    /// unusable, meters.
    pub space_visibility_range: Meter,
    /// Instants sampled over a scan for (u,v) synthesis.
    pub uv_time_samples: usize,
    /// Side length of the (u,v) gridding used for the synthesized beam, and
    /// the sample count of beam cuts.
    pub beam_grid_size: usize,
    /// Instants sampled over a scan for sky tracks.
    pub track_samples: usize,
}

impl Default for CalcConfig {
    fn default() -> Self {
        CalcConfig {
            space_visibility_range: 3.5e8,
            uv_time_samples: 100,
            beam_grid_size: 100,
            track_samples: 100,
        }
    }
}

/// The per-scan geometry engine, generic over the Earth rotation model.
#[derive(Debug, Clone, Default)]
pub struct GeometryCalculator<F: FrameTransform = EarthRotationFrame> {
    frame: F,
    config: CalcConfig,
}

impl GeometryCalculator<EarthRotationFrame> {
    pub fn new() -> Self {
        GeometryCalculator::default()
    }

    pub fn with_config(config: CalcConfig) -> Self {
        GeometryCalculator {
            frame: EarthRotationFrame,
            config,
        }
    }
}

impl<F: FrameTransform> GeometryCalculator<F> {
    /// A calculator over a custom rotation model.
    pub fn with_frame(frame: F, config: CalcConfig) -> Self {
        GeometryCalculator { frame, config }
    }

    pub fn config(&self) -> &CalcConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut CalcConfig {
        &mut self.config
    }

    /// Full recalculation: clear the cache, then fill every block of every
    /// active scan. A failing scan keeps the blocks computed before the
    /// failure and does not stop the remaining scans.
    ///
    /// Return
    /// ----------
    /// * One `(scan, error)` entry per scan that could not be fully computed.
    pub fn calculate_all(
        &self,
        obs: &Observation,
        cache: &mut ResultCache,
    ) -> Vec<(ScanId, UvplanError)> {
        cache.clear();
        let mut failures = Vec::new();

        for (id, scan) in obs.active_scans() {
            let mut diagnostics = Vec::new();
            let positions =
                scan_antenna_positions(obs, scan, scan.start, &self.frame, &mut diagnostics);
            let visibility =
                source_visibility(obs, scan, scan.start, &self.frame, &self.config, &positions);
            let baselines = baseline_projections(obs, scan, &positions);
            let uv = uv_coverage(obs, scan, &self.frame, &self.config);
            diagnostics.extend(uv.diagnostics);
            let flat: Vec<UvPoint> = uv.value.values().flatten().copied().collect();

            let results = cache.entry(id);
            results.antenna_positions = Some(positions);
            results.visibility = Some(visibility);
            results.baselines = Some(baselines);
            results.uv_points = Some(uv.value);
            results.antenna_sensitivity = Some(scan_antenna_sensitivity(obs, scan));
            match scan_baseline_sensitivity(obs, scan) {
                Ok(block) => results.baseline_sensitivity = Some(block),
                Err(error) => failures.push((id, error)),
            }
            results.sky_track = Some(sky_tracks(obs, scan, &self.frame, &self.config));
            results.field_of_view = Some(field_of_view(obs, scan, &self.frame));
            results.sun_separation = Some(sun_separation(obs, scan));
            results.beam = Some(scan_beam(obs, scan, &flat, &self.config));
            results.diagnostics = diagnostics;
        }
        failures
    }

    fn scan<'o>(&self, obs: &'o Observation, id: ScanId) -> Result<&'o Scan, UvplanError> {
        obs.scan(id).ok_or(UvplanError::ScanNotFound(id))
    }

    /// Inertial antenna positions at the scan start, computed on first access.
    pub fn antenna_positions<'c>(
        &self,
        obs: &Observation,
        cache: &'c mut ResultCache,
        id: ScanId,
    ) -> Result<&'c AntMap<Vector3<Meter>>, UvplanError> {
        let scan = self.scan(obs, id)?;
        let results = cache.entry(id);
        let diagnostics = &mut results.diagnostics;
        Ok(block_or_insert(&mut results.antenna_positions, || {
            scan_antenna_positions(obs, scan, scan.start, &self.frame, diagnostics)
        }))
    }

    /// Per-antenna source visibility at the scan start; fills the position
    /// block first when needed.
    pub fn visibility<'c>(
        &self,
        obs: &Observation,
        cache: &'c mut ResultCache,
        id: ScanId,
    ) -> Result<&'c AntMap<bool>, UvplanError> {
        let scan = self.scan(obs, id)?;
        let results = cache.entry(id);
        let diagnostics = &mut results.diagnostics;
        let positions = block_or_insert(&mut results.antenna_positions, || {
            scan_antenna_positions(obs, scan, scan.start, &self.frame, diagnostics)
        });
        Ok(block_or_insert(&mut results.visibility, || {
            source_visibility(obs, scan, scan.start, &self.frame, &self.config, positions)
        }))
    }

    /// Baseline vectors of the scan; fills the position block first when
    /// needed.
    pub fn baselines<'c>(
        &self,
        obs: &Observation,
        cache: &'c mut ResultCache,
        id: ScanId,
    ) -> Result<&'c BaselineMap<Vector3<Meter>>, UvplanError> {
        let scan = self.scan(obs, id)?;
        let results = cache.entry(id);
        let diagnostics = &mut results.diagnostics;
        let positions = block_or_insert(&mut results.antenna_positions, || {
            scan_antenna_positions(obs, scan, scan.start, &self.frame, diagnostics)
        });
        Ok(block_or_insert(&mut results.baselines, || {
            baseline_projections(obs, scan, positions)
        }))
    }

    /// (u,v) tracks of the scan.
    pub fn uv_points<'c>(
        &self,
        obs: &Observation,
        cache: &'c mut ResultCache,
        id: ScanId,
    ) -> Result<&'c BaselineMap<Vec<UvPoint>>, UvplanError> {
        let scan = self.scan(obs, id)?;
        let results = cache.entry(id);
        let diagnostics = &mut results.diagnostics;
        Ok(block_or_insert(&mut results.uv_points, || {
            let out = uv_coverage(obs, scan, &self.frame, &self.config);
            diagnostics.extend(out.diagnostics);
            out.value
        }))
    }

    /// Per scan-frequency antenna noise figures.
    pub fn antenna_sensitivity<'c>(
        &self,
        obs: &Observation,
        cache: &'c mut ResultCache,
        id: ScanId,
    ) -> Result<&'c [(usize, AntMap<Option<f64>>)], UvplanError> {
        let scan = self.scan(obs, id)?;
        let results = cache.entry(id);
        Ok(block_or_insert::<Vec<_>>(
            &mut results.antenna_sensitivity,
            || scan_antenna_sensitivity(obs, scan),
        ))
    }

    /// Per scan-frequency baseline sensitivities. Unlike the other blocks this
    /// can fail on an invalid channel bandwidth or scan duration; the slot is
    /// left empty on failure so a corrected catalog recomputes it.
    pub fn baseline_sensitivity<'c>(
        &self,
        obs: &Observation,
        cache: &'c mut ResultCache,
        id: ScanId,
    ) -> Result<&'c [(usize, BaselineMap<Option<f64>>)], UvplanError> {
        let scan = self.scan(obs, id)?;
        let results = cache.entry(id);
        if results.baseline_sensitivity.is_none() {
            results.baseline_sensitivity = Some(scan_baseline_sensitivity(obs, scan)?);
        }
        Ok(results.baseline_sensitivity.get_or_insert_with(Vec::new))
    }

    /// Projected sky tracks of the scan.
    pub fn sky_track<'c>(
        &self,
        obs: &Observation,
        cache: &'c mut ResultCache,
        id: ScanId,
    ) -> Result<&'c SkyTrack, UvplanError> {
        let scan = self.scan(obs, id)?;
        let results = cache.entry(id);
        Ok(block_or_insert(&mut results.sky_track, || {
            sky_tracks(obs, scan, &self.frame, &self.config)
        }))
    }

    /// Single-dish field of view of the scan.
    pub fn field_of_view<'c>(
        &self,
        obs: &Observation,
        cache: &'c mut ResultCache,
        id: ScanId,
    ) -> Result<&'c FieldOfView, UvplanError> {
        let scan = self.scan(obs, id)?;
        let results = cache.entry(id);
        Ok(block_or_insert(&mut results.field_of_view, || {
            field_of_view(obs, scan, &self.frame)
        }))
    }

    /// Sun-source separation at the scan start, `None` for an off-source scan.
    pub fn sun_separation(
        &self,
        obs: &Observation,
        cache: &mut ResultCache,
        id: ScanId,
    ) -> Result<Option<Radian>, UvplanError> {
        let scan = self.scan(obs, id)?;
        let results = cache.entry(id);
        Ok(*block_or_insert(&mut results.sun_separation, || {
            sun_separation(obs, scan)
        }))
    }

    /// Beam block of the scan; fills the (u,v) block first when needed.
    pub fn beam<'c>(
        &self,
        obs: &Observation,
        cache: &'c mut ResultCache,
        id: ScanId,
    ) -> Result<&'c BeamBlock, UvplanError> {
        let scan = self.scan(obs, id)?;
        let results = cache.entry(id);
        let diagnostics = &mut results.diagnostics;
        let uv = block_or_insert(&mut results.uv_points, || {
            let out = uv_coverage(obs, scan, &self.frame, &self.config);
            diagnostics.extend(out.diagnostics);
            out.value
        });
        let flat: Vec<UvPoint> = uv.values().flatten().copied().collect();
        Ok(block_or_insert(&mut results.beam, || {
            scan_beam(obs, scan, &flat, &self.config)
        }))
    }
}
