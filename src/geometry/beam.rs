//! Beam patterns.
//!
//! Single-dish antennas get the analytic Gaussian main lobe with the
//! diffraction-limited width `FWHM = 1.22·λ/D`. VLBI scans get a synthesized
//! beam estimated from the scan's (u,v) coverage: the points and their
//! conjugates are gridded onto a square cell grid and the one-dimensional cut
//! through the dirty beam is accumulated as a weighted cosine sum over the
//! occupied cells, normalized to unit peak.

use crate::catalog::{Observation, ObservationType, Scan};
use crate::constants::{AntMap, DPI};
use crate::result_cache::{BeamBlock, BeamPattern, UvPoint};

use super::sky_track::beam_radius;
use super::CalcConfig;

/// Gaussian single-dish beam at `frequency_mhz`, sampled over ±2 FWHM.
pub fn single_dish_beam(
    diameter: f64,
    frequency_mhz: f64,
    samples: usize,
) -> BeamPattern {
    let fwhm = beam_radius(diameter, frequency_mhz);
    let samples = samples.max(2);
    let step = 4.0 * fwhm / (samples - 1) as f64;
    let ln2 = std::f64::consts::LN_2;

    let mut offsets = Vec::with_capacity(samples);
    let mut response = Vec::with_capacity(samples);
    for k in 0..samples {
        let theta = -2.0 * fwhm + k as f64 * step;
        offsets.push(theta);
        response.push((-4.0 * ln2 * (theta / fwhm).powi(2)).exp());
    }
    BeamPattern { offsets, response }
}

/// Synthesized beam cut from the gridded (u,v) points of one scan; `None`
/// when the coverage is empty.
pub fn vlbi_beam(points: &[UvPoint], grid_size: usize) -> Option<BeamPattern> {
    if points.is_empty() {
        return None;
    }
    let grid_size = grid_size.max(2);

    let extent = points
        .iter()
        .flat_map(|p| [p.u.abs(), p.v.abs()])
        .fold(0.0_f64, f64::max);
    if extent == 0.0 {
        return None;
    }

    // Grid the points and their conjugates; the dirty beam is real, so every
    // (u,v) contributes together with (-u,-v).
    let cell = 2.0 * extent / grid_size as f64;
    let mut weights = vec![0.0_f64; grid_size * grid_size];
    for p in points {
        for (u, v) in [(p.u, p.v), (-p.u, -p.v)] {
            let i = (((u + extent) / cell) as usize).min(grid_size - 1);
            let j = (((v + extent) / cell) as usize).min(grid_size - 1);
            weights[j * grid_size + i] += 1.0;
        }
    }

    // One-dimensional cut: cosine sum over occupied cells at their u center,
    // sampled across the un-aliased window ±N/(4·u_max).
    let l_max = grid_size as f64 / (4.0 * extent);
    let samples = grid_size;
    let step = 2.0 * l_max / (samples - 1) as f64;

    let mut offsets = Vec::with_capacity(samples);
    let mut response = Vec::with_capacity(samples);
    for k in 0..samples {
        let l = -l_max + k as f64 * step;
        let mut acc = 0.0;
        for (idx, &w) in weights.iter().enumerate() {
            if w == 0.0 {
                continue;
            }
            let i = idx % grid_size;
            let u_cell = -extent + (i as f64 + 0.5) * cell;
            acc += w * (DPI * u_cell * l).cos();
        }
        offsets.push(l);
        response.push(acc);
    }

    let peak = response.iter().fold(0.0_f64, |m, &r| m.max(r.abs()));
    if peak > 0.0 {
        for r in &mut response {
            *r /= peak;
        }
    }
    Some(BeamPattern { offsets, response })
}

/// Beam block of one scan: per-antenna Gaussian beams for single-dish
/// observations, a single synthesized beam over all baselines for VLBI.
pub fn scan_beam(
    obs: &Observation,
    scan: &Scan,
    uv_points: &[UvPoint],
    config: &CalcConfig,
) -> BeamBlock {
    match obs.observation_type() {
        ObservationType::SingleDish => {
            let mut beams = AntMap::default();
            if let Some((_, channel)) = obs.scan_frequencies(scan).next() {
                for antenna in obs.scan_antennas(scan) {
                    beams.insert(
                        antenna.code.clone(),
                        single_dish_beam(
                            antenna.diameter,
                            channel.frequency,
                            config.beam_grid_size,
                        ),
                    );
                }
            }
            BeamBlock::SingleDish(beams)
        }
        ObservationType::Vlbi => BeamBlock::Vlbi(vlbi_beam(uv_points, config.beam_grid_size)),
    }
}
