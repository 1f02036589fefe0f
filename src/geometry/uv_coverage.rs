//! (u,v) coverage synthesis.
//!
//! The scan's time span is sampled at a fixed number of equally spaced
//! instants; at each instant, every antenna pair with **both** antennas
//! visible contributes one (u,v) point obtained by rotating the baseline into
//! the source-aligned frame with the hour angle `h = GMST − RA`:
//!
//! ```text
//! u =  Bx·sin(h) + By·cos(h)
//! v = −Bx·sin(δ)·cos(h) + By·sin(δ)·sin(h) + Bz·cos(δ)
//! ```
//!
//! Pairs never jointly visible are simply absent from the result.

use itertools::Itertools;

use crate::catalog::{Observation, ObservationType, Scan};
use crate::diagnostics::Outcome;
use crate::ref_frame::FrameTransform;
use crate::result_cache::{BaselineKey, BaselineMap, UvPoint};
use crate::time::gmst_at;

use super::positions::scan_antenna_positions;
use super::visibility::source_visibility;
use super::CalcConfig;

/// (u,v) tracks of one scan. Empty for single-dish observations, off-source
/// scans, and stale source indices.
pub fn uv_coverage(
    obs: &Observation,
    scan: &Scan,
    frame: &dyn FrameTransform,
    config: &CalcConfig,
) -> Outcome<BaselineMap<Vec<UvPoint>>> {
    let mut tracks: BaselineMap<Vec<UvPoint>> = BaselineMap::default();
    if obs.observation_type() != ObservationType::Vlbi {
        return Outcome::clean(tracks);
    }
    let Some(source) = obs.scan_source(scan) else {
        return Outcome::clean(tracks);
    };

    let (sin_dec, cos_dec) = source.dec.sin_cos();
    let samples = config.uv_time_samples.max(2);
    let step = scan.duration / (samples - 1) as f64;

    let mut diagnostics = Vec::new();
    for k in 0..samples {
        let t = scan.start + k as f64 * step;
        let positions = scan_antenna_positions(obs, scan, t, frame, &mut diagnostics);
        let visibility = source_visibility(obs, scan, t, frame, config, &positions);

        let hour_angle = gmst_at(t) - source.ra;
        let (sin_h, cos_h) = hour_angle.sin_cos();

        for (a, b) in obs.scan_antennas(scan).tuple_combinations() {
            let both_visible = visibility.get(&a.code).copied().unwrap_or(false)
                && visibility.get(&b.code).copied().unwrap_or(false);
            if !both_visible {
                continue;
            }
            let (Some(pa), Some(pb)) = (positions.get(&a.code), positions.get(&b.code)) else {
                continue;
            };
            let baseline = pa - pb;

            let u = baseline.x * sin_h + baseline.y * cos_h;
            let v = -baseline.x * sin_dec * cos_h + baseline.y * sin_dec * sin_h
                + baseline.z * cos_dec;

            tracks
                .entry(BaselineKey::new(a.code.clone(), b.code.clone()))
                .or_default()
                .push(UvPoint { u, v });
        }
    }

    Outcome {
        value: tracks,
        diagnostics: diagnostics.into(),
    }
}
