//! Antenna and baseline sensitivity.
//!
//! The per-antenna noise figure comes from the tabulated frequency→value map
//! by linear interpolation; outside the tabulated range (or with no table at
//! all) the value is **undefined**, represented as `None` rather than an
//! error. Baseline sensitivity combines two defined antenna values as
//! `sqrt(S1·S2) / sqrt(2·bandwidth·duration)`.

use itertools::Itertools;

use crate::catalog::{Antenna, Observation, Scan};
use crate::constants::{AntMap, MegaHertz, MHZ_TO_HZ};
use crate::result_cache::{BaselineKey, BaselineMap};
use crate::uvplan_errors::UvplanError;

/// Noise figure of one antenna at `frequency`, linearly interpolated in its
/// sorted table; `None` when the table is empty or the frequency falls outside
/// the tabulated range.
pub fn antenna_noise_at(antenna: &Antenna, frequency: MegaHertz) -> Option<f64> {
    let table = &antenna.noise_table;
    let (first, last) = (table.first()?, table.last()?);
    if frequency < first.0 || frequency > last.0 {
        return None;
    }

    // In-range, so idx >= 1 and table[idx - 1] brackets from below
    let idx = table.partition_point(|&(f, _)| f <= frequency);
    let (f0, v0) = table[idx - 1];
    if idx == table.len() {
        return Some(v0);
    }
    let (f1, v1) = table[idx];
    if f1 == f0 {
        return Some(v0);
    }
    Some(v0 + (v1 - v0) * (frequency - f0) / (f1 - f0))
}

/// Combined baseline sensitivity `sqrt(S1·S2) / sqrt(2·Δν·τ)`.
///
/// Arguments
/// -----------------
/// * `s1`, `s2`: antenna noise figures; `None` on either side makes the result
///   undefined.
/// * `bandwidth`: channel bandwidth in MHz, strictly positive.
/// * `duration`: integration time in seconds, strictly positive.
pub fn baseline_sensitivity(
    s1: Option<f64>,
    s2: Option<f64>,
    bandwidth: MegaHertz,
    duration: f64,
) -> Result<Option<f64>, UvplanError> {
    if bandwidth <= 0.0 {
        return Err(UvplanError::InvalidBandwidth(bandwidth));
    }
    if duration <= 0.0 {
        return Err(UvplanError::InvalidDuration(duration));
    }
    let (Some(s1), Some(s2)) = (s1, s2) else {
        return Ok(None);
    };
    Ok(Some(
        (s1 * s2).sqrt() / (2.0 * bandwidth * MHZ_TO_HZ * duration).sqrt(),
    ))
}

/// Per scan-frequency antenna noise figures, undefined values included.
pub fn scan_antenna_sensitivity(
    obs: &Observation,
    scan: &Scan,
) -> Vec<(usize, AntMap<Option<f64>>)> {
    obs.scan_frequencies(scan)
        .map(|(freq_idx, channel)| {
            let mut per_antenna = AntMap::default();
            for antenna in obs.scan_antennas(scan) {
                per_antenna.insert(
                    antenna.code.clone(),
                    antenna_noise_at(antenna, channel.frequency),
                );
            }
            (freq_idx, per_antenna)
        })
        .collect()
}

/// Per scan-frequency baseline sensitivities over every antenna pair of the
/// scan (VLBI use; integration time is the scan duration).
pub fn scan_baseline_sensitivity(
    obs: &Observation,
    scan: &Scan,
) -> Result<Vec<(usize, BaselineMap<Option<f64>>)>, UvplanError> {
    let mut blocks = Vec::new();
    for (freq_idx, channel) in obs.scan_frequencies(scan) {
        let mut per_pair = BaselineMap::default();
        for (a, b) in obs.scan_antennas(scan).tuple_combinations() {
            let value = baseline_sensitivity(
                antenna_noise_at(a, channel.frequency),
                antenna_noise_at(b, channel.frequency),
                channel.bandwidth,
                scan.duration,
            )?;
            per_pair.insert(BaselineKey::new(a.code.clone(), b.code.clone()), value);
        }
        blocks.push((freq_idx, per_pair));
    }
    Ok(blocks)
}
