//! Candidate selection
//!
//! A pure reduction over an estimator candidate set. Preference tiers:
//! 1. direct estimates inside the plausible band
//! 2. corrected estimates
//! 3. any remaining direct estimate
//!
//! Within a tier the value nearest `selection_target` wins; exact ties go to
//! the lower value, then the lower prior, so the result does not depend on
//! candidate order.

use crate::config::TempoConfig;
use crate::types::{TempoCandidate, TempoOrigin};
use std::cmp::Ordering;
use tracing::warn;

/// Choose the final candidate, or `None` for an empty set
pub fn select_candidate(
    candidates: &[TempoCandidate],
    config: &TempoConfig,
) -> Option<TempoCandidate> {
    let chosen = candidates
        .iter()
        .filter_map(|c| tier(c, config).map(|t| (t, c)))
        .min_by(|(ta, a), (tb, b)| {
            ta.cmp(tb)
                .then_with(|| compare(a, b, config.selection_target))
        })
        .map(|(_, c)| *c)?;

    if outside_plausible_band(&chosen, config) {
        warn!(
            "No estimate fell in the {:.0}-{:.0} BPM band; using {:.2} BPM (prior {:.0})",
            config.plausible_band.min,
            config.plausible_band.max,
            chosen.value,
            chosen.prior.unwrap_or_default()
        );
    }

    Some(chosen)
}

/// True when selection had to fall back to an estimate outside the band
fn outside_plausible_band(candidate: &TempoCandidate, config: &TempoConfig) -> bool {
    !config.plausible_band.contains(candidate.value)
}

fn tier(candidate: &TempoCandidate, config: &TempoConfig) -> Option<u8> {
    match candidate.origin {
        TempoOrigin::DirectEstimate if config.plausible_band.contains(candidate.value) => Some(0),
        TempoOrigin::CorrectedEstimate => Some(1),
        TempoOrigin::DirectEstimate => Some(2),
        TempoOrigin::Manual | TempoOrigin::Filename => None,
    }
}

fn compare(a: &TempoCandidate, b: &TempoCandidate, target: f64) -> Ordering {
    (a.value - target)
        .abs()
        .total_cmp(&(b.value - target).abs())
        .then_with(|| a.value.total_cmp(&b.value))
        .then_with(|| {
            let pa = a.prior.unwrap_or(f64::INFINITY);
            let pb = b.prior.unwrap_or(f64::INFINITY);
            pa.total_cmp(&pb)
        })
}

/// True when two tempos agree within `tolerance`, allowing half/double time
pub fn bpms_match(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance || (a - b * 2.0).abs() <= tolerance || (a * 2.0 - b).abs() <= tolerance
}
