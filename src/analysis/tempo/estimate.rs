//! Audio tempo candidate collection
//!
//! Runs the estimator once per prior and expands each raw value through the
//! subdivision corrector. Selection happens separately in `selection`.

use super::subdivision::correct_subdivision;
use crate::analysis::traits::TempoEstimator;
use crate::config::TempoConfig;
use crate::types::{AudioBuffer, TempoCandidate};
use rayon::prelude::*;
use tracing::{debug, trace};

/// Produce the candidate set for one clip
///
/// Per-prior runs are independent and execute in parallel. A run that fails
/// contributes nothing; an empty result means the clip is undetectable.
pub fn collect_candidates(
    estimator: &dyn TempoEstimator,
    audio: &AudioBuffer,
    config: &TempoConfig,
) -> Vec<TempoCandidate> {
    let candidates: Vec<TempoCandidate> = config
        .priors
        .par_iter()
        .flat_map_iter(|&prior| candidates_for_prior(estimator, audio, prior, config))
        .collect();

    debug!(
        "{} produced {} candidate(s) from {} prior(s)",
        estimator.name(),
        candidates.len(),
        config.priors.len()
    );

    candidates
}

fn candidates_for_prior(
    estimator: &dyn TempoEstimator,
    audio: &AudioBuffer,
    prior: f64,
    config: &TempoConfig,
) -> Vec<TempoCandidate> {
    let raw = match estimator.estimate(audio, prior) {
        Ok(bpm) if bpm.is_finite() && bpm > 0.0 => bpm,
        Ok(bpm) => {
            debug!("Prior {:.0}: discarding unusable estimate {}", prior, bpm);
            return Vec::new();
        }
        Err(e) => {
            debug!("Prior {:.0}: estimation failed: {}", prior, e);
            return Vec::new();
        }
    };

    let mut candidates = vec![TempoCandidate::direct(raw, prior)];

    let correction = correct_subdivision(raw, &config.preferred_band);
    if correction.is_corrected() && config.plausible_band.contains(correction.value) {
        trace!(
            "Prior {:.0}: {:.2} corrected by {:?} to {:.2}",
            prior,
            raw,
            correction.factor,
            correction.value
        );
        candidates.push(TempoCandidate::corrected(correction.value, prior));
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BreakstretchError, Result};
    use crate::types::TempoOrigin;
    use std::collections::HashMap;

    /// Returns a fixed value per prior, failing for unknown priors
    struct PriorTable(HashMap<u32, f64>);

    impl PriorTable {
        fn new(entries: &[(u32, f64)]) -> Self {
            Self(entries.iter().copied().collect())
        }
    }

    impl TempoEstimator for PriorTable {
        fn estimate(&self, _buffer: &AudioBuffer, prior_bpm: f64) -> Result<f64> {
            self.0
                .get(&(prior_bpm as u32))
                .copied()
                .ok_or_else(|| BreakstretchError::undetermined("", "no estimate"))
        }

        fn name(&self) -> &'static str {
            "prior-table"
        }
    }

    fn audio() -> AudioBuffer {
        AudioBuffer::new(vec![0.0; 64], 22050)
    }

    #[test]
    fn test_in_band_estimates_produce_only_direct_candidates() {
        let estimator = PriorTable::new(&[(120, 170.0), (140, 170.0), (170, 172.0)]);
        let candidates = collect_candidates(&estimator, &audio(), &TempoConfig::default());
        assert_eq!(candidates.len(), 3);
        assert!(candidates
            .iter()
            .all(|c| c.origin == TempoOrigin::DirectEstimate));
        assert_eq!(candidates[0].prior, Some(120.0));
    }

    #[test]
    fn test_half_time_estimate_adds_corrected_candidate() {
        let estimator = PriorTable::new(&[(120, 85.0)]);
        let candidates = collect_candidates(&estimator, &audio(), &TempoConfig::default());
        assert_eq!(
            candidates,
            vec![
                TempoCandidate::direct(85.0, 120.0),
                TempoCandidate::corrected(170.0, 120.0),
            ]
        );
    }

    #[test]
    fn test_failed_and_invalid_runs_are_skipped() {
        let estimator = PriorTable::new(&[(140, f64::NAN), (170, -3.0)]);
        let candidates = collect_candidates(&estimator, &audio(), &TempoConfig::default());
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_collection_order_follows_priors() {
        let estimator = PriorTable::new(&[(120, 100.0), (140, 150.0), (170, 160.0)]);
        let candidates = collect_candidates(&estimator, &audio(), &TempoConfig::default());
        let priors: Vec<_> = candidates.iter().filter_map(|c| c.prior).collect();
        let mut sorted = priors.clone();
        sorted.sort_by(f64::total_cmp);
        assert_eq!(priors, sorted);
    }
}
