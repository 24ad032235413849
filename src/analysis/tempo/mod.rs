//! Source tempo resolution
//!
//! Turns a file name, an optional override and optional audio into one
//! confident BPM. See [`TempoResolverChain`] for the priority order.

pub mod chain;
pub mod estimate;
pub mod filename;
pub mod selection;
pub mod subdivision;

pub use chain::{
    validate_manual_bpm, AudioResolver, FilenameResolver, ManualResolver, TempoQuery,
    TempoResolver, TempoResolverChain,
};
pub use estimate::collect_candidates;
pub use filename::{parse_bpm_from_stem, FilenamePattern};
pub use selection::{bpms_match, select_candidate};
pub use subdivision::{correct_subdivision, Correction, SubdivisionFactor};

use crate::analysis::traits::TempoEstimator;
use crate::config::TempoConfig;
use crate::error::Result;
use crate::types::{AudioBuffer, ResolvedTempo};
use std::sync::Arc;

/// One-shot resolution with a throwaway chain
///
/// Batch callers should build a [`TempoResolverChain`] once and reuse it.
pub fn resolve_tempo(
    filename: &str,
    manual_bpm: Option<f64>,
    audio: Option<&AudioBuffer>,
    warn: bool,
    estimator: Arc<dyn TempoEstimator>,
    config: &TempoConfig,
) -> Result<ResolvedTempo> {
    let query = TempoQuery::new(filename)
        .with_manual(manual_bpm)
        .with_audio(audio);
    TempoResolverChain::new(estimator, config.clone()).resolve(&query, warn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StratumTempoEstimator;
    use crate::types::TempoOrigin;

    #[test]
    fn test_resolve_tempo_manual_beats_filename() {
        let resolved = resolve_tempo(
            "amen_170.wav",
            Some(175.0),
            None,
            false,
            Arc::new(StratumTempoEstimator::new()),
            &TempoConfig::default(),
        )
        .unwrap();
        assert_eq!(resolved.bpm, 175.0);
        assert_eq!(resolved.origin, TempoOrigin::Manual);
    }

    #[test]
    fn test_resolve_tempo_from_filename() {
        let resolved = resolve_tempo(
            "amen_170.wav",
            None,
            None,
            false,
            Arc::new(StratumTempoEstimator::new()),
            &TempoConfig::default(),
        )
        .unwrap();
        assert_eq!(resolved.bpm, 170.0);
        assert_eq!(resolved.origin, TempoOrigin::Filename);
    }

    #[test]
    fn test_custom_plausible_band_changes_filename_acceptance() {
        let config = TempoConfig {
            plausible_band: crate::config::BpmBand::new(60.0, 200.0),
            ..TempoConfig::default()
        };
        let resolved = resolve_tempo(
            "dub_70.wav",
            None,
            None,
            false,
            Arc::new(StratumTempoEstimator::new()),
            &config,
        )
        .unwrap();
        assert_eq!(resolved.bpm, 70.0);
    }
}
