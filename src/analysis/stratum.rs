//! Stratum-DSP based tempo estimation
//!
//! stratum-dsp has no notion of a tempo prior, so a prior is expressed as the
//! search window handed to the analyzer: one octave centred on the prior. An
//! onset-based estimator restricted this way cannot lock onto a half-time or
//! double-time alias far from the prior.

use crate::analysis::traits::TempoEstimator;
use crate::error::{BreakstretchError, Result};
use crate::types::AudioBuffer;
use std::f64::consts::SQRT_2;
use stratum_dsp::{analyze_audio, AnalysisConfig};
use tracing::debug;

/// Tempo estimator using stratum-dsp
///
/// Uses autocorrelation and comb filterbank analysis for tempo detection.
#[derive(Debug, Default, Clone, Copy)]
pub struct StratumTempoEstimator;

impl StratumTempoEstimator {
    pub fn new() -> Self {
        Self
    }

    /// BPM search window used for a given prior
    pub fn window_for_prior(prior_bpm: f64) -> (f64, f64) {
        (prior_bpm / SQRT_2, prior_bpm * SQRT_2)
    }
}

impl TempoEstimator for StratumTempoEstimator {
    fn estimate(&self, buffer: &AudioBuffer, prior_bpm: f64) -> Result<f64> {
        let (min_bpm, max_bpm) = Self::window_for_prior(prior_bpm);

        debug!(
            "Estimating tempo with stratum-dsp ({} samples, {}Hz, window {:.1}-{:.1} BPM)",
            buffer.len(),
            buffer.sample_rate,
            min_bpm,
            max_bpm
        );

        let config = AnalysisConfig {
            min_bpm: min_bpm as f32,
            max_bpm: max_bpm as f32,
            ..AnalysisConfig::default()
        };

        let result = analyze_audio(&buffer.samples, buffer.sample_rate, config).map_err(|e| {
            BreakstretchError::undetermined("", format!("tempo estimation failed: {}", e))
        })?;

        let bpm = result.bpm as f64;
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(BreakstretchError::undetermined(
                "",
                format!("tempo estimator returned unusable value {}", bpm),
            ));
        }

        debug!(
            "Prior {:.0}: estimated {:.2} BPM (confidence: {:.2})",
            prior_bpm, bpm, result.bpm_confidence
        );

        Ok(bpm)
    }

    fn name(&self) -> &'static str {
        "stratum-dsp"
    }
}
