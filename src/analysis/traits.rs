//! Analysis trait abstractions
//!
//! These traits define the interface for swappable tempo estimation backends.
//! Current implementation uses stratum-dsp.

use crate::error::Result;
use crate::types::AudioBuffer;

/// Tempo estimation primitive
///
/// One call is one estimation run biased toward `prior_bpm`. Implementations
/// must be deterministic for identical inputs and hold no per-call state, so
/// runs for different priors can execute in parallel.
pub trait TempoEstimator: Send + Sync {
    /// Estimate the tempo of mono audio, expecting something near `prior_bpm`
    fn estimate(&self, buffer: &AudioBuffer, prior_bpm: f64) -> Result<f64>;

    /// Get the name of this estimator (for logging)
    fn name(&self) -> &'static str;
}
