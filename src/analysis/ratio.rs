//! Stretch ratio calculation

use crate::error::{BreakstretchError, Result};

/// Playback-rate ratio handed to the stretch engine (>1 faster, <1 slower)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StretchRatio(f64);

impl StretchRatio {
    pub fn value(self) -> f64 {
        self.0
    }

    /// True when the ratio needs no stretching at all
    pub fn is_identity(self) -> bool {
        self.0 == 1.0
    }

    /// True when the ratio falls outside `(low, high)` and artifacts are likely
    pub fn is_quality_risk(self, bounds: (f64, f64)) -> bool {
        self.0 < bounds.0 || self.0 > bounds.1
    }
}

/// Ratio needed to move audio from `source_bpm` to `target_bpm`
///
/// The exact quotient is returned; no rounding is applied.
pub fn compute_ratio(source_bpm: f64, target_bpm: f64) -> Result<StretchRatio> {
    for value in [source_bpm, target_bpm] {
        if !value.is_finite() || value <= 0.0 {
            return Err(BreakstretchError::OutOfRangeBpm { value });
        }
    }
    Ok(StretchRatio(target_bpm / source_bpm))
}
