//! Time-stretch engine
//!
//! The DSP itself is delegated; this module only defines the seam and the
//! rubberband command-line backend.

pub mod rubberband;

pub use rubberband::RubberbandStretcher;

use crate::analysis::StretchRatio;
use crate::error::Result;
use std::path::Path;

/// Trait for time-stretch backends
///
/// Implementations must change tempo without changing pitch, and must
/// create `output`'s parent directory if needed.
pub trait TimeStretcher: Send + Sync {
    /// Stretch `input` by `ratio` (>1 faster) into `output`
    fn stretch(&self, input: &Path, output: &Path, ratio: StretchRatio) -> Result<()>;

    /// Get the name of this stretcher (for logging)
    fn name(&self) -> &'static str;
}
