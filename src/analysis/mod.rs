//! Tempo analysis
//!
//! The estimator trait abstracts the tempo-estimation primitive so the
//! resolution logic in `tempo` can be tested without real audio analysis.

pub mod ratio;
pub mod stratum;
pub mod tempo;
pub mod traits;

pub use ratio::{compute_ratio, StretchRatio};
pub use stratum::StratumTempoEstimator;
pub use tempo::{resolve_tempo, TempoQuery, TempoResolverChain};
pub use traits::TempoEstimator;
