//! breakstretch - Batch time-stretching of drum breaks to target tempos
//!
//! Resolves each clip's source tempo from a manual override, its file name
//! or audio analysis, then stretches it to one or more target BPMs without
//! changing pitch.
//!
//! # Architecture
//!
//! - `config`: CLI argument parsing, runtime settings and tempo tunables
//! - `discovery`: Input file scanning
//! - `audio`: Decoding (symphonia), resampling (rubato) and WAV conversion
//! - `analysis`: Tempo estimation, resolution and stretch ratio
//! - `stretch`: Time-stretch engine (rubberband)
//! - `pipeline`: Parallel processing orchestration
//! - `export`: JSON run manifest
//!
//! # Example
//!
//! ```no_run
//! use breakstretch::{config::Settings, pipeline};
//!
//! let settings = Settings {
//!     input: "breaks/amen_170.wav".into(),
//!     targets: vec![140.0, 160.0],
//!     ..Settings::default()
//! };
//! let result = pipeline::run(&settings).expect("Stretch failed");
//! println!("Wrote {} files", result.outputs.len());
//! ```

pub mod analysis;
pub mod audio;
pub mod config;
pub mod discovery;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod stretch;
pub mod types;

// Re-export key types at crate root
pub use error::{BreakstretchError, Result};
pub use types::{AudioBuffer, ResolvedTempo, TempoCandidate, TempoOrigin};
