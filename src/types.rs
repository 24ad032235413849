//! Core data types for breakstretch
//!
//! These types represent the domain model and flow through the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// =============================================================================
// Tempo primitives
// =============================================================================

/// Where a tempo value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TempoOrigin {
    /// User-supplied override
    Manual,
    /// Parsed from the file's base name
    Filename,
    /// Raw estimator output for one prior
    DirectEstimate,
    /// Estimator output moved into the preferred band by a subdivision factor
    CorrectedEstimate,
}

impl TempoOrigin {
    /// Whether this origin came from running the audio estimator
    pub fn is_estimate(self) -> bool {
        matches!(self, TempoOrigin::DirectEstimate | TempoOrigin::CorrectedEstimate)
    }
}

impl fmt::Display for TempoOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TempoOrigin::Manual => "manual",
            TempoOrigin::Filename => "filename",
            TempoOrigin::DirectEstimate => "direct-estimate",
            TempoOrigin::CorrectedEstimate => "corrected-estimate",
        };
        f.write_str(label)
    }
}

/// A candidate tempo produced by one resolution stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoCandidate {
    /// BPM value
    pub value: f64,
    /// How the value was obtained
    pub origin: TempoOrigin,
    /// Tempo prior used by the estimator run (estimates only)
    pub prior: Option<f64>,
}

impl TempoCandidate {
    pub fn manual(value: f64) -> Self {
        Self {
            value,
            origin: TempoOrigin::Manual,
            prior: None,
        }
    }

    pub fn filename(value: f64) -> Self {
        Self {
            value,
            origin: TempoOrigin::Filename,
            prior: None,
        }
    }

    pub fn direct(value: f64, prior: f64) -> Self {
        Self {
            value,
            origin: TempoOrigin::DirectEstimate,
            prior: Some(prior),
        }
    }

    pub fn corrected(value: f64, prior: f64) -> Self {
        Self {
            value,
            origin: TempoOrigin::CorrectedEstimate,
            prior: Some(prior),
        }
    }
}

/// Non-fatal disagreement between an authoritative tempo and the audio estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoDisagreement {
    /// The tempo that was kept (manual or filename)
    pub resolved_bpm: f64,
    /// What the audio estimator selected instead
    pub detected_bpm: f64,
}

/// The single tempo chosen for a file
///
/// Treated as ground truth for ratio computation once returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTempo {
    pub bpm: f64,
    pub origin: TempoOrigin,
    /// Set when the warn flag was on and the audio estimate disagreed
    pub disagreement: Option<TempoDisagreement>,
}

impl From<TempoCandidate> for ResolvedTempo {
    fn from(candidate: TempoCandidate) -> Self {
        Self {
            bpm: candidate.value,
            origin: candidate.origin,
            disagreement: None,
        }
    }
}

// =============================================================================
// Pipeline results
// =============================================================================

/// One stretched rendition of a source file
#[derive(Debug, Clone, PartialEq)]
pub struct StretchOutput {
    pub target_bpm: f64,
    pub ratio: crate::analysis::StretchRatio,
    /// Ratio is outside the configured quality bounds
    pub quality_risk: bool,
    pub path: PathBuf,
}

/// A source file that resolved and stretched to every target
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedFile {
    pub path: PathBuf,
    pub tempo: ResolvedTempo,
    pub outputs: Vec<StretchOutput>,
}

// =============================================================================
// Audio buffer types
// =============================================================================

/// Decoded mono samples ready for tempo estimation
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Mono samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Duration in seconds
    pub duration: f64,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        // Guard against division by zero - use 0 duration for invalid sample rate
        let duration = if sample_rate > 0 {
            samples.len() as f64 / sample_rate as f64
        } else {
            0.0
        };
        Self {
            samples,
            sample_rate,
            duration,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Full-fidelity interleaved audio for format conversion
#[derive(Debug, Clone)]
pub struct InterleavedBuffer {
    /// Interleaved samples [c0, c1, ..., c0, c1, ...] in [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Number of channels
    pub channels: usize,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Bit depth of the source encoding, when known
    pub bits_per_sample: Option<u32>,
}

impl InterleavedBuffer {
    pub fn new(samples: Vec<f32>, channels: usize, sample_rate: u32) -> Self {
        Self {
            samples,
            channels: channels.max(1),
            sample_rate,
            bits_per_sample: None,
        }
    }

    pub fn with_bits_per_sample(mut self, bits: Option<u32>) -> Self {
        self.bits_per_sample = bits;
        self
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    /// Split into one vector per channel
    pub fn deinterleave(&self) -> Vec<Vec<f32>> {
        let mut planes = vec![Vec::with_capacity(self.frames()); self.channels];
        for frame in self.samples.chunks_exact(self.channels) {
            for (plane, sample) in planes.iter_mut().zip(frame) {
                plane.push(*sample);
            }
        }
        planes
    }

    /// Build from one vector per channel (truncated to the shortest)
    pub fn from_planes(planes: &[Vec<f32>], sample_rate: u32) -> Self {
        let channels = planes.len().max(1);
        let frames = planes.iter().map(Vec::len).min().unwrap_or(0);
        let mut samples = Vec::with_capacity(frames * channels);
        for i in 0..frames {
            for plane in planes {
                samples.push(plane[i]);
            }
        }
        Self::new(samples, channels, sample_rate)
    }
}

// =============================================================================
// Supported formats
// =============================================================================

/// Audio formats supported by breakstretch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Flac,
}

impl AudioFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "wav" => Some(AudioFormat::Wav),
            "flac" => Some(AudioFormat::Flac),
            _ => None,
        }
    }

    /// Check if a path has a supported extension
    pub fn is_supported_path(path: &std::path::Path) -> bool {
        Self::from_path(path).is_some()
    }

    /// Detect format from a path's extension
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}
