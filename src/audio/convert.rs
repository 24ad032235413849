//! Sample-rate, bit-depth and channel conversion
//!
//! Applied to stretched files when the user asks for a different output
//! format. Decoding goes through symphonia, writing through hound.

use super::decoder::{decode_interleaved, resample, to_mono};
use crate::error::{BreakstretchError, Result};
use crate::types::{AudioFormat, InterleavedBuffer};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Bit depths hound can write as integer PCM
const SUPPORTED_BIT_DEPTHS: [u16; 3] = [16, 24, 32];

/// Depth used when neither the caller nor the source says otherwise
const DEFAULT_BIT_DEPTH: u16 = 16;

/// Requested output format; `None` fields keep the source value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionOptions {
    pub sample_rate: Option<u32>,
    pub bit_depth: Option<u16>,
    pub mono: bool,
}

impl ConversionOptions {
    /// True when conversion would leave the file untouched
    pub fn is_noop(&self) -> bool {
        self.sample_rate.is_none() && self.bit_depth.is_none() && !self.mono
    }
}

/// Convert `input` into `output` according to `options`
///
/// `input` and `output` may be the same path; the result is written to a
/// temporary file and renamed into place.
pub fn convert_audio(input: &Path, output: &Path, options: &ConversionOptions) -> Result<PathBuf> {
    if AudioFormat::from_path(output) != Some(AudioFormat::Wav) {
        return Err(BreakstretchError::ConversionError {
            path: output.to_path_buf(),
            reason: "Converted output must be a .wav file".to_string(),
        });
    }

    if let Some(bits) = options.bit_depth {
        if !SUPPORTED_BIT_DEPTHS.contains(&bits) {
            return Err(BreakstretchError::ConversionError {
                path: output.to_path_buf(),
                reason: format!("Unsupported bit depth {} (expected 16, 24 or 32)", bits),
            });
        }
    }

    let source = decode_interleaved(input).map_err(|e| BreakstretchError::ConversionError {
        path: input.to_path_buf(),
        reason: e.to_string(),
    })?;

    let bits = options
        .bit_depth
        .or_else(|| {
            source
                .bits_per_sample
                .and_then(|b| u16::try_from(b).ok())
                .filter(|b| SUPPORTED_BIT_DEPTHS.contains(b))
        })
        .unwrap_or(DEFAULT_BIT_DEPTH);

    let converted = apply(source, options);

    debug!(
        "Converting {} -> {} ({} Hz, {} ch, {} bit)",
        input.display(),
        output.display(),
        converted.sample_rate,
        converted.channels,
        bits
    );

    write_wav(&converted, output, bits)?;
    Ok(output.to_path_buf())
}

/// Mixdown then resample
fn apply(source: InterleavedBuffer, options: &ConversionOptions) -> InterleavedBuffer {
    let mut buffer = if options.mono && source.channels > 1 {
        let mono = to_mono(&source.samples, source.channels);
        InterleavedBuffer::new(mono, 1, source.sample_rate)
    } else {
        source
    };

    if let Some(rate) = options.sample_rate {
        if rate != buffer.sample_rate {
            let planes: Vec<Vec<f32>> = buffer
                .deinterleave()
                .iter()
                .map(|plane| resample(plane, buffer.sample_rate, rate))
                .collect();
            buffer = InterleavedBuffer::from_planes(&planes, rate);
        }
    }

    buffer
}

fn write_wav(buffer: &InterleavedBuffer, output: &Path, bits: u16) -> Result<()> {
    let channels = u16::try_from(buffer.channels).map_err(|_| BreakstretchError::ConversionError {
        path: output.to_path_buf(),
        reason: format!("Too many channels ({})", buffer.channels),
    })?;

    let spec = hound::WavSpec {
        channels,
        sample_rate: buffer.sample_rate,
        bits_per_sample: bits,
        sample_format: hound::SampleFormat::Int,
    };

    let temp_path = output.with_extension("wav.tmp");
    let conversion_error = |reason: String| BreakstretchError::ConversionError {
        path: output.to_path_buf(),
        reason,
    };

    let write = || -> std::result::Result<(), hound::Error> {
        let mut writer = hound::WavWriter::create(&temp_path, spec)?;
        let scale = ((1i64 << (bits - 1)) - 1) as f64;
        for &sample in &buffer.samples {
            let clamped = f64::from(sample.clamp(-1.0, 1.0));
            writer.write_sample((clamped * scale).round() as i32)?;
        }
        writer.finalize()
    };

    if let Err(e) = write() {
        let _ = std::fs::remove_file(&temp_path);
        return Err(conversion_error(format!("Failed to write WAV: {}", e)));
    }

    std::fs::rename(&temp_path, output).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        conversion_error(format!("Failed to finalize file: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_source(path: &Path, channels: u16, sample_rate: u32, bits: u16, frames: usize) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: bits,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            for _ in 0..channels {
                let value = ((i as f32 * 0.05).sin() * 0.5 * ((1i32 << (bits - 1)) - 1) as f32) as i32;
                writer.write_sample(value).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_noop_detection() {
        assert!(ConversionOptions::default().is_noop());
        assert!(!ConversionOptions {
            mono: true,
            ..Default::default()
        }
        .is_noop());
    }

    #[test]
    fn test_mono_and_resample() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("break.wav");
        let output = dir.path().join("break_mono.wav");
        write_source(&input, 2, 44100, 16, 44100);

        let options = ConversionOptions {
            sample_rate: Some(22050),
            bit_depth: Some(24),
            mono: true,
        };
        convert_audio(&input, &output, &options).unwrap();

        let reader = hound::WavReader::open(&output).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(spec.bits_per_sample, 24);
        let frames = reader.duration() as f64;
        assert!((frames - 22050.0).abs() < 64.0, "got {} frames", frames);
    }

    #[test]
    fn test_source_bit_depth_preserved_in_place() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("break.wav");
        write_source(&path, 2, 48000, 24, 4800);

        let options = ConversionOptions {
            mono: true,
            ..Default::default()
        };
        convert_audio(&path, &path, &options).unwrap();

        let spec = hound::WavReader::open(&path).unwrap().spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 48000);
        assert_eq!(spec.bits_per_sample, 24);
        assert!(!dir.path().join("break.wav.tmp").exists());
    }

    #[test]
    fn test_non_wav_output_rejected() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("break.wav");
        write_source(&input, 1, 44100, 16, 100);

        let err = convert_audio(&input, &dir.path().join("break.flac"), &ConversionOptions::default())
            .unwrap_err();
        assert!(matches!(err, BreakstretchError::ConversionError { .. }));
    }

    #[test]
    fn test_unreadable_input_is_conversion_error() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("broken.wav");
        std::fs::write(&input, b"not audio at all, just text bytes").unwrap();

        let err = convert_audio(&input, &dir.path().join("out.wav"), &ConversionOptions::default())
            .unwrap_err();
        assert!(matches!(err, BreakstretchError::ConversionError { .. }));
    }
}
