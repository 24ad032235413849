//! Audio decoding and format conversion

pub mod convert;
pub mod decoder;

pub use convert::{convert_audio, ConversionOptions};
pub use decoder::{decode, decode_interleaved, ANALYSIS_SAMPLE_RATE};
