//! Batch processing

pub mod orchestrator;

pub use orchestrator::{detect, detect_with, output_path, run, run_with, PipelineResult};
