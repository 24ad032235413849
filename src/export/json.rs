//! JSON run manifest
//!
//! Records, per source file, the resolved tempo and every stretched output
//! so downstream tools need not re-run detection.

use crate::error::{BreakstretchError, Result};
use crate::types::{ProcessedFile, TempoDisagreement, TempoOrigin};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

/// Manifest file name inside the output directory
pub const MANIFEST_FILE_NAME: &str = "breakstretch.json";

/// JSON output schema version
const SCHEMA_VERSION: &str = "1.0";

/// Top-level JSON output structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    /// Schema version for forward compatibility
    pub version: String,
    pub metadata: ExportMetadata,
    pub files: Vec<FileJson>,
}

/// Export metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// breakstretch version that generated this file
    pub generator_version: String,
    /// Timestamp of export
    pub exported_at: String,
    pub file_count: usize,
    pub output_count: usize,
}

/// One source file and its stretched outputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileJson {
    pub path: String,
    pub source_bpm: f64,
    pub origin: TempoOrigin,
    /// Present only when the warn cross-check disagreed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disagreement: Option<TempoDisagreement>,
    pub outputs: Vec<OutputJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputJson {
    pub target_bpm: f64,
    pub ratio: f64,
    pub quality_risk: bool,
    pub path: String,
}

/// Write the manifest for processed files
///
/// Uses atomic write pattern: writes to a temp file first, then renames.
/// This prevents data corruption if the write is interrupted.
pub fn write_manifest(files: &[ProcessedFile], output_path: &Path) -> Result<()> {
    // Write to temp file in same directory (ensures same filesystem for atomic rename)
    let temp_path = output_path.with_extension("json.tmp");

    let file = File::create(&temp_path).map_err(|e| BreakstretchError::OutputError {
        path: output_path.to_path_buf(),
        reason: format!("Failed to create temp file: {}", e),
    })?;

    let writer = BufWriter::new(file);

    let output = Manifest {
        version: SCHEMA_VERSION.to_string(),
        metadata: ExportMetadata {
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            file_count: files.len(),
            output_count: files.iter().map(|f| f.outputs.len()).sum(),
        },
        files: files.iter().map(file_to_json).collect(),
    };

    serde_json::to_writer_pretty(writer, &output).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        BreakstretchError::OutputError {
            path: output_path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    // Atomic rename: either succeeds completely or fails without modifying target
    std::fs::rename(&temp_path, output_path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        BreakstretchError::OutputError {
            path: output_path.to_path_buf(),
            reason: format!("Failed to finalize file: {}", e),
        }
    })?;

    info!("Wrote manifest for {} files to {}", files.len(), output_path.display());

    Ok(())
}

fn file_to_json(file: &ProcessedFile) -> FileJson {
    FileJson {
        path: file.path.to_string_lossy().to_string(),
        source_bpm: file.tempo.bpm,
        origin: file.tempo.origin,
        disagreement: file.tempo.disagreement,
        outputs: file
            .outputs
            .iter()
            .map(|o| OutputJson {
                target_bpm: o.target_bpm,
                ratio: o.ratio.value(),
                quality_risk: o.quality_risk,
                path: o.path.to_string_lossy().to_string(),
            })
            .collect(),
    }
}

/// Read a previously written manifest
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let file = File::open(path).map_err(|_| BreakstretchError::FileNotFound(path.to_path_buf()))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        BreakstretchError::ConfigError(format!("Invalid manifest {}: {}", path.display(), e))
    })
}
