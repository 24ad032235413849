//! Unified error types for breakstretch
//!
//! Error strategy:
//! - Per-file errors (tempo, decode, stretch, conversion): Recoverable, skip and continue
//! - System errors (missing stretcher, bad targets, output): Fatal, abort batch
//!
//! All errors include actionable suggestions where possible.

use std::path::PathBuf;
use thiserror::Error;

/// Supported audio formats for helpful error messages
pub const SUPPORTED_FORMATS: &str = "WAV, FLAC";

/// Top-level error type for breakstretch operations
#[derive(Debug, Error)]
pub enum BreakstretchError {
    // =========================================================================
    // Recoverable errors - skip file, continue batch
    // =========================================================================
    #[error("Could not determine BPM for '{path}': {reason}\n  Tip: Name the file like 'amen_170.wav' or pass --bpm to set the source tempo")]
    UndeterminedTempo { path: PathBuf, reason: String },

    #[error("Invalid BPM value {value}: BPM must be a positive, finite number")]
    OutOfRangeBpm { value: f64 },

    #[error("Failed to decode audio file '{path}': {reason}\n  Supported formats: {SUPPORTED_FORMATS}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Unsupported audio format for '{path}': {format}\n  Supported formats: {SUPPORTED_FORMATS}")]
    UnsupportedFormat { path: PathBuf, format: String },

    #[error("File not found: '{0}'\n  Tip: Check the path exists and is accessible")]
    FileNotFound(PathBuf),

    #[error("Time stretch failed for '{path}': {reason}")]
    StretchFailed { path: PathBuf, reason: String },

    #[error("Format conversion failed for '{path}': {reason}")]
    ConversionError { path: PathBuf, reason: String },

    // =========================================================================
    // Fatal errors - abort entire batch
    // =========================================================================
    #[error("rubberband CLI not found. Install it with:\n  {install_hint}")]
    StretcherNotFound { install_hint: String },

    #[error("Invalid target BPM specification: {0}\n  Examples: --target 140, --targets 90,120,140, --range 80-160 --step 10")]
    InvalidTarget(String),

    #[error("Cannot write output to '{path}': {reason}\n  Tip: Check write permissions for the output directory")]
    OutputError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for breakstretch operations
pub type Result<T> = std::result::Result<T, BreakstretchError>;

impl BreakstretchError {
    /// Returns true if this error is scoped to one file (skip it, continue batch)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BreakstretchError::UndeterminedTempo { .. }
                | BreakstretchError::OutOfRangeBpm { .. }
                | BreakstretchError::DecodeError { .. }
                | BreakstretchError::UnsupportedFormat { .. }
                | BreakstretchError::FileNotFound(_)
                | BreakstretchError::StretchFailed { .. }
                | BreakstretchError::ConversionError { .. }
        )
    }

    /// Create a decode error with context about the issue
    pub fn decode_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        BreakstretchError::DecodeError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an undetermined tempo error
    pub fn undetermined(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        BreakstretchError::UndeterminedTempo {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an output error, checking for common issues
    pub fn output_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                format!("Permission denied. Check that you have write access to {}", path.display())
            }
            std::io::ErrorKind::NotFound => {
                format!("Directory does not exist: {}", path.parent().map(|p| p.display().to_string()).unwrap_or_default())
            }
            _ => err.to_string(),
        };
        BreakstretchError::OutputError { path, reason }
    }

    /// Create a stretcher-not-found error with an install hint for this platform
    pub fn stretcher_not_found() -> Self {
        let install_hint = if cfg!(target_os = "macos") {
            "brew install rubberband"
        } else if cfg!(target_os = "linux") {
            "sudo apt-get install rubberband-cli"
        } else if cfg!(target_os = "windows") {
            "Download from https://breakfastquay.com/rubberband/"
        } else {
            "See https://breakfastquay.com/rubberband/"
        };
        BreakstretchError::StretcherNotFound {
            install_hint: install_hint.to_string(),
        }
    }
}

/// Extension trait for adding context to errors
pub trait ErrorContext<T> {
    /// Re-attribute a tempo failure to the file being processed
    fn with_file_context(self, path: &std::path::Path) -> Result<T>;
}

impl<T> ErrorContext<T> for Result<T> {
    fn with_file_context(self, path: &std::path::Path) -> Result<T> {
        self.map_err(|e| match e {
            BreakstretchError::UndeterminedTempo { reason, .. } => {
                BreakstretchError::UndeterminedTempo {
                    path: path.to_path_buf(),
                    reason,
                }
            }
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(BreakstretchError::undetermined("a.wav", "no candidates").is_recoverable());
        assert!(BreakstretchError::OutOfRangeBpm { value: 0.0 }.is_recoverable());
        assert!(BreakstretchError::decode_error("a.wav", "bad header").is_recoverable());
        assert!(!BreakstretchError::stretcher_not_found().is_recoverable());
        assert!(!BreakstretchError::InvalidTarget("empty".into()).is_recoverable());
    }

    #[test]
    fn test_file_context_rewrites_tempo_path() {
        let result: Result<()> = Err(BreakstretchError::undetermined("", "no candidates"));
        let err = result
            .with_file_context(std::path::Path::new("breaks/amen.wav"))
            .unwrap_err();
        match err {
            BreakstretchError::UndeterminedTempo { path, reason } => {
                assert_eq!(path, PathBuf::from("breaks/amen.wav"));
                assert_eq!(reason, "no candidates");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_stretcher_hint_is_not_empty() {
        match BreakstretchError::stretcher_not_found() {
            BreakstretchError::StretcherNotFound { install_hint } => {
                assert!(!install_hint.is_empty())
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
