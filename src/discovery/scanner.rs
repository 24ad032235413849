//! File discovery and scanning

use crate::error::{BreakstretchError, Result};
use crate::types::AudioFormat;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Discovered audio file with basic metadata
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub format: AudioFormat,
    pub size_bytes: u64,
}

impl DiscoveredFile {
    /// File name as a string, for tempo parsing and display
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Scan a path (file or directory) for audio files
///
/// Results are sorted by path. A directory with no supported files is an
/// error, as is a single file with an unsupported extension.
pub fn scan(input: &Path, recursive: bool) -> Result<Vec<DiscoveredFile>> {
    if !input.exists() {
        return Err(BreakstretchError::FileNotFound(input.to_path_buf()));
    }

    let mut files = Vec::new();

    if input.is_file() {
        // Single file mode
        if let Some(file) = try_discover_file(input) {
            files.push(file);
        } else {
            return Err(BreakstretchError::UnsupportedFormat {
                path: input.to_path_buf(),
                format: input
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            });
        }
    } else if input.is_dir() {
        // Directory mode
        let walker = if recursive {
            WalkDir::new(input)
        } else {
            WalkDir::new(input).max_depth(1)
        };

        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_file() {
                if let Some(file) = try_discover_file(path) {
                    debug!("Discovered: {}", file.path.display());
                    files.push(file);
                }
            }
        }

        if files.is_empty() {
            return Err(BreakstretchError::ConfigError(format!(
                "No audio files found in {} (supported: .wav, .flac{})",
                input.display(),
                if recursive { "" } else { "; use --recursive to include subdirectories" }
            )));
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    info!("Discovered {} audio files", files.len());

    Ok(files)
}

/// Try to create a DiscoveredFile if the path is a supported audio format
fn try_discover_file(path: &Path) -> Option<DiscoveredFile> {
    let format = AudioFormat::from_path(path)?;
    let metadata = std::fs::metadata(path).ok()?;

    Some(DiscoveredFile {
        path: path.to_path_buf(),
        format,
        size_bytes: metadata.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_scan_directory_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("think_160.WAV"));
        touch(&dir.path().join("amen_170.wav"));
        touch(&dir.path().join("funky.flac"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("sub").join("nested_140.wav"));

        let files = scan(dir.path(), false).unwrap();
        let names: Vec<_> = files.iter().map(DiscoveredFile::file_name).collect();
        assert_eq!(names, ["amen_170.wav", "funky.flac", "think_160.WAV"]);
        assert_eq!(files[1].format, AudioFormat::Flac);
    }

    #[test]
    fn test_scan_recursive() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("amen_170.wav"));
        touch(&dir.path().join("sub").join("nested_140.wav"));

        assert_eq!(scan(dir.path(), true).unwrap().len(), 2);
    }

    #[test]
    fn test_scan_empty_directory_is_error() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("readme.md"));
        assert!(matches!(
            scan(dir.path(), false),
            Err(BreakstretchError::ConfigError(_))
        ));
    }

    #[test]
    fn test_scan_single_file() {
        let dir = TempDir::new().unwrap();
        let wav = dir.path().join("amen_170.wav");
        let mp3 = dir.path().join("amen_170.mp3");
        touch(&wav);
        touch(&mp3);

        assert_eq!(scan(&wav, false).unwrap().len(), 1);
        assert!(matches!(
            scan(&mp3, false),
            Err(BreakstretchError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_scan_missing_path() {
        assert!(matches!(
            scan(Path::new("/nonexistent/breaks"), false),
            Err(BreakstretchError::FileNotFound(_))
        ));
    }
}
