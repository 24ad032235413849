//! rubberband CLI backend

use super::TimeStretcher;
use crate::analysis::StretchRatio;
use crate::config::settings::DEFAULT_CRISPNESS;
use crate::error::{BreakstretchError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, trace};

const RUBBERBAND_COMMAND: &str = "rubberband";

/// Highest crispness level rubberband accepts
pub const MAX_CRISPNESS: u8 = 6;

/// Stretches by shelling out to the `rubberband` executable
#[derive(Debug, Clone)]
pub struct RubberbandStretcher {
    crispness: u8,
}

impl RubberbandStretcher {
    pub fn new(crispness: u8) -> Self {
        Self {
            crispness: crispness.min(MAX_CRISPNESS),
        }
    }

    pub fn crispness(&self) -> u8 {
        self.crispness
    }

    /// Fail with an install hint unless `rubberband` is on PATH
    pub fn check_installed() -> Result<PathBuf> {
        find_on_path(RUBBERBAND_COMMAND).ok_or_else(BreakstretchError::stretcher_not_found)
    }

    fn build_command(&self, input: &Path, output: &Path, ratio: StretchRatio) -> Command {
        let mut command = Command::new(RUBBERBAND_COMMAND);
        command
            .arg("--tempo")
            .arg(ratio.value().to_string())
            .arg("--crisp")
            .arg(self.crispness.to_string())
            .arg("--quiet")
            .arg(input)
            .arg(output)
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        command
    }
}

impl Default for RubberbandStretcher {
    fn default() -> Self {
        Self::new(DEFAULT_CRISPNESS)
    }
}

impl TimeStretcher for RubberbandStretcher {
    fn stretch(&self, input: &Path, output: &Path, ratio: StretchRatio) -> Result<()> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| BreakstretchError::output_error(parent, e))?;
            }
        }

        if ratio.is_identity() {
            debug!("Ratio is 1.0, copying {} unchanged", input.display());
            std::fs::copy(input, output).map_err(|e| BreakstretchError::StretchFailed {
                path: input.to_path_buf(),
                reason: format!("Failed to copy file: {}", e),
            })?;
            return Ok(());
        }

        let mut command = self.build_command(input, output, ratio);
        trace!("Running {:?}", command);

        let result = command.output().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => BreakstretchError::stretcher_not_found(),
            _ => BreakstretchError::StretchFailed {
                path: input.to_path_buf(),
                reason: format!("Failed to run {}: {}", RUBBERBAND_COMMAND, e),
            },
        })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(BreakstretchError::StretchFailed {
                path: input.to_path_buf(),
                reason: format!("{} exited with {}: {}", RUBBERBAND_COMMAND, result.status, stderr.trim()),
            });
        }

        debug!(
            "Stretched {} by {:.4} -> {}",
            input.display(),
            ratio.value(),
            output.display()
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "rubberband"
    }
}

/// Locate an executable by searching PATH
fn find_on_path(program: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) {
            let exe = dir.join(format!("{}.exe", program));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::compute_ratio;
    use tempfile::TempDir;

    #[test]
    fn test_crispness_clamped() {
        assert_eq!(RubberbandStretcher::new(9).crispness(), 6);
        assert_eq!(RubberbandStretcher::default().crispness(), 5);
    }

    #[test]
    fn test_command_arguments() {
        let stretcher = RubberbandStretcher::new(4);
        let ratio = compute_ratio(170.0, 85.0).unwrap();
        let command = stretcher.build_command(Path::new("in.wav"), Path::new("out.wav"), ratio);
        let args: Vec<_> = command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, ["--tempo", "0.5", "--crisp", "4", "--quiet", "in.wav", "out.wav"]);
    }

    #[test]
    fn test_identity_ratio_copies_without_engine() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("amen_170.wav");
        std::fs::write(&input, b"RIFF fake").unwrap();
        let output = dir.path().join("nested").join("amen_170_170bpm.wav");

        let ratio = compute_ratio(170.0, 170.0).unwrap();
        RubberbandStretcher::default()
            .stretch(&input, &output, ratio)
            .unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), b"RIFF fake");
    }

    #[test]
    fn test_find_on_path_missing_program() {
        assert!(find_on_path("definitely-not-a-real-program-xyz").is_none());
    }
}
