//! Runtime configuration settings

use super::cli::{Cli, Command, SourceArgs, StretchArgs};
use super::targets::parse_targets;
use super::tempo::TempoConfig;
use crate::audio::ConversionOptions;
use crate::error::Result;
use std::path::PathBuf;

/// Default rubberband crispness, tuned for drums
pub const DEFAULT_CRISPNESS: u8 = 5;

/// Runtime settings for the processing pipeline
#[derive(Debug, Clone)]
pub struct Settings {
    /// Input path (file or directory)
    pub input: PathBuf,
    /// Output directory
    pub output: PathBuf,
    /// Target BPMs, in order
    pub targets: Vec<f64>,
    /// Manual source BPM override
    pub manual_bpm: Option<f64>,
    /// Cross-check authoritative tempos against the audio estimate
    pub warn: bool,
    /// Rubberband crispness (0-6)
    pub crispness: u8,
    /// Format conversion applied after stretching
    pub conversion: ConversionOptions,
    /// Number of worker threads
    pub threads: usize,
    /// Scan recursively
    pub recursive: bool,
    /// Show progress bars
    pub show_progress: bool,
    /// Dry run mode - show planned outputs without processing
    pub dry_run: bool,
    /// Tempo resolution tunables
    pub tempo: TempoConfig,
}

impl Settings {
    /// Create settings from CLI arguments
    ///
    /// Fails if the target specification is invalid.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut settings = Self::from_source(cli.source());
        settings.show_progress = !cli.quiet;

        if let Command::Stretch(args) = &cli.command {
            settings.apply_stretch_args(args)?;
        }

        settings.tempo.validate()?;
        Ok(settings)
    }

    fn from_source(source: &SourceArgs) -> Self {
        let defaults = Self::default();
        Self {
            input: source.input.clone(),
            manual_bpm: source.bpm,
            warn: source.warn,
            recursive: source.recursive,
            threads: source.threads.unwrap_or(defaults.threads),
            ..defaults
        }
    }

    fn apply_stretch_args(&mut self, args: &StretchArgs) -> Result<()> {
        self.targets = parse_targets(
            args.target,
            args.targets.as_deref(),
            args.range_spec.as_deref(),
            args.step,
        )?;
        self.output = args.output.clone();
        self.crispness = args.crispness;
        self.dry_run = args.dry_run;
        self.conversion = ConversionOptions {
            sample_rate: args.sample_rate,
            bit_depth: args.bit_depth,
            mono: args.mono,
        };
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            output: PathBuf::from("./output"),
            targets: Vec::new(),
            manual_bpm: None,
            warn: false,
            crispness: DEFAULT_CRISPNESS,
            conversion: ConversionOptions::default(),
            threads: num_cpus::get().saturating_sub(1).max(1),
            recursive: false,
            show_progress: true,
            dry_run: false,
            tempo: TempoConfig::default(),
        }
    }
}
