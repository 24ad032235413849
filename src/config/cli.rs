//! CLI argument parsing

use clap::builder::TypedValueParser;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// breakstretch - Time-stretch drum breaks to target BPMs
///
/// Resolves each file's source tempo (manual override, filename, or audio
/// analysis) and stretches it to one or more target tempos.
#[derive(Parser, Debug)]
#[command(name = "breakstretch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only, no progress bars)
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Time-stretch audio file(s) to target BPM(s)
    ///
    /// Examples:
    ///   breakstretch stretch break.wav --target 140
    ///   breakstretch stretch break.wav --targets 90,120,140
    ///   breakstretch stretch break.wav --range 80-160 --step 10
    ///   breakstretch stretch ./breaks/ -t 140 --sample-rate 44100 --mono
    Stretch(StretchArgs),

    /// Resolve and print the source BPM of audio file(s) without stretching
    Detect(DetectArgs),
}

/// Source tempo options shared by both subcommands
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Input path (audio file or directory of audio files)
    #[arg(value_name = "INPUT_PATH")]
    pub input: PathBuf,

    /// Manual source BPM override
    #[arg(short, long, value_name = "BPM")]
    pub bpm: Option<f64>,

    /// Warn if detected BPM differs from the filename or manual BPM
    #[arg(short, long, default_value = "false")]
    pub warn: bool,

    /// Scan subdirectories recursively
    #[arg(long, default_value = "false")]
    pub recursive: bool,

    /// Number of worker threads (defaults to CPU count - 1)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct StretchArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Single target BPM
    #[arg(short, long, value_name = "BPM")]
    pub target: Option<f64>,

    /// Comma-separated target BPMs (e.g., 90,120,140)
    #[arg(long, value_name = "LIST")]
    pub targets: Option<String>,

    /// BPM range (e.g., 80-160)
    #[arg(short, long = "range", value_name = "START-END")]
    pub range_spec: Option<String>,

    /// Step size for range
    #[arg(short, long, default_value_t = super::targets::DEFAULT_STEP)]
    pub step: u32,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = "./output")]
    pub output: PathBuf,

    /// Target sample rate (e.g., 44100, 48000)
    #[arg(long, value_name = "HZ")]
    pub sample_rate: Option<u32>,

    /// Target bit depth
    #[arg(long, value_name = "BITS")]
    #[arg(value_parser = clap::builder::PossibleValuesParser::new(["16", "24", "32"]).map(|s| s.parse::<u16>().unwrap_or(16)))]
    pub bit_depth: Option<u16>,

    /// Convert to mono
    #[arg(long, default_value = "false")]
    pub mono: bool,

    /// Rubberband crispness (0-6, higher preserves transients)
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(0..=6))]
    pub crispness: u8,

    /// Dry run - show planned outputs without processing
    #[arg(long, default_value = "false")]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DetectArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

impl Cli {
    /// Get the log level based on verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    /// Source options of whichever subcommand was given
    pub fn source(&self) -> &SourceArgs {
        match &self.command {
            Command::Stretch(args) => &args.source,
            Command::Detect(args) => &args.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_stretch_defaults() {
        let cli = Cli::try_parse_from(["breakstretch", "stretch", "amen_170.wav", "-t", "140"])
            .unwrap();
        let Command::Stretch(args) = cli.command else {
            panic!("expected stretch subcommand");
        };
        assert_eq!(args.target, Some(140.0));
        assert_eq!(args.step, 10);
        assert_eq!(args.crispness, 5);
        assert_eq!(args.output, PathBuf::from("./output"));
        assert!(!args.source.warn);
        assert!(args.bit_depth.is_none());
    }

    #[test]
    fn test_parse_stretch_full() {
        let cli = Cli::try_parse_from([
            "breakstretch",
            "-vv",
            "stretch",
            "breaks",
            "--range",
            "80-160",
            "--step",
            "20",
            "--bpm",
            "172",
            "--bit-depth",
            "24",
            "--mono",
            "--warn",
        ])
        .unwrap();
        assert_eq!(cli.log_level(), tracing::Level::DEBUG);
        let Command::Stretch(args) = cli.command else {
            panic!("expected stretch subcommand");
        };
        assert_eq!(args.range_spec.as_deref(), Some("80-160"));
        assert_eq!(args.step, 20);
        assert_eq!(args.source.bpm, Some(172.0));
        assert_eq!(args.bit_depth, Some(24));
        assert!(args.mono);
        assert!(args.source.warn);
    }

    #[test]
    fn test_crispness_out_of_range_rejected() {
        let result = Cli::try_parse_from([
            "breakstretch",
            "stretch",
            "a.wav",
            "-t",
            "140",
            "--crispness",
            "7",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        let cli = Cli::try_parse_from(["breakstretch", "detect", "a.wav", "-q", "-vvv"]).unwrap();
        assert_eq!(cli.log_level(), tracing::Level::ERROR);
    }
}
