//! breakstretch CLI entry point

use breakstretch::config::cli::Command;
use breakstretch::config::{Cli, Settings};
use breakstretch::pipeline;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli);

    // Build settings from CLI
    let settings = match Settings::from_cli(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Validate inputs
    if let Err(e) = validate_inputs(&settings) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match cli.command {
        Command::Stretch(_) => run_stretch(&settings),
        Command::Detect(_) => run_detect(&settings),
    }
}

fn run_stretch(settings: &Settings) -> ExitCode {
    match pipeline::run(settings) {
        Ok(result) => {
            println!();
            if settings.dry_run {
                println!(
                    "Dry run: {} outputs planned from {} files",
                    result.outputs.len(),
                    result.total_files
                );
                return ExitCode::SUCCESS;
            }
            println!(
                "Summary: {} successful, {} failed (of {} total), {} files written",
                result.successful,
                result.failed,
                result.total_files,
                result.outputs.len()
            );

            if result.failed > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_detect(settings: &Settings) -> ExitCode {
    let results = match pipeline::detect(settings) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut failed = 0;
    for (path, result) in &results {
        match result {
            Ok(tempo) => {
                println!("{}: {:.2} BPM ({})", path.display(), tempo.bpm, tempo.origin);
                if let Some(d) = tempo.disagreement {
                    println!("  ! audio suggests {:.2} BPM", d.detected_bpm);
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}: {}", path.display(), e);
            }
        }
    }

    if failed > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn init_logging(cli: &Cli) {
    let filter = cli.log_level().to_string().to_lowercase();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

fn validate_inputs(settings: &Settings) -> Result<(), String> {
    // Check input exists
    if !settings.input.exists() {
        return Err(format!(
            "Input path does not exist: {}\n\n  Tip: Check the path is correct and accessible.\n  Examples:\n    breakstretch stretch ./breaks -t 140\n    breakstretch detect ./amen.wav",
            settings.input.display()
        ));
    }

    // Check output parent directory exists (we'll create the output dir itself)
    if let Some(parent) = settings.output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(format!(
                "Output parent directory does not exist: {}\n\n  Tip: The output directory will be created automatically,\n  but its parent directory must exist.\n  Example: mkdir -p {}",
                parent.display(),
                parent.display()
            ));
        }
    }

    Ok(())
}
