//! Pipeline orchestration
//!
//! Coordinates file discovery, tempo resolution, parallel stretching and
//! the manifest export.

use crate::analysis::tempo::validate_manual_bpm;
use crate::analysis::{
    compute_ratio, StratumTempoEstimator, TempoEstimator, TempoQuery, TempoResolverChain,
};
use crate::audio;
use crate::config::Settings;
use crate::discovery::{self, DiscoveredFile};
use crate::error::{BreakstretchError, ErrorContext, Result};
use crate::export;
use crate::stretch::{RubberbandStretcher, TimeStretcher};
use crate::types::{ProcessedFile, ResolvedTempo, StretchOutput};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Pipeline result summary
#[derive(Debug)]
pub struct PipelineResult {
    pub total_files: usize,
    pub successful: usize,
    pub failed: usize,
    /// Files written, or planned in dry run mode
    pub outputs: Vec<PathBuf>,
}

/// Run the full stretch pipeline with the default collaborators
pub fn run(settings: &Settings) -> Result<PipelineResult> {
    if !settings.dry_run {
        let engine = RubberbandStretcher::check_installed()?;
        debug!("Using rubberband at {}", engine.display());
    }

    run_with(
        settings,
        Arc::new(StratumTempoEstimator::new()),
        Arc::new(RubberbandStretcher::new(settings.crispness)),
    )
}

/// Run the stretch pipeline with explicit estimator and stretch engine
pub fn run_with(
    settings: &Settings,
    estimator: Arc<dyn TempoEstimator>,
    stretcher: Arc<dyn TimeStretcher>,
) -> Result<PipelineResult> {
    use std::time::Instant;

    let pipeline_start = Instant::now();

    if settings.targets.is_empty() {
        return Err(BreakstretchError::InvalidTarget(
            "No target BPM specified".to_string(),
        ));
    }
    validate_manual_bpm(settings.manual_bpm)?;

    configure_thread_pool(settings.threads)?;

    // Phase 1: Discovery
    info!("Scanning for audio files...");
    let files = discovery::scan(&settings.input, settings.recursive)?;

    let chain = TempoResolverChain::new(estimator, settings.tempo.clone());

    // Dry run mode - show planned outputs and exit
    if settings.dry_run {
        return Ok(run_dry_run(&files, settings, &chain));
    }

    std::fs::create_dir_all(&settings.output)
        .map_err(|e| BreakstretchError::output_error(&settings.output, e))?;

    // Phase 2: Resolve and stretch
    info!(
        "Stretching {} files to {} target(s) using {}",
        files.len(),
        settings.targets.len(),
        stretcher.name()
    );
    let stretch_start = Instant::now();
    let processed = process_files(&files, settings, &chain, stretcher.as_ref())?;
    info!(
        "Stretching completed in {:.2}s",
        stretch_start.elapsed().as_secs_f64()
    );

    // Phase 3: Manifest
    let manifest_path = settings.output.join(export::MANIFEST_FILE_NAME);
    export::write_manifest(&processed, &manifest_path)?;

    info!(
        "Total pipeline time: {:.2}s",
        pipeline_start.elapsed().as_secs_f64()
    );

    let successful = processed.len();
    Ok(PipelineResult {
        total_files: files.len(),
        successful,
        failed: files.len() - successful,
        outputs: processed
            .into_iter()
            .flat_map(|f| f.outputs.into_iter().map(|o| o.path))
            .collect(),
    })
}

/// Resolve the source tempo of every discovered file without stretching
pub fn detect(settings: &Settings) -> Result<Vec<(PathBuf, Result<ResolvedTempo>)>> {
    detect_with(settings, Arc::new(StratumTempoEstimator::new()))
}

/// Detect-only mode with an explicit estimator
pub fn detect_with(
    settings: &Settings,
    estimator: Arc<dyn TempoEstimator>,
) -> Result<Vec<(PathBuf, Result<ResolvedTempo>)>> {
    validate_manual_bpm(settings.manual_bpm)?;
    configure_thread_pool(settings.threads)?;

    let files = discovery::scan(&settings.input, settings.recursive)?;
    let chain = TempoResolverChain::new(estimator, settings.tempo.clone());

    Ok(files
        .par_iter()
        .map(|file| (file.path.clone(), resolve_file(file, settings, &chain)))
        .collect())
}

/// Where the stretched rendition of `input` at `target_bpm` is written
///
/// `<output_dir>/<stem>/<stem>_<target>bpm.<ext>`, target truncated to an
/// integer.
pub fn output_path(input: &Path, output_dir: &Path, target_bpm: f64) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "wav".to_string());

    output_dir
        .join(&stem)
        .join(format!("{}_{}bpm.{}", stem, target_bpm.trunc() as i64, ext))
}

/// Dry run mode - show what would be written without decoding or stretching
fn run_dry_run(
    files: &[DiscoveredFile],
    settings: &Settings,
    chain: &TempoResolverChain,
) -> PipelineResult {
    println!();
    println!("=== DRY RUN MODE ===");
    println!();

    let mut outputs = Vec::new();

    for file in files {
        let name = file.file_name();
        let query = TempoQuery::new(&name).with_manual(settings.manual_bpm);
        // Without audio only manual and filename resolution can answer
        let source = chain.resolve(&query, false).ok();

        match source {
            Some(tempo) => println!("{} ({:.2} BPM, {})", file.path.display(), tempo.bpm, tempo.origin),
            None => println!("{} (BPM from audio analysis)", file.path.display()),
        }

        for &target in &settings.targets {
            let path = planned_path(&file.path, settings, target);
            let ratio = source.and_then(|t| compute_ratio(t.bpm, target).ok());
            match ratio {
                Some(ratio) => println!("  -> {} (ratio {:.4})", path.display(), ratio.value()),
                None => println!("  -> {}", path.display()),
            }
            outputs.push(path);
        }
        println!();
    }

    println!("─────────────────────────────────────────");
    println!(
        "Would create {} files from {} sources in {}",
        outputs.len(),
        files.len(),
        settings.output.display()
    );
    println!(
        "  {}/{}",
        settings.output.display(),
        export::MANIFEST_FILE_NAME
    );
    println!();

    PipelineResult {
        total_files: files.len(),
        successful: 0,
        failed: 0,
        outputs,
    }
}

/// Configure the Rayon thread pool
fn configure_thread_pool(num_threads: usize) -> Result<()> {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        Ok(()) => {
            debug!("Configured thread pool with {} threads", num_threads);
        }
        Err(e) => {
            // If the pool is already initialized (e.g., in tests), that's OK
            if e.to_string().contains("already been initialized") {
                debug!("Thread pool already initialized, using existing pool");
            } else {
                return Err(BreakstretchError::ConfigError(format!(
                    "Failed to configure thread pool: {}",
                    e
                )));
            }
        }
    }
    Ok(())
}

/// Process files in parallel; per-file failures are logged and dropped
///
/// A fatal error from any file aborts the run once in-flight files finish.
fn process_files(
    files: &[DiscoveredFile],
    settings: &Settings,
    chain: &TempoResolverChain,
    stretcher: &dyn TimeStretcher,
) -> Result<Vec<ProcessedFile>> {
    let progress_bar = if settings.show_progress {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let results: Vec<Result<ProcessedFile>> = files
        .par_iter()
        .map(|file| {
            let result = process_single_file(file, settings, chain, stretcher);

            if let Err(e) = &result {
                if e.is_recoverable() {
                    warn!("Skipping {}: {}", file.path.display(), e);
                } else {
                    error!("Failed {}: {}", file.path.display(), e);
                }
            }

            if let Some(ref pb) = progress_bar {
                pb.inc(1);
                pb.set_message(file.file_name());
            }
            result
        })
        .collect();

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Stretching complete");
    }

    let mut processed = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(file) => processed.push(file),
            Err(e) if e.is_recoverable() => {}
            Err(fatal) => return Err(fatal),
        }
    }
    Ok(processed)
}

/// Resolve tempo, decoding audio only when the chain needs it
fn resolve_file(
    file: &DiscoveredFile,
    settings: &Settings,
    chain: &TempoResolverChain,
) -> Result<ResolvedTempo> {
    let name = file.file_name();
    let query = TempoQuery::new(&name).with_manual(settings.manual_bpm);

    let audio = if chain.needs_audio(&query, settings.warn) {
        match audio::decode(&file.path) {
            Ok(buffer) => Some(buffer),
            Err(e) if !chain.needs_audio(&query, false) => {
                // Audio was only wanted for the cross-check
                debug!("Skipping cross-check for {}: {}", file.path.display(), e);
                None
            }
            Err(BreakstretchError::DecodeError { reason, .. }) => {
                return Err(BreakstretchError::undetermined(&file.path, reason));
            }
            Err(e) => return Err(e),
        }
    } else {
        None
    };

    let resolved = chain
        .resolve(&query.with_audio(audio.as_ref()), settings.warn)
        .with_file_context(&file.path)?;

    debug!(
        "{}: {:.2} BPM ({})",
        file.path.display(),
        resolved.bpm,
        resolved.origin
    );
    Ok(resolved)
}

/// Resolve one file and render it at every target
fn process_single_file(
    file: &DiscoveredFile,
    settings: &Settings,
    chain: &TempoResolverChain,
    stretcher: &dyn TimeStretcher,
) -> Result<ProcessedFile> {
    let tempo = resolve_file(file, settings, chain)?;

    let mut outputs = Vec::with_capacity(settings.targets.len());
    for &target in &settings.targets {
        outputs.push(render_target(file, &tempo, target, settings, chain, stretcher)?);
    }

    Ok(ProcessedFile {
        path: file.path.clone(),
        tempo,
        outputs,
    })
}

/// Stretched path, with a `.wav` extension when conversion will run
fn planned_path(input: &Path, settings: &Settings, target: f64) -> PathBuf {
    let path = output_path(input, &settings.output, target);
    if settings.conversion.is_noop() {
        path
    } else {
        path.with_extension("wav")
    }
}

fn render_target(
    file: &DiscoveredFile,
    tempo: &ResolvedTempo,
    target: f64,
    settings: &Settings,
    chain: &TempoResolverChain,
    stretcher: &dyn TimeStretcher,
) -> Result<StretchOutput> {
    let ratio = compute_ratio(tempo.bpm, target)?;
    let quality_risk = ratio.is_quality_risk(chain.config().quality_ratio_bounds);
    if quality_risk {
        warn!(
            "{}: ratio {:.3} ({:.1} -> {:.1} BPM) is extreme, expect artifacts",
            file.path.display(),
            ratio.value(),
            tempo.bpm,
            target
        );
    }

    let stretched = output_path(&file.path, &settings.output, target);
    stretcher.stretch(&file.path, &stretched, ratio)?;

    let path = if settings.conversion.is_noop() {
        stretched
    } else {
        let converted = planned_path(&file.path, settings, target);
        audio::convert_audio(&stretched, &converted, &settings.conversion)?;
        if converted != stretched {
            std::fs::remove_file(&stretched)
                .map_err(|e| BreakstretchError::output_error(&stretched, e))?;
        }
        converted
    };

    debug!("Wrote {}", path.display());

    Ok(StretchOutput {
        target_bpm: target,
        ratio,
        quality_risk,
        path,
    })
}
