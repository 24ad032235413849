//! Tempo resolver chain
//!
//! Resolution is an ordered list of resolvers, first success wins:
//! manual override, then filename, then audio estimate. Later resolvers are
//! never consulted once an earlier one answers.

use super::estimate::collect_candidates;
use super::filename::parse_bpm_from_stem;
use super::selection::{bpms_match, select_candidate};
use crate::analysis::traits::TempoEstimator;
use crate::config::TempoConfig;
use crate::error::{BreakstretchError, Result};
use crate::types::{AudioBuffer, ResolvedTempo, TempoCandidate, TempoDisagreement};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything known about one input when resolving its tempo
#[derive(Debug, Clone, Copy)]
pub struct TempoQuery<'a> {
    /// File name or path; only the base name without extension is parsed
    pub filename: &'a str,
    /// User-supplied source BPM
    pub manual_bpm: Option<f64>,
    /// Decoded mono audio, if the caller has it
    pub audio: Option<&'a AudioBuffer>,
}

impl<'a> TempoQuery<'a> {
    pub fn new(filename: &'a str) -> Self {
        Self {
            filename,
            manual_bpm: None,
            audio: None,
        }
    }

    pub fn with_manual(mut self, bpm: Option<f64>) -> Self {
        self.manual_bpm = bpm;
        self
    }

    pub fn with_audio(mut self, audio: Option<&'a AudioBuffer>) -> Self {
        self.audio = audio;
        self
    }

    /// Base name without directory or extension
    pub fn stem(&self) -> &'a str {
        Path::new(self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(self.filename)
    }
}

/// One stage of the resolution chain
pub trait TempoResolver: Send + Sync {
    /// Produce a candidate, or `None` to defer to the next stage
    fn try_resolve(&self, query: &TempoQuery<'_>, config: &TempoConfig) -> Option<TempoCandidate>;

    /// Get the name of this resolver (for logging)
    fn name(&self) -> &'static str;
}

/// Accepts the user's override
///
/// Validity is checked once by [`validate_manual_bpm`] before the chain runs.
pub struct ManualResolver;

impl TempoResolver for ManualResolver {
    fn try_resolve(&self, query: &TempoQuery<'_>, _config: &TempoConfig) -> Option<TempoCandidate> {
        query.manual_bpm.map(TempoCandidate::manual)
    }

    fn name(&self) -> &'static str {
        "manual"
    }
}

/// Parses the BPM out of the file name
pub struct FilenameResolver;

impl TempoResolver for FilenameResolver {
    fn try_resolve(&self, query: &TempoQuery<'_>, config: &TempoConfig) -> Option<TempoCandidate> {
        parse_bpm_from_stem(query.stem(), &config.plausible_band).map(TempoCandidate::filename)
    }

    fn name(&self) -> &'static str {
        "filename"
    }
}

/// Runs the audio estimator under every prior and selects one candidate
pub struct AudioResolver {
    estimator: Arc<dyn TempoEstimator>,
}

impl AudioResolver {
    pub fn new(estimator: Arc<dyn TempoEstimator>) -> Self {
        Self { estimator }
    }
}

impl TempoResolver for AudioResolver {
    fn try_resolve(&self, query: &TempoQuery<'_>, config: &TempoConfig) -> Option<TempoCandidate> {
        let audio = query.audio?;
        let candidates = collect_candidates(self.estimator.as_ref(), audio, config);
        select_candidate(&candidates, config)
    }

    fn name(&self) -> &'static str {
        "audio"
    }
}

/// The full manual → filename → audio chain with its configuration
///
/// The audio stage is kept outside `authoritative` because the warn
/// cross-check consults it on its own.
pub struct TempoResolverChain {
    authoritative: Vec<Box<dyn TempoResolver>>,
    audio: AudioResolver,
    config: TempoConfig,
}

impl TempoResolverChain {
    pub fn new(estimator: Arc<dyn TempoEstimator>, config: TempoConfig) -> Self {
        Self {
            authoritative: vec![Box::new(ManualResolver), Box::new(FilenameResolver)],
            audio: AudioResolver::new(estimator),
            config,
        }
    }

    /// Every stage in priority order
    fn stages(&self) -> impl Iterator<Item = &dyn TempoResolver> + '_ {
        let audio: &dyn TempoResolver = &self.audio;
        self.authoritative
            .iter()
            .map(|resolver| &**resolver as &dyn TempoResolver)
            .chain(std::iter::once(audio))
    }

    pub fn config(&self) -> &TempoConfig {
        &self.config
    }

    /// Whether resolving `query` would benefit from decoded audio
    ///
    /// Audio is needed when neither the override nor the filename answers,
    /// or when the warn cross-check is requested.
    pub fn needs_audio(&self, query: &TempoQuery<'_>, warn: bool) -> bool {
        if warn {
            return true;
        }
        self.authoritative
            .iter()
            .all(|resolver| resolver.try_resolve(query, &self.config).is_none())
    }

    /// Resolve one input to exactly one tempo
    pub fn resolve(&self, query: &TempoQuery<'_>, warn: bool) -> Result<ResolvedTempo> {
        validate_manual_bpm(query.manual_bpm)?;

        let candidate = self
            .stages()
            .find_map(|resolver| {
                let found = resolver.try_resolve(query, &self.config);
                match &found {
                    Some(c) => debug!(
                        "{}: resolved {:.2} BPM via {}",
                        query.filename,
                        c.value,
                        resolver.name()
                    ),
                    None => debug!("{}: {} resolver had no answer", query.filename, resolver.name()),
                }
                found
            })
            .ok_or_else(|| {
                let reason = if query.audio.is_some() {
                    "no BPM in filename and audio analysis produced no usable tempo"
                } else {
                    "no BPM in filename and no audio available for analysis"
                };
                BreakstretchError::undetermined(PathBuf::from(query.filename), reason)
            })?;

        let mut resolved = ResolvedTempo::from(candidate);

        if warn && !candidate.origin.is_estimate() {
            resolved.disagreement = self.cross_check(query, resolved.bpm);
        }

        Ok(resolved)
    }

    /// Compare an authoritative tempo against the audio estimate
    ///
    /// Never changes the resolved value.
    fn cross_check(&self, query: &TempoQuery<'_>, resolved_bpm: f64) -> Option<TempoDisagreement> {
        let detected = self.audio.try_resolve(query, &self.config)?;

        if bpms_match(resolved_bpm, detected.value, self.config.cross_check_tolerance) {
            debug!(
                "{}: audio estimate {:.1} BPM agrees with {:.1} BPM",
                query.filename, detected.value, resolved_bpm
            );
            return None;
        }

        warn!(
            "{}: using {} BPM, but audio analysis detected {:.1} BPM",
            query.filename, resolved_bpm, detected.value
        );

        Some(TempoDisagreement {
            resolved_bpm,
            detected_bpm: detected.value,
        })
    }
}

/// Reject a manual override that is not a positive, finite BPM
pub fn validate_manual_bpm(manual_bpm: Option<f64>) -> Result<()> {
    match manual_bpm {
        Some(value) if !value.is_finite() || value <= 0.0 => {
            Err(BreakstretchError::OutOfRangeBpm { value })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TempoOrigin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns the same estimate for every prior and counts calls
    struct FixedEstimator {
        bpm: Option<f64>,
        calls: AtomicUsize,
    }

    impl FixedEstimator {
        fn new(bpm: Option<f64>) -> Arc<Self> {
            Arc::new(Self {
                bpm,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TempoEstimator for FixedEstimator {
        fn estimate(&self, _buffer: &AudioBuffer, _prior_bpm: f64) -> Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bpm
                .ok_or_else(|| BreakstretchError::undetermined("", "silent"))
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn audio() -> AudioBuffer {
        AudioBuffer::new(vec![0.0; 64], 22050)
    }

    fn chain(estimator: Arc<FixedEstimator>) -> TempoResolverChain {
        TempoResolverChain::new(estimator, TempoConfig::default())
    }

    #[test]
    fn test_manual_override_wins() {
        let estimator = FixedEstimator::new(Some(120.0));
        let buffer = audio();
        let query = TempoQuery::new("amen_170.wav")
            .with_manual(Some(175.0))
            .with_audio(Some(&buffer));
        let resolved = chain(estimator.clone()).resolve(&query, false).unwrap();
        assert_eq!(resolved.bpm, 175.0);
        assert_eq!(resolved.origin, TempoOrigin::Manual);
        assert_eq!(estimator.calls(), 0);
    }

    #[test]
    fn test_filename_used_without_audio() {
        let estimator = FixedEstimator::new(None);
        let query = TempoQuery::new("amen_170.wav");
        let resolved = chain(estimator.clone()).resolve(&query, false).unwrap();
        assert_eq!(resolved.bpm, 170.0);
        assert_eq!(resolved.origin, TempoOrigin::Filename);
        assert!(resolved.disagreement.is_none());
        assert_eq!(estimator.calls(), 0);
    }

    #[test]
    fn test_filename_parsed_from_full_path() {
        let query = TempoQuery::new("/breaks/2024/think_120_BPM.flac");
        let resolved = chain(FixedEstimator::new(None)).resolve(&query, false).unwrap();
        assert_eq!(resolved.bpm, 120.0);
    }

    #[test]
    fn test_audio_fallback_applies_subdivision_correction() {
        let buffer = audio();
        let query = TempoQuery::new("drum_loop.wav").with_audio(Some(&buffer));
        let resolved = chain(FixedEstimator::new(Some(85.0)))
            .resolve(&query, false)
            .unwrap();
        assert_eq!(resolved.bpm, 170.0);
        assert_eq!(resolved.origin, TempoOrigin::CorrectedEstimate);
    }

    #[test]
    fn test_undetectable_without_any_source() {
        let err = chain(FixedEstimator::new(Some(170.0)))
            .resolve(&TempoQuery::new("drum_loop.wav"), false)
            .unwrap_err();
        assert!(matches!(err, BreakstretchError::UndeterminedTempo { .. }));
    }

    #[test]
    fn test_undetectable_when_estimator_fails_every_prior() {
        let buffer = audio();
        let query = TempoQuery::new("drum_loop.wav").with_audio(Some(&buffer));
        let err = chain(FixedEstimator::new(None))
            .resolve(&query, false)
            .unwrap_err();
        assert!(matches!(err, BreakstretchError::UndeterminedTempo { .. }));
    }

    #[test]
    fn test_invalid_manual_override_rejected() {
        for bad in [0.0, -120.0, f64::NAN] {
            let query = TempoQuery::new("amen_170.wav").with_manual(Some(bad));
            let err = chain(FixedEstimator::new(None))
                .resolve(&query, false)
                .unwrap_err();
            assert!(matches!(err, BreakstretchError::OutOfRangeBpm { .. }));
        }
    }

    #[test]
    fn test_cross_check_reports_disagreement_without_changing_result() {
        let buffer = audio();
        let query = TempoQuery::new("amen_170.wav").with_audio(Some(&buffer));
        let resolved = chain(FixedEstimator::new(Some(120.0)))
            .resolve(&query, true)
            .unwrap();
        assert_eq!(resolved.bpm, 170.0);
        assert_eq!(resolved.origin, TempoOrigin::Filename);
        assert_eq!(
            resolved.disagreement,
            Some(TempoDisagreement {
                resolved_bpm: 170.0,
                detected_bpm: 120.0,
            })
        );
    }

    #[test]
    fn test_cross_check_ignores_half_time_agreement() {
        let buffer = audio();
        let query = TempoQuery::new("break.wav")
            .with_manual(Some(170.0))
            .with_audio(Some(&buffer));
        let resolved = chain(FixedEstimator::new(Some(171.0)))
            .resolve(&query, true)
            .unwrap();
        assert!(resolved.disagreement.is_none());
    }

    #[test]
    fn test_cross_check_skipped_without_warn() {
        let estimator = FixedEstimator::new(Some(120.0));
        let buffer = audio();
        let query = TempoQuery::new("amen_170.wav").with_audio(Some(&buffer));
        let resolved = chain(estimator.clone()).resolve(&query, false).unwrap();
        assert!(resolved.disagreement.is_none());
        assert_eq!(estimator.calls(), 0);
    }

    #[test]
    fn test_validate_manual_bpm() {
        assert!(validate_manual_bpm(None).is_ok());
        assert!(validate_manual_bpm(Some(172.0)).is_ok());
        assert!(matches!(
            validate_manual_bpm(Some(-5.0)),
            Err(BreakstretchError::OutOfRangeBpm { value }) if value == -5.0
        ));
        assert!(validate_manual_bpm(Some(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_invalid_manual_override_never_decodes_or_estimates() {
        let estimator = FixedEstimator::new(Some(170.0));
        let buffer = audio();
        let query = TempoQuery::new("drum_loop.wav")
            .with_manual(Some(0.0))
            .with_audio(Some(&buffer));
        let chain = chain(estimator.clone());
        assert!(!chain.needs_audio(&query, false));
        assert!(chain.resolve(&query, true).is_err());
        assert_eq!(estimator.calls(), 0);
    }

    #[test]
    fn test_needs_audio() {
        let chain = chain(FixedEstimator::new(None));
        assert!(!chain.needs_audio(&TempoQuery::new("amen_170.wav"), false));
        assert!(chain.needs_audio(&TempoQuery::new("amen_170.wav"), true));
        assert!(chain.needs_audio(&TempoQuery::new("drum_loop.wav"), false));
        assert!(!chain.needs_audio(&TempoQuery::new("drum_loop.wav").with_manual(Some(140.0)), false));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let buffer = audio();
        let chain = chain(FixedEstimator::new(Some(92.0)));
        let query = TempoQuery::new("loop.wav").with_audio(Some(&buffer));
        let first = chain.resolve(&query, false).unwrap();
        let second = chain.resolve(&query, false).unwrap();
        assert_eq!(first, second);
    }
}
