//! Tempo resolution tunables
//!
//! Passed explicitly into the resolver chain so every call can carry its own
//! configuration.

use crate::error::{BreakstretchError, Result};

/// Inclusive BPM range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BpmBand {
    pub min: f64,
    pub max: f64,
}

impl BpmBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, bpm: f64) -> bool {
        bpm >= self.min && bpm <= self.max
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min <= 0.0 || self.min > self.max {
            return Err(BreakstretchError::ConfigError(format!(
                "{} band {}-{} must be positive and ordered",
                name, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Tempo resolution configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TempoConfig {
    /// Values a filename parse or final estimate may take
    pub plausible_band: BpmBand,
    /// Breakbeat-biased band used to correct subdivision errors
    pub preferred_band: BpmBand,
    /// Priors fed to the estimator, one run each
    pub priors: Vec<f64>,
    /// Maximum BPM difference before the cross-check warns
    pub cross_check_tolerance: f64,
    /// Final disambiguator: prefer candidates nearest this value
    pub selection_target: f64,
    /// Stretch ratios outside this band are flagged as quality risks
    pub quality_ratio_bounds: (f64, f64),
}

impl Default for TempoConfig {
    fn default() -> Self {
        let preferred_band = BpmBand::new(140.0, 180.0);
        Self {
            plausible_band: BpmBand::new(90.0, 180.0),
            preferred_band,
            priors: vec![120.0, 140.0, 170.0],
            cross_check_tolerance: 3.0,
            selection_target: preferred_band.midpoint(),
            quality_ratio_bounds: (0.5, 2.0),
        }
    }
}

impl TempoConfig {
    /// Reject configurations the resolver cannot work with
    pub fn validate(&self) -> Result<()> {
        self.plausible_band.validate("plausible")?;
        self.preferred_band.validate("preferred")?;
        if self.priors.is_empty() {
            return Err(BreakstretchError::ConfigError(
                "at least one tempo prior is required".to_string(),
            ));
        }
        if let Some(bad) = self.priors.iter().find(|p| !p.is_finite() || **p <= 0.0) {
            return Err(BreakstretchError::ConfigError(format!(
                "tempo prior {} must be positive",
                bad
            )));
        }
        if !self.cross_check_tolerance.is_finite() || self.cross_check_tolerance < 0.0 {
            return Err(BreakstretchError::ConfigError(format!(
                "cross-check tolerance {} must be non-negative",
                self.cross_check_tolerance
            )));
        }
        let (low, high) = self.quality_ratio_bounds;
        if low <= 0.0 || low > high {
            return Err(BreakstretchError::ConfigError(format!(
                "quality ratio bounds {}-{} must be positive and ordered",
                low, high
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TempoConfig::default();
        assert_eq!(config.plausible_band, BpmBand::new(90.0, 180.0));
        assert_eq!(config.preferred_band, BpmBand::new(140.0, 180.0));
        assert_eq!(config.priors, vec![120.0, 140.0, 170.0]);
        assert_eq!(config.selection_target, 160.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_band_is_inclusive() {
        let band = BpmBand::new(90.0, 180.0);
        assert!(band.contains(90.0));
        assert!(band.contains(180.0));
        assert!(!band.contains(89.9));
        assert!(!band.contains(180.1));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = TempoConfig::default();
        config.priors.clear();
        assert!(config.validate().is_err());

        let mut config = TempoConfig::default();
        config.preferred_band = BpmBand::new(180.0, 140.0);
        assert!(config.validate().is_err());

        let mut config = TempoConfig::default();
        config.priors.push(-1.0);
        assert!(config.validate().is_err());
    }
}
