//! Target BPM specification parsing
//!
//! Targets can be given as a single value, a comma-separated list, and/or an
//! inclusive `start-end` range expanded with a step. All sources are combined
//! in that order with duplicates removed.

use crate::error::{BreakstretchError, Result};

/// Default step for range expansion
pub const DEFAULT_STEP: u32 = 10;

/// Parse target specifications into an ordered, de-duplicated list of BPMs
pub fn parse_targets(
    single: Option<f64>,
    list: Option<&str>,
    range: Option<&str>,
    step: u32,
) -> Result<Vec<f64>> {
    let mut result = Vec::new();

    if let Some(target) = single {
        result.push(target);
    }

    if let Some(list) = list {
        for entry in list.split(',') {
            let entry = entry.trim();
            let value = entry.parse::<f64>().map_err(|_| {
                BreakstretchError::InvalidTarget(format!("'{}' is not a number", entry))
            })?;
            result.push(value);
        }
    }

    if let Some(range) = range {
        result.extend(expand_range(range, step)?);
    }

    if result.is_empty() {
        return Err(BreakstretchError::InvalidTarget(
            "No target BPM specified. Use --target, --targets, or --range.".to_string(),
        ));
    }

    if let Some(bad) = result.iter().find(|t| !t.is_finite() || **t <= 0.0) {
        return Err(BreakstretchError::InvalidTarget(format!(
            "target {} must be a positive BPM",
            bad
        )));
    }

    let mut unique: Vec<f64> = Vec::with_capacity(result.len());
    for bpm in result {
        if !unique.contains(&bpm) {
            unique.push(bpm);
        }
    }

    Ok(unique)
}

/// Expand `start-end` into `start, start + step, ...` up to and including `end`
fn expand_range(spec: &str, step: u32) -> Result<Vec<f64>> {
    let parts: Vec<&str> = spec.split('-').collect();
    if parts.len() != 2 {
        return Err(BreakstretchError::InvalidTarget(format!(
            "Invalid range format: {}. Use 'start-end'.",
            spec
        )));
    }

    let parse = |s: &str| {
        s.trim().parse::<u32>().map_err(|_| {
            BreakstretchError::InvalidTarget(format!(
                "Invalid range format: {}. Bounds must be whole numbers.",
                spec
            ))
        })
    };
    let start = parse(parts[0])?;
    let end = parse(parts[1])?;

    if step == 0 {
        return Err(BreakstretchError::InvalidTarget(
            "Range step must be at least 1".to_string(),
        ));
    }
    if start > end {
        return Err(BreakstretchError::InvalidTarget(format!(
            "Invalid range {}: start is greater than end",
            spec
        )));
    }

    Ok((start..=end)
        .step_by(step as usize)
        .map(f64::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_target() {
        assert_eq!(parse_targets(Some(120.0), None, None, 10).unwrap(), vec![120.0]);
    }

    #[test]
    fn test_list_targets() {
        let result = parse_targets(None, Some("90, 120,140"), None, 10).unwrap();
        assert_eq!(result, vec![90.0, 120.0, 140.0]);
    }

    #[test]
    fn test_range_targets() {
        let result = parse_targets(None, None, Some("80-160"), 10).unwrap();
        assert_eq!(result.len(), 9);
        assert_eq!(result.first(), Some(&80.0));
        assert_eq!(result.last(), Some(&160.0));
    }

    #[test]
    fn test_range_with_uneven_step_stops_before_end() {
        let result = parse_targets(None, None, Some("80-100"), 15).unwrap();
        assert_eq!(result, vec![80.0, 95.0]);
    }

    #[test]
    fn test_combined_targets_keep_source_order() {
        let result = parse_targets(Some(75.0), Some("120,140"), Some("200-220"), 10).unwrap();
        assert_eq!(result, vec![75.0, 120.0, 140.0, 200.0, 210.0, 220.0]);
    }

    #[test]
    fn test_removes_duplicates() {
        let result = parse_targets(Some(120.0), Some("120,140,120"), None, 10).unwrap();
        assert_eq!(result, vec![120.0, 140.0]);
    }

    #[test]
    fn test_no_targets_error() {
        let err = parse_targets(None, None, None, 10).unwrap_err();
        assert!(err.to_string().contains("No target BPM specified"));
    }

    #[test]
    fn test_invalid_ranges() {
        let err = parse_targets(None, None, Some("80-100-120"), 10).unwrap_err();
        assert!(err.to_string().contains("Invalid range format"));
        assert!(parse_targets(None, None, Some("fast-slow"), 10).is_err());
        assert!(parse_targets(None, None, Some("160-80"), 10).is_err());
        assert!(parse_targets(None, None, Some("80-160"), 0).is_err());
    }

    #[test]
    fn test_rejects_non_positive_and_garbage() {
        assert!(parse_targets(Some(0.0), None, None, 10).is_err());
        assert!(parse_targets(None, Some("120,abc"), None, 10).is_err());
    }
}
