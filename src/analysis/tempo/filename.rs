//! Filename tempo parser
//!
//! Recognized forms, first match wins:
//! 1. `<N>bpm` suffix, optionally with one separator: `drums-140bpm`, `break_170_BPM`
//! 2. Leading number: `164_HT_Drums`, `140-break`
//! 3. Trailing number: `amen_170`, `break-140`
//!
//! A matched number outside the plausible band is discarded and the next form
//! is tried. No match is a normal outcome, not an error.

use crate::config::BpmBand;
use tracing::{debug, trace};

/// Characters accepted between a number and the surrounding text
const SEPARATORS: [u8; 3] = [b'-', b'_', b' '];

/// Which form produced a filename match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenamePattern {
    BpmSuffix,
    Leading,
    Trailing,
}

impl FilenamePattern {
    /// Precedence order
    pub const ALL: [FilenamePattern; 3] = [
        FilenamePattern::BpmSuffix,
        FilenamePattern::Leading,
        FilenamePattern::Trailing,
    ];

    /// Byte range of the first number this form matches in `name`
    fn find(self, name: &[u8]) -> Option<(usize, usize)> {
        match self {
            FilenamePattern::BpmSuffix => find_bpm_suffix(name),
            FilenamePattern::Leading => find_leading(name),
            FilenamePattern::Trailing => find_trailing(name),
        }
    }
}

/// Extract a BPM from a file's base name (no directory, no extension)
pub fn parse_bpm_from_stem(stem: &str, band: &BpmBand) -> Option<f64> {
    parse_with_pattern(stem, band).map(|(bpm, _)| bpm)
}

/// Like [`parse_bpm_from_stem`], also reporting which form matched
pub fn parse_with_pattern(stem: &str, band: &BpmBand) -> Option<(f64, FilenamePattern)> {
    let bytes = stem.as_bytes();

    for pattern in FilenamePattern::ALL {
        let Some((start, end)) = pattern.find(bytes) else {
            continue;
        };
        // Range boundaries sit on ASCII digits, so slicing is char-safe
        let token = &stem[start..end];
        match accept_number(token, band) {
            Some(bpm) => {
                debug!("Filename '{}' matched {:?}: {} BPM", stem, pattern, bpm);
                return Some((bpm, pattern));
            }
            None => {
                trace!(
                    "Filename '{}': {:?} match '{}' rejected (not an integer in {}-{})",
                    stem,
                    pattern,
                    token,
                    band.min,
                    band.max
                );
            }
        }
    }

    None
}

fn accept_number(token: &str, band: &BpmBand) -> Option<f64> {
    let value = token.parse::<f64>().ok()?;
    (value.fract() == 0.0 && band.contains(value)).then_some(value)
}

fn is_separator(b: u8) -> bool {
    SEPARATORS.contains(&b)
}

/// End of a number (`digits` or `digits.digits`) starting at `start`
fn scan_number_forward(name: &[u8], start: usize) -> Option<usize> {
    let mut i = start;
    while i < name.len() && name[i].is_ascii_digit() {
        i += 1;
    }
    if i == start {
        return None;
    }
    if i + 1 < name.len() && name[i] == b'.' && name[i + 1].is_ascii_digit() {
        i += 1;
        while i < name.len() && name[i].is_ascii_digit() {
            i += 1;
        }
    }
    Some(i)
}

/// Start of a number (`digits` or `digits.digits`) ending at `end`
fn scan_number_backward(name: &[u8], end: usize) -> Option<usize> {
    let mut j = end;
    while j > 0 && name[j - 1].is_ascii_digit() {
        j -= 1;
    }
    if j == end {
        return None;
    }
    if j >= 2 && name[j - 1] == b'.' && name[j - 2].is_ascii_digit() {
        j -= 1;
        while j > 0 && name[j - 1].is_ascii_digit() {
            j -= 1;
        }
    }
    Some(j)
}

fn find_bpm_suffix(name: &[u8]) -> Option<(usize, usize)> {
    if name.len() < 3 {
        return None;
    }
    (0..=name.len() - 3)
        .filter(|&p| name[p..p + 3].eq_ignore_ascii_case(b"bpm"))
        .find_map(|p| {
            let end = match p.checked_sub(1).map(|i| name[i]) {
                Some(b) if b.is_ascii_digit() => p,
                Some(b) if is_separator(b) => p - 1,
                _ => return None,
            };
            scan_number_backward(name, end).map(|start| (start, end))
        })
}

fn find_leading(name: &[u8]) -> Option<(usize, usize)> {
    let end = scan_number_forward(name, 0)?;
    // Separator plus at least one more character
    (end + 1 < name.len() && is_separator(name[end])).then_some((0, end))
}

fn find_trailing(name: &[u8]) -> Option<(usize, usize)> {
    let start = scan_number_backward(name, name.len())?;
    (start > 0 && is_separator(name[start - 1])).then_some((start, name.len()))
}
