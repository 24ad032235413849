//! Subdivision correction
//!
//! Estimators often report a tempo related to the true one by a small ratio
//! (half-time feel, triplet subdivision). Each raw value is tried against the
//! preferred band under a fixed set of factors.

use crate::config::BpmBand;

/// Multiplicative transform applied to a raw estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubdivisionFactor {
    Unity,
    Double,
    Half,
    ThreeHalves,
    TwoThirds,
}

impl SubdivisionFactor {
    /// Tie-break order: earlier factors win when several land in the band
    pub const ORDER: [SubdivisionFactor; 5] = [
        SubdivisionFactor::Unity,
        SubdivisionFactor::Double,
        SubdivisionFactor::Half,
        SubdivisionFactor::ThreeHalves,
        SubdivisionFactor::TwoThirds,
    ];

    pub fn multiplier(self) -> f64 {
        match self {
            SubdivisionFactor::Unity => 1.0,
            SubdivisionFactor::Double => 2.0,
            SubdivisionFactor::Half => 0.5,
            SubdivisionFactor::ThreeHalves => 1.5,
            SubdivisionFactor::TwoThirds => 2.0 / 3.0,
        }
    }

    pub fn apply(self, bpm: f64) -> f64 {
        bpm * self.multiplier()
    }
}

/// Outcome of correcting one raw estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    pub value: f64,
    pub factor: SubdivisionFactor,
}

impl Correction {
    /// True when a non-unity factor moved the value into the band
    pub fn is_corrected(&self) -> bool {
        self.factor != SubdivisionFactor::Unity
    }
}

/// Best in-band representative of `raw`'s harmonic family
///
/// Returns `raw` unchanged with [`SubdivisionFactor::Unity`] when it already
/// sits in the band or when no factor reaches it.
pub fn correct_subdivision(raw: f64, preferred: &BpmBand) -> Correction {
    SubdivisionFactor::ORDER
        .iter()
        .map(|&factor| Correction {
            value: factor.apply(raw),
            factor,
        })
        .find(|c| preferred.contains(c.value))
        .unwrap_or(Correction {
            value: raw,
            factor: SubdivisionFactor::Unity,
        })
}
