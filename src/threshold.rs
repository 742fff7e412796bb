/// Percentile cutoffs derived from the score distributions.
///
/// - `exp`: 5th percentile of explicit scores. Only tokens at or above it are
///   removed, which keeps borderline words out of the censor.
/// - `apr`: 80th percentile of appropriate scores. Only words strictly below
///   it are offered as substitutes.
use tracing::debug;

use crate::error::{ScrubError, ScrubResult};
use crate::scoring::Scores;

pub const EXPLICIT_PERCENTILE: f64 = 5.0;
pub const APPROPRIATE_PERCENTILE: f64 = 80.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Threshold {
    /// Minimum explicit score eligible for removal
    pub exp: f64,
    /// Maximum (exclusive) appropriate score eligible as a substitute
    pub apr: f64,
}

impl Threshold {
    /// Compute both cutoffs. Both score maps must be non-empty.
    pub fn from_scores(scores: &Scores) -> ScrubResult<Self> {
        if scores.explicit.is_empty() {
            return Err(ScrubError::NoScores("explicit"));
        }
        if scores.approp.is_empty() {
            return Err(ScrubError::NoScores("appropriate"));
        }

        let exp = percentile_of(scores.explicit.values().copied(), EXPLICIT_PERCENTILE);
        let apr = percentile_of(scores.approp.values().copied(), APPROPRIATE_PERCENTILE);

        debug!(exp, apr, "updated thresholds");
        Ok(Self { exp, apr })
    }
}

fn percentile_of(values: impl Iterator<Item = f64>, pct: f64) -> f64 {
    let mut sorted: Vec<f64> = values.collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    percentile(&sorted, pct).unwrap_or(0.0)
}

/// Percentile of an ascending slice, interpolating linearly between the two
/// nearest order statistics. `pct` is clamped to `[0, 100]`.
pub fn percentile(sorted: &[f64], pct: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let rank = pct.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}
