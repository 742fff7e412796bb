/// Smoothed log-odds scoring of tokens against the two corpus classes.
///
/// Implements:
///   score(t) = ln( ((exp(t) + α) / N_exp) / ((apr(t) + α) / N_apr) )
///
/// where `exp(t)`/`apr(t)` are the token's occurrences in explicit and
/// appropriate documents and `N_exp`/`N_apr` are the document totals.
/// Scores ≥ 0 lean explicit, scores < 0 lean appropriate.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::counts::{BaseCounts, CountAccumulator, TokenCounts};
use crate::error::{ScrubError, ScrubResult};

/// Default smoothing constant.
pub const DEFAULT_ALPHA: f64 = 20.0;

/// Accepts only finite, strictly positive smoothing constants. Anything else
/// yields infinite or NaN scores that cannot be written as JSON.
pub fn validate_alpha(alpha: f64) -> ScrubResult<f64> {
    if alpha.is_finite() && alpha > 0.0 {
        Ok(alpha)
    } else {
        Err(ScrubError::InvalidAlpha(alpha))
    }
}

/// Scored tokens, partitioned by the sign of their score.
///
/// Ordered maps keep candidate iteration stable across runs and across a
/// save/load cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub explicit: BTreeMap<String, f64>,
    pub approp: BTreeMap<String, f64>,
}

impl Scores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `token` in the map matching the sign of `score`, removing it
    /// from the other one so the maps stay disjoint.
    pub fn insert(&mut self, token: impl Into<String>, score: f64) {
        let token = token.into();
        if score >= 0.0 {
            self.approp.remove(&token);
            self.explicit.insert(token, score);
        } else {
            self.explicit.remove(&token);
            self.approp.insert(token, score);
        }
    }

    pub fn get(&self, token: &str) -> Option<f64> {
        self.explicit
            .get(token)
            .or_else(|| self.approp.get(token))
            .copied()
    }

    pub fn explicit_score(&self, token: &str) -> Option<f64> {
        self.explicit.get(token).copied()
    }

    pub fn len(&self) -> usize {
        self.explicit.len() + self.approp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.explicit.is_empty() && self.approp.is_empty()
    }
}

/// Turns accumulated counts into scores.
#[derive(Debug, Clone, Copy)]
pub struct ScoreEngine {
    alpha: f64,
}

impl Default for ScoreEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

impl ScoreEngine {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Score a single token.
    ///
    /// Fails with [`ScrubError::EmptyClass`] when either class has no documents.
    pub fn log_odds(&self, counts: TokenCounts, base: BaseCounts) -> ScrubResult<f64> {
        if !base.is_usable() {
            return Err(ScrubError::EmptyClass {
                explicit: base.explicit,
                approp: base.approp,
            });
        }

        let numerator = (counts.explicit as f64 + self.alpha) / base.explicit as f64;
        let denominator = (counts.approp as f64 + self.alpha) / base.approp as f64;

        Ok((numerator / denominator).ln())
    }

    /// Score every token in the accumulator.
    pub fn score_all(&self, acc: &CountAccumulator) -> ScrubResult<Scores> {
        validate_alpha(self.alpha)?;
        let base = acc.base();
        if !base.is_usable() {
            return Err(ScrubError::EmptyClass {
                explicit: base.explicit,
                approp: base.approp,
            });
        }

        let mut scores = Scores::new();
        for (token, counts) in acc.iter() {
            scores.insert(token, self.log_odds(counts, base)?);
        }

        debug!(
            explicit = scores.explicit.len(),
            approp = scores.approp.len(),
            alpha = self.alpha,
            "scored vocabulary"
        );
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(explicit: u64, approp: u64) -> TokenCounts {
        TokenCounts { explicit, approp }
    }

    fn base(explicit: u64, approp: u64) -> BaseCounts {
        BaseCounts { explicit, approp }
    }

    #[test]
    fn test_zero_class_is_rejected() {
        let engine = ScoreEngine::default();
        let err = engine.log_odds(counts(0, 0), base(0, 0)).unwrap_err();
        assert!(matches!(err, ScrubError::EmptyClass { .. }));
        assert!(engine.log_odds(counts(3, 1), base(4, 0)).is_err());
    }

    #[test]
    fn test_sign_follows_class() {
        let engine = ScoreEngine::default();
        assert!(engine.log_odds(counts(0, 40), base(25, 25)).unwrap() < 0.0);
        assert!(engine.log_odds(counts(40, 39), base(25, 25)).unwrap() > 0.0);
    }

    #[test]
    fn test_hand_computed_value() {
        let engine = ScoreEngine::new(20.0);
        let score = engine.log_odds(counts(20, 5), base(2, 5)).unwrap();
        assert!((score - 4.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_unseen_token_with_balanced_classes_scores_zero() {
        let engine = ScoreEngine::default();
        assert_eq!(engine.log_odds(counts(0, 0), base(7, 7)).unwrap(), 0.0);
        // with unbalanced classes the score reflects the class-size ratio
        let skewed = engine.log_odds(counts(0, 0), base(1, 4)).unwrap();
        assert!((skewed - 4.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_one_sided_counts_are_finite() {
        let engine = ScoreEngine::default();
        assert!(engine.log_odds(counts(12, 0), base(3, 3)).unwrap().is_finite());
        assert!(engine.log_odds(counts(0, 12), base(3, 3)).unwrap().is_finite());
    }

    #[test]
    fn test_score_all_partitions_every_token() {
        let mut acc = CountAccumulator::new();
        acc.record(&["damn", "damn", "damn", "you"], true);
        acc.record(&["damn", "you"], true);
        acc.record(&["sunshine", "you"], false);
        acc.record(&["sunshine", "love"], false);

        let scores = ScoreEngine::default().score_all(&acc).unwrap();

        assert_eq!(scores.len(), acc.len());
        for (token, _) in acc.iter() {
            let in_exp = scores.explicit.contains_key(token);
            let in_apr = scores.approp.contains_key(token);
            assert!(in_exp ^ in_apr, "{token} must be in exactly one map");
        }
        assert!(scores.explicit.values().all(|&s| s >= 0.0));
        assert!(scores.approp.values().all(|&s| s < 0.0));
        assert!(scores.explicit.contains_key("damn"));
        assert!(scores.approp.contains_key("sunshine"));
    }

    #[test]
    fn test_score_all_on_empty_corpus_fails() {
        let acc = CountAccumulator::new();
        assert!(ScoreEngine::default().score_all(&acc).is_err());
    }

    #[test]
    fn test_non_positive_alpha_is_rejected() {
        let mut acc = CountAccumulator::new();
        acc.record(&["damn"], true);
        acc.record(&["sunny"], false);

        for alpha in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = ScoreEngine::new(alpha).score_all(&acc).unwrap_err();
            assert!(matches!(err, ScrubError::InvalidAlpha(_)));
            assert!(err.is_user_error());
        }
        assert_eq!(validate_alpha(0.5).unwrap(), 0.5);
    }

    #[test]
    fn test_insert_moves_between_maps() {
        let mut scores = Scores::new();
        scores.insert("word", 0.4);
        scores.insert("word", -0.2);
        assert!(!scores.explicit.contains_key("word"));
        assert_eq!(scores.get("word"), Some(-0.2));
        assert_eq!(scores.explicit_score("word"), None);
    }
}
