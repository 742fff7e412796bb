//! Explicit / appropriate word lexicon.
//!
//! A lexicon is either trained from labeled documents (counts → scores →
//! thresholds) or loaded from a saved `[scores, sim_cache]` file, after which
//! the thresholds are recomputed from the loaded scores. Counts, document
//! totals and alpha are not saved, so a loaded lexicon cannot be trained
//! further.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::counts::{BaseCounts, CountAccumulator};
use crate::error::ScrubResult;
use crate::scoring::{ScoreEngine, Scores, DEFAULT_ALPHA};
use crate::threshold::Threshold;

/// Explicit token → previously chosen substitute.
pub type SimCache = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct Lexicon {
    counts: CountAccumulator,
    engine: ScoreEngine,
    scores: Scores,
    threshold: Threshold,
    sim_cache: SimCache,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

impl Lexicon {
    /// Empty lexicon with smoothing constant `alpha`.
    pub fn new(alpha: f64) -> Self {
        Self {
            counts: CountAccumulator::new(),
            engine: ScoreEngine::new(alpha),
            scores: Scores::new(),
            threshold: Threshold::default(),
            sim_cache: SimCache::new(),
        }
    }

    /// Build a lexicon from saved scores and cache, recomputing thresholds.
    pub fn from_parts(scores: Scores, sim_cache: SimCache) -> ScrubResult<Self> {
        let mut lexicon = Self {
            scores,
            sim_cache,
            ..Self::default()
        };
        lexicon.update_threshold()?;
        Ok(lexicon)
    }

    /// Count every tokenized document, score the vocabulary and compute
    /// thresholds.
    pub fn train<I>(&mut self, documents: I) -> ScrubResult<()>
    where
        I: IntoIterator<Item = (Vec<String>, bool)>,
    {
        for (tokens, explicit) in documents {
            self.counts.record(&tokens, explicit);
        }
        info!(
            explicit = self.counts.base().explicit,
            approp = self.counts.base().approp,
            vocabulary = self.counts.len(),
            "counted training documents"
        );

        self.score()?;
        self.update_threshold()?;
        Ok(())
    }

    /// Recompute `scores` from the accumulated counts.
    pub fn score(&mut self) -> ScrubResult<()> {
        self.scores = self.engine.score_all(&self.counts)?;
        Ok(())
    }

    /// Recompute both thresholds from the current scores.
    pub fn update_threshold(&mut self) -> ScrubResult<Threshold> {
        self.threshold = Threshold::from_scores(&self.scores)?;
        Ok(self.threshold)
    }

    pub fn counts(&self) -> &CountAccumulator {
        &self.counts
    }

    pub fn base_counts(&self) -> BaseCounts {
        self.counts.base()
    }

    pub fn alpha(&self) -> f64 {
        self.engine.alpha()
    }

    pub fn scores(&self) -> &Scores {
        &self.scores
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    pub fn sim_cache(&self) -> &SimCache {
        &self.sim_cache
    }

    pub fn cached_substitute(&self, token: &str) -> Option<&str> {
        self.sim_cache.get(token).map(String::as_str)
    }

    /// Remember `substitute` for `token`. An existing entry is never replaced.
    pub fn cache_substitute(&mut self, token: &str, substitute: String) -> &str {
        self.sim_cache
            .entry(token.to_string())
            .or_insert(substitute)
            .as_str()
    }

    /// Load a lexicon saved with [`Lexicon::save`].
    pub fn load(path: &Path) -> ScrubResult<Self> {
        let file = File::open(path)?;
        let (scores, sim_cache): (Scores, SimCache) = serde_json::from_reader(BufReader::new(file))?;
        debug!(
            path = %path.display(),
            explicit = scores.explicit.len(),
            approp = scores.approp.len(),
            cached = sim_cache.len(),
            "loaded lexicon"
        );
        Self::from_parts(scores, sim_cache)
    }

    /// Write `[scores, sim_cache]` as JSON. The file is written next to the
    /// destination and renamed over it, so readers never see a partial file.
    pub fn save(&self, path: &Path) -> ScrubResult<()> {
        let parent_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent_dir)?;

        let temp_file = NamedTempFile::new_in(parent_dir)?;
        {
            let mut writer = BufWriter::new(temp_file.as_file());
            serde_json::to_writer_pretty(&mut writer, &(&self.scores, &self.sim_cache))?;
            writer.flush()?;
        }
        temp_file.as_file().sync_all()?;

        temp_file.persist(path).map_err(|e| e.error)?;
        debug!(path = %path.display(), "saved lexicon");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrubError;
    use tempfile::tempdir;

    fn doc(words: &[&str], explicit: bool) -> (Vec<String>, bool) {
        (words.iter().map(|w| w.to_string()).collect(), explicit)
    }

    fn corpus() -> Vec<(Vec<String>, bool)> {
        vec![
            doc(&["damn", "you", "damn", "fool", "baby"], true),
            doc(&["shit", "damn", "baby", "you"], true),
            doc(&["damn", "shit", "yeah"], true),
            doc(&["sunny", "day", "you", "baby", "love"], false),
            doc(&["love", "flower", "sunny", "you"], false),
            doc(&["heck", "love", "darn", "day"], false),
        ]
    }

    #[test]
    fn test_train_fills_scores_and_threshold() {
        let mut lex = Lexicon::default();
        lex.train(corpus()).unwrap();

        assert_eq!(lex.base_counts(), BaseCounts { explicit: 3, approp: 3 });
        assert_eq!(lex.scores().len(), lex.counts().len());
        assert!(lex.scores().explicit.contains_key("damn"));
        assert!(lex.scores().approp.contains_key("love"));

        let t = lex.threshold();
        assert!(t.exp > 0.0);
        assert!(t.apr < 0.0);
    }

    #[test]
    fn test_train_without_both_classes_fails() {
        let mut lex = Lexicon::default();
        let err = lex.train(vec![doc(&["damn"], true)]).unwrap_err();
        assert!(err.is_invalid_state());
    }

    #[test]
    fn test_threshold_requires_scores() {
        let mut lex = Lexicon::default();
        assert!(matches!(lex.update_threshold(), Err(ScrubError::NoScores(_))));
        assert_eq!(lex.threshold(), Threshold::default());
    }

    #[test]
    fn test_cache_is_append_only() {
        let mut lex = Lexicon::default();
        assert_eq!(lex.cache_substitute("damn", "heck".to_string()), "heck");
        assert_eq!(lex.cache_substitute("damn", "darn".to_string()), "heck");
        assert_eq!(lex.cached_substitute("damn"), Some("heck"));
        assert_eq!(lex.cached_substitute("fool"), None);
    }

    #[test]
    fn test_save_and_load_reproduce_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lexicon.json");

        let mut lex = Lexicon::default();
        lex.train(corpus()).unwrap();
        lex.cache_substitute("damn", "heck".to_string());
        lex.save(&path).unwrap();

        let loaded = Lexicon::load(&path).unwrap();
        assert_eq!(loaded.scores(), lex.scores());
        assert_eq!(loaded.sim_cache(), lex.sim_cache());
        assert_eq!(loaded.threshold(), lex.threshold());
        // counts are not persisted
        assert!(loaded.counts().is_empty());
    }

    #[test]
    fn test_saved_file_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("lexicon.json");

        let mut scores = Scores::new();
        scores.insert("damn", 1.5);
        scores.insert("heck", -0.5);
        let mut cache = SimCache::new();
        cache.insert("damn".to_string(), "heck".to_string());
        Lexicon::from_parts(scores, cache).unwrap().save(&path).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0]["explicit"]["damn"], 1.5);
        assert_eq!(raw[0]["approp"]["heck"], -0.5);
        assert_eq!(raw[1]["damn"], "heck");
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"explicit\": {}}").unwrap();
        assert!(matches!(Lexicon::load(&path), Err(ScrubError::Json(_))));
    }
}
