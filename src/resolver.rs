/// Nearest appropriate word for an explicit word, memoized in the lexicon.
///
/// `resolve` is not a pure query: the first lookup for a token scans the
/// eligible appropriate vocabulary and writes the winner into the lexicon's
/// substitution cache. Later lookups for the same token return the cached
/// word and never call the similarity oracle again.
use tracing::debug;

use crate::lexicon::Lexicon;
use crate::similarity::Similarity;

pub struct SubstitutionResolver<'a> {
    similarity: &'a dyn Similarity,
}

impl<'a> SubstitutionResolver<'a> {
    pub fn new(similarity: &'a dyn Similarity) -> Self {
        Self { similarity }
    }

    /// Substitute for `token`, computing and caching it on a miss.
    ///
    /// Returns an empty string when no candidate is more than 0-similar.
    /// The empty result is cached too.
    pub fn resolve(&self, lexicon: &mut Lexicon, token: &str) -> String {
        if let Some(hit) = lexicon.cached_substitute(token) {
            return hit.to_string();
        }

        let best = self.most_similar(lexicon, token);
        lexicon.cache_substitute(token, best).to_string()
    }

    /// Scan the candidates without touching the cache. The first candidate
    /// reaching the highest similarity wins.
    pub fn most_similar(&self, lexicon: &Lexicon, token: &str) -> String {
        let mut best: (f32, &str) = (0.0, "");

        for word in candidates(lexicon) {
            let sim = self.similarity.similarity(token, word);
            if sim > best.0 {
                best = (sim, word);
            }
        }

        debug!(token, substitute = best.1, similarity = best.0, "resolved substitute");
        best.1.to_string()
    }
}

/// Appropriate words scoring strictly below the appropriate threshold, in
/// map order.
pub fn candidates(lexicon: &Lexicon) -> impl Iterator<Item = &str> {
    let apr = lexicon.threshold().apr;
    lexicon
        .scores()
        .approp
        .iter()
        .filter(move |&(_, &score)| score < apr)
        .map(|(word, _)| word.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::SimCache;
    use crate::scoring::Scores;
    use crate::similarity::WordVectors;
    use std::cell::Cell;

    /// Counts calls and delegates to a vector table.
    struct Counting {
        inner: WordVectors,
        calls: Cell<usize>,
    }

    impl Similarity for Counting {
        fn similarity(&self, a: &str, b: &str) -> f32 {
            self.calls.set(self.calls.get() + 1);
            self.inner.similarity(a, b)
        }
    }

    fn lexicon() -> Lexicon {
        let mut scores = Scores::new();
        for (word, score) in [("stuff", 0.5), ("animal", 1.5), ("plant", 1.25)] {
            scores.insert(word, score);
        }
        for (word, score) in [("cow", -0.9), ("fly", -0.2), ("ham", -1.4)] {
            scores.insert(word, score);
        }
        Lexicon::from_parts(scores, SimCache::new()).unwrap()
    }

    fn vectors() -> WordVectors {
        let mut v = WordVectors::new();
        v.insert("animal", vec![1.0, 0.1, 0.0]);
        v.insert("cow", vec![0.9, 0.2, 0.0]);
        v.insert("ham", vec![0.2, 0.9, 0.0]);
        v.insert("fly", vec![1.0, 0.1, 0.0]);
        v.insert("plant", vec![0.0, 0.0, 1.0]);
        v
    }

    #[test]
    fn test_candidates_below_threshold() {
        let lex = lexicon();
        let words: Vec<&str> = candidates(&lex).collect();
        // apr = -0.48, so "fly" (-0.2) is excluded
        assert_eq!(words, vec!["cow", "ham"]);
    }

    #[test]
    fn test_most_similar_respects_threshold() {
        let lex = lexicon();
        let table = vectors();
        let resolver = SubstitutionResolver::new(&table);
        // "fly" is the closest vector but is not eligible
        assert_eq!(resolver.most_similar(&lex, "animal"), "cow");
    }

    #[test]
    fn test_resolve_is_memoized() {
        let mut lex = lexicon();
        let counting = Counting {
            inner: vectors(),
            calls: Cell::new(0),
        };
        let resolver = SubstitutionResolver::new(&counting);

        let first = resolver.resolve(&mut lex, "animal");
        let calls_after_first = counting.calls.get();
        assert_eq!(calls_after_first, 2);
        assert_eq!(lex.cached_substitute("animal"), Some("cow"));

        let second = resolver.resolve(&mut lex, "animal");
        assert_eq!(first, second);
        assert_eq!(counting.calls.get(), calls_after_first);
    }

    #[test]
    fn test_no_similar_candidate_yields_empty() {
        let mut lex = lexicon();
        let table = vectors();
        let resolver = SubstitutionResolver::new(&table);

        // "plant" is orthogonal to every candidate
        assert_eq!(resolver.resolve(&mut lex, "plant"), "");
        assert_eq!(lex.cached_substitute("plant"), Some(""));
        // an unknown word has no vector at all
        assert_eq!(resolver.resolve(&mut lex, "zzz"), "");
    }

    #[test]
    fn test_ties_keep_first_candidate() {
        let mut scores = Scores::new();
        scores.insert("damn", 2.0);
        for (word, score) in [("darn", -2.0), ("heck", -2.0), ("meh", -0.1)] {
            scores.insert(word, score);
        }
        let lex = Lexicon::from_parts(scores, SimCache::new()).unwrap();

        let mut table = WordVectors::new();
        table.insert("damn", vec![1.0, 0.0]);
        table.insert("darn", vec![1.0, 1.0]);
        table.insert("heck", vec![1.0, 1.0]);
        let resolver = SubstitutionResolver::new(&table);

        assert_eq!(resolver.most_similar(&lex, "damn"), "darn");
    }

    #[test]
    fn test_cached_value_wins_over_search() {
        let mut cache = SimCache::new();
        cache.insert("cheese".to_string(), "Test Results 1".to_string());
        let mut lex = Lexicon::from_parts(lexicon().scores().clone(), cache).unwrap();
        let table = vectors();
        let resolver = SubstitutionResolver::new(&table);

        assert_eq!(resolver.resolve(&mut lex, "cheese"), "Test Results 1");
    }
}
