/// Per-token removal of explicit words.
///
/// Each token whose explicit score reaches `min_score` is either masked with
/// asterisks or replaced by a `$substitute$` marker. Everything else passes
/// through untouched, and the output always has one token per input token.
use std::collections::BTreeSet;

use tracing::debug;

use crate::lexicon::Lexicon;
use crate::resolver::SubstitutionResolver;

/// What to do with an explicit token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Redaction {
    /// Swap in the most similar appropriate word, wrapped in `$...$`
    #[default]
    Replace,
    /// Overwrite with one `*` per character
    Mask,
}

impl Redaction {
    pub fn from_replace_flag(replace: bool) -> Self {
        if replace {
            Self::Replace
        } else {
            Self::Mask
        }
    }
}

pub struct RedactionPipeline<'a> {
    resolver: SubstitutionResolver<'a>,
    min_score: f64,
    mode: Redaction,
}

impl<'a> RedactionPipeline<'a> {
    pub fn new(resolver: SubstitutionResolver<'a>, min_score: f64, mode: Redaction) -> Self {
        Self {
            resolver,
            min_score,
            mode,
        }
    }

    /// Clean `tokens`. Tokens are matched case-sensitively against the
    /// explicit scores. Replacing may grow the lexicon's substitution cache.
    pub fn clean(&self, tokens: &[String], lexicon: &mut Lexicon) -> Vec<String> {
        let mut cleaned = Vec::with_capacity(tokens.len());
        let mut removed = 0usize;

        for token in tokens {
            if !is_eligible(lexicon, token, self.min_score) {
                cleaned.push(token.clone());
                continue;
            }

            removed += 1;
            cleaned.push(match self.mode {
                Redaction::Replace => substitute_marker(&self.resolver.resolve(lexicon, token)),
                Redaction::Mask => mask(token),
            });
        }

        debug!(tokens = tokens.len(), removed, mode = ?self.mode, "cleaned token stream");
        cleaned
    }
}

/// The token is explicit and scores at least `min_score`.
pub fn is_eligible(lexicon: &Lexicon, token: &str, min_score: f64) -> bool {
    lexicon
        .scores()
        .explicit_score(token)
        .is_some_and(|score| score >= min_score)
}

/// Eligible tokens with no cached substitute yet, i.e. the tokens a
/// replacing pass would have to run a similarity search for.
pub fn pending_substitutions(tokens: &[String], lexicon: &Lexicon, min_score: f64) -> BTreeSet<String> {
    tokens
        .iter()
        .filter(|t| is_eligible(lexicon, t, min_score) && lexicon.cached_substitute(t).is_none())
        .cloned()
        .collect()
}

/// One asterisk per character of `token`.
pub fn mask(token: &str) -> String {
    "*".repeat(token.chars().count())
}

pub fn substitute_marker(substitute: &str) -> String {
    format!("${substitute}$")
}
