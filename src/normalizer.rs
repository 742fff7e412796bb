//! Turns a cleaned token list back into natural text.
//!
//! Pipeline: straighten apostrophes → pairwise merge of contractions and
//! elisions → detokenize → capitalize the pronoun "i" → close up spaced dashes.
//!
//! The merge pass looks at tokens two at a time, `(0, 1)`, `(2, 3)`, ... and
//! fuses a pair into one unit when the second token is a contraction suffix
//! ("we" + "'ll"), when an elided "-in'" or "gon'" is followed by a bare
//! apostrophe, or when a bare apostrophe is followed by "cause". A leftover
//! last token is fused onto the previous unit if it is a contraction suffix.
//! Malformed input never fails; at worst it leaves a stray space.

use regex::Regex;
use std::sync::OnceLock;

use crate::detokenizer::Detokenize;

/// Suffixes reattached to the token before them.
pub const CONTRACTION_SUFFIXES: [&str; 8] = ["'ll", "n't", "'s", "'t", "'m", "'d", "'re", "'ve"];

fn elision_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(in\$?\b|gon)").expect("valid regex"))
}

fn pronoun_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bi ").expect("valid regex"))
}

fn pronoun_contraction_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bi'").expect("valid regex"))
}

fn spaced_dash_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" ([-–—]) ").expect("valid regex"))
}

fn straighten(token: &str) -> String {
    token.replace(['‘', '’'], "'")
}

fn is_contraction_suffix(token: &str) -> bool {
    CONTRACTION_SUFFIXES.contains(&token.to_lowercase().as_str())
}

fn should_merge(current: &str, next: &str) -> bool {
    if is_contraction_suffix(next) {
        return true;
    }
    if next == "'" && elision_re().is_match(current) {
        return true;
    }
    current == "'" && next.eq_ignore_ascii_case("cause")
}

pub struct Normalizer<'a> {
    detokenizer: &'a dyn Detokenize,
}

impl<'a> Normalizer<'a> {
    pub fn new(detokenizer: &'a dyn Detokenize) -> Self {
        Self { detokenizer }
    }

    /// Normalize a cleaned token list into a single string.
    pub fn normalize(&self, tokens: &[String]) -> String {
        let units = merge_units(tokens);
        let text = self.detokenizer.detokenize(&units);

        let text = pronoun_re().replace_all(&text, "I ");
        let text = pronoun_contraction_re().replace_all(&text, "I'");
        spaced_dash_re().replace_all(&text, "$1").into_owned()
    }
}

/// The merge pass on its own, before detokenizing.
pub fn merge_units(tokens: &[String]) -> Vec<String> {
    let tokens: Vec<String> = tokens.iter().map(|t| straighten(t)).collect();
    let mut units: Vec<String> = Vec::with_capacity(tokens.len());

    let mut pairs = tokens.chunks_exact(2);
    for pair in pairs.by_ref() {
        let (current, next) = (&pair[0], &pair[1]);
        if should_merge(current, next) {
            units.push(format!("{current}{next}"));
        } else {
            units.push(current.clone());
            units.push(next.clone());
        }
    }

    if let [last] = pairs.remainder() {
        if is_contraction_suffix(last) {
            if let Some(prev) = units.last_mut() {
                prev.push_str(last);
                return units;
            }
        }
        units.push(last.clone());
    }

    units
}

/// Break `text` into console lines: once a line holds five spaces, the next
/// space becomes a line break, so every line carries at most six words.
pub fn wrap_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut spaces = 0usize;

    for c in text.chars() {
        if c == ' ' && spaces >= 5 {
            out.push('\n');
            spaces = 0;
            continue;
        }
        if c == ' ' {
            spaces += 1;
        }
        out.push(c);
    }

    out
}
