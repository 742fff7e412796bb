/// Per-class token tallies collected from a labeled corpus.
///
/// Every occurrence of a token in a document bumps that token's count for
/// the document's class, and every recorded document bumps the class's
/// document total.
use std::collections::HashMap;

/// Occurrences of one token, split by the class of the document it came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenCounts {
    pub explicit: u64,
    pub approp: u64,
}

/// Number of explicit and appropriate documents seen so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaseCounts {
    pub explicit: u64,
    pub approp: u64,
}

impl BaseCounts {
    /// Both classes have at least one document.
    pub fn is_usable(&self) -> bool {
        self.explicit > 0 && self.approp > 0
    }

    pub fn total(&self) -> u64 {
        self.explicit + self.approp
    }
}

#[derive(Debug, Clone, Default)]
pub struct CountAccumulator {
    /// Token → occurrences per class
    counts: HashMap<String, TokenCounts>,
    /// Documents per class
    base: BaseCounts,
}

impl CountAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one labeled document: tally its tokens and count the document.
    pub fn record<S: AsRef<str>>(&mut self, tokens: &[S], explicit: bool) {
        self.tally(tokens, explicit);
        if explicit {
            self.base.explicit += 1;
        } else {
            self.base.approp += 1;
        }
    }

    /// Tally token occurrences without counting a document.
    pub fn tally<S: AsRef<str>>(&mut self, tokens: &[S], explicit: bool) {
        for token in tokens {
            let entry = self.counts.entry(token.as_ref().to_string()).or_default();
            if explicit {
                entry.explicit += 1;
            } else {
                entry.approp += 1;
            }
        }
    }

    /// Counts for `token`, zero in both classes if it was never seen.
    pub fn get(&self, token: &str) -> TokenCounts {
        self.counts.get(token).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TokenCounts)> {
        self.counts.iter().map(|(token, counts)| (token.as_str(), *counts))
    }

    pub fn base(&self) -> BaseCounts {
        self.base
    }

    /// Number of distinct tokens seen.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
