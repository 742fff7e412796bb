/// Word similarity over dense vectors.
///
/// `WordVectors` holds one vector per word and scores pairs by cosine
/// similarity. Words without a vector (or with an all-zero vector) score 0
/// against everything, so they never win a substitution search.
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::ScrubResult;

/// Scores how similar two tokens are; higher means more similar.
pub trait Similarity {
    fn similarity(&self, a: &str, b: &str) -> f32;
}

#[derive(Debug, Clone, Default)]
pub struct WordVectors {
    vectors: HashMap<String, Vec<f32>>,
}

impl WordVectors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: impl Into<String>, vector: Vec<f32>) {
        self.vectors.insert(word.into(), vector);
    }

    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.vectors.get(word).map(Vec::as_slice)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.vectors.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Load vectors from a GloVe / word2vec text file, keeping only the
    /// words for which `keep` returns true.
    pub fn load(path: &Path, keep: impl Fn(&str) -> bool) -> ScrubResult<Self> {
        let file = File::open(path)?;
        let table = Self::from_reader(BufReader::new(file), keep)?;
        debug!(path = %path.display(), words = table.len(), "loaded word vectors");
        Ok(table)
    }

    /// Parse `word v1 v2 ...` lines. A leading `count dim` header line is
    /// skipped, as are lines whose values do not parse.
    pub fn from_reader<R: BufRead>(reader: R, keep: impl Fn(&str) -> bool) -> ScrubResult<Self> {
        let mut table = Self::new();
        let mut dim: Option<usize> = None;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else {
                continue;
            };
            let values: Vec<&str> = fields.collect();

            if line_no == 0 && values.len() == 1 && word.parse::<usize>().is_ok() {
                continue;
            }
            if !keep(word) {
                continue;
            }

            let vector: Result<Vec<f32>, _> = values.iter().map(|v| v.parse::<f32>()).collect();
            let Ok(vector) = vector else {
                warn!(line = line_no + 1, "skipping unparsable vector line");
                continue;
            };

            match dim {
                Some(d) if d != vector.len() => {
                    warn!(line = line_no + 1, expected = d, found = vector.len(), "skipping vector with wrong dimension");
                    continue;
                }
                None => dim = Some(vector.len()),
                _ => {}
            }

            table.insert(word, vector);
        }

        Ok(table)
    }
}

impl Similarity for WordVectors {
    fn similarity(&self, a: &str, b: &str) -> f32 {
        match (self.get(a), self.get(b)) {
            (Some(x), Some(y)) => cosine(x, y),
            _ => 0.0,
        }
    }
}

/// Cosine similarity, 0 for mismatched lengths or zero vectors.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
