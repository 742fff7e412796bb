use std::path::PathBuf;
use tracing::warn;

use crate::scoring::{validate_alpha, DEFAULT_ALPHA};

/// Runtime settings read from the environment (and `.env`, loaded in `main`).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Smoothing constant for new lexicons (`SCRUB_ALPHA`)
    pub alpha: f64,
    /// Ollama embedding model (`EMBEDDING_MODEL`)
    pub embedding_model: String,
    /// Words per embedding request (`EMBEDDING_BATCH_SIZE`)
    pub embedding_batch_size: usize,
    /// Word-vectors text file; when set, no embedding model is called (`SCRUB_VECTORS`)
    pub vectors_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            embedding_model: "all-minilm".to_string(),
            embedding_batch_size: 256,
            vectors_path: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unparsable values fall back to
    /// the defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let alpha = match lookup("SCRUB_ALPHA") {
            Some(raw) => match raw.trim().parse::<f64>().ok().map(validate_alpha) {
                Some(Ok(alpha)) => alpha,
                _ => {
                    warn!(value = %raw, "SCRUB_ALPHA must be a positive number, using default");
                    defaults.alpha
                }
            },
            None => defaults.alpha,
        };

        let embedding_batch_size = match lookup("EMBEDDING_BATCH_SIZE") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    warn!(value = %raw, "EMBEDDING_BATCH_SIZE must be a positive integer, using default");
                    defaults.embedding_batch_size
                }
            },
            None => defaults.embedding_batch_size,
        };

        Self {
            alpha,
            embedding_model: lookup("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            embedding_batch_size,
            vectors_path: lookup("SCRUB_VECTORS")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}
