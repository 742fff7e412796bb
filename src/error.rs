//! Error types for lexicon training and text scrubbing.

use thiserror::Error;

/// Errors raised by the lexicon, the corpus loaders and the scrubbing pipeline.
#[derive(Error, Debug)]
pub enum ScrubError {
    /// One corpus class has no documents, so scores cannot be normalized.
    #[error(
        "Data invalid: songs should be annotated as explicit or not \
         (explicit songs: {explicit}, appropriate songs: {approp})"
    )]
    EmptyClass { explicit: u64, approp: u64 },

    /// Thresholds were requested before any scores exist.
    #[error(
        "No {0} scores available. Before updating the threshold you must load a \
         lexicon file or train one with new data"
    )]
    NoScores(&'static str),

    #[error("This song title is ambiguous or not in the database you provided: '{title}' ({matches} matches)")]
    SongNotFound { title: String, matches: usize },

    #[error("The song '{0}' has no lyrics in the database you provided")]
    MissingLyrics(String),

    #[error("Smoothing constant must be a positive number, got {0}")]
    InvalidAlpha(f64),

    #[error("Text file must contain text: {0}")]
    EmptyText(String),

    #[error("If you choose to clean a text, you must pass the path to a .txt file: {0}")]
    NotTextFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed lexicon file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Embedding error: {0}")]
    Embedding(String),
}

/// Result type for scrubbing operations
pub type ScrubResult<T> = Result<T, ScrubError>;

impl ScrubError {
    /// True for errors caused by what the user asked for rather than by bad
    /// data or a bug. These are reported as a plain message.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::SongNotFound { .. }
                | Self::MissingLyrics(_)
                | Self::InvalidAlpha(_)
                | Self::EmptyText(_)
                | Self::NotTextFile(_)
        )
    }

    /// True for precondition violations on lexicon state.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::EmptyClass { .. } | Self::NoScores(_))
    }

    /// Create an embedding error
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }
}
