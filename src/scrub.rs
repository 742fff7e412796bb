use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Settings;
use crate::corpus;
use crate::detokenizer::EnglishDetokenizer;
use crate::embeddings;
use crate::lexicon::Lexicon;
use crate::normalizer::Normalizer;
use crate::pipeline::{self, Redaction, RedactionPipeline};
use crate::resolver::{self, SubstitutionResolver};
use crate::similarity::{Similarity, WordVectors};
use crate::tokenizer::EnglishTokenizer;

/// What to clean: a song from the dataset or a text file.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    SongTitle(String),
    TextFile(PathBuf),
}

#[derive(Debug, Clone)]
pub struct CleanRequest {
    pub song_info: PathBuf,
    pub lyrics: PathBuf,
    pub lexicon: PathBuf,
    pub mode: Redaction,
    pub query: Query,
    /// Overrides `Settings::vectors_path`
    pub vectors: Option<PathBuf>,
}

/// Trains a lexicon from the two song tables and writes it to `output`.
///
/// Pipeline: Load + join tables → Tokenize lyrics → Count → Score → Threshold → Save.
pub fn build_lexicon(song_info: &Path, lyrics: &Path, output: &Path, alpha: f64) -> Result<Lexicon> {
    println!("  Loading songs from: {} + {}", song_info.display(), lyrics.display());
    let songs = corpus::load_songs(song_info, lyrics).context("Failed to load song tables")?;
    println!("  Joined {} songs.", songs.len());

    println!("  Tokenizing lyrics [parallel]...");
    let documents = corpus::tokenize_songs(&songs, &EnglishTokenizer);
    println!("  Tokenized {} songs with lyrics.", documents.len());

    let mut lexicon = Lexicon::new(alpha);
    lexicon
        .train(documents)
        .context("Failed to score the training data")?;

    let base = lexicon.base_counts();
    let threshold = lexicon.threshold();
    println!(
        "  Scored {} words from {} explicit / {} appropriate songs (alpha={}).",
        lexicon.scores().len(),
        base.explicit,
        base.approp,
        lexicon.alpha()
    );
    println!(
        "  {} explicit, {} appropriate (thresholds: exp={:.3}, apr={:.3}).",
        lexicon.scores().explicit.len(),
        lexicon.scores().approp.len(),
        threshold.exp,
        threshold.apr
    );

    lexicon
        .save(output)
        .with_context(|| format!("Failed to write lexicon to '{}'", output.display()))?;
    println!("  Saved lexicon to '{}'.", output.display());

    Ok(lexicon)
}

/// Cleans a song or text file and returns the normalized text.
///
/// Pipeline: Load lexicon → Tokenize query → Prepare similarity → Redact →
/// Normalize → Save lexicon (to keep newly cached substitutes).
pub async fn clean(request: &CleanRequest, settings: &Settings) -> Result<String> {
    let mut lexicon = Lexicon::load(&request.lexicon)
        .with_context(|| format!("Failed to load lexicon '{}'", request.lexicon.display()))?;

    let tokens = match &request.query {
        Query::SongTitle(title) => {
            let songs = corpus::load_songs(&request.song_info, &request.lyrics)
                .context("Failed to load song tables")?;
            corpus::find_song(&songs, title, &EnglishTokenizer)?
        }
        Query::TextFile(path) => corpus::read_text(path, &EnglishTokenizer)?,
    };

    let vectors_path = request.vectors.as_ref().or(settings.vectors_path.as_ref());
    let similarity = prepare_similarity(&tokens, &lexicon, request.mode, vectors_path, settings).await?;

    let text = clean_tokens(&tokens, &mut lexicon, request.mode, &similarity);

    lexicon
        .save(&request.lexicon)
        .with_context(|| format!("Failed to update lexicon '{}'", request.lexicon.display()))?;

    Ok(text)
}

/// Redacts `tokens` at the lexicon's explicit threshold and normalizes the
/// result into text.
pub fn clean_tokens(
    tokens: &[String],
    lexicon: &mut Lexicon,
    mode: Redaction,
    similarity: &dyn Similarity,
) -> String {
    let min_score = lexicon.threshold().exp;
    let redactor = RedactionPipeline::new(SubstitutionResolver::new(similarity), min_score, mode);
    let cleaned = redactor.clean(tokens, lexicon);

    Normalizer::new(&EnglishDetokenizer).normalize(&cleaned)
}

/// Words that need vectors for this query: the explicit tokens with no
/// cached substitute plus every eligible candidate. Empty when masking or
/// when every explicit token is already cached.
pub fn vocabulary_to_embed(tokens: &[String], lexicon: &Lexicon, mode: Redaction) -> BTreeSet<String> {
    if mode == Redaction::Mask {
        return BTreeSet::new();
    }

    let mut words = pipeline::pending_substitutions(tokens, lexicon, lexicon.threshold().exp);
    if words.is_empty() {
        return words;
    }
    words.extend(resolver::candidates(lexicon).map(str::to_string));
    words
}

async fn prepare_similarity(
    tokens: &[String],
    lexicon: &Lexicon,
    mode: Redaction,
    vectors_path: Option<&PathBuf>,
    settings: &Settings,
) -> Result<WordVectors> {
    let vocabulary = vocabulary_to_embed(tokens, lexicon, mode);
    if vocabulary.is_empty() {
        return Ok(WordVectors::new());
    }

    match vectors_path {
        Some(path) => {
            info!(path = %path.display(), words = vocabulary.len(), "loading word vectors");
            WordVectors::load(path, |word| vocabulary.contains(word))
                .with_context(|| format!("Failed to load word vectors from '{}'", path.display()))
        }
        None => {
            let words: Vec<String> = vocabulary.into_iter().collect();
            embeddings::embed_vocabulary(&settings.embedding_model, &words, settings.embedding_batch_size)
                .await
                .context("Failed to embed vocabulary (is Ollama running? set SCRUB_VECTORS to use a local vectors file)")
        }
    }
}
