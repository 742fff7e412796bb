//! Explicit-word lexicon for song lyrics: learns per-word log-odds scores
//! from labelled songs, then masks explicit words in new text or swaps them
//! for their nearest appropriate neighbour.

pub mod config;
pub mod corpus;
pub mod counts;
pub mod detokenizer;
pub mod embeddings;
pub mod error;
pub mod lexicon;
pub mod normalizer;
pub mod pipeline;
pub mod resolver;
pub mod scoring;
pub mod scrub;
pub mod similarity;
pub mod threshold;
pub mod tokenizer;
