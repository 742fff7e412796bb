use anyhow::{Context, Result};
use rig::client::EmbeddingsClient;
use rig::client::Nothing;
use rig::embeddings::Embedding;
use rig::embeddings::EmbeddingModel;
use rig::providers::ollama;
use tracing::{debug, info};

use crate::error::ScrubError;
use crate::similarity::WordVectors;

/// Creates an Ollama client with explicit type annotation for the HTTP client.
fn create_ollama_client() -> Result<ollama::Client<reqwest::Client>> {
    let client: ollama::Client<reqwest::Client> = ollama::Client::new(Nothing)?;
    Ok(client)
}

/// Generates embedding vectors for a batch of words using Ollama's embedding model.
pub async fn embed_texts(model_name: &str, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let client = create_ollama_client()?;
    let emb_model = client.embedding_model(model_name);

    let embeddings: Vec<Embedding> = emb_model.embed_texts(texts.to_vec()).await?;

    let vectors: Vec<Vec<f32>> = embeddings
        .into_iter()
        .map(|e| e.vec.iter().map(|&v| v as f32).collect())
        .collect();

    Ok(vectors)
}

/// Embeds every word in `words`, `batch_size` words per request, and
/// collects the results into a vector table for similarity lookups.
pub async fn embed_vocabulary(
    model_name: &str,
    words: &[String],
    batch_size: usize,
) -> Result<WordVectors> {
    let mut table = WordVectors::new();
    let batch_size = batch_size.max(1);

    info!(words = words.len(), model = model_name, "embedding vocabulary");

    for (i, batch) in words.chunks(batch_size).enumerate() {
        let vectors = embed_texts(model_name, batch)
            .await
            .with_context(|| format!("Failed to embed batch {} with model '{}'", i + 1, model_name))?;

        if vectors.len() != batch.len() {
            return Err(ScrubError::embedding(format!(
                "model '{}' returned {} vectors for {} words",
                model_name,
                vectors.len(),
                batch.len()
            ))
            .into());
        }

        for (word, vector) in batch.iter().zip(vectors) {
            table.insert(word.clone(), vector);
        }
        debug!(batch = i + 1, embedded = table.len(), "embedded batch");
    }

    Ok(table)
}
