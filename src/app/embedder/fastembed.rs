use crate::{config::INDEX_SIZE, core::embedder::Embedder, err, error::MedibotError};

/// Embedder implementation running `sentence-transformers/all-MiniLM-L6-v2`
/// locally. The model is downloaded from the HuggingFace hub on first use.
///
/// The index dimension ([INDEX_SIZE]) matches this model; swapping models
/// without reindexing silently degrades retrieval.
pub struct LocalMiniLmEmbedder {
    embedder: fastembed::TextEmbedding,
}

impl LocalMiniLmEmbedder {
    /// Initialise the embedding model. Panics if the model cannot be
    /// downloaded or loaded.
    pub fn new() -> Self {
        tracing::info!("Initializing local Fastembed with AllMiniLML6V2");

        let embedder = fastembed::TextEmbedding::try_new(
            fastembed::InitOptions::new(fastembed::EmbeddingModel::AllMiniLML6V2)
                .with_show_download_progress(true),
        )
        .unwrap_or_else(|e| panic!("error while instantiating text embedding model: {e}"));

        Self { embedder }
    }
}

impl Default for LocalMiniLmEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Embedder for LocalMiniLmEmbedder {
    fn id(&self) -> &'static str {
        "fastembed"
    }

    fn size(&self) -> usize {
        INDEX_SIZE
    }

    async fn embed(&self, content: &[&str]) -> Result<Vec<Vec<f64>>, MedibotError> {
        if content.is_empty() {
            return err!(InvalidInput, "cannot embed empty content");
        }

        let embeddings = match self.embedder.embed(content.to_vec(), None) {
            Ok(embeddings) => embeddings,
            Err(e) => return err!(Embedding, "{e}"),
        };

        debug_assert_eq!(
            embeddings.len(),
            content.len(),
            "Content length is different from embeddings!"
        );

        Ok(embeddings
            .into_iter()
            .map(|embedding| embedding.into_iter().map(|v| v as f64).collect())
            .collect())
    }
}

impl std::fmt::Debug for LocalMiniLmEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalMiniLmEmbedder").finish()
    }
}
