use crate::error::MedibotError;

/// # CORE
/// Operations related to embeddings. The model is fixed at construction
/// time; its vectors must match the configured index dimension.
#[async_trait::async_trait]
pub trait Embedder {
    fn id(&self) -> &'static str;

    /// The dimension of the vectors produced by this embedder.
    fn size(&self) -> usize;

    /// Get the vectors for the elements in `content`.
    /// The content passed in can be a user's query,
    /// or a chunked document.
    async fn embed(&self, content: &[&str]) -> Result<Vec<Vec<f64>>, MedibotError>;
}
