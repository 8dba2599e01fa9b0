use crate::{
    config::{INDEX_NAME, SEARCH_LIMIT},
    core::{embedder::Embedder, llm::Llm, vector::VectorDb},
    error::MedibotError,
};
use std::sync::Arc;
use tracing::debug;

/// The answer returned when the chat model's reply contains no answer text.
pub const NO_RESPONSE: &str = "No response";

/// Persona and grounding instructions for the chat model. The retrieved
/// context is appended below it when answering.
const SYSTEM_PROMPT: &str = "You are a medical assistant for question-answering tasks. \
Use the following pieces of retrieved context to answer the question. \
If you don't know the answer, say that you don't know. \
Use three sentences maximum and keep the answer concise.";

/// High level operations for retrieval augmented answering.
#[derive(Clone)]
pub struct ChatService {
    embedder: Arc<dyn Embedder + Send + Sync>,
    vector_db: Arc<dyn VectorDb + Send + Sync>,
    llm: Arc<dyn Llm + Send + Sync>,
    namespace: String,
}

impl ChatService {
    pub fn new(
        embedder: Arc<dyn Embedder + Send + Sync>,
        vector_db: Arc<dyn VectorDb + Send + Sync>,
        llm: Arc<dyn Llm + Send + Sync>,
        namespace: String,
    ) -> Self {
        Self {
            embedder,
            vector_db,
            llm,
            namespace,
        }
    }

    /// Answer `message` using the top [SEARCH_LIMIT] chunks nearest to its
    /// embedding as context.
    ///
    /// Always produces a string while the downstream services respond; a
    /// model reply without answer text becomes [NO_RESPONSE].
    pub async fn answer(&self, message: &str) -> Result<String, MedibotError> {
        let mut embeddings = self.embedder.embed(&[message]).await?;

        debug_assert_eq!(1, embeddings.len());

        let snippets = self
            .vector_db
            .query(
                INDEX_NAME,
                &self.namespace,
                std::mem::take(&mut embeddings[0]),
                SEARCH_LIMIT,
            )
            .await?;

        debug!("Retrieved {} snippet(s) for context", snippets.len());

        let context = snippets
            .iter()
            .map(|snippet| snippet.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let system = format!("{SYSTEM_PROMPT}\n\n{context}");

        let answer = self.llm.complete(&system, message).await?;

        Ok(answer.unwrap_or_else(|| NO_RESPONSE.to_string()))
    }
}
