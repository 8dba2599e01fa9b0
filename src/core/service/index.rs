use crate::{
    config::{INDEX_NAME, INDEX_SIZE},
    core::{
        chunk::Recursive,
        document::{sha256, store::DocumentStore},
        embedder::Embedder,
        model::{filter_to_minimal, Document},
        vector::{IndexRecord, VectorDb},
    },
    error::MedibotError,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum amount of records sent in a single upsert request.
const UPSERT_BATCH_SIZE: usize = 100;

/// Summary of a finished indexing run.
#[derive(Debug, Default, PartialEq)]
pub struct IndexReport {
    /// Amount of loaded documents (PDF pages).
    pub documents: usize,
    /// Amount of chunks upserted into the index.
    pub chunks: usize,
}

/// One-shot pipeline populating the vector index from the document store.
#[derive(Clone)]
pub struct IndexService {
    store: Arc<dyn DocumentStore + Send + Sync>,
    embedder: Arc<dyn Embedder + Send + Sync>,
    vector_db: Arc<dyn VectorDb + Send + Sync>,
    chunker: Recursive,
}

impl IndexService {
    pub fn new(
        store: Arc<dyn DocumentStore + Send + Sync>,
        embedder: Arc<dyn Embedder + Send + Sync>,
        vector_db: Arc<dyn VectorDb + Send + Sync>,
    ) -> Self {
        Self {
            store,
            embedder,
            vector_db,
            chunker: Recursive::default(),
        }
    }

    /// Ensure the index exists, then load, chunk, embed and upsert every
    /// document.
    ///
    /// A failure partway through leaves the index partially populated.
    /// Re-running converges for unchanged content since record IDs are
    /// content digests; records for removed content are never deleted.
    pub async fn build(&self, namespace: &str) -> Result<IndexReport, MedibotError> {
        self.vector_db
            .create_default_index(INDEX_NAME, INDEX_SIZE)
            .await?;

        let documents = filter_to_minimal(self.store.load().await?);

        let chunks = self.chunk_documents(&documents);

        info!(
            "Embedding {} chunk(s) from {} document(s)",
            chunks.len(),
            documents.len()
        );

        for batch in chunks.chunks(UPSERT_BATCH_SIZE) {
            let content: Vec<&str> = batch.iter().map(|chunk| chunk.text.as_str()).collect();

            let embeddings = self.embedder.embed(&content).await?;

            debug_assert_eq!(
                batch.len(),
                embeddings.len(),
                "Content length is different from embeddings!"
            );

            let records: Vec<IndexRecord> = batch
                .iter()
                .zip(embeddings)
                .map(|(chunk, vector)| IndexRecord {
                    id: chunk.id.clone(),
                    vector,
                    text: chunk.text.clone(),
                    source: chunk.source.clone(),
                })
                .collect();

            self.vector_db
                .insert_embeddings(INDEX_NAME, namespace, &records)
                .await?;

            debug!("Upserted {} record(s)", records.len());
        }

        Ok(IndexReport {
            documents: documents.len(),
            chunks: chunks.len(),
        })
    }

    /// Split the documents into chunks with deterministic IDs. Chunk order
    /// within a source document is preserved.
    fn chunk_documents(&self, documents: &[Document]) -> Vec<PendingChunk> {
        let mut chunks = vec![];

        for document in documents {
            let source = &document.meta.source;

            for (i, text) in self.chunker.chunk(&document.text).into_iter().enumerate() {
                let id = sha256(format!("{source}#{i}:{text}").as_bytes());
                chunks.push(PendingChunk {
                    id,
                    text,
                    source: source.clone(),
                });
            }
        }

        chunks
    }
}

/// A chunk waiting to be embedded and upserted.
struct PendingChunk {
    id: String,
    text: String,
    source: String,
}
