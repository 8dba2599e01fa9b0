use crate::error::MedibotError;

/// A single entry stored in the vector index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord {
    pub id: String,
    pub vector: Vec<f64>,
    pub text: String,
    pub source: String,
}

/// A retrieved entry. Query results are ordered most similar first.
#[derive(Debug, Clone, PartialEq)]
pub struct Snippet {
    pub text: String,
    pub source: String,
    pub score: f64,
}

/// # CORE
/// Operations related to the remote vector index.
#[async_trait::async_trait]
pub trait VectorDb {
    fn id(&self) -> &'static str;

    /// List the names of all existing indexes.
    async fn list_indexes(&self) -> Result<Vec<String>, MedibotError>;

    /// Create the index `name` with the given vector dimension and cosine
    /// similarity, treating an already existing index as success.
    async fn create_default_index(&self, name: &str, size: usize) -> Result<(), MedibotError>;

    /// Upsert the records into the index under the given namespace.
    async fn insert_embeddings(
        &self,
        index: &str,
        namespace: &str,
        records: &[IndexRecord],
    ) -> Result<(), MedibotError>;

    /// Nearest-neighbour search, most similar first.
    async fn query(
        &self,
        index: &str,
        namespace: &str,
        vector: Vec<f64>,
        limit: u32,
    ) -> Result<Vec<Snippet>, MedibotError>;
}
