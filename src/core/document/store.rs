use crate::{core::model::Document, error::MedibotError};

/// Implement on anything that can produce the documents to index.
#[async_trait::async_trait]
pub trait DocumentStore {
    fn id(&self) -> &'static str;

    /// Load every available document, one per text element (for PDFs, a
    /// page). A single unreadable or unparsable file fails the whole load.
    async fn load(&self) -> Result<Vec<Document>, MedibotError>;
}
