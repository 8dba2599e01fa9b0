/// A single unit of loaded text. PDF documents produce one of these
/// per page.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub text: String,
    pub meta: DocumentMeta,
}

/// Document metadata. The loader fills everything it knows; only `source`
/// survives into the vector index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMeta {
    /// Path of the file this document was loaded from.
    pub source: String,

    /// 1-based page number within the source file.
    pub page: Option<u32>,
}

impl Document {
    pub fn new(text: String, source: &str, page: Option<u32>) -> Self {
        Self {
            text,
            meta: DocumentMeta {
                source: source.to_string(),
                page,
            },
        }
    }

    /// Reduce the metadata to the source path only, leaving the text
    /// untouched.
    pub fn minimal(self) -> Document {
        Document {
            text: self.text,
            meta: DocumentMeta {
                source: self.meta.source,
                page: None,
            },
        }
    }
}

/// Reduce every document's metadata to the source path. Count and order
/// are preserved.
pub fn filter_to_minimal(documents: Vec<Document>) -> Vec<Document> {
    documents.into_iter().map(Document::minimal).collect()
}
