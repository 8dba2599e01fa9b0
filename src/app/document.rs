use crate::{
    core::{
        document::{
            parser::{pdf::PdfParser, DocumentParser},
            store::DocumentStore,
        },
        model::Document,
    },
    error::MedibotError,
    map_err,
};
use std::{path::PathBuf, str::FromStr};
use tracing::{debug, info};

/// Simple FS based implementation of a [DocumentStore].
///
/// Scans the base directory for PDF files (non-recursive) and parses each
/// into one [Document] per page.
#[derive(Debug)]
pub struct FsDocumentStore {
    /// The directory the documents are read from.
    base: PathBuf,
    parser: PdfParser,
}

impl FsDocumentStore {
    pub fn new(path: &str) -> Self {
        let base = PathBuf::from_str(path)
            .expect("invalid path")
            .canonicalize()
            .expect("unable to canonicalize");

        if !base.is_dir() {
            panic!("not a directory: {path}");
        }

        info!("Initialising fs store at {}", base.display());

        Self {
            base,
            parser: PdfParser::default(),
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for FsDocumentStore {
    fn id(&self) -> &'static str {
        "fs"
    }

    async fn load(&self) -> Result<Vec<Document>, MedibotError> {
        let mut documents = vec![];

        let mut files = map_err!(tokio::fs::read_dir(&self.base).await);

        while let Some(file) = map_err!(files.next_entry().await) {
            let path = file.path();

            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("pdf") {
                debug!("Skipping {}", path.display());
                continue;
            }

            let source = path.display().to_string();

            debug!("Reading {source}");

            let content = map_err!(tokio::fs::read(&path).await);
            let pages = self.parser.parse(&content)?;

            for (i, text) in pages.into_iter().enumerate() {
                documents.push(Document::new(text, &source, Some(i as u32 + 1)));
            }
        }

        info!(
            "Loaded {} page(s) from {}",
            documents.len(),
            self.base.display()
        );

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::parser::pdf::sample_pdf;

    const DIR: &str = "__fs_doc_store_tests";

    #[tokio::test]
    async fn loads_one_document_per_pdf_page() {
        tokio::fs::create_dir(DIR).await.unwrap();

        let pdf = sample_pdf(&["Aspirin reduces fever", "Ibuprofen reduces swelling"]);
        tokio::fs::write(format!("{DIR}/drugs.pdf"), &pdf)
            .await
            .unwrap();
        tokio::fs::write(format!("{DIR}/notes.txt"), b"not a pdf")
            .await
            .unwrap();

        let store = FsDocumentStore::new(DIR);
        let documents = store.load().await.unwrap();

        tokio::fs::remove_dir_all(DIR).await.unwrap();

        assert_eq!(2, documents.len());
        assert!(documents[0].text.contains("Aspirin reduces fever"));
        assert!(documents[1].text.contains("Ibuprofen reduces swelling"));

        for (i, document) in documents.iter().enumerate() {
            assert!(document.meta.source.ends_with("drugs.pdf"));
            assert_eq!(Some(i as u32 + 1), document.meta.page);
        }
    }

    #[tokio::test]
    async fn unparsable_pdf_fails_the_load() {
        const DIR: &str = "__fs_doc_store_tests_invalid";

        tokio::fs::create_dir(DIR).await.unwrap();
        tokio::fs::write(format!("{DIR}/broken.pdf"), b"definitely not a pdf")
            .await
            .unwrap();

        let store = FsDocumentStore::new(DIR);
        let result = store.load().await;

        tokio::fs::remove_dir_all(DIR).await.unwrap();

        assert!(result.is_err());
    }
}
