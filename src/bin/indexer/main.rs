use clap::Parser;
use medibot::app::{
    document::FsDocumentStore, embedder::fastembed::LocalMiniLmEmbedder, vector::pinecone,
};
use medibot::core::service::index::IndexService;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = medibot::config::StartArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from(args.log()))
        .init();

    let store = Arc::new(FsDocumentStore::new(&args.data_path()));
    let embedder = Arc::new(LocalMiniLmEmbedder::new());
    let pinecone = pinecone::init(&args.pinecone_api_key());

    let indexer = IndexService::new(store, embedder, pinecone);

    match indexer.build(&args.namespace()).await {
        Ok(report) => info!(
            "Indexed {} chunk(s) from {} page(s)",
            report.chunks, report.documents
        ),
        Err(e) => {
            e.print();
            std::process::exit(1);
        }
    }
}
