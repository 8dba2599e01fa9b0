use crate::{
    app::{embedder::fastembed::LocalMiniLmEmbedder, llm::gemini::GeminiChat, vector::pinecone},
    config::StartArgs,
    core::service::chat::ChatService,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
pub struct AppState {
    /// Medibot services.
    pub services: ServiceState,
}

impl AppState {
    /// Load the application state using the provided configuration.
    ///
    /// Every client is constructed exactly once here; missing credentials
    /// fail the process before it starts serving.
    pub fn new(args: &StartArgs) -> Self {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from(args.log()))
            .init();

        let pinecone = pinecone::init(&args.pinecone_api_key());
        let embedder = Arc::new(LocalMiniLmEmbedder::new());
        let llm = Arc::new(GeminiChat::new(&args.google_api_key()));

        let chat = ChatService::new(embedder, pinecone, llm, args.namespace());

        Self {
            services: ServiceState { chat },
        }
    }
}

#[derive(Clone)]
pub struct ServiceState {
    pub chat: ChatService,
}
