use clap::Parser;

/// The name of the vector index holding the document chunks.
pub const INDEX_NAME: &str = "medical-bot";
/// The dimension of the vector index. Must match the embedding model.
pub const INDEX_SIZE: usize = 384;
/// The amount of chunks retrieved as context for a single question.
pub const SEARCH_LIMIT: u32 = 3;
/// The default address to listen on.
const DEFAULT_ADDRESS: &str = "0.0.0.0";
/// The default port to listen on.
const DEFAULT_PORT: &str = "5000";
/// The default directory scanned for PDF documents.
const DEFAULT_DATA_PATH: &str = "data";

#[derive(Debug, Parser)]
#[command(name = "medibot", version = "0.1", about = "Retrieval augmented medical chat", long_about = None)]
pub struct StartArgs {
    /// Address to listen on.
    #[arg(short, long)]
    address: Option<String>,

    /// Port to listen on.
    #[arg(short, long)]
    port: Option<String>,

    /// RUST_LOG string to use as the env filter.
    #[arg(short, long)]
    log: Option<String>,

    /// Directory scanned for PDF documents by the indexer.
    #[arg(short, long)]
    data_path: Option<String>,

    /// Vector index namespace to store and query chunks in.
    #[arg(short, long)]
    namespace: Option<String>,
}

/// Implement a getter method on [StartArgs], using the `$var` environment variable as a fallback
/// and either panic or default if neither the argument nor the environment variable is set.
macro_rules! arg {
    ($id:ident, $var:literal, panic $msg:literal) => {
        impl StartArgs {
            pub fn $id(&self) -> String {
                match &self.$id {
                    Some(val) => val.to_string(),
                    None => match std::env::var($var) {
                        Ok(val) => val,
                        Err(_) => panic!($msg),
                    },
                }
            }
        }
    };
    ($id:ident, $var:literal, default $value:expr) => {
        impl StartArgs {
            pub fn $id(&self) -> String {
                match &self.$id {
                    Some(val) => val.to_string(),
                    None => match std::env::var($var) {
                        Ok(val) => val,
                        Err(_) => $value,
                    },
                }
            }
        }
    };
}

impl StartArgs {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.address(), self.port())
    }

    pub fn pinecone_api_key(&self) -> String {
        std::env::var("PINECONE_API_KEY").expect("Missing PINECONE_API_KEY in env")
    }

    pub fn google_api_key(&self) -> String {
        std::env::var("GOOGLE_API_KEY").expect("Missing GOOGLE_API_KEY in env")
    }
}

arg!(address,   "ADDRESS",            default DEFAULT_ADDRESS.to_string());
arg!(port,      "PORT",               default DEFAULT_PORT.to_string());
arg!(log,       "RUST_LOG",           default "info".to_string());
arg!(data_path, "DATA_PATH",          default DEFAULT_DATA_PATH.to_string());
arg!(namespace, "PINECONE_NAMESPACE", default String::new());
