use crate::{
    core::vector::{IndexRecord, Snippet, VectorDb},
    err,
    error::MedibotError,
    map_err,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, info, warn};

/// Default Pinecone control plane endpoint.
const DEFAULT_CONTROL_PLANE: &str = "https://api.pinecone.io";
/// API version header value sent with every request.
const API_VERSION: &str = "2025-01";

/// Alias for an arced Pinecone instance.
pub type PineconeDb = Arc<Pinecone>;

pub fn init(api_key: &str) -> PineconeDb {
    info!("Connecting to pinecone at {DEFAULT_CONTROL_PLANE}");
    Arc::new(Pinecone::new(api_key, DEFAULT_CONTROL_PLANE))
}

/// Client for the Pinecone REST API.
///
/// Index management goes through the control plane; upserts and queries go
/// to the per-index data plane host, resolved once per index and cached.
///
/// Record metadata holds the chunk text under `text` and the document path
/// under `source` — the indexer and the retriever share this schema through
/// [RecordMetadata].
pub struct Pinecone {
    client: reqwest::Client,
    api_key: String,
    control_url: String,
    hosts: tokio::sync::RwLock<HashMap<String, String>>,
}

impl Pinecone {
    pub fn new(api_key: &str, control_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            control_url: control_url.trim_end_matches('/').to_string(),
            hosts: tokio::sync::RwLock::new(HashMap::new()),
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    /// Resolve the data plane host for `index`, caching it for subsequent
    /// calls.
    async fn host(&self, index: &str) -> Result<String, MedibotError> {
        if let Some(host) = self.hosts.read().await.get(index) {
            return Ok(host.clone());
        }

        let url = format!("{}/indexes/{index}", self.control_url);
        let response = map_err!(self.get(&url).send().await);

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return err!(DoesNotExist, "Index '{index}'");
        }

        let description: IndexDescription = read_json(response).await?;

        // The control plane returns a bare hostname.
        let host = if description.host.starts_with("http") {
            description.host
        } else {
            format!("https://{}", description.host)
        };

        self.hosts
            .write()
            .await
            .insert(index.to_string(), host.clone());

        Ok(host)
    }
}

#[async_trait::async_trait]
impl VectorDb for Pinecone {
    fn id(&self) -> &'static str {
        "pinecone"
    }

    async fn list_indexes(&self) -> Result<Vec<String>, MedibotError> {
        let url = format!("{}/indexes", self.control_url);
        let response = map_err!(self.get(&url).send().await);
        let list: IndexList = read_json(response).await?;

        Ok(list.indexes.into_iter().map(|index| index.name).collect())
    }

    async fn create_default_index(&self, name: &str, size: usize) -> Result<(), MedibotError> {
        if self.list_indexes().await?.iter().any(|n| n == name) {
            info!("Index '{name}' already exists");
            return Ok(());
        }

        info!("Creating index '{name}' of size {size}");

        let request = CreateIndexRequest {
            name,
            dimension: size,
            metric: "cosine",
            spec: IndexSpec {
                serverless: ServerlessSpec {
                    cloud: "aws",
                    region: "us-east-1",
                },
            },
        };

        let url = format!("{}/indexes", self.control_url);
        let response = map_err!(self.post(&url).json(&request).send().await);

        // Lost the race against another creator.
        if response.status() == reqwest::StatusCode::CONFLICT {
            info!("Index '{name}' already exists");
            return Ok(());
        }

        let description: IndexDescription = read_json(response).await?;

        debug_assert_eq!(size, description.dimension);

        Ok(())
    }

    async fn insert_embeddings(
        &self,
        index: &str,
        namespace: &str,
        records: &[IndexRecord],
    ) -> Result<(), MedibotError> {
        debug!("Inserting {} vector(s) to {index}", records.len());

        let host = self.host(index).await?;

        let vectors = records
            .iter()
            .map(|record| UpsertVector {
                id: record.id.clone(),
                values: record.vector.iter().map(|v| *v as f32).collect(),
                metadata: RecordMetadata {
                    text: record.text.clone(),
                    source: record.source.clone(),
                },
            })
            .collect();

        let request = UpsertRequest { vectors, namespace };

        let response = map_err!(
            self.post(&format!("{host}/vectors/upsert"))
                .json(&request)
                .send()
                .await
        );

        let result: UpsertResponse = read_json(response).await?;

        debug_assert_eq!(records.len(), result.upserted_count);

        Ok(())
    }

    async fn query(
        &self,
        index: &str,
        namespace: &str,
        vector: Vec<f64>,
        limit: u32,
    ) -> Result<Vec<Snippet>, MedibotError> {
        let host = self.host(index).await?;

        let request = QueryRequest {
            vector: vector.into_iter().map(|v| v as f32).collect(),
            top_k: limit,
            namespace,
            include_metadata: true,
        };

        let response = map_err!(
            self.post(&format!("{host}/query"))
                .json(&request)
                .send()
                .await
        );

        let result: QueryResponse = read_json(response).await?;

        let snippets = result
            .matches
            .into_iter()
            .filter_map(|m| {
                let Some(metadata) = m.metadata else {
                    warn!("Match '{}' has no metadata, skipping", m.id);
                    return None;
                };
                Some(Snippet {
                    text: metadata.text,
                    source: metadata.source,
                    score: m.score,
                })
            })
            .collect();

        Ok(snippets)
    }
}

/// Read the response body as JSON, mapping non-success statuses to a
/// Pinecone error carrying the body.
async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, MedibotError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return err!(Pinecone, "{status}: {body}");
    }

    Ok(map_err!(response.json::<T>().await))
}

#[derive(Debug, Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: IndexSpec<'a>,
}

#[derive(Debug, Serialize)]
struct IndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Debug, Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexDescription>,
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    name: String,
    dimension: usize,
    host: String,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector>,
    namespace: &'a str,
}

#[derive(Debug, Serialize)]
struct UpsertVector {
    id: String,
    values: Vec<f32>,
    metadata: RecordMetadata,
}

/// The single metadata schema shared by upserts and queries.
#[derive(Debug, Serialize, Deserialize)]
struct RecordMetadata {
    text: String,
    source: String,
}

#[derive(Debug, Deserialize)]
struct UpsertResponse {
    #[serde(rename = "upsertedCount")]
    upserted_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: Vec<f32>,
    top_k: u32,
    namespace: &'a str,
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    score: f64,
    metadata: Option<RecordMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const INDEX: &str = "medical-bot";

    fn description(server: &MockServer) -> serde_json::Value {
        json!({
            "name": INDEX,
            "dimension": 384,
            "metric": "cosine",
            "host": server.base_url(),
            "status": { "ready": true, "state": "Ready" }
        })
    }

    #[tokio::test]
    async fn create_default_index_skips_existing() {
        let server = MockServer::start_async().await;

        let list = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/indexes")
                    .header("Api-Key", "test-key");
                then.status(200)
                    .json_body(json!({ "indexes": [description(&server)] }));
            })
            .await;

        let create = server
            .mock_async(|when, then| {
                when.method(POST).path("/indexes");
                then.status(201).json_body(description(&server));
            })
            .await;

        let pinecone = Pinecone::new("test-key", &server.base_url());

        pinecone.create_default_index(INDEX, 384).await.unwrap();

        list.assert_async().await;
        create.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn create_default_index_creates_missing() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/indexes");
                then.status(200).json_body(json!({ "indexes": [] }));
            })
            .await;

        let create = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/indexes")
                    .body_includes("\"dimension\":384")
                    .body_includes("\"metric\":\"cosine\"")
                    .body_includes("\"serverless\"");
                then.status(201).json_body(description(&server));
            })
            .await;

        let pinecone = Pinecone::new("test-key", &server.base_url());

        pinecone.create_default_index(INDEX, 384).await.unwrap();

        create.assert_async().await;
    }

    #[tokio::test]
    async fn create_default_index_tolerates_conflict() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/indexes");
                then.status(200).json_body(json!({ "indexes": [] }));
            })
            .await;

        server
            .mock_async(|when, then| {
                when.method(POST).path("/indexes");
                then.status(409)
                    .json_body(json!({ "error": { "code": "ALREADY_EXISTS" } }));
            })
            .await;

        let pinecone = Pinecone::new("test-key", &server.base_url());

        pinecone.create_default_index(INDEX, 384).await.unwrap();
    }

    #[tokio::test]
    async fn upserts_records_with_metadata() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/indexes/{INDEX}"));
                then.status(200).json_body(description(&server));
            })
            .await;

        let upsert = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/vectors/upsert")
                    .header("Api-Key", "test-key")
                    .body_includes("\"metadata\":{\"text\":\"Aspirin reduces fever.\",\"source\":\"data/a.pdf\"}")
                    .body_includes("\"namespace\":\"\"");
                then.status(200).json_body(json!({ "upsertedCount": 1 }));
            })
            .await;

        let pinecone = Pinecone::new("test-key", &server.base_url());

        let records = vec![IndexRecord {
            id: "abc".to_string(),
            vector: vec![0.1; 384],
            text: "Aspirin reduces fever.".to_string(),
            source: "data/a.pdf".to_string(),
        }];

        pinecone
            .insert_embeddings(INDEX, "", &records)
            .await
            .unwrap();

        upsert.assert_async().await;
    }

    #[tokio::test]
    async fn queries_and_maps_matches_in_order() {
        let server = MockServer::start_async().await;

        let describe = server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/indexes/{INDEX}"));
                then.status(200).json_body(description(&server));
            })
            .await;

        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/query")
                    .body_includes("\"topK\":3")
                    .body_includes("\"includeMetadata\":true");
                then.status(200).json_body(json!({
                    "matches": [
                        { "id": "a", "score": 0.9, "metadata": { "text": "first", "source": "data/a.pdf" } },
                        { "id": "b", "score": 0.5, "metadata": { "text": "second", "source": "data/b.pdf" } },
                        { "id": "c", "score": 0.1 }
                    ],
                    "namespace": ""
                }));
            })
            .await;

        let pinecone = Pinecone::new("test-key", &server.base_url());

        let snippets = pinecone.query(INDEX, "", vec![0.1; 384], 3).await.unwrap();
        // The match without metadata is dropped.
        assert_eq!(2, snippets.len());
        assert_eq!("first", snippets[0].text);
        assert_eq!(0.9, snippets[0].score);
        assert_eq!("second", snippets[1].text);

        // The data plane host is resolved once and cached.
        pinecone.query(INDEX, "", vec![0.1; 384], 3).await.unwrap();
        describe.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn query_on_missing_index_errors() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/indexes/{INDEX}"));
                then.status(404).json_body(json!({ "error": "not found" }));
            })
            .await;

        let pinecone = Pinecone::new("test-key", &server.base_url());

        assert!(pinecone.query(INDEX, "", vec![0.1; 384], 3).await.is_err());
    }
}
